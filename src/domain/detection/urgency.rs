//! Urgency (pressure tactic) analysis.

use serde::{Deserialize, Serialize};

/// Coarse urgency level of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    None,
    Medium,
    High,
}

impl UrgencyLevel {
    /// Level for a number of distinct urgency keywords found.
    pub fn from_hits(hits: usize) -> Self {
        match hits {
            0 => UrgencyLevel::None,
            1 | 2 => UrgencyLevel::Medium,
            _ => UrgencyLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::None => "none",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
        }
    }
}

/// Result of scanning a message for urgency keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrgencyAnalysis {
    pub level: UrgencyLevel,
    pub keywords_found: Vec<String>,
}

impl UrgencyAnalysis {
    /// Scans `text` for the given keywords (substring, case-insensitive).
    pub fn analyze(text: &str, keywords: &[String]) -> Self {
        let lower = text.to_lowercase();
        let keywords_found: Vec<String> = keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .cloned()
            .collect();

        Self {
            level: UrgencyLevel::from_hits(keywords_found.len()),
            keywords_found,
        }
    }

    pub fn score(&self) -> usize {
        self.keywords_found.len()
    }

    pub fn is_urgent(&self) -> bool {
        self.level != UrgencyLevel::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::DetectionRules;

    fn analyze(text: &str) -> UrgencyAnalysis {
        UrgencyAnalysis::analyze(text, &DetectionRules::default().urgency_keywords)
    }

    #[test]
    fn calm_message_has_no_urgency() {
        let result = analyze("Hello, how was your weekend?");
        assert_eq!(result.level, UrgencyLevel::None);
        assert!(!result.is_urgent());
    }

    #[test]
    fn single_keyword_is_medium() {
        let result = analyze("Please reply TODAY.");
        assert_eq!(result.level, UrgencyLevel::Medium);
        assert_eq!(result.keywords_found, vec!["today".to_string()]);
    }

    #[test]
    fn three_keywords_is_high() {
        let result = analyze("URGENT: act now, offer expires in an hour");
        assert_eq!(result.level, UrgencyLevel::High);
        assert!(result.score() >= 3);
    }
}
