//! Heuristic indicator tables.
//!
//! These are configuration data, not logic. They are built once at start-up,
//! compiled by [`RuleBasedScorer`](super::RuleBasedScorer) and shared by
//! reference for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// Indicators for a single scam category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    /// Scam type reported when this category wins.
    pub scam_type: String,
    /// Plain substrings, matched case-insensitively. Weight 1.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regular expressions, matched case-insensitively. Weight 2.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Explicit credential-request expressions. Weight 10.
    #[serde(default)]
    pub credential_requests: Vec<String>,
}

impl CategoryRules {
    fn new(scam_type: &str, keywords: &[&str], patterns: &[&str], credential_requests: &[&str]) -> Self {
        Self {
            scam_type: scam_type.to_string(),
            keywords: to_strings(keywords),
            patterns: to_strings(patterns),
            credential_requests: to_strings(credential_requests),
        }
    }
}

/// Complete rule set for the detection pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRules {
    /// Categories in declaration order; ties on score go to the earlier entry.
    pub categories: Vec<CategoryRules>,
    /// Advisory phrasing that negates scam intent ("do not share ...").
    pub negation_phrases: Vec<String>,
    /// Terms that carry risk on their own and warrant a semantic second look.
    pub risk_terms: Vec<String>,
    /// Single words that flip the meaning of a nearby risk term.
    pub negation_words: Vec<String>,
    /// Pressure-tactic vocabulary used by urgency analysis.
    pub urgency_keywords: Vec<String>,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryRules::new(
                    "phishing",
                    &["verify", "suspended", "locked", "otp", "suspicious activity"],
                    &[
                        r"(?:share|send|provide).*otp",
                        r"suspicious.*activity",
                        r"secure.*account",
                        r"account.*(?:suspended|locked)",
                    ],
                    &[r"(?:share|send|provide|enter).*(?:otp|password|pin|cvv)"],
                ),
                CategoryRules::new(
                    "lottery",
                    &["won", "winner", "lottery", "prize", "congratulations"],
                    &[r"won.*(?:rs\.?|₹|\$)\s*[\d,]+", r"claim.*prize"],
                    &[],
                ),
                CategoryRules::new(
                    "investment",
                    &["profit", "returns", "guaranteed", "crypto"],
                    &[r"\d+%.*(?:profit|returns)", r"guaranteed.*returns"],
                    &[],
                ),
                CategoryRules::new(
                    "tech_support",
                    &["virus", "infected", "microsoft", "tech support"],
                    &[r"computer.*virus", r"call.*immediately"],
                    &[],
                ),
                CategoryRules::new(
                    "impersonation",
                    &["police", "government", "arrest", "warrant"],
                    &[r"legal.*action", r"arrest.*warrant"],
                    &[],
                ),
            ],
            negation_phrases: to_strings(&[
                "do not share",
                "don't share",
                "never share",
                "beware",
                "signs of a scam",
                "be careful",
                "be aware",
                "stay alert",
                "report fraud",
                "will never ask",
                "never ask for",
            ]),
            risk_terms: to_strings(&[
                "otp",
                "password",
                "pin",
                "cvv",
                "upi",
                "pay",
                "payment",
                "transfer",
                "bank account",
                "urgent",
                "immediately",
                "whatsapp",
                "telegram",
                "click",
                "link",
            ]),
            negation_words: to_strings(&["not", "never", "don't", "no"]),
            urgency_keywords: to_strings(&[
                "urgent",
                "immediately",
                "now",
                "today",
                "hurry",
                "limited time",
                "expires",
                "last chance",
                "act now",
                "within 24 hours",
                "deadline",
                "before",
            ]),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
