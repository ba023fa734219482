//! Stage 1: weighted keyword/pattern scoring.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::domain::foundation::DomainError;
use crate::domain::session::SCAM_TYPE_NONE;

use super::{DetectionRules, UrgencyAnalysis};

const KEYWORD_WEIGHT: u32 = 1;
const PATTERN_WEIGHT: u32 = 2;
const CREDENTIAL_WEIGHT: u32 = 10;

/// Minimum winning score for a scam verdict.
pub const SCAM_SCORE_THRESHOLD: u32 = 2;
/// Confidence ceiling for rule-only verdicts.
pub const RULE_CONFIDENCE_CAP: f64 = 0.85;
const CONFIDENCE_PER_POINT: f64 = 0.15;
const NON_SCAM_CONFIDENCE: f64 = 0.1;

/// A compiled scam category.
#[derive(Debug)]
struct CompiledCategory {
    scam_type: String,
    keywords: Vec<String>,
    patterns: Vec<Regex>,
    credential_requests: Vec<Regex>,
}

impl CompiledCategory {
    fn score(&self, lower: &str) -> u32 {
        let keyword_hits = self.keywords.iter().filter(|kw| lower.contains(kw.as_str())).count();
        let pattern_hits = self.patterns.iter().filter(|re| re.is_match(lower)).count();
        let credential_hits = self
            .credential_requests
            .iter()
            .filter(|re| re.is_match(lower))
            .count();

        keyword_hits as u32 * KEYWORD_WEIGHT
            + pattern_hits as u32 * PATTERN_WEIGHT
            + credential_hits as u32 * CREDENTIAL_WEIGHT
    }
}

/// Verdict of the rule layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleVerdict {
    pub is_scam: bool,
    pub scam_type: String,
    pub confidence: f64,
    /// Advisory phrasing short-circuited scoring.
    pub negated: bool,
    /// Per-category scores in declaration order (empty when negated).
    pub scores: Vec<(String, u32)>,
}

impl RuleVerdict {
    fn negated() -> Self {
        Self {
            is_scam: false,
            scam_type: SCAM_TYPE_NONE.to_string(),
            confidence: 0.0,
            negated: true,
            scores: Vec::new(),
        }
    }

    /// Score of the winning category (0 when negated).
    pub fn top_score(&self) -> u32 {
        self.scores.iter().map(|(_, s)| *s).max().unwrap_or(0)
    }
}

/// Risk-bearing vocabulary found in a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskSignals {
    pub risk_terms: Vec<String>,
    pub has_negation_word: bool,
}

impl RiskSignals {
    pub fn has_risk_terms(&self) -> bool {
        !self.risk_terms.is_empty()
    }

    /// Risk terms and a negation word appear together ("never share your pin").
    pub fn negated_risk(&self) -> bool {
        self.has_risk_terms() && self.has_negation_word
    }
}

/// Rule-based scam scorer compiled from [`DetectionRules`].
#[derive(Debug)]
pub struct RuleBasedScorer {
    categories: Vec<CompiledCategory>,
    negation_phrases: Vec<String>,
    risk_terms: Vec<(String, Regex)>,
    negation_words: Vec<Regex>,
    urgency_keywords: Vec<String>,
}

impl RuleBasedScorer {
    /// Compiles the rule tables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if any expression fails to compile.
    pub fn new(rules: &DetectionRules) -> Result<Self, DomainError> {
        let mut categories = Vec::with_capacity(rules.categories.len());
        for category in &rules.categories {
            categories.push(CompiledCategory {
                scam_type: category.scam_type.trim().to_lowercase(),
                keywords: lowercase_all(&category.keywords),
                patterns: compile_all(&category.scam_type, &category.patterns)?,
                credential_requests: compile_all(&category.scam_type, &category.credential_requests)?,
            });
        }

        let mut risk_terms = Vec::with_capacity(rules.risk_terms.len());
        for term in lowercase_all(&rules.risk_terms) {
            let regex = compile_word("risk_terms", &term)?;
            risk_terms.push((term, regex));
        }

        let negation_words = lowercase_all(&rules.negation_words)
            .iter()
            .map(|word| compile_word("negation_words", word))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            categories,
            negation_phrases: lowercase_all(&rules.negation_phrases),
            risk_terms,
            negation_words,
            urgency_keywords: lowercase_all(&rules.urgency_keywords),
        })
    }

    /// Returns true if the text uses advisory phrasing that negates intent.
    pub fn is_negated(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.negation_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Scores a message against every category.
    pub fn score(&self, text: &str) -> RuleVerdict {
        if self.is_negated(text) {
            return RuleVerdict::negated();
        }

        let lower = text.to_lowercase();
        let scores: Vec<(String, u32)> = self
            .categories
            .iter()
            .map(|c| (c.scam_type.clone(), c.score(&lower)))
            .collect();

        // First maximum wins, so ties resolve to declaration order.
        let mut winner: Option<&(String, u32)> = None;
        for entry in &scores {
            if winner.map_or(true, |(_, best)| entry.1 > *best) {
                winner = Some(entry);
            }
        }

        let (scam_type, top) = match winner {
            Some((scam_type, score)) => (scam_type.clone(), *score),
            None => (SCAM_TYPE_NONE.to_string(), 0),
        };

        let is_scam = top >= SCAM_SCORE_THRESHOLD;
        let confidence = if is_scam {
            round2((top as f64 * CONFIDENCE_PER_POINT).min(RULE_CONFIDENCE_CAP))
        } else {
            NON_SCAM_CONFIDENCE
        };

        RuleVerdict {
            is_scam,
            scam_type: if is_scam { scam_type } else { SCAM_TYPE_NONE.to_string() },
            confidence,
            negated: false,
            scores,
        }
    }

    /// Collects risk terms and negation words present in the text.
    pub fn risk_signals(&self, text: &str) -> RiskSignals {
        let lower = text.to_lowercase();
        RiskSignals {
            risk_terms: self
                .risk_terms
                .iter()
                .filter(|(_, re)| re.is_match(&lower))
                .map(|(term, _)| term.clone())
                .collect(),
            has_negation_word: self.negation_words.iter().any(|re| re.is_match(&lower)),
        }
    }

    pub fn urgency(&self, text: &str) -> UrgencyAnalysis {
        UrgencyAnalysis::analyze(text, &self.urgency_keywords)
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn compile_all(table: &str, patterns: &[String]) -> Result<Vec<Regex>, DomainError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| DomainError::invalid_pattern(table, pattern, e))
        })
        .collect()
}

fn compile_word(table: &str, word: &str) -> Result<Regex, DomainError> {
    let pattern = format!(r"\b{}\b", regex::escape(word));
    Regex::new(&pattern).map_err(|e| DomainError::invalid_pattern(table, &pattern, e))
}
