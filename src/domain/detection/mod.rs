//! Scam detection: rule tables, the rule scorer and the two-stage pipeline.

mod pipeline;
mod rules;
mod scorer;
mod urgency;

pub use pipeline::{DetectionMethod, DetectionPipeline, Verdict};
pub use rules::{CategoryRules, DetectionRules};
pub use scorer::{
    round2, RiskSignals, RuleBasedScorer, RuleVerdict, RULE_CONFIDENCE_CAP, SCAM_SCORE_THRESHOLD,
};
pub use urgency::{UrgencyAnalysis, UrgencyLevel};
