//! Two-stage scam detection.
//!
//! Stage 1 is the rule scorer. Stage 2 is a semantic classifier consulted only
//! when stage 1 is ambiguous or the message carries risk vocabulary. Stage 2
//! failures never surface: the stage-1 verdict stands.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::DomainError;
use crate::domain::session::{DetectionState, Message, SCAM_TYPE_NONE};
use crate::ports::{SemanticClassifier, SemanticVerdict};

use super::scorer::round2;
use super::{DetectionRules, RiskSignals, RuleBasedScorer, RuleVerdict, UrgencyLevel};

const STAGE2_WEIGHT: f64 = 0.7;
const STAGE1_WEIGHT: f64 = 0.3;
/// Scam verdicts below this confidence get a second opinion.
const AMBIGUOUS_SCAM_BELOW: f64 = 0.85;
/// Non-scam verdicts above this confidence get a second opinion.
const AMBIGUOUS_CLEAN_ABOVE: f64 = 0.2;

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Advisory phrasing short-circuited both stages.
    NegationGuard,
    /// Stage 1 only; stage 2 was not needed.
    RuleBased,
    /// Stage 2 was needed but failed.
    RuleFallback,
    /// Both stages combined.
    Hybrid,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::NegationGuard => "negation_guard",
            DetectionMethod::RuleBased => "rule_based",
            DetectionMethod::RuleFallback => "rule_fallback",
            DetectionMethod::Hybrid => "hybrid",
        }
    }
}

/// Output of [`DetectionPipeline::classify`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub is_scam: bool,
    pub scam_type: String,
    pub confidence: f64,
    pub method: DetectionMethod,
    pub urgency: UrgencyLevel,
    /// Stage-2 reasoning, when stage 2 ran successfully.
    pub reasoning: Option<String>,
    pub flags: Vec<String>,
}

impl Verdict {
    /// The verdict as persisted session state.
    pub fn to_detection_state(&self) -> DetectionState {
        DetectionState::new(self.is_scam, self.scam_type.clone(), self.confidence)
    }

    fn from_rules(rule: &RuleVerdict, method: DetectionMethod, urgency: UrgencyLevel) -> Self {
        Self {
            is_scam: rule.is_scam,
            scam_type: rule.scam_type.clone(),
            confidence: rule.confidence,
            method,
            urgency,
            reasoning: None,
            flags: Vec::new(),
        }
    }

    fn combined(rule: &RuleVerdict, semantic: SemanticVerdict, urgency: UrgencyLevel) -> Self {
        let is_scam = semantic.is_scam || rule.is_scam;
        let semantic_type = semantic.scam_type.trim().to_lowercase();
        let scam_type = if !is_scam {
            SCAM_TYPE_NONE.to_string()
        } else if semantic_type.is_empty() || semantic_type == SCAM_TYPE_NONE {
            rule.scam_type.clone()
        } else {
            semantic_type
        };
        let semantic_confidence = if semantic.confidence.is_finite() {
            semantic.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            is_scam,
            scam_type,
            confidence: round2(STAGE2_WEIGHT * semantic_confidence + STAGE1_WEIGHT * rule.confidence),
            method: DetectionMethod::Hybrid,
            urgency,
            reasoning: Some(semantic.reasoning).filter(|r| !r.is_empty()),
            flags: semantic.flags,
        }
    }
}

/// Rule scorer plus optional semantic classifier.
pub struct DetectionPipeline {
    scorer: RuleBasedScorer,
    classifier: Option<Arc<dyn SemanticClassifier>>,
}

impl DetectionPipeline {
    /// Builds a pipeline from rule tables.
    ///
    /// Without a classifier, every stage-2 trigger resolves as a fallback.
    pub fn new(
        rules: &DetectionRules,
        classifier: Option<Arc<dyn SemanticClassifier>>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            scorer: RuleBasedScorer::new(rules)?,
            classifier,
        })
    }

    pub fn scorer(&self) -> &RuleBasedScorer {
        &self.scorer
    }

    /// Classifies a message. `history` is used for trace context only.
    pub async fn classify(&self, message: &str, history: &[Message]) -> Verdict {
        let urgency = self.scorer.urgency(message).level;
        let rule = self.scorer.score(message);

        if rule.negated {
            tracing::debug!(method = "negation_guard", "Advisory phrasing, skipping classification");
            return Verdict::from_rules(&rule, DetectionMethod::NegationGuard, urgency);
        }

        let signals = self.scorer.risk_signals(message);
        if !needs_semantic_stage(&rule, &signals, urgency) {
            return Verdict::from_rules(&rule, DetectionMethod::RuleBased, urgency);
        }

        let Some(classifier) = &self.classifier else {
            return Verdict::from_rules(&rule, DetectionMethod::RuleFallback, urgency);
        };

        match classifier.classify(message).await {
            Ok(semantic) => {
                let verdict = Verdict::combined(&rule, semantic, urgency);
                tracing::debug!(
                    method = verdict.method.as_str(),
                    is_scam = verdict.is_scam,
                    scam_type = %verdict.scam_type,
                    confidence = verdict.confidence,
                    history_len = history.len(),
                    "Hybrid detection verdict"
                );
                verdict
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    history_len = history.len(),
                    "Semantic classifier failed, using rule verdict"
                );
                Verdict::from_rules(&rule, DetectionMethod::RuleFallback, urgency)
            }
        }
    }
}

fn needs_semantic_stage(rule: &RuleVerdict, signals: &RiskSignals, urgency: UrgencyLevel) -> bool {
    let ambiguous_scam = rule.is_scam && rule.confidence < AMBIGUOUS_SCAM_BELOW;
    let ambiguous_clean = !rule.is_scam && rule.confidence > AMBIGUOUS_CLEAN_ABOVE;
    let pressured = urgency != UrgencyLevel::None && !rule.is_scam;

    ambiguous_scam
        || ambiguous_clean
        || signals.negated_risk()
        || signals.has_risk_terms()
        || pressured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ClassifierError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedClassifier {
        result: Result<SemanticVerdict, ClassifierError>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedClassifier {
        fn returning(result: Result<SemanticVerdict, ClassifierError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SemanticClassifier for ScriptedClassifier {
        async fn classify(&self, text: &str) -> Result<SemanticVerdict, ClassifierError> {
            self.calls.lock().unwrap().push(text.to_string());
            self.result.clone()
        }
    }

    fn pipeline(classifier: Arc<ScriptedClassifier>) -> DetectionPipeline {
        DetectionPipeline::new(&DetectionRules::default(), Some(classifier)).unwrap()
    }

    #[tokio::test]
    async fn advisory_message_skips_stage_two() {
        let classifier = ScriptedClassifier::returning(Ok(SemanticVerdict::new(true, "phishing", 0.99)));
        let verdict = pipeline(classifier.clone())
            .classify("Do not share your OTP with anyone", &[])
            .await;

        assert!(!verdict.is_scam);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.method, DetectionMethod::NegationGuard);
        assert_eq!(classifier.call_count(), 0);
    }

    #[tokio::test]
    async fn otp_request_combines_both_stages() {
        let classifier = ScriptedClassifier::returning(Ok(
            SemanticVerdict::new(true, "phishing", 0.95).with_reasoning("credential request"),
        ));
        let verdict = pipeline(classifier.clone())
            .classify("Share your OTP now to verify your account", &[])
            .await;

        assert!(verdict.is_scam);
        assert_eq!(verdict.scam_type, "phishing");
        // 0.7 * 0.95 + 0.3 * 0.85
        assert_eq!(verdict.confidence, 0.92);
        assert_eq!(verdict.method, DetectionMethod::Hybrid);
        assert_eq!(verdict.reasoning.as_deref(), Some("credential request"));
        assert_eq!(classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn classifier_failure_falls_back_to_rules() {
        let classifier = ScriptedClassifier::returning(Err(ClassifierError::Timeout(8)));
        let verdict = pipeline(classifier)
            .classify("Share your OTP now to verify your account", &[])
            .await;

        assert!(verdict.is_scam);
        assert_eq!(verdict.scam_type, "phishing");
        assert!(verdict.confidence >= 0.85);
        assert_eq!(verdict.method, DetectionMethod::RuleFallback);
    }

    #[tokio::test]
    async fn benign_message_stays_rule_based() {
        let classifier = ScriptedClassifier::returning(Ok(SemanticVerdict::new(true, "phishing", 0.9)));
        let verdict = pipeline(classifier.clone())
            .classify("Are we still on for dinner?", &[])
            .await;

        assert!(!verdict.is_scam);
        assert_eq!(verdict.method, DetectionMethod::RuleBased);
        assert_eq!(classifier.call_count(), 0);
    }

    #[tokio::test]
    async fn semantic_stage_can_flag_what_rules_missed() {
        let classifier = ScriptedClassifier::returning(Ok(SemanticVerdict::new(true, "job_offer", 0.9)));
        let verdict = pipeline(classifier)
            .classify("Part-time job, pay 500 per task, message on telegram", &[])
            .await;

        assert!(verdict.is_scam);
        assert_eq!(verdict.scam_type, "job_offer");
        // 0.7 * 0.9 + 0.3 * 0.1
        assert_eq!(verdict.confidence, 0.66);
    }

    #[tokio::test]
    async fn semantic_none_type_keeps_rule_type() {
        let classifier = ScriptedClassifier::returning(Ok(SemanticVerdict::new(false, "none", 0.2)));
        let verdict = pipeline(classifier)
            .classify("Your account is suspended, verify now", &[])
            .await;

        assert!(verdict.is_scam);
        assert_eq!(verdict.scam_type, "phishing");
    }

    #[tokio::test]
    async fn no_classifier_means_fallback() {
        let pipeline = DetectionPipeline::new(&DetectionRules::default(), None).unwrap();
        let verdict = pipeline.classify("Click this link to pay", &[]).await;
        assert_eq!(verdict.method, DetectionMethod::RuleFallback);
        assert!(!verdict.is_scam);
    }

    #[test]
    fn verdict_maps_to_detection_state() {
        let verdict = Verdict {
            is_scam: false,
            scam_type: "phishing".into(),
            confidence: 0.4,
            method: DetectionMethod::Hybrid,
            urgency: UrgencyLevel::None,
            reasoning: None,
            flags: vec![],
        };
        let state = verdict.to_detection_state();
        assert!(!state.is_scam());
        assert_eq!(state.scam_type(), "none");
    }
}
