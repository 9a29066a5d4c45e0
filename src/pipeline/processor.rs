//! Email classifier. Normalizes text, runs the category strategy, detects
//! the sub-intent and applies the greeting override.
//!
//! Flow:
//! 1. `normalize_text` → canonical single-line text
//! 2. `CategoryClassifier::classify` → category + confidence
//! 3. `SubIntentDetector::detect` → sub-intent + signals
//! 4. Greeting override → weak Productive greetings become Unproductive

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::pipeline::normalize::normalize_text;
use crate::pipeline::rules::SubIntentDetector;
use crate::pipeline::splitter;
use crate::pipeline::types::{
    Category, CategoryClassifier, ClassificationResult, EmailUnit, SubIntent, UnitClassification,
};

/// Productive greetings below this confidence are overridden.
const GREETING_OVERRIDE_THRESHOLD: f64 = 0.8;

/// Confidence cap applied by the greeting override.
const GREETING_OVERRIDE_CAP: f64 = 0.65;

/// Units whose trimmed content is shorter than this are splitting artifacts.
const MIN_UNIT_CHARS: usize = 10;

/// Characters kept in a unit preview.
const PREVIEW_CHARS: usize = 150;

/// Adjust a classifier decision using the detected sub-intent.
///
/// A greeting pattern is strong evidence of low-stakes mail, so a Productive
/// call below 0.8 confidence is flipped to Unproductive and capped at 0.65.
pub fn apply_greeting_override(
    category: Category,
    confidence: f64,
    sub_intent: Option<SubIntent>,
) -> (Category, f64) {
    if sub_intent == Some(SubIntent::Greetings)
        && category == Category::Productive
        && confidence < GREETING_OVERRIDE_THRESHOLD
    {
        (Category::Unproductive, confidence.min(GREETING_OVERRIDE_CAP))
    } else {
        (category, confidence)
    }
}

/// First 150 characters, with an ellipsis when truncated.
pub fn content_preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let head: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}

/// Classification pipeline over an injected category strategy.
pub struct EmailClassifier {
    strategy: Arc<dyn CategoryClassifier>,
    detector: SubIntentDetector,
}

impl EmailClassifier {
    /// Create a classifier with the default sub-intent rules.
    pub fn new(strategy: Arc<dyn CategoryClassifier>) -> Self {
        Self::with_detector(strategy, SubIntentDetector::default_rules())
    }

    pub fn with_detector(strategy: Arc<dyn CategoryClassifier>, detector: SubIntentDetector) -> Self {
        Self { strategy, detector }
    }

    /// Name of the active category strategy.
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Classify one email. Always returns a well-formed result.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        let raw = normalize_text(text);
        let score = self.strategy.classify(&raw).await;
        let detected = self.detector.detect(&raw);

        let (category, confidence) =
            apply_greeting_override(score.category, score.confidence, detected.intent);
        if category != score.category {
            debug!(
                from = %score.category,
                to = %category,
                confidence,
                "Greeting override applied"
            );
        }

        ClassificationResult {
            category,
            confidence,
            sub_intent: detected.intent,
            signals: detected.signals,
            method: score.method,
        }
    }

    /// Split a multi-email blob and classify every substantial unit, in source order.
    pub async fn classify_multiple(&self, text: &str) -> Vec<UnitClassification> {
        let units = splitter::split(text);
        let total = units.len();

        let kept: Vec<EmailUnit> = units
            .into_iter()
            .filter(|unit| unit.content.trim().chars().count() >= MIN_UNIT_CHARS)
            .collect();

        let results = join_all(kept.into_iter().map(|unit| self.classify_unit(unit))).await;

        info!(
            units = total,
            classified = results.len(),
            "Multi-email classification complete"
        );
        results
    }

    async fn classify_unit(&self, unit: EmailUnit) -> UnitClassification {
        let classification = self.classify(&unit.content).await;
        UnitClassification {
            content_preview: content_preview(&unit.content),
            id: unit.id,
            header: unit.header,
            content_full: unit.content,
            category_hint: unit.category_hint,
            classification,
        }
    }
}
