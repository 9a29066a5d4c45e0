//! Shared types for the classification pipeline.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ── Category ────────────────────────────────────────────────────────

/// Business category of an inbound email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Requires action or a response.
    #[serde(rename = "Produtivo")]
    Productive,
    /// Social or courtesy mail, no action needed.
    #[serde(rename = "Improdutivo")]
    Unproductive,
}

impl Category {
    /// Presentation label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Productive => "Produtivo",
            Self::Unproductive => "Improdutivo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Sub-intent ──────────────────────────────────────────────────────

/// Finer-grained tag layered on top of the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubIntent {
    StatusUpdate,
    Attachment,
    Greetings,
}

impl SubIntent {
    /// Resolution order when several intents match.
    pub const PRIORITY: [SubIntent; 3] = [Self::StatusUpdate, Self::Attachment, Self::Greetings];

    /// Canonical snake_case tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::StatusUpdate => "status_update",
            Self::Attachment => "attachment",
            Self::Greetings => "greetings",
        }
    }
}

impl fmt::Display for SubIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SubIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status_update" => Ok(Self::StatusUpdate),
            "attachment" => Ok(Self::Attachment),
            "greetings" => Ok(Self::Greetings),
            other => Err(format!("unknown sub-intent '{other}'")),
        }
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Which classifier produced the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMethod {
    Heuristic,
    HeuristicLite,
    ZeroShot,
}

/// Raw output of a category classifier, before sub-intent post-processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryScore {
    pub category: Category,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub method: ClassifierMethod,
}

impl CategoryScore {
    pub fn new(category: Category, confidence: f64, method: ClassifierMethod) -> Self {
        Self {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            method,
        }
    }
}

/// Result of classifying one email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f64,
    pub sub_intent: Option<SubIntent>,
    /// `intent:pattern` trace of every sub-intent rule that matched.
    pub signals: Vec<String>,
    pub method: ClassifierMethod,
}

// ── Multi-email ─────────────────────────────────────────────────────

/// One email segmented out of a multi-email blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailUnit {
    /// "EMAIL 1", "EMAIL 2", ... or "single email".
    pub id: String,
    /// Marker line remainder; empty when the source had none.
    pub header: String,
    pub content: String,
    /// Category annotated in the source text. Reference only, never used to classify.
    pub category_hint: Option<Category>,
}

/// Classification of one unit from `classify_multiple`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitClassification {
    pub id: String,
    pub header: String,
    pub content_preview: String,
    pub content_full: String,
    pub category_hint: Option<Category>,
    #[serde(flatten)]
    pub classification: ClassificationResult,
}

// ── Classifier strategy ─────────────────────────────────────────────

/// Strategy that assigns a category to normalized email text.
///
/// Implementations must always return a well-formed score. Optional
/// capabilities are expected to fall back internally rather than fail.
#[async_trait]
pub trait CategoryClassifier: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &str;

    /// Score already-normalized text.
    async fn classify(&self, normalized: &str) -> CategoryScore;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels() {
        assert_eq!(Category::Productive.label(), "Produtivo");
        assert_eq!(Category::Unproductive.to_string(), "Improdutivo");
    }

    #[test]
    fn category_serializes_with_labels() {
        let json = serde_json::to_value(Category::Unproductive).unwrap();
        assert_eq!(json, "Improdutivo");
    }

    #[test]
    fn sub_intent_parses_known_tags_only() {
        assert_eq!("status_update".parse::<SubIntent>(), Ok(SubIntent::StatusUpdate));
        assert_eq!(" Greetings ".parse::<SubIntent>(), Ok(SubIntent::Greetings));
        assert!("unknown_tag".parse::<SubIntent>().is_err());
    }

    #[test]
    fn category_score_clamps_confidence() {
        let score = CategoryScore::new(Category::Productive, 1.4, ClassifierMethod::ZeroShot);
        assert_eq!(score.confidence, 1.0);
    }

    #[test]
    fn unit_classification_flattens_result() {
        let unit = UnitClassification {
            id: "EMAIL 1".into(),
            header: "- PRODUTIVO".into(),
            content_preview: "Preciso de ajuda".into(),
            content_full: "Preciso de ajuda".into(),
            category_hint: Some(Category::Productive),
            classification: ClassificationResult {
                category: Category::Productive,
                confidence: 0.75,
                sub_intent: None,
                signals: vec![],
                method: ClassifierMethod::Heuristic,
            },
        };
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["category"], "Produtivo");
        assert_eq!(json["category_hint"], "Produtivo");
        assert_eq!(json["method"], "heuristic");
        assert!(json["sub_intent"].is_null());
    }
}
