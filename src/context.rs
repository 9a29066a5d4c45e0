//! Composition root for the triage pipeline.
//!
//! Built once at startup from [`TriageConfig`]. Owns the category strategy
//! (heuristic or model-backed), the zero-shot model cache and the reply
//! composer, and routes input to the single or multi-email path.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::TriageConfig;
use crate::llm::{ModelBackedClassifier, ModelCache, create_generator};
use crate::pipeline::heuristic::HeuristicClassifier;
use crate::pipeline::processor::EmailClassifier;
use crate::pipeline::splitter::is_multi_email;
use crate::pipeline::types::{CategoryClassifier, ClassificationResult, UnitClassification};
use crate::reply::{ReplyBackend, ReplyComposer};

/// One classified unit of a multi-email input, with its suggested reply.
#[derive(Debug, Clone, Serialize)]
pub struct TriagedUnit {
    #[serde(flatten)]
    pub unit: UnitClassification,
    pub reply: String,
}

/// Outcome of processing one input.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TriageOutcome {
    Single {
        #[serde(flatten)]
        classification: ClassificationResult,
        reply: String,
    },
    Multiple {
        units: Vec<TriagedUnit>,
    },
}

impl TriageOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Multiple { .. } => "multiple",
        }
    }
}

/// Triage pipeline with its injected strategy and composer.
pub struct TriageContext {
    classifier: EmailClassifier,
    composer: ReplyComposer,
    backend: ReplyBackend,
}

impl TriageContext {
    /// Assemble a context from explicit parts.
    pub fn new(
        strategy: Arc<dyn CategoryClassifier>,
        composer: ReplyComposer,
        backend: ReplyBackend,
    ) -> Self {
        Self {
            classifier: EmailClassifier::new(strategy),
            composer,
            backend,
        }
    }

    /// Build the context described by `config`.
    pub fn from_config(config: &TriageConfig) -> Self {
        let heuristic = HeuristicClassifier::new(config.profile);

        let strategy: Arc<dyn CategoryClassifier> = match &config.zero_shot {
            Some(zsc) => {
                let cache = ModelCache::hosted(zsc.clone(), config.remote_timeout);
                Arc::new(ModelBackedClassifier::new(Arc::new(cache), heuristic))
            }
            None => Arc::new(heuristic),
        };

        let mut composer = ReplyComposer::new(config.signature.clone());
        if let Some(generator) = create_generator(config) {
            composer = composer.with_generator(generator);
        }

        info!(
            strategy = strategy.name(),
            profile = %config.profile,
            backend = %config.reply_backend,
            remote_replies = composer.has_generator(),
            "Triage context ready"
        );

        Self::new(strategy, composer, config.reply_backend)
    }

    pub fn classifier(&self) -> &EmailClassifier {
        &self.classifier
    }

    pub fn backend(&self) -> ReplyBackend {
        self.backend
    }

    /// Classify a single email.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text).await
    }

    /// Suggest a reply for an already-classified email.
    pub async fn suggest_reply(&self, text: &str, classification: &ClassificationResult) -> String {
        self.composer
            .compose(
                text,
                classification.category,
                classification.sub_intent,
                self.backend,
            )
            .await
    }

    /// Classify and reply, splitting first when the input holds several emails.
    pub async fn process(&self, text: &str) -> TriageOutcome {
        if !is_multi_email(text) {
            let classification = self.classify(text).await;
            let reply = self.suggest_reply(text, &classification).await;
            return TriageOutcome::Single {
                classification,
                reply,
            };
        }

        let units = self.classifier.classify_multiple(text).await;
        let mut triaged = Vec::with_capacity(units.len());
        for unit in units {
            let reply = self
                .suggest_reply(&unit.content_full, &unit.classification)
                .await;
            triaged.push(TriagedUnit { unit, reply });
        }
        TriageOutcome::Multiple { units: triaged }
    }
}
