//! Zero-shot category classifier backed by a hosted inference endpoint.
//!
//! The model handle is loaded lazily, at most once per [`ModelCache`], and
//! reused for the lifetime of the owning context. When no model is available
//! or a call fails, [`ModelBackedClassifier`] falls back to the heuristic.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ZeroShotConfig;
use crate::error::CapabilityError;
use crate::llm::{CapabilityOutcome, bounded};
use crate::pipeline::heuristic::HeuristicClassifier;
use crate::pipeline::types::{Category, CategoryClassifier, CategoryScore, ClassifierMethod};

const CAPABILITY: &str = "zero-shot classifier";

/// Candidate label for mail that requires action.
pub const ACTION_LABEL: &str = "suporte técnico";

/// Candidate label for social/courtesy mail.
pub const SOCIAL_LABEL: &str = "conversa social";

/// Both candidate labels, action first.
pub const CANDIDATE_LABELS: [&str; 2] = [ACTION_LABEL, SOCIAL_LABEL];

/// Per-label scores returned by a zero-shot model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotScores {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotScores {
    /// Highest-scoring label.
    pub fn top(&self) -> Option<(&str, f64)> {
        self.labels
            .iter()
            .zip(self.scores.iter().copied())
            .filter(|(_, score)| score.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, score)| (label.as_str(), score))
    }

    /// Map the top label onto a category.
    pub fn to_category_score(&self) -> Option<CategoryScore> {
        let (label, score) = self.top()?;
        let category = if label == ACTION_LABEL {
            Category::Productive
        } else {
            Category::Unproductive
        };
        Some(CategoryScore::new(category, score, ClassifierMethod::ZeroShot))
    }
}

/// A zero-shot classification capability.
#[async_trait]
pub trait ZeroShotModel: Send + Sync {
    /// Model identifier for logging.
    fn model_id(&self) -> &str;

    /// Score `text` against the candidate labels.
    async fn classify(&self, text: &str, labels: &[&str]) -> CapabilityOutcome<ZeroShotScores>;
}

// ── Hosted endpoint ─────────────────────────────────────────────────

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Serialize)]
struct InferenceParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// The endpoint answers with one object or a one-element batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Single(ZeroShotScores),
    Batch(Vec<ZeroShotScores>),
}

/// Zero-shot classification over the Hugging Face inference API shape.
pub struct HostedZeroShot {
    client: reqwest::Client,
    url: String,
    model: String,
    api_token: SecretString,
    timeout: Duration,
}

impl HostedZeroShot {
    pub fn new(config: &ZeroShotConfig, timeout: Duration) -> Result<Self, CapabilityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CapabilityError::RequestFailed {
                capability: CAPABILITY.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            url: format!("{}/{}", config.endpoint, config.model),
            model: config.model.clone(),
            api_token: config.api_token.clone(),
            timeout,
        })
    }

    async fn request(&self, text: &str, labels: &[&str]) -> Result<ZeroShotScores, CapabilityError> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                candidate_labels: labels,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::RequestFailed {
                capability: CAPABILITY.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CapabilityError::Unauthorized {
                capability: CAPABILITY.to_string(),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CapabilityError::RequestFailed {
                capability: CAPABILITY.to_string(),
                reason: format!("HTTP {status}: {}", detail.chars().take(200).collect::<String>()),
            });
        }

        let parsed: InferenceResponse =
            response
                .json()
                .await
                .map_err(|e| CapabilityError::InvalidResponse {
                    capability: CAPABILITY.to_string(),
                    reason: e.to_string(),
                })?;

        match parsed {
            InferenceResponse::Single(scores) => Ok(scores),
            InferenceResponse::Batch(batch) => {
                batch
                    .into_iter()
                    .next()
                    .ok_or_else(|| CapabilityError::InvalidResponse {
                        capability: CAPABILITY.to_string(),
                        reason: "empty batch".to_string(),
                    })
            }
        }
    }
}

#[async_trait]
impl ZeroShotModel for HostedZeroShot {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str, labels: &[&str]) -> CapabilityOutcome<ZeroShotScores> {
        bounded(CAPABILITY, self.timeout, self.request(text, labels)).await
    }
}

// ── Model cache ─────────────────────────────────────────────────────

/// Builds the model handle on first use. `None` means no model is available.
pub type ModelLoader = Box<dyn Fn() -> Option<Arc<dyn ZeroShotModel>> + Send + Sync>;

/// Once-initialized model handle, owned by the triage context.
///
/// The loader runs at most once; its answer (including "no model") is kept
/// for the lifetime of the cache and never reloaded.
pub struct ModelCache {
    cell: OnceLock<Option<Arc<dyn ZeroShotModel>>>,
    loader: ModelLoader,
}

impl ModelCache {
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            cell: OnceLock::new(),
            loader,
        }
    }

    /// Cache that never yields a model.
    pub fn disabled() -> Self {
        Self::new(Box::new(|| None))
    }

    /// Cache around an already-built model (tests, custom injection).
    pub fn with_model(model: Arc<dyn ZeroShotModel>) -> Self {
        Self::new(Box::new(move || Some(Arc::clone(&model))))
    }

    /// Cache that lazily builds a hosted model from configuration.
    pub fn hosted(config: ZeroShotConfig, timeout: Duration) -> Self {
        Self::new(Box::new(move || match HostedZeroShot::new(&config, timeout) {
            Ok(model) => {
                info!(model = %config.model, "Zero-shot classifier loaded");
                Some(Arc::new(model) as Arc<dyn ZeroShotModel>)
            }
            Err(e) => {
                warn!(error = %e, "Zero-shot classifier unavailable, using heuristic");
                None
            }
        }))
    }

    /// Get the model, loading it on first call.
    pub fn get(&self) -> Option<Arc<dyn ZeroShotModel>> {
        self.cell.get_or_init(|| (self.loader)()).clone()
    }

    /// Whether the loader has already run.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

// ── Strategy ────────────────────────────────────────────────────────

/// Category strategy that prefers the zero-shot model and falls back to the heuristic.
pub struct ModelBackedClassifier {
    cache: Arc<ModelCache>,
    fallback: HeuristicClassifier,
}

impl ModelBackedClassifier {
    pub fn new(cache: Arc<ModelCache>, fallback: HeuristicClassifier) -> Self {
        Self { cache, fallback }
    }
}

#[async_trait]
impl CategoryClassifier for ModelBackedClassifier {
    fn name(&self) -> &str {
        "zero_shot"
    }

    async fn classify(&self, normalized: &str) -> CategoryScore {
        if normalized.is_empty() {
            return self.fallback.score(normalized);
        }

        let Some(model) = self.cache.get() else {
            debug!("No zero-shot model available, using heuristic");
            return self.fallback.score(normalized);
        };

        match model.classify(normalized, &CANDIDATE_LABELS).await {
            CapabilityOutcome::Success(scores) => match scores.to_category_score() {
                Some(score) => {
                    debug!(
                        model = model.model_id(),
                        category = %score.category,
                        confidence = score.confidence,
                        "Zero-shot classification"
                    );
                    score
                }
                None => {
                    warn!(model = model.model_id(), "Zero-shot response had no scores, using heuristic");
                    self.fallback.score(normalized)
                }
            },
            CapabilityOutcome::Unavailable => {
                debug!(model = model.model_id(), "Zero-shot model unavailable, using heuristic");
                self.fallback.score(normalized)
            }
            CapabilityOutcome::Failed(e) => {
                warn!(model = model.model_id(), error = %e, "Zero-shot call failed, using heuristic");
                self.fallback.score(normalized)
            }
        }
    }
}
