//! Optional external model capabilities.
//!
//! - **Zero-shot classifier**: hosted NLI model scoring two candidate labels.
//! - **Reply generator**: OpenAI chat model via rig-core.
//!
//! Both are pure enhancements. Their boundary returns a typed
//! [`CapabilityOutcome`] and callers fall back to the deterministic
//! heuristic/template path on anything but `Success`.

pub mod generator;
pub mod zero_shot;

pub use generator::{ReplyGenerator, RigReplyGenerator, create_generator};
pub use zero_shot::{
    HostedZeroShot, ModelBackedClassifier, ModelCache, ZeroShotModel, ZeroShotScores,
};

use std::future::Future;
use std::time::Duration;

use crate::error::CapabilityError;

/// Result of calling an optional capability.
#[derive(Debug)]
pub enum CapabilityOutcome<T> {
    /// The capability answered.
    Success(T),
    /// The capability is not configured or declined to answer.
    Unavailable,
    /// The capability was called and failed.
    Failed(CapabilityError),
}

impl<T> CapabilityOutcome<T> {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Unavailable => "unavailable",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T> From<Result<T, CapabilityError>> for CapabilityOutcome<T> {
    fn from(result: Result<T, CapabilityError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Run a single capability attempt under `timeout`. No retries.
pub async fn bounded<T, F>(capability: &str, timeout: Duration, call: F) -> CapabilityOutcome<T>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.into(),
        Err(_) => CapabilityOutcome::Failed(CapabilityError::Timeout {
            capability: capability.to_string(),
            timeout,
        }),
    }
}
