//! Remote reply generation via rig-core.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::config::TriageConfig;
use crate::error::CapabilityError;
use crate::llm::{CapabilityOutcome, bounded};
use crate::reply::ReplyBackend;

const CAPABILITY: &str = "reply generator";

/// Low temperature keeps replies close to the requested tone.
const GENERATION_TEMPERATURE: f64 = 0.2;

/// Replies are short; cap the completion.
const GENERATION_MAX_TOKENS: u64 = 220;

/// A text-generation capability that drafts replies.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Model name for logging.
    fn model_name(&self) -> &str;

    /// Generate a reply from a system instruction and a user payload.
    async fn generate(&self, system: &str, user: &str) -> CapabilityOutcome<String>;
}

type OpenAiClient = rig::client::Client<rig::providers::openai::client::OpenAIResponsesExt>;

/// OpenAI chat generation through rig-core.
pub struct RigReplyGenerator {
    client: OpenAiClient,
    model: String,
    timeout: Duration,
}

impl RigReplyGenerator {
    pub fn new(
        api_key: &SecretString,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, CapabilityError> {
        let client: OpenAiClient = rig::providers::openai::Client::new(api_key.expose_secret())
            .map_err(|e| CapabilityError::RequestFailed {
                capability: CAPABILITY.to_string(),
                reason: format!("Failed to create OpenAI client: {e}"),
            })?;

        Ok(Self {
            client,
            model: model.to_string(),
            timeout,
        })
    }

    async fn request(&self, system: &str, user: &str) -> Result<String, CapabilityError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(GENERATION_TEMPERATURE)
            .max_tokens(GENERATION_MAX_TOKENS)
            .build();

        let reply = agent
            .prompt(user)
            .await
            .map_err(|e| CapabilityError::RequestFailed {
                capability: CAPABILITY.to_string(),
                reason: e.to_string(),
            })?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(CapabilityError::InvalidResponse {
                capability: CAPABILITY.to_string(),
                reason: "empty completion".to_string(),
            });
        }
        Ok(reply.to_string())
    }
}

#[async_trait]
impl ReplyGenerator for RigReplyGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, user: &str) -> CapabilityOutcome<String> {
        bounded(CAPABILITY, self.timeout, self.request(system, user)).await
    }
}

/// Build the remote generator when the OpenAI backend is selected and a key is set.
pub fn create_generator(config: &TriageConfig) -> Option<Arc<dyn ReplyGenerator>> {
    if config.reply_backend != ReplyBackend::OpenAi {
        return None;
    }
    let Some(api_key) = config.openai_api_key.as_ref() else {
        info!("OpenAI backend selected without OPENAI_API_KEY, using templates");
        return None;
    };

    match RigReplyGenerator::new(api_key, &config.openai_model, config.remote_timeout) {
        Ok(generator) => {
            info!("Using OpenAI replies (model: {})", config.openai_model);
            Some(Arc::new(generator))
        }
        Err(e) => {
            warn!(error = %e, "Reply generator unavailable, using templates");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_backend_has_no_generator() {
        let config = TriageConfig {
            openai_api_key: Some(SecretString::from("sk-test")),
            ..TriageConfig::default()
        };
        assert!(create_generator(&config).is_none());
    }

    #[test]
    fn openai_backend_requires_key() {
        let config = TriageConfig {
            reply_backend: ReplyBackend::OpenAi,
            ..TriageConfig::default()
        };
        assert!(create_generator(&config).is_none());
    }

    #[test]
    fn openai_backend_with_key_constructs() {
        // Client construction accepts any key; auth fails only on request.
        let config = TriageConfig {
            reply_backend: ReplyBackend::OpenAi,
            openai_api_key: Some(SecretString::from("sk-test")),
            openai_model: "gpt-4o-mini".into(),
            ..TriageConfig::default()
        };
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), "gpt-4o-mini");
    }
}
