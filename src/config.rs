//! Configuration types.
//!
//! Everything is read from environment variables once at startup and handed
//! to [`crate::context::TriageContext`]. Nothing else in the crate inspects
//! the environment.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::pipeline::heuristic::ClassifierProfile;
use crate::reply::ReplyBackend;

/// Default hosted zero-shot model (multilingual NLI).
pub const DEFAULT_ZSC_MODEL: &str = "joeddav/xlm-roberta-large-xnli";

/// Default base URL of the hosted inference API.
pub const DEFAULT_ZSC_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Default generative model for remote replies.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default bound for any remote call.
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Default closing block appended to every templated reply.
pub const DEFAULT_SIGNATURE: &str = "Atenciosamente,\nEquipe de Suporte";

/// Hosted zero-shot classifier settings. Present only when enabled and a token is set.
#[derive(Debug, Clone)]
pub struct ZeroShotConfig {
    pub api_token: SecretString,
    pub model: String,
    pub endpoint: String,
}

/// Triage configuration.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Heuristic profile used directly, or as the fallback behind the model.
    pub profile: ClassifierProfile,
    /// Optional zero-shot model. `None` means heuristic only.
    pub zero_shot: Option<ZeroShotConfig>,
    /// Reply backend requested by the caller.
    pub reply_backend: ReplyBackend,
    /// Credentials for the remote reply generator.
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    /// Upper bound for a single remote call.
    pub remote_timeout: Duration,
    pub signature: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            profile: ClassifierProfile::Full,
            zero_shot: None,
            reply_backend: ReplyBackend::Local,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            signature: DEFAULT_SIGNATURE.to_string(),
        }
    }
}

impl TriageConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let profile = match var("CLASSIFIER_PROFILE") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "CLASSIFIER_PROFILE".into(),
                message,
            })?,
            None => ClassifierProfile::Full,
        };

        let reply_backend = match var("MODEL_BACKEND") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "MODEL_BACKEND".into(),
                message,
            })?,
            None => ReplyBackend::Local,
        };

        let zsc_enabled = match var("ZSC_ENABLED") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "ZSC_ENABLED".into(),
                message: format!("expected true/false, got '{raw}'"),
            })?,
            None => false,
        };

        let zero_shot = if zsc_enabled {
            var("HF_API_TOKEN").map(|token| ZeroShotConfig {
                api_token: SecretString::from(token),
                model: var("ZSC_MODEL").unwrap_or_else(|| DEFAULT_ZSC_MODEL.to_string()),
                endpoint: var("ZSC_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_ZSC_ENDPOINT.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            })
        } else {
            None
        };

        let remote_timeout = match var("REMOTE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "REMOTE_TIMEOUT_SECS".into(),
                    message: format!("expected seconds, got '{raw}'"),
                })?;
                Duration::from_secs(secs.max(1))
            }
            None => Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        };

        Ok(Self {
            profile,
            zero_shot,
            reply_backend,
            openai_api_key: var("OPENAI_API_KEY").map(SecretString::from),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            remote_timeout,
            signature: var("REPLY_SIGNATURE")
                .map(|s| s.replace("\\n", "\n"))
                .unwrap_or_else(|| DEFAULT_SIGNATURE.to_string()),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
