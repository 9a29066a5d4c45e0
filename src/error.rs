//! Error types for inbox triage.
//!
//! Classification and reply composition never fail. Errors here cover the
//! edges: configuration, caller input validation, and the optional remote
//! capabilities (which are always recovered from, see `CapabilityOutcome`).

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Caller-side input validation. Surfaced to the user, never classified.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Formato não suportado: {0}")]
    UnsupportedFormat(String),

    #[error("Insira o texto do e-mail ou faça upload de um arquivo .txt/.pdf")]
    EmptyContent,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of an optional external capability (zero-shot model, reply generator).
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("{capability} request failed: {reason}")]
    RequestFailed { capability: String, reason: String },

    #[error("{capability} timed out after {timeout:?}")]
    Timeout {
        capability: String,
        timeout: Duration,
    },

    #[error("Invalid response from {capability}: {reason}")]
    InvalidResponse { capability: String, reason: String },

    #[error("Authentication failed for {capability}")]
    Unauthorized { capability: String },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
