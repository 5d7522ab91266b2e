//! Error types for tactbot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Slack error: {0}")]
    Slack(#[from] SlackError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Text-analysis backend errors. Any of these ends the current event's
/// run without an advisory.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Analysis backend {backend} failed: {reason}")]
    Backend { backend: String, reason: String },

    #[error("Invalid response from {backend}: {reason}")]
    InvalidResponse { backend: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Advisory delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to deliver advisory: {0}")]
    Http(String),

    #[error("Slack rejected {method}: {error}")]
    Api { method: String, error: String },
}

/// Slack Web API errors outside advisory delivery.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("Slack API call {method} failed: {reason}")]
    RequestFailed { method: String, reason: String },

    #[error("Slack authentication failed: {reason}")]
    AuthFailed { reason: String },
}

/// Result type alias for the bot. The error slot defaults to [`Error`]
/// but stays open so trait signatures can name a leaf error directly.
pub type Result<T, E = Error> = std::result::Result<T, E>;
