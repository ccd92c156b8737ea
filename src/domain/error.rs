use thiserror::Error;

/// Message surfaced when a provider failure carries no text of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Streaming error: {0}")]
    StreamingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderError(msg.into())
    }

    pub fn streaming(msg: impl Into<String>) -> Self {
        Self::StreamingError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The bare message, without the variant prefix added by `Display`.
    ///
    /// Empty provider messages fall back to [`UNKNOWN_ERROR_MESSAGE`].
    pub fn message(&self) -> &str {
        let msg = match self {
            Self::ValidationError(m)
            | Self::ConfigurationError(m)
            | Self::ProviderError(m)
            | Self::StreamingError(m)
            | Self::InvalidInput(m)
            | Self::Internal(m) => m.as_str(),
        };
        if msg.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE
        } else {
            msg
        }
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }

    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::ProviderError(_))
    }
}
