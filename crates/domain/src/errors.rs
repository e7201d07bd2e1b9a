use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resolution timed out for {domain}")]
    ResolutionTimeout { domain: String },

    #[error("Resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Whether the failure means the source could not be reached at all,
    /// as opposed to the source answering with a failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DomainError::TransportUnavailable(_) | DomainError::NetworkUnavailable(_)
        )
    }
}
