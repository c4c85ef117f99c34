use thiserror::Error;

/// Error type for token issuance.
///
/// Validation failures are reported as [`crate::FailureKind`] instead.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Token lifetime must be at least one second")]
    InvalidLifetime,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}
