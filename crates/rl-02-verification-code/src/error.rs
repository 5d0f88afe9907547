//! Error types for the Verification Code subsystem

use shared_types::IssuerConfigError;
use thiserror::Error;

/// Code and URL generation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Code generation is not permitted with this issuer configuration
    #[error("code generation not permitted: {0}")]
    Config(#[from] IssuerConfigError),

    /// Issuer id has no alphanumeric characters left after normalization
    #[error("issuer id '{issuer_id}' has no alphanumeric characters")]
    UnusableIssuerId { issuer_id: String },

    /// Every candidate collided with an existing code
    #[error("could not generate a unique verification code after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// Uniqueness check could not be performed
    #[error("code registry unavailable: {reason}")]
    Registry { reason: String },

    /// Text does not match `YYYYMMDD-<ISSUER>-XXXX-YYYY`
    #[error("invalid verification code: {code}")]
    InvalidCode { code: String },

    /// Verification URL could not be built
    #[error("invalid verification url: {reason}")]
    Url { reason: String },
}

/// Result type for code operations
pub type CodeResult<T> = Result<T, CodeError>;

/// QR rendering errors. Never surfaced past the encoder's fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrEncodeError {
    #[error("qr encoding failed: {0}")]
    Encoding(String),
}
