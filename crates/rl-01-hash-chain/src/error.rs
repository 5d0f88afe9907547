//! Error types for the Hash Chain subsystem

use shared_types::IssuerConfigError;
use thiserror::Error;

/// Hash chain errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Digest generation is not permitted with this issuer configuration
    #[error("digest generation not permitted: {0}")]
    Config(#[from] IssuerConfigError),

    /// Stored digest text is not 64 hex characters
    #[error("malformed digest: {reason}")]
    MalformedDigest { reason: String },

    /// A fiscal field contains the field separator and would make the
    /// preimage ambiguous
    #[error("field '{field}' contains the reserved separator '|'")]
    AmbiguousField { field: &'static str },
}

/// Result type for hash chain operations
pub type ChainResult<T> = Result<T, ChainError>;
