//! Error types for the audit log.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("audit payload could not be serialized: {reason}")]
    Serialization { reason: String },
}

pub type AuditResult<T> = Result<T, AuditError>;
