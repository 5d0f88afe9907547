//! # Error Types
//!
//! Errors shared across subsystems.

use thiserror::Error;

/// Reasons an issuer configuration cannot be used for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IssuerConfigError {
    /// Registration is switched off for this issuer.
    #[error("registration disabled")]
    Disabled,

    /// Tax identifier or legal name is missing.
    #[error("issuer configuration incomplete: tax identifier and legal name are required")]
    Incomplete,
}
