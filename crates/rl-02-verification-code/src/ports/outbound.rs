//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::code::VerificationCode;
use crate::error::CodeResult;
use async_trait::async_trait;

/// Lookup of codes already issued.
///
/// Implemented by whatever persists registrations; the code generator asks
/// it before handing out a candidate.
#[async_trait]
pub trait CodeRegistry: Send + Sync {
    /// True when `code` has already been issued to a registration.
    async fn is_taken(&self, code: &VerificationCode) -> CodeResult<bool>;
}
