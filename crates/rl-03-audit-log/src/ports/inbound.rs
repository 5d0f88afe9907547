//! Driving Ports (API - Inbound)

use crate::domain::AuditEntry;
use crate::error::AuditResult;
use async_trait::async_trait;
use shared_types::InvoiceId;

/// Audit query interface
#[async_trait]
pub trait AuditTrailApi: Send + Sync {
    /// All entries for `invoice_id`, most recent first.
    async fn trail(&self, invoice_id: &InvoiceId) -> AuditResult<Vec<AuditEntry>>;
}
