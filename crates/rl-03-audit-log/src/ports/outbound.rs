//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{AuditEntry, NewAuditEntry};
use crate::error::AuditResult;
use async_trait::async_trait;
use shared_types::InvoiceId;

/// Append-only audit persistence.
///
/// Entries are never updated or deleted.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Stamp and persist an entry. Sequence numbers are strictly increasing
    /// across all invoices.
    async fn append(&self, entry: NewAuditEntry) -> AuditResult<AuditEntry>;

    /// Entries for one invoice, most recent first.
    async fn list_for_invoice(&self, invoice_id: &InvoiceId) -> AuditResult<Vec<AuditEntry>>;

    /// Every entry in creation order.
    async fn list_all(&self) -> AuditResult<Vec<AuditEntry>>;
}
