//! Driving Ports (API - Inbound)
//!
//! The operations the invoicing layer invokes on the registration ledger.

use crate::domain::{ChainReport, RegistrationView};
use crate::error::RegistrationResult;
use async_trait::async_trait;
use rl_03_audit_log::AuditEntry;
use shared_types::{Invoice, InvoiceId, IssuerConfig, IssuerConfigUpdate, IssuerId};
use std::sync::Arc;

/// Registration State Machine API
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// `not_registered -> pending -> registered | error`
    async fn register(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView>;

    /// `error -> not_registered`, then the register pipeline.
    async fn retry(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView>;

    /// `registered -> cancelled`. Artifacts are kept.
    async fn cancel(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView>;

    /// Current registration status. Audited as a `query`.
    async fn status(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView>;

    /// Audit entries for an invoice, most recent first.
    async fn audit_trail(&self, invoice_id: &InvoiceId) -> RegistrationResult<Vec<AuditEntry>>;

    /// Current issuer configuration snapshot.
    fn config(&self) -> Arc<IssuerConfig>;

    /// Apply a partial configuration update and return the new snapshot.
    async fn update_config(&self, update: IssuerConfigUpdate) -> RegistrationResult<Arc<IssuerConfig>>;

    /// Re-derive every stored link of an issuer's chain and check it still
    /// matches the invoice it registered.
    async fn verify_chain(&self, issuer_id: &IssuerId) -> RegistrationResult<ChainReport>;

    /// Insert or refresh an invoice from the invoicing layer.
    ///
    /// Fiscal fields of a pending, registered or cancelled invoice are
    /// frozen; changing them fails with `FISCAL_FIELDS_LOCKED`.
    async fn upsert_invoice(&self, invoice: Invoice) -> RegistrationResult<()>;
}
