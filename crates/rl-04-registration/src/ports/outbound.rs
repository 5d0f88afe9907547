//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{RegistrationArtifacts, RegistrationRecord, RegistrationStatus, SubmissionPayload};
use crate::error::{RegistrarError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rl_01_hash_chain::{ChainLink, Digest};
use rl_02_verification_code::VerificationCode;
use serde::{Deserialize, Serialize};
use shared_types::{Invoice, InvoiceId, IssuerId};

/// Persistence of invoices, their registration status and the per-issuer
/// chains.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert a new invoice as `not_registered`, or refresh the fields of an
    /// existing one without touching its status.
    ///
    /// Fails with `FiscalFieldsLocked` when the record is pending, registered
    /// or cancelled and the fiscal fields differ from the stored ones.
    async fn upsert_invoice(&self, invoice: Invoice) -> StoreResult<()>;

    async fn load(&self, invoice_id: &InvoiceId) -> StoreResult<Option<RegistrationRecord>>;

    /// Overwrite the status of an existing invoice.
    async fn set_status(&self, invoice_id: &InvoiceId, status: RegistrationStatus) -> StoreResult<()>;

    /// Digest of the issuer's most recent registration, `None` before the first.
    async fn chain_head(&self, issuer_id: &IssuerId) -> StoreResult<Option<Digest>>;

    /// Atomically append `artifacts.link` to the issuer's chain, index the
    /// verification code and set the invoice to `registered`.
    ///
    /// Fails with `ChainConflict` when the chain head is no longer
    /// `expected_head`; nothing is written in that case.
    async fn commit_registration(
        &self,
        invoice_id: &InvoiceId,
        issuer_id: &IssuerId,
        expected_head: Option<Digest>,
        artifacts: RegistrationArtifacts,
    ) -> StoreResult<()>;

    async fn code_in_use(&self, code: &VerificationCode) -> StoreResult<bool>;

    /// The issuer's chain in registration order.
    async fn chain_links(&self, issuer_id: &IssuerId) -> StoreResult<Vec<ChainLink>>;

    /// The issuer's chain paired with the invoice each link was committed for.
    async fn chain_entries(&self, issuer_id: &IssuerId) -> StoreResult<Vec<ChainEntry>>;
}

/// One committed link and the invoice it registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub invoice_id: InvoiceId,
    pub link: ChainLink,
}

/// Acknowledgement from the registrar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarReceipt {
    /// Registrar-side reference for the submission
    pub reference: String,
    pub accepted_at: DateTime<Utc>,
}

/// Authority-side system receiving registrations
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<RegistrarReceipt, RegistrarError>;
}
