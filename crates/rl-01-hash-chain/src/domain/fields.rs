//! Digest preimage fields
//!
//! The exact rendering of every field is part of the chain contract: a
//! stored link can only be re-verified if its fields render to the same
//! bytes years later.

use crate::error::{ChainError, ChainResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{format_fiscal_amount, Invoice, IssuerConfig, IssuerId};

/// Separator between preimage fields
pub const FIELD_SEPARATOR: char = '|';

/// Capture the generation timestamp for a new link.
///
/// Truncated to milliseconds so the persisted value renders back to the
/// exact text that was hashed.
pub fn capture_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render a generation timestamp as it appears in the preimage
/// (`2026-01-15T10:00:00.000Z`).
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Immutable fiscal fields of one registration, as fed to the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFields {
    pub issuer_id: String,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    /// Amounts already rendered with two decimals
    pub total: String,
    pub taxable_base: String,
    pub tax_amount: String,
    pub generated_at: DateTime<Utc>,
}

impl ChainFields {
    /// Extract the preimage fields of an invoice.
    ///
    /// Rejects identifiers containing the separator, since `A|B` + `C` and
    /// `A` + `B|C` would otherwise hash identically.
    pub fn from_invoice(
        invoice: &Invoice,
        config: &IssuerConfig,
        generated_at: DateTime<Utc>,
    ) -> ChainResult<Self> {
        Self::for_issuer(invoice, &config.issuer_id, generated_at)
    }

    /// Same as [`ChainFields::from_invoice`] with the issuer id given
    /// directly, as when re-deriving the fields of a stored link.
    pub fn for_issuer(
        invoice: &Invoice,
        issuer_id: &IssuerId,
        generated_at: DateTime<Utc>,
    ) -> ChainResult<Self> {
        if issuer_id.as_str().contains(FIELD_SEPARATOR) {
            return Err(ChainError::AmbiguousField { field: "issuer_id" });
        }
        if invoice.number.contains(FIELD_SEPARATOR) {
            return Err(ChainError::AmbiguousField {
                field: "invoice_number",
            });
        }

        Ok(Self {
            issuer_id: issuer_id.as_str().to_string(),
            invoice_number: invoice.number.clone(),
            issue_date: invoice.issue_date,
            total: format_fiscal_amount(invoice.amounts.total),
            taxable_base: format_fiscal_amount(invoice.amounts.taxable_base),
            tax_amount: format_fiscal_amount(invoice.amounts.tax_amount),
            generated_at: generated_at.trunc_subsecs(3),
        })
    }

    /// Canonical preimage bytes, excluding the previous digest.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let issue_date = self.issue_date.format("%Y-%m-%d").to_string();
        let generated_at = format_timestamp(&self.generated_at);
        let parts: [&str; 7] = [
            &self.issuer_id,
            &self.invoice_number,
            &issue_date,
            &self.total,
            &self.taxable_base,
            &self.tax_amount,
            &generated_at,
        ];
        parts.join("|").into_bytes()
    }
}
