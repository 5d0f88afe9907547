//! Submission payload handed to the registrar.
//!
//! Field names follow the authority's record layout. The payload is built
//! in two steps: a draft before the pipeline runs (attached to the pending
//! audit entry) and a sealed copy carrying the digest and its generation
//! time once the chain link exists.

use rl_01_hash_chain::{format_timestamp, ChainLink};
use serde::{Deserialize, Serialize};
use shared_types::{format_fiscal_amount, Invoice, IssuerConfig};

/// Ordinary invoice
pub const INVOICE_KIND_ORDINARY: &str = "F1";

pub const DEFAULT_OPERATION_DESCRIPTION: &str = "Provision of professional services";

/// Used when the invoice carries no recipient
pub const DEFAULT_RECIPIENT_NAME: &str = "Cliente";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIdentity {
    #[serde(rename = "IDEmisorFactura")]
    pub issuer_id: String,
    #[serde(rename = "NumSerieFactura")]
    pub invoice_number: String,
    /// `DD-MM-YYYY`
    #[serde(rename = "FechaExpedicionFactura")]
    pub issue_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "IDFactura")]
    pub invoice: InvoiceIdentity,
    #[serde(rename = "TipoFactura")]
    pub invoice_kind: String,
    #[serde(rename = "DescripcionOperacion")]
    pub description: String,
    #[serde(rename = "ImporteTotal")]
    pub total: String,
    #[serde(rename = "BaseImponible")]
    pub taxable_base: String,
    #[serde(rename = "CuotaRepercutida")]
    pub tax_amount: String,
    #[serde(rename = "TipoImpositivo")]
    pub tax_rate: String,
    #[serde(rename = "NombreRazonDestinatario")]
    pub recipient_name: String,
    #[serde(rename = "NIFDestinatario")]
    pub recipient_tax_id: String,
    #[serde(rename = "Huella", default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(
        rename = "FechaHoraHusoGenRegistro",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<String>,
    #[serde(rename = "SoftwareID")]
    pub software_id: String,
    #[serde(rename = "VersionSoftware")]
    pub software_version: String,
}

impl SubmissionPayload {
    /// Payload without digest.
    pub fn draft(invoice: &Invoice, config: &IssuerConfig) -> Self {
        let (recipient_name, recipient_tax_id) = match &invoice.recipient {
            Some(r) if !r.name.trim().is_empty() => {
                (r.name.clone(), r.tax_id.clone().unwrap_or_default())
            }
            Some(r) => (
                DEFAULT_RECIPIENT_NAME.to_string(),
                r.tax_id.clone().unwrap_or_default(),
            ),
            None => (DEFAULT_RECIPIENT_NAME.to_string(), String::new()),
        };

        Self {
            invoice: InvoiceIdentity {
                issuer_id: config.issuer_id.as_str().to_string(),
                invoice_number: invoice.number.clone(),
                issue_date: invoice.issue_date.format("%d-%m-%Y").to_string(),
            },
            invoice_kind: INVOICE_KIND_ORDINARY.to_string(),
            description: DEFAULT_OPERATION_DESCRIPTION.to_string(),
            total: format_fiscal_amount(invoice.amounts.total),
            taxable_base: format_fiscal_amount(invoice.amounts.taxable_base),
            tax_amount: format_fiscal_amount(invoice.amounts.tax_amount),
            tax_rate: format_fiscal_amount(invoice.amounts.tax_rate_percent()),
            recipient_name,
            recipient_tax_id,
            digest: None,
            generated_at: None,
            software_id: config.software_id.clone(),
            software_version: config.software_version.clone(),
        }
    }

    /// Attach the digest and generation time of `link`.
    pub fn seal(mut self, link: &ChainLink) -> Self {
        self.digest = Some(link.digest.to_hex());
        self.generated_at = Some(format_timestamp(&link.fields.generated_at));
        self
    }

    pub fn is_sealed(&self) -> bool {
        self.digest.is_some()
    }
}
