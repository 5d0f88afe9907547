//! # Core Fiscal Entities
//!
//! The subset of the invoicing layer's records that the registration ledger
//! reads. Amounts are exact decimals; dates are calendar dates without a
//! time zone, exactly as printed on the invoice.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used whenever an amount enters a digest or a payload.
pub const FISCAL_DECIMAL_PLACES: u32 = 2;

/// Identifier assigned to an invoice by the invoicing layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

impl InvoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvoiceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Tax identifier of the issuing business (e.g. `B12345678`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct IssuerId(pub String);

impl IssuerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for IssuerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssuerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Commercial status of an invoice. Owned by the invoicing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommercialStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl CommercialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CommercialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monetary amounts of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAmounts {
    /// Taxable base (subtotal before tax).
    pub taxable_base: Decimal,
    /// Tax charged on the base.
    pub tax_amount: Decimal,
    /// Invoice total.
    pub total: Decimal,
}

impl InvoiceAmounts {
    pub fn new(taxable_base: Decimal, tax_amount: Decimal, total: Decimal) -> Self {
        Self {
            taxable_base,
            tax_amount,
            total,
        }
    }

    /// Tax rate as a percentage of the base; zero when the base is zero.
    pub fn tax_rate_percent(&self) -> Decimal {
        if self.taxable_base.is_zero() {
            return Decimal::ZERO;
        }
        self.tax_amount * Decimal::ONE_HUNDRED / self.taxable_base
    }
}

/// Render an amount with exactly [`FISCAL_DECIMAL_PLACES`] decimals,
/// rounding half away from zero (`1210` -> `"1210.00"`).
pub fn format_fiscal_amount(amount: Decimal) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(FISCAL_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(FISCAL_DECIMAL_PLACES);
    rounded.to_string()
}

/// Invoice recipient, used only for the submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub tax_id: Option<String>,
}

/// An invoice as handed over by the invoicing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Issuer-assigned sequence number (e.g. `2026-0001`).
    pub number: String,
    pub issue_date: NaiveDate,
    pub amounts: InvoiceAmounts,
    pub commercial_status: CommercialStatus,
    pub recipient: Option<Recipient>,
}

impl Invoice {
    /// New invoices start as drafts, as the invoicing layer creates them.
    pub fn new(
        id: impl Into<InvoiceId>,
        number: impl Into<String>,
        issue_date: NaiveDate,
        amounts: InvoiceAmounts,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            issue_date,
            amounts,
            commercial_status: CommercialStatus::Draft,
            recipient: None,
        }
    }

    pub fn with_status(mut self, status: CommercialStatus) -> Self {
        self.commercial_status = status;
        self
    }

    pub fn with_recipient(mut self, name: impl Into<String>, tax_id: Option<String>) -> Self {
        self.recipient = Some(Recipient {
            name: name.into(),
            tax_id,
        });
        self
    }

    /// True when both carry the same number, issue date and amounts.
    ///
    /// Commercial status and recipient are not fiscal fields.
    pub fn same_fiscal_fields(&self, other: &Invoice) -> bool {
        self.number == other.number
            && self.issue_date == other.issue_date
            && self.amounts == other.amounts
    }
}

impl From<String> for InvoiceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_fiscal_amount_always_two_decimals() {
        assert_eq!(format_fiscal_amount(dec("1210")), "1210.00");
        assert_eq!(format_fiscal_amount(dec("1000.5")), "1000.50");
        assert_eq!(format_fiscal_amount(dec("210.005")), "210.01");
        assert_eq!(format_fiscal_amount(dec("0")), "0.00");
    }

    #[test]
    fn test_tax_rate_percent() {
        let amounts = InvoiceAmounts::new(dec("1000.00"), dec("210.00"), dec("1210.00"));
        assert_eq!(format_fiscal_amount(amounts.tax_rate_percent()), "21.00");

        let zero_base = InvoiceAmounts::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(zero_base.tax_rate_percent(), Decimal::ZERO);
    }

    #[test]
    fn test_same_fiscal_fields_ignores_commercial_changes() {
        let base = Invoice::new(
            "inv-1",
            "2026-0001",
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            InvoiceAmounts::new(dec("1000"), dec("210"), dec("1210")),
        );

        let paid = base
            .clone()
            .with_status(CommercialStatus::Paid)
            .with_recipient("Cliente Final SA", None);
        assert!(base.same_fiscal_fields(&paid));

        let mut amended = base.clone();
        amended.amounts.total = dec("1");
        assert!(!base.same_fiscal_fields(&amended));

        let mut renumbered = base.clone();
        renumbered.number = "2026-0002".to_string();
        assert!(!base.same_fiscal_fields(&renumbered));
    }

    #[test]
    fn test_new_invoice_is_draft() {
        let invoice = Invoice::new(
            "inv-1",
            "2026-0001",
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            InvoiceAmounts::new(dec("1000"), dec("210"), dec("1210")),
        );
        assert_eq!(invoice.commercial_status, CommercialStatus::Draft);
        assert!(invoice.recipient.is_none());
    }

    #[test]
    fn test_commercial_status_serializes_snake_case() {
        let json = serde_json::to_string(&CommercialStatus::Overdue).unwrap();
        assert_eq!(json, "\"overdue\"");
    }

    #[test]
    fn test_blank_issuer_id() {
        assert!(IssuerId::new("   ").is_blank());
        assert!(!IssuerId::new("B12345678").is_blank());
    }
}
