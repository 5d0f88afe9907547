//! Shared builders for the integration suite.

use chrono::NaiveDate;
use rl_03_audit_log::InMemoryAuditStore;
use rl_04_registration::{
    InMemoryRegistrationStore, LedgerSettings, RegistrationService, SimulatedRegistrar,
};
use rust_decimal::Decimal;
use shared_types::{CommercialStatus, Invoice, InvoiceAmounts, IssuerConfig};
use std::sync::Arc;

pub const ISSUER: &str = "B12345678";

/// A wired service plus handles on its in-memory stores
pub struct Ledger {
    pub service: Arc<RegistrationService>,
    pub store: Arc<InMemoryRegistrationStore>,
    pub audit: Arc<InMemoryAuditStore>,
}

impl Ledger {
    pub fn from_settings(settings: &LedgerSettings) -> Self {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let audit = Arc::new(InMemoryAuditStore::new());
        let registrar = Arc::new(SimulatedRegistrar::with_latency(settings.registrar_latency));
        let service = RegistrationService::new(store.clone(), registrar, audit.clone(), settings);
        Self {
            service: Arc::new(service),
            store,
            audit,
        }
    }

    /// Enabled sandbox issuer, default pipeline settings.
    pub fn enabled() -> Self {
        Self::from_settings(&LedgerSettings {
            issuer: IssuerConfig::new(ISSUER, "Acme Servicios SL").with_enabled(true),
            ..LedgerSettings::default()
        })
    }
}

/// A sent invoice issued on 2026-01-15 for 1210.00 (1000.00 + 21% VAT).
pub fn sent_invoice(id: &str) -> Invoice {
    Invoice::new(
        id,
        format!("F-{}", id),
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        InvoiceAmounts::new(
            Decimal::new(100000, 2),
            Decimal::new(21000, 2),
            Decimal::new(121000, 2),
        ),
    )
    .with_status(CommercialStatus::Sent)
}
