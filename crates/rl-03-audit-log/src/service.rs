//! Audit Logger service
//!
//! Best-effort front for an [`AuditStore`]. A failed write never reaches the
//! caller: the primary state transition must complete regardless.

use crate::domain::{AuditEntry, NewAuditEntry};
use crate::error::{AuditError, AuditResult};
use crate::ports::inbound::AuditTrailApi;
use crate::ports::outbound::AuditStore;
use async_trait::async_trait;
use ledger_telemetry::{AUDIT_ENTRIES_WRITTEN, AUDIT_WRITE_FAILURES};
use serde::Serialize;
use shared_types::InvoiceId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Serialize a value for use as an entry payload.
pub fn payload_snapshot<T: Serialize>(value: &T) -> AuditResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AuditError::Serialization {
        reason: e.to_string(),
    })
}

pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
    write_failures: AtomicU64,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            write_failures: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Number of writes dropped since this logger was created
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Append an entry, swallowing store failures.
    ///
    /// Returns the stored entry, or `None` when the write failed.
    pub async fn record(&self, entry: NewAuditEntry) -> Option<AuditEntry> {
        let action = entry.action;
        let outcome = entry.outcome;
        let invoice_id = entry.invoice_id.clone();

        match self.store.append(entry).await {
            Ok(stored) => {
                AUDIT_ENTRIES_WRITTEN
                    .with_label_values(&[action.as_str(), outcome.as_str()])
                    .inc();
                Some(stored)
            }
            Err(e) => {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
                AUDIT_WRITE_FAILURES.inc();
                tracing::error!(
                    invoice_id = invoice_id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
                    action = %action,
                    outcome = %outcome,
                    error = %e,
                    "[rl-03] audit write failed, entry dropped"
                );
                None
            }
        }
    }
}

#[async_trait]
impl AuditTrailApi for AuditLogger {
    async fn trail(&self, invoice_id: &InvoiceId) -> AuditResult<Vec<AuditEntry>> {
        self.store.list_for_invoice(invoice_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryAuditStore;
    use crate::domain::{AuditAction, AuditOutcome};

    #[tokio::test]
    async fn test_record_and_trail() {
        let store = Arc::new(InMemoryAuditStore::new());
        let logger = AuditLogger::new(store.clone());
        let invoice = InvoiceId::new("inv-1");

        logger
            .record(NewAuditEntry::pending(&invoice, AuditAction::Register))
            .await
            .unwrap();
        logger
            .record(NewAuditEntry::error(&invoice, AuditAction::Register, "digest failed"))
            .await
            .unwrap();

        let trail = logger.trail(&invoice).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].outcome, AuditOutcome::Error);
        assert_eq!(trail[0].error_message.as_deref(), Some("digest failed"));
        assert_eq!(logger.write_failures(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed_and_counted() {
        let store = Arc::new(InMemoryAuditStore::new());
        store.set_unavailable(true);
        let logger = AuditLogger::new(store.clone());
        let before = AUDIT_WRITE_FAILURES.get();

        let stored = logger
            .record(NewAuditEntry::pending(&InvoiceId::new("inv-1"), AuditAction::Cancel))
            .await;

        assert!(stored.is_none());
        assert_eq!(logger.write_failures(), 1);
        assert!(AUDIT_WRITE_FAILURES.get() >= before + 1.0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_payload_snapshot() {
        #[derive(Serialize)]
        struct Payload {
            total: String,
        }

        let value = payload_snapshot(&Payload {
            total: "1210.00".to_string(),
        })
        .unwrap();
        assert_eq!(value["total"], "1210.00");
    }
}
