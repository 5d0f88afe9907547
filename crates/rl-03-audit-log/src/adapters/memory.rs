//! In-memory audit store.

use crate::domain::{AuditEntry, NewAuditEntry};
use crate::error::{AuditError, AuditResult};
use crate::ports::outbound::AuditStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use shared_types::InvoiceId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Inner {
    /// Creation order; index `i` holds sequence `i + 1`
    entries: Vec<AuditEntry>,
    by_invoice: HashMap<InvoiceId, Vec<usize>>,
}

/// Audit store backed by a vector plus a per-invoice index.
#[derive(Default)]
pub struct InMemoryAuditStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail, simulating a store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, entry: NewAuditEntry) -> AuditResult<AuditEntry> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable {
                reason: "store offline".to_string(),
            });
        }

        let mut inner = self.inner.write();
        let index = inner.entries.len();
        let stamped = AuditEntry::stamp(entry, index as u64 + 1, Utc::now());

        if let Some(invoice_id) = &stamped.invoice_id {
            inner
                .by_invoice
                .entry(invoice_id.clone())
                .or_default()
                .push(index);
        }
        inner.entries.push(stamped.clone());

        Ok(stamped)
    }

    async fn list_for_invoice(&self, invoice_id: &InvoiceId) -> AuditResult<Vec<AuditEntry>> {
        let inner = self.inner.read();
        let entries = inner
            .by_invoice
            .get(invoice_id)
            .map(|indices| {
                indices
                    .iter()
                    .rev()
                    .map(|&i| inner.entries[i].clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(entries)
    }

    async fn list_all(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.inner.read().entries.clone())
    }
}
