//! In-memory registration store.

use crate::domain::{RegistrationArtifacts, RegistrationRecord, RegistrationStatus};
use crate::error::{StoreError, StoreResult};
use crate::ports::outbound::{ChainEntry, RegistrationStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use rl_01_hash_chain::{ChainLink, Digest};
use rl_02_verification_code::VerificationCode;
use shared_types::{Invoice, InvoiceId, IssuerId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Inner {
    records: HashMap<InvoiceId, RegistrationRecord>,
    chains: HashMap<IssuerId, Vec<ChainLink>>,
    members: HashMap<IssuerId, Vec<InvoiceId>>,
    codes: HashSet<VerificationCode>,
}

/// Registration store kept in process memory.
///
/// Every operation takes the single lock once, so `commit_registration` is
/// atomic with respect to all other calls.
#[derive(Default)]
pub struct InMemoryRegistrationStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent calls fail, simulating a storage outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Direct access to a stored chain, for repair tooling and corruption
    /// drills.
    pub fn with_chain_mut<F>(&self, issuer_id: &IssuerId, f: F)
    where
        F: FnOnce(&mut Vec<ChainLink>),
    {
        let mut inner = self.inner.write();
        f(inner.chains.entry(issuer_id.clone()).or_default());
    }

    /// Direct access to a stored record, bypassing the fiscal field lock.
    pub fn with_record_mut<F>(&self, invoice_id: &InvoiceId, f: F)
    where
        F: FnOnce(&mut RegistrationRecord),
    {
        if let Some(record) = self.inner.write().records.get_mut(invoice_id) {
            f(record);
        }
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn upsert_invoice(&self, invoice: Invoice) -> StoreResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write();
        match inner.records.get_mut(&invoice.id) {
            Some(record) => {
                if record.fiscal_fields_locked() && !record.invoice.same_fiscal_fields(&invoice) {
                    return Err(StoreError::FiscalFieldsLocked {
                        invoice_id: invoice.id,
                        current: record.state(),
                    });
                }
                record.invoice = invoice;
            }
            None => {
                inner
                    .records
                    .insert(invoice.id.clone(), RegistrationRecord::new(invoice));
            }
        }
        Ok(())
    }

    async fn load(&self, invoice_id: &InvoiceId) -> StoreResult<Option<RegistrationRecord>> {
        self.check_available()?;
        Ok(self.inner.read().records.get(invoice_id).cloned())
    }

    async fn set_status(&self, invoice_id: &InvoiceId, status: RegistrationStatus) -> StoreResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(invoice_id)
            .ok_or_else(|| StoreError::NotFound {
                invoice_id: invoice_id.clone(),
            })?;
        record.status = status;
        Ok(())
    }

    async fn chain_head(&self, issuer_id: &IssuerId) -> StoreResult<Option<Digest>> {
        self.check_available()?;
        Ok(self
            .inner
            .read()
            .chains
            .get(issuer_id)
            .and_then(|chain| chain.last())
            .map(|link| link.digest))
    }

    async fn commit_registration(
        &self,
        invoice_id: &InvoiceId,
        issuer_id: &IssuerId,
        expected_head: Option<Digest>,
        artifacts: RegistrationArtifacts,
    ) -> StoreResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write();

        if !inner.records.contains_key(invoice_id) {
            return Err(StoreError::NotFound {
                invoice_id: invoice_id.clone(),
            });
        }

        let head = inner
            .chains
            .get(issuer_id)
            .and_then(|chain| chain.last())
            .map(|link| link.digest);
        if head != expected_head {
            return Err(StoreError::ChainConflict {
                issuer_id: issuer_id.clone(),
            });
        }

        inner
            .chains
            .entry(issuer_id.clone())
            .or_default()
            .push(artifacts.link.clone());
        inner
            .members
            .entry(issuer_id.clone())
            .or_default()
            .push(invoice_id.clone());
        inner.codes.insert(artifacts.verification_code.clone());
        if let Some(record) = inner.records.get_mut(invoice_id) {
            record.status = RegistrationStatus::Registered(Box::new(artifacts));
        }
        Ok(())
    }

    async fn code_in_use(&self, code: &VerificationCode) -> StoreResult<bool> {
        self.check_available()?;
        Ok(self.inner.read().codes.contains(code))
    }

    async fn chain_links(&self, issuer_id: &IssuerId) -> StoreResult<Vec<ChainLink>> {
        self.check_available()?;
        Ok(self
            .inner
            .read()
            .chains
            .get(issuer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn chain_entries(&self, issuer_id: &IssuerId) -> StoreResult<Vec<ChainEntry>> {
        self.check_available()?;
        let inner = self.inner.read();
        let (Some(links), Some(members)) = (inner.chains.get(issuer_id), inner.members.get(issuer_id)) else {
            return Ok(Vec::new());
        };
        Ok(members
            .iter()
            .zip(links)
            .map(|(invoice_id, link)| ChainEntry {
                invoice_id: invoice_id.clone(),
                link: link.clone(),
            })
            .collect())
    }
}
