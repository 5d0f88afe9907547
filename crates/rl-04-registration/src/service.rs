//! # Registration Service
//!
//! Implements [`RegistrationApi`].
//!
//! ## Pipeline
//!
//! 1. Guards: in-flight marker, invoice exists, config enabled and complete,
//!    commercial status, registration status. A failed guard is audited as
//!    an `error` entry and nothing else happens.
//! 2. `pending` status plus a `pending` audit entry carrying the draft
//!    submission payload.
//! 3. Under the issuer's chain lock: read the chain head, compute the
//!    digest, issue code, URL, QR and registration id, submit to the
//!    registrar, commit atomically against the head read in this step.
//! 4. `registered` plus a `success` entry, or `error` with the message plus
//!    an `error` entry.
//!
//! Step 3 is bounded by the configured pipeline timeout; expiry ends in
//! `error` like any other pipeline failure.
//!
//! `register` and `retry` run steps 1 to 4 on a spawned task that owns the
//! in-flight marker. A caller that stops waiting does not stop the
//! registration; it still ends in `registered` or `error`.

use crate::adapters::StoreCodeRegistry;
use crate::config_store::ConfigStore;
use crate::domain::{
    check_invoice, check_transition, ChainReport, RegistrationArtifacts, RegistrationOp,
    RegistrationRecord, RegistrationState, RegistrationStatus, RegistrationView, SubmissionPayload,
};
use crate::error::{PipelineError, PreconditionError, RegistrationError, RegistrationResult};
use crate::ports::inbound::RegistrationApi;
use crate::ports::outbound::{ChainEntry, Registrar, RegistrarReceipt, RegistrationStore};
use crate::settings::LedgerSettings;
use async_trait::async_trait;
use ledger_telemetry::{
    log_invoice_event, time_histogram, CHAIN_VERIFICATIONS, PIPELINE_DURATION,
    PRECONDITION_REJECTIONS, REGISTRATIONS,
};
use parking_lot::Mutex;
use rl_01_hash_chain::{
    capture_timestamp, compute_link, format_timestamp, verify_chain, ChainBreak, ChainBreakKind,
};
use rl_02_verification_code::{
    CodeGenerator, QrEncoder, RegistrationId, VerificationCode, VerificationService,
    VerificationUrl,
};
use rl_03_audit_log::{
    payload_snapshot, AuditAction, AuditEntry, AuditLogger, AuditOutcome, AuditStore,
    AuditTrailApi, NewAuditEntry,
};
use serde::Serialize;
use shared_types::{Invoice, InvoiceId, IssuerConfig, IssuerConfigUpdate, IssuerId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// Attempts at writing the `error` status after a failed pipeline
const FAILURE_STATUS_ATTEMPTS: usize = 2;

/// Response payload of a successful `register` entry
#[derive(Serialize)]
struct RegisteredPayload<'a> {
    registration_id: &'a RegistrationId,
    digest: String,
    previous_digest: String,
    verification_code: &'a VerificationCode,
    verification_url: &'a VerificationUrl,
    qr_placeholder: bool,
    registered_at: String,
    registrar_reference: &'a str,
}

impl<'a> RegisteredPayload<'a> {
    fn new(artifacts: &'a RegistrationArtifacts, receipt: &'a RegistrarReceipt) -> Self {
        Self {
            registration_id: &artifacts.registration_id,
            digest: artifacts.digest.to_hex(),
            previous_digest: artifacts.previous_digest().to_hex(),
            verification_code: &artifacts.verification_code,
            verification_url: &artifacts.verification_url,
            qr_placeholder: artifacts.qr.is_placeholder(),
            registered_at: format_timestamp(&artifacts.registered_at),
            registrar_reference: &receipt.reference,
        }
    }
}

fn with_request<T: Serialize>(entry: NewAuditEntry, payload: &T) -> NewAuditEntry {
    match payload_snapshot(payload) {
        Ok(value) => entry.with_request(value),
        Err(e) => {
            tracing::warn!(error = %e, "[rl-04] request payload dropped from audit entry");
            entry
        }
    }
}

fn with_response<T: Serialize>(entry: NewAuditEntry, payload: &T) -> NewAuditEntry {
    match payload_snapshot(payload) {
        Ok(value) => entry.with_response(value),
        Err(e) => {
            tracing::warn!(error = %e, "[rl-04] response payload dropped from audit entry");
            entry
        }
    }
}

/// Marks an invoice as having an operation in progress until dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<InvoiceId>>>,
    invoice_id: InvoiceId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.invoice_id);
    }
}

/// The Registration State Machine.
///
/// Clones share every piece of state.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
    registrar: Arc<dyn Registrar>,
    audit: Arc<AuditLogger>,
    config: Arc<ConfigStore>,
    verification: Arc<VerificationService>,
    pipeline_timeout: Duration,
    /// One chain lock per issuer; registrations of the same issuer never
    /// read the same head.
    issuer_locks: Arc<Mutex<HashMap<IssuerId, Arc<tokio::sync::Mutex<()>>>>>,
    in_flight: Arc<Mutex<HashSet<InvoiceId>>>,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        registrar: Arc<dyn Registrar>,
        audit_store: Arc<dyn AuditStore>,
        settings: &LedgerSettings,
    ) -> Self {
        let verification = VerificationService::new(
            CodeGenerator::new(settings.code_max_attempts),
            QrEncoder::new(settings.qr.clone()),
        );

        Self {
            store,
            registrar,
            audit: Arc::new(AuditLogger::new(audit_store)),
            config: Arc::new(ConfigStore::new(settings.issuer.clone())),
            verification: Arc::new(verification),
            pipeline_timeout: settings.pipeline_timeout,
            issuer_locks: Arc::default(),
            in_flight: Arc::default(),
        }
    }

    /// Replace the code generator and QR encoder.
    pub fn with_verification(mut self, verification: VerificationService) -> Self {
        self.verification = Arc::new(verification);
        self
    }

    pub fn audit_logger(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn pipeline_timeout(&self) -> Duration {
        self.pipeline_timeout
    }

    fn enter(&self, invoice_id: &InvoiceId) -> Result<InFlightGuard, PreconditionError> {
        if !self.in_flight.lock().insert(invoice_id.clone()) {
            return Err(PreconditionError::OperationInFlight {
                invoice_id: invoice_id.clone(),
            });
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            invoice_id: invoice_id.clone(),
        })
    }

    fn issuer_lock(&self, issuer_id: &IssuerId) -> Arc<tokio::sync::Mutex<()>> {
        self.issuer_locks
            .lock()
            .entry(issuer_id.clone())
            .or_default()
            .clone()
    }

    /// Record a refused operation and turn it into the caller's error.
    async fn reject(
        &self,
        invoice_id: &InvoiceId,
        action: AuditAction,
        error: PreconditionError,
    ) -> RegistrationError {
        PRECONDITION_REJECTIONS
            .with_label_values(&[error.code()])
            .inc();
        REGISTRATIONS
            .with_label_values(&[action.as_str(), "rejected"])
            .inc();
        log_invoice_event!(
            info,
            "rl-04",
            "[rl-04] operation refused",
            invoice_id,
            action = %action,
            code = error.code(),
            reason = %error
        );

        self.audit
            .record(NewAuditEntry::error(invoice_id, action, error.to_string()))
            .await;
        error.into()
    }

    /// Record a storage failure that happened outside the timed pipeline.
    async fn fail(
        &self,
        invoice_id: &InvoiceId,
        action: AuditAction,
        error: PipelineError,
    ) -> RegistrationError {
        REGISTRATIONS
            .with_label_values(&[action.as_str(), "error"])
            .inc();
        tracing::error!(
            invoice_id = %invoice_id,
            action = %action,
            code = error.code(),
            error = %error,
            "[rl-04] operation failed"
        );

        self.audit
            .record(NewAuditEntry::error(invoice_id, action, error.to_string()))
            .await;
        error.into()
    }

    async fn load_record(
        &self,
        invoice_id: &InvoiceId,
        action: AuditAction,
    ) -> RegistrationResult<RegistrationRecord> {
        match self.store.load(invoice_id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(self
                .reject(
                    invoice_id,
                    action,
                    PreconditionError::InvoiceNotFound {
                        invoice_id: invoice_id.clone(),
                    },
                )
                .await),
            Err(e) => Err(self.fail(invoice_id, action, e.into()).await),
        }
    }

    fn check_register(
        record: &RegistrationRecord,
        config: &IssuerConfig,
    ) -> Result<(), PreconditionError> {
        config.ensure_registrable()?;
        check_invoice(&record.invoice)?;
        check_transition(RegistrationOp::Register, record.state())
    }

    /// Run `register` or `retry` on its own task, holding `guard` until the
    /// task ends.
    async fn run_detached(
        &self,
        invoice_id: &InvoiceId,
        action: AuditAction,
        guard: InFlightGuard,
    ) -> RegistrationResult<RegistrationView> {
        let service = self.clone();
        let id = invoice_id.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            match action {
                AuditAction::Retry => service.retry_guarded(&id).await,
                _ => service.register_guarded(&id).await,
            }
        });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(self.abort(invoice_id, e).await),
        }
    }

    /// The registration task died without finishing; a `pending` invoice
    /// is moved to `error` so it can be retried.
    async fn abort(&self, invoice_id: &InvoiceId, cause: JoinError) -> RegistrationError {
        let error = PipelineError::Aborted {
            reason: if cause.is_panic() {
                "registration task panicked".to_string()
            } else {
                "registration task cancelled".to_string()
            },
        };

        match self.store.load(invoice_id).await {
            Ok(Some(record)) if record.state() == RegistrationState::Pending => {
                self.record_failure(invoice_id, error.to_string()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(
                    invoice_id = %invoice_id,
                    error = %e,
                    "[rl-04] could not inspect aborted registration"
                );
            }
        }

        self.fail(invoice_id, AuditAction::Register, error).await
    }

    /// Write the `error` status, retrying once.
    async fn record_failure(&self, invoice_id: &InvoiceId, message: String) {
        for attempt in 1..=FAILURE_STATUS_ATTEMPTS {
            let status = RegistrationStatus::Error {
                message: message.clone(),
            };
            match self.store.set_status(invoice_id, status).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(
                        invoice_id = %invoice_id,
                        attempt,
                        error = %e,
                        "[rl-04] could not record pipeline failure"
                    );
                }
            }
        }

        tracing::error!(
            invoice_id = %invoice_id,
            "[rl-04] pipeline failure not recorded, invoice left pending"
        );
    }

    /// Retry with the in-flight marker already held.
    async fn retry_guarded(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView> {
        let record = self.load_record(invoice_id, AuditAction::Retry).await?;
        if let Err(e) = check_transition(RegistrationOp::Retry, record.state()) {
            return Err(self.reject(invoice_id, AuditAction::Retry, e).await);
        }

        if let Err(e) = self
            .store
            .set_status(invoice_id, RegistrationStatus::NotRegistered)
            .await
        {
            return Err(self.fail(invoice_id, AuditAction::Retry, e.into()).await);
        }
        log_invoice_event!(info, "rl-04", "[rl-04] failed registration reset for retry", invoice_id);

        let previous_error = record.status.error_message().unwrap_or_default();
        self.audit
            .record(with_request(
                NewAuditEntry::pending(invoice_id, AuditAction::Retry),
                &serde_json::json!({ "previous_error": previous_error }),
            ))
            .await;

        self.register_guarded(invoice_id).await
    }

    /// Register with the in-flight marker already held.
    async fn register_guarded(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView> {
        let config = self.config.snapshot();
        let record = self.load_record(invoice_id, AuditAction::Register).await?;

        if let Err(e) = Self::check_register(&record, &config) {
            return Err(self.reject(invoice_id, AuditAction::Register, e).await);
        }

        if let Err(e) = self
            .store
            .set_status(invoice_id, RegistrationStatus::Pending)
            .await
        {
            return Err(self.fail(invoice_id, AuditAction::Register, e.into()).await);
        }

        let draft = SubmissionPayload::draft(&record.invoice, &config);
        self.audit
            .record(with_request(
                NewAuditEntry::pending(invoice_id, AuditAction::Register),
                &draft,
            ))
            .await;
        log_invoice_event!(
            info,
            "rl-04",
            "[rl-04] registration pending",
            invoice_id,
            issuer_id = %config.issuer_id
        );

        let timer = time_histogram!(PIPELINE_DURATION);
        let outcome = match tokio::time::timeout(
            self.pipeline_timeout,
            self.run_pipeline(&record.invoice, &config, draft),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout {
                after_ms: u64::try_from(self.pipeline_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        drop(timer);

        match outcome {
            Ok((artifacts, receipt)) => {
                REGISTRATIONS
                    .with_label_values(&["register", "success"])
                    .inc();
                log_invoice_event!(
                    info,
                    "rl-04",
                    "[rl-04] invoice registered",
                    invoice_id,
                    code = %artifacts.verification_code,
                    digest = %artifacts.digest
                );

                self.audit
                    .record(with_response(
                        NewAuditEntry::success(invoice_id, AuditAction::Register),
                        &RegisteredPayload::new(&artifacts, &receipt),
                    ))
                    .await;

                Ok(RegistrationView {
                    invoice_id: invoice_id.clone(),
                    state: RegistrationState::Registered,
                    artifacts: Some(artifacts),
                    error_message: None,
                })
            }
            Err(error) => {
                let message = error.to_string();
                self.record_failure(invoice_id, message.clone()).await;

                REGISTRATIONS
                    .with_label_values(&["register", "error"])
                    .inc();
                log_invoice_event!(
                    warn,
                    "rl-04",
                    "[rl-04] registration failed",
                    invoice_id,
                    code = error.code(),
                    error = %message
                );

                self.audit
                    .record(NewAuditEntry::error(invoice_id, AuditAction::Register, message))
                    .await;
                Err(error.into())
            }
        }
    }

    /// Index of the first entry whose invoice no longer yields the committed
    /// fields. A missing invoice counts as a mismatch.
    async fn first_field_mismatch(&self, entries: &[ChainEntry]) -> RegistrationResult<Option<usize>> {
        for (index, entry) in entries.iter().enumerate() {
            let matches = match self.store.load(&entry.invoice_id).await? {
                Some(record) => entry.link.matches_invoice(&record.invoice),
                None => false,
            };
            if !matches {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Digest, artifacts, submission and commit, serialized per issuer.
    async fn run_pipeline(
        &self,
        invoice: &Invoice,
        config: &IssuerConfig,
        draft: SubmissionPayload,
    ) -> Result<(RegistrationArtifacts, RegistrarReceipt), PipelineError> {
        let lock = self.issuer_lock(&config.issuer_id);
        let _chain = lock.lock().await;

        let head = self.store.chain_head(&config.issuer_id).await?;
        let generated_at = capture_timestamp();
        let link = compute_link(invoice, config, head.as_ref(), generated_at)?;

        let issued = self
            .verification
            .issue(
                invoice,
                config,
                &StoreCodeRegistry::new(self.store.as_ref()),
                generated_at,
            )
            .await?;

        let receipt = self.registrar.submit(&draft.seal(&link)).await?;

        let artifacts = RegistrationArtifacts {
            registration_id: issued.registration_id,
            digest: link.digest,
            verification_code: issued.code,
            verification_url: issued.url,
            qr: issued.qr,
            registered_at: link.fields.generated_at,
            link,
        };
        self.store
            .commit_registration(&invoice.id, &config.issuer_id, head, artifacts.clone())
            .await?;

        Ok((artifacts, receipt))
    }
}

#[async_trait]
impl RegistrationApi for RegistrationService {
    async fn register(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView> {
        let guard = match self.enter(invoice_id) {
            Ok(guard) => guard,
            Err(e) => return Err(self.reject(invoice_id, AuditAction::Register, e).await),
        };
        self.run_detached(invoice_id, AuditAction::Register, guard).await
    }

    async fn retry(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView> {
        let guard = match self.enter(invoice_id) {
            Ok(guard) => guard,
            Err(e) => return Err(self.reject(invoice_id, AuditAction::Retry, e).await),
        };
        self.run_detached(invoice_id, AuditAction::Retry, guard).await
    }

    async fn cancel(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView> {
        let _guard = match self.enter(invoice_id) {
            Ok(guard) => guard,
            Err(e) => return Err(self.reject(invoice_id, AuditAction::Cancel, e).await),
        };

        let record = self.load_record(invoice_id, AuditAction::Cancel).await?;
        let current = record.state();
        let cancelled = check_transition(RegistrationOp::Cancel, current).and_then(|()| {
            record
                .status
                .into_cancelled()
                .ok_or(PreconditionError::NotRegistered { current })
        });
        let cancelled = match cancelled {
            Ok(status) => status,
            Err(e) => return Err(self.reject(invoice_id, AuditAction::Cancel, e).await),
        };

        self.audit
            .record(NewAuditEntry::pending(invoice_id, AuditAction::Cancel))
            .await;

        if let Err(e) = self.store.set_status(invoice_id, cancelled.clone()).await {
            return Err(self.fail(invoice_id, AuditAction::Cancel, e.into()).await);
        }

        REGISTRATIONS
            .with_label_values(&["cancel", "success"])
            .inc();
        log_invoice_event!(info, "rl-04", "[rl-04] registration cancelled", invoice_id);
        self.audit
            .record(NewAuditEntry::success(invoice_id, AuditAction::Cancel))
            .await;

        Ok(RegistrationView::from(&RegistrationRecord {
            invoice: record.invoice,
            status: cancelled,
        }))
    }

    async fn status(&self, invoice_id: &InvoiceId) -> RegistrationResult<RegistrationView> {
        let record = self.load_record(invoice_id, AuditAction::Query).await?;
        let view = RegistrationView::from(&record);

        self.audit
            .record(with_response(
                NewAuditEntry::success(invoice_id, AuditAction::Query),
                &serde_json::json!({ "status": view.state }),
            ))
            .await;
        Ok(view)
    }

    async fn audit_trail(&self, invoice_id: &InvoiceId) -> RegistrationResult<Vec<AuditEntry>> {
        Ok(self.audit.trail(invoice_id).await?)
    }

    fn config(&self) -> Arc<IssuerConfig> {
        self.config.snapshot()
    }

    async fn update_config(&self, update: IssuerConfigUpdate) -> RegistrationResult<Arc<IssuerConfig>> {
        let updated = self.config.apply(&update);

        self.audit
            .record(with_request(
                NewAuditEntry::new(None, AuditAction::ConfigUpdate, AuditOutcome::Success),
                updated.as_ref(),
            ))
            .await;
        tracing::info!(
            issuer_id = %updated.issuer_id,
            enabled = updated.enabled,
            environment = updated.environment.as_str(),
            "[rl-04] issuer configuration updated"
        );

        Ok(updated)
    }

    async fn verify_chain(&self, issuer_id: &IssuerId) -> RegistrationResult<ChainReport> {
        let entries = self.store.chain_entries(issuer_id).await?;
        let links: Vec<_> = entries.iter().map(|entry| entry.link.clone()).collect();
        let structural = verify_chain(&links).err();
        let checked = structural.map_or(entries.len(), |broken| broken.index);
        let first_break = match self.first_field_mismatch(&entries[..checked]).await? {
            Some(index) => Some(ChainBreak {
                index,
                kind: ChainBreakKind::FieldMismatch,
            }),
            None => structural,
        };

        let report = ChainReport {
            issuer_id: issuer_id.clone(),
            length: links.len(),
            head: links.last().map(|link| link.digest),
            first_break,
        };

        match &report.first_break {
            None => {
                CHAIN_VERIFICATIONS.with_label_values(&["intact"]).inc();
            }
            Some(broken) => {
                CHAIN_VERIFICATIONS.with_label_values(&["broken"]).inc();
                tracing::error!(
                    issuer_id = %issuer_id,
                    index = broken.index,
                    kind = ?broken.kind,
                    "[rl-04] chain verification failed"
                );
            }
        }

        Ok(report)
    }

    async fn upsert_invoice(&self, invoice: Invoice) -> RegistrationResult<()> {
        tracing::debug!(invoice_id = %invoice.id, "[rl-04] invoice received");
        self.store.upsert_invoice(invoice).await?;
        Ok(())
    }
}
