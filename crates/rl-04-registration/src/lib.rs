//! # Registration State Machine (rl-04)
//!
//! Drives an invoice through `not_registered -> pending -> registered`,
//! with `error` and `cancelled` as the other resting states, and is the
//! single writer of an issuer's hash chain.
//!
//! ## Operations
//!
//! | Operation | Allowed from | Result |
//! |-----------|--------------|--------|
//! | register | `not_registered` | `registered` or `error` |
//! | retry | `error` | delegates to register |
//! | cancel | `registered` | `cancelled`, artifacts kept |
//! | status | any | read only |
//!
//! Every operation, including refused ones, leaves audit entries through
//! [`rl_03_audit_log::AuditLogger`].
//!
//! ## Concurrency
//!
//! - One operation per invoice at a time; a second caller gets
//!   `OPERATION_IN_FLIGHT`.
//! - Registrations of one issuer are serialized on a chain lock, and the
//!   commit is conditional on the chain head read under that lock.
//! - An accepted registration runs on its own task and finishes even if the
//!   caller stops waiting.

pub mod adapters;
pub mod config_store;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod settings;

pub use adapters::{InMemoryRegistrationStore, SimulatedRegistrar, StoreCodeRegistry};
pub use config_store::ConfigStore;
pub use domain::{
    check_invoice, check_transition, ChainReport, RegistrationArtifacts, RegistrationOp,
    RegistrationRecord, RegistrationState, RegistrationStatus, RegistrationView,
    SubmissionPayload,
};
pub use error::{
    PipelineError, PreconditionError, RegistrarError, RegistrationError, RegistrationResult,
    SettingsError, StoreError, StoreResult,
};
pub use ports::inbound::RegistrationApi;
pub use ports::outbound::{ChainEntry, Registrar, RegistrarReceipt, RegistrationStore};
pub use service::RegistrationService;
pub use settings::{LedgerSettings, DEFAULT_CODE_MAX_ATTEMPTS, DEFAULT_PIPELINE_TIMEOUT};
