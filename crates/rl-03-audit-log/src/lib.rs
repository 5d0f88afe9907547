//! # Audit Logger (rl-03)
//!
//! Append-only ledger of every action attempted against the registration
//! state machine, independent of outcome.
//!
//! ## Guarantees
//!
//! - Entries are never mutated or deleted. The store port only exposes
//!   `append` and read operations.
//! - Each entry carries a global creation-order sequence; per-invoice
//!   listings are most-recent-first by that sequence.
//! - Writes through [`AuditLogger`] are best-effort: a failed write is
//!   reported on the diagnostic channel (`tracing::error!` plus the
//!   `rl_audit_write_failures_total` counter) and never reaches the caller.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryAuditStore;
pub use domain::{AuditAction, AuditEntry, AuditOutcome, NewAuditEntry};
pub use error::{AuditError, AuditResult};
pub use ports::inbound::AuditTrailApi;
pub use ports::outbound::AuditStore;
pub use service::{payload_snapshot, AuditLogger};
