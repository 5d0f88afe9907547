//! Audit domain types

pub mod entry;

pub use entry::{AuditAction, AuditEntry, AuditOutcome, NewAuditEntry};
