//! # Shared Types Crate
//!
//! Fiscal entities and issuer configuration consumed by every ledger
//! subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: invoice fields and issuer configuration are
//!   defined once here and re-used by the hash chain, the code generator and
//!   the registration state machine.
//! - **Read-only Inputs**: the invoicing layer owns `Invoice`; the ledger never
//!   mutates its fiscal fields.
//! - **Snapshots, not Singletons**: `IssuerConfig` is a plain value. Updates
//!   produce a new value via `IssuerConfigUpdate::apply`.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::*;
pub use entities::*;
pub use errors::*;
