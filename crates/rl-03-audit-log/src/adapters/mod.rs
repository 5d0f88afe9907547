//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound audit store port.

mod memory;

pub use memory::InMemoryAuditStore;
