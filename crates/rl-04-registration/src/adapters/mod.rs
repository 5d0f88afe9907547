//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, plus the bridge that
//! lets the code generator check uniqueness against the registration store.

mod code_registry;
mod memory;
mod registrar;

pub use code_registry::StoreCodeRegistry;
pub use memory::InMemoryRegistrationStore;
pub use registrar::SimulatedRegistrar;
