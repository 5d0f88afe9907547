//! Domain layer: digest value type, preimage fields and chain linkage.

pub mod chain;
pub mod digest;
pub mod fields;
