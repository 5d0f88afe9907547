//! Ports (Hexagonal Architecture)

pub mod outbound;
