//! # Registration Ledger Test Suite
//!
//! Cross-crate tests that drive the whole stack through
//! [`rl_04_registration::RegistrationApi`].
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # lifecycle, audit trail, settings file
//!     └── concurrency.rs  # chain integrity under parallel callers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rl-tests
//! cargo bench -p rl-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
