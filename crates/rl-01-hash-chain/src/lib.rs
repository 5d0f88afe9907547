//! # rl-01-hash-chain
//!
//! Hash Chain Generator for the registration ledger.
//!
//! ## Overview
//!
//! Every registered invoice receives a digest that commits to its own fiscal
//! fields and to the digest registered immediately before it for the same
//! issuer. Altering or removing a past registration changes every digest
//! after it.
//!
//! ```text
//! GENESIS ──→ D1 = H(fields1 | GENESIS) ──→ D2 = H(fields2 | D1) ──→ ...
//! ```
//!
//! ## Preimage Layout
//!
//! | # | Field | Rendering |
//! |---|-------|-----------|
//! | 1 | issuer tax id | as configured |
//! | 2 | invoice number | as issued |
//! | 3 | issue date | `YYYY-MM-DD` |
//! | 4 | total | 2 decimals |
//! | 5 | taxable base | 2 decimals |
//! | 6 | tax amount | 2 decimals |
//! | 7 | generation timestamp | RFC 3339, milliseconds, `Z` |
//! | 8 | previous digest | 64 uppercase hex |
//!
//! Fields are joined with `|` and hashed with SHA-256.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rl_01_hash_chain::{compute_link, capture_timestamp};
//!
//! let link = compute_link(&invoice, &config, previous.as_ref(), capture_timestamp())?;
//! println!("{}", link.digest); // 64 uppercase hex characters
//! ```

pub mod domain;
pub mod error;

pub use domain::chain::{chain_digest, compute_link, verify_chain, ChainBreak, ChainBreakKind, ChainLink};
pub use domain::digest::{Digest, DIGEST_HEX_LEN, DIGEST_LEN};
pub use domain::fields::{capture_timestamp, format_timestamp, ChainFields, FIELD_SEPARATOR};
pub use error::{ChainError, ChainResult};
