//! # rl-02-verification-code
//!
//! Human-presentable verification artifacts for a registered invoice.
//!
//! ## Overview
//!
//! - **Verification code**: `YYYYMMDD-<ISSUER>-XXXX-YYYY`, unique per
//!   registration, regenerated on collision up to a bounded attempt count.
//! - **Verification URL**: environment specific base endpoint with the code
//!   as the `csv` query parameter.
//! - **QR artifact**: SVG data URL of the verification URL at error
//!   correction level M. Encoding failures degrade to a placeholder image
//!   and never fail a registration.
//! - **Registration id**: `VF-<ISSUER>-<base36 millis>-<XXXX>`.
//!
//! ```text
//! invoice + config ──→ code ──→ url ──→ qr
//!                        │
//!                        └── CodeRegistry (uniqueness check)
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::code::{normalize_issuer_id, CodeGenerator, VerificationCode, ISSUER_SEGMENT_LEN};
pub use domain::qr::{QrArtifact, QrEncoder, QrEncoderConfig};
pub use domain::registration_id::RegistrationId;
pub use domain::url::{verification_url, VerificationUrl, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use error::{CodeError, CodeResult, QrEncodeError};
pub use ports::outbound::CodeRegistry;
pub use service::{VerificationArtifacts, VerificationService};
