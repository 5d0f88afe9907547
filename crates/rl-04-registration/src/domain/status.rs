//! Registration lifecycle
//!
//! ```text
//!   not_registered ──register──> pending ──┬──> registered ──cancel──> cancelled
//!         ^                                └──> error
//!         └───────────────retry────────────────────┘
//! ```
//!
//! Artifacts exist exactly in `registered` and `cancelled`; a stored error
//! message exists exactly in `error`. Both are enforced by the shape of
//! [`RegistrationStatus`].

use chrono::{DateTime, Utc};
use rl_01_hash_chain::{ChainBreak, ChainLink, Digest};
use rl_02_verification_code::{QrArtifact, RegistrationId, VerificationCode, VerificationUrl};
use serde::{Deserialize, Serialize};
use shared_types::{Invoice, InvoiceId, IssuerId};
use std::fmt;

/// Lifecycle state without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    NotRegistered,
    Pending,
    Registered,
    Error,
    Cancelled,
}

impl RegistrationState {
    pub const ALL: [RegistrationState; 5] = [
        RegistrationState::NotRegistered,
        RegistrationState::Pending,
        RegistrationState::Registered,
        RegistrationState::Error,
        RegistrationState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationState::NotRegistered => "not_registered",
            RegistrationState::Pending => "pending",
            RegistrationState::Registered => "registered",
            RegistrationState::Error => "error",
            RegistrationState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything persisted by a successful registration.
///
/// Kept unchanged when the registration is later cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationArtifacts {
    pub registration_id: RegistrationId,
    pub digest: Digest,
    pub verification_code: VerificationCode,
    pub verification_url: VerificationUrl,
    pub qr: QrArtifact,
    /// Digest generation time, millisecond precision
    pub registered_at: DateTime<Utc>,
    pub link: ChainLink,
}

impl RegistrationArtifacts {
    pub fn previous_digest(&self) -> Digest {
        self.link.previous
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistrationStatus {
    NotRegistered,
    Pending,
    Registered(Box<RegistrationArtifacts>),
    Error { message: String },
    Cancelled(Box<RegistrationArtifacts>),
}

impl RegistrationStatus {
    pub fn state(&self) -> RegistrationState {
        match self {
            RegistrationStatus::NotRegistered => RegistrationState::NotRegistered,
            RegistrationStatus::Pending => RegistrationState::Pending,
            RegistrationStatus::Registered(_) => RegistrationState::Registered,
            RegistrationStatus::Error { .. } => RegistrationState::Error,
            RegistrationStatus::Cancelled(_) => RegistrationState::Cancelled,
        }
    }

    pub fn artifacts(&self) -> Option<&RegistrationArtifacts> {
        match self {
            RegistrationStatus::Registered(a) | RegistrationStatus::Cancelled(a) => Some(a),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RegistrationStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// The cancelled form of a registered status.
    pub fn into_cancelled(self) -> Option<Self> {
        match self {
            RegistrationStatus::Registered(a) => Some(RegistrationStatus::Cancelled(a)),
            _ => None,
        }
    }
}

/// An invoice together with its registration status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub invoice: Invoice,
    pub status: RegistrationStatus,
}

impl RegistrationRecord {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            invoice,
            status: RegistrationStatus::NotRegistered,
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.status.state()
    }

    /// Fiscal fields are frozen from the moment a registration starts.
    pub fn fiscal_fields_locked(&self) -> bool {
        matches!(
            self.state(),
            RegistrationState::Pending | RegistrationState::Registered | RegistrationState::Cancelled
        )
    }
}

/// Read model returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationView {
    pub invoice_id: InvoiceId,
    pub state: RegistrationState,
    pub artifacts: Option<RegistrationArtifacts>,
    pub error_message: Option<String>,
}

impl From<&RegistrationRecord> for RegistrationView {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            invoice_id: record.invoice.id.clone(),
            state: record.state(),
            artifacts: record.status.artifacts().cloned(),
            error_message: record.status.error_message().map(str::to_string),
        }
    }
}

/// Result of re-verifying an issuer's chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    pub issuer_id: IssuerId,
    pub length: usize,
    pub head: Option<Digest>,
    pub first_break: Option<ChainBreak>,
}

impl ChainReport {
    pub fn is_intact(&self) -> bool {
        self.first_break.is_none()
    }
}
