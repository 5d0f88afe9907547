//! Error types for the registration state machine.
//!
//! Two families reach the caller:
//!
//! - [`PreconditionError`]: a guard refused the operation. Local,
//!   synchronous and not retryable without changing the underlying
//!   condition. No pipeline stage ran.
//! - [`PipelineError`]: a stage failed after the invoice entered `pending`.
//!   The invoice is left in `error` with the message stored, and the
//!   operation can be retried.

use crate::domain::RegistrationState;
use rl_01_hash_chain::ChainError;
use rl_02_verification_code::CodeError;
use rl_03_audit_log::AuditError;
use shared_types::{InvoiceId, IssuerConfigError, IssuerId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("registration disabled")]
    RegistrationDisabled,

    #[error("issuer configuration incomplete (issuer id and name are required)")]
    ConfigIncomplete,

    #[error("invoice is a draft")]
    InvoiceDraft,

    #[error("invoice is cancelled")]
    InvoiceCancelled,

    #[error("already registered (current status: {current})")]
    AlreadyRegistered { current: RegistrationState },

    #[error("registration in progress")]
    RegistrationInProgress,

    #[error("previous registration failed, use retry")]
    RetryRequired,

    #[error("no failed registration to retry (current status: {current})")]
    NoFailedRegistration { current: RegistrationState },

    #[error("invoice is not registered (current status: {current})")]
    NotRegistered { current: RegistrationState },

    #[error("invoice not found: {invoice_id}")]
    InvoiceNotFound { invoice_id: InvoiceId },

    #[error("another operation is in flight for invoice {invoice_id}")]
    OperationInFlight { invoice_id: InvoiceId },

    #[error("fiscal fields of invoice {invoice_id} can no longer change (current status: {current})")]
    FiscalFieldsLocked {
        invoice_id: InvoiceId,
        current: RegistrationState,
    },
}

impl PreconditionError {
    pub fn code(&self) -> &'static str {
        match self {
            PreconditionError::RegistrationDisabled => "REGISTRATION_DISABLED",
            PreconditionError::ConfigIncomplete => "CONFIG_INCOMPLETE",
            PreconditionError::InvoiceDraft => "INVOICE_DRAFT",
            PreconditionError::InvoiceCancelled => "INVOICE_CANCELLED",
            PreconditionError::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            PreconditionError::RegistrationInProgress => "REGISTRATION_IN_PROGRESS",
            PreconditionError::RetryRequired => "RETRY_REQUIRED",
            PreconditionError::NoFailedRegistration { .. } => "NO_FAILED_REGISTRATION",
            PreconditionError::NotRegistered { .. } => "NOT_REGISTERED",
            PreconditionError::InvoiceNotFound { .. } => "INVOICE_NOT_FOUND",
            PreconditionError::OperationInFlight { .. } => "OPERATION_IN_FLIGHT",
            PreconditionError::FiscalFieldsLocked { .. } => "FISCAL_FIELDS_LOCKED",
        }
    }
}

impl From<IssuerConfigError> for PreconditionError {
    fn from(e: IssuerConfigError) -> Self {
        match e {
            IssuerConfigError::Disabled => PreconditionError::RegistrationDisabled,
            IssuerConfigError::Incomplete => PreconditionError::ConfigIncomplete,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("digest computation failed: {reason}")]
    DigestFailed { reason: String },

    #[error("verification code generation failed: {reason}")]
    CodeFailed { reason: String },

    #[error("no unique verification code after {attempts} attempts")]
    CodeExhausted { attempts: u32 },

    #[error("registrar rejected the submission: {reason}")]
    RegistrarRejected { reason: String },

    #[error("storage failure: {reason}")]
    Store { reason: String },

    #[error("chain head for issuer {issuer_id} moved during registration")]
    ChainConflict { issuer_id: IssuerId },

    #[error("registration timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("registration aborted: {reason}")]
    Aborted { reason: String },
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::DigestFailed { .. } => "DIGEST_FAILED",
            PipelineError::CodeFailed { .. } => "CODE_FAILED",
            PipelineError::CodeExhausted { .. } => "CODE_EXHAUSTED",
            PipelineError::RegistrarRejected { .. } => "REGISTRAR_REJECTED",
            PipelineError::Store { .. } => "PERSIST_FAILED",
            PipelineError::ChainConflict { .. } => "CHAIN_CONFLICT",
            PipelineError::Timeout { .. } => "TIMEOUT",
            PipelineError::Aborted { .. } => "ABORTED",
        }
    }
}

impl From<ChainError> for PipelineError {
    fn from(e: ChainError) -> Self {
        PipelineError::DigestFailed {
            reason: e.to_string(),
        }
    }
}

impl From<CodeError> for PipelineError {
    fn from(e: CodeError) -> Self {
        match e {
            CodeError::Exhausted { attempts } => PipelineError::CodeExhausted { attempts },
            other => PipelineError::CodeFailed {
                reason: other.to_string(),
            },
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ChainConflict { issuer_id } => PipelineError::ChainConflict { issuer_id },
            other => PipelineError::Store {
                reason: other.to_string(),
            },
        }
    }
}

impl From<AuditError> for PipelineError {
    fn from(e: AuditError) -> Self {
        PipelineError::Store {
            reason: e.to_string(),
        }
    }
}

impl From<RegistrarError> for PipelineError {
    fn from(e: RegistrarError) -> Self {
        PipelineError::RegistrarRejected {
            reason: e.to_string(),
        }
    }
}

/// Error returned by every registration operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl RegistrationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationError::Precondition(e) => e.code(),
            RegistrationError::Pipeline(e) => e.code(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistrationError::Pipeline(_))
    }
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::FiscalFieldsLocked {
                invoice_id,
                current,
            } => RegistrationError::Precondition(PreconditionError::FiscalFieldsLocked {
                invoice_id,
                current,
            }),
            other => RegistrationError::Pipeline(other.into()),
        }
    }
}

impl From<AuditError> for RegistrationError {
    fn from(e: AuditError) -> Self {
        RegistrationError::Pipeline(e.into())
    }
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Registration store failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("registration store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("invoice not found: {invoice_id}")]
    NotFound { invoice_id: InvoiceId },

    #[error("chain head for issuer {issuer_id} does not match the expected head")]
    ChainConflict { issuer_id: IssuerId },

    #[error("fiscal fields of invoice {invoice_id} are locked (current status: {current})")]
    FiscalFieldsLocked {
        invoice_id: InvoiceId,
        current: RegistrationState,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Authority-side submission failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("submission rejected: {reason}")]
    Rejected { reason: String },

    #[error("registrar unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Settings file failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse settings: {0}")]
    Parse(String),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
