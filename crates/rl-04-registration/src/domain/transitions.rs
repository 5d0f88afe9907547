//! Transition guards
//!
//! | from \ op        | register                 | retry                  | cancel          |
//! |------------------|--------------------------|------------------------|-----------------|
//! | `not_registered` | ok                       | NO_FAILED_REGISTRATION | NOT_REGISTERED  |
//! | `pending`        | REGISTRATION_IN_PROGRESS | NO_FAILED_REGISTRATION | NOT_REGISTERED  |
//! | `registered`     | ALREADY_REGISTERED       | NO_FAILED_REGISTRATION | ok              |
//! | `error`          | RETRY_REQUIRED           | ok                     | NOT_REGISTERED  |
//! | `cancelled`      | ALREADY_REGISTERED       | NO_FAILED_REGISTRATION | NOT_REGISTERED  |

use super::status::RegistrationState;
use crate::error::PreconditionError;
use serde::{Deserialize, Serialize};
use shared_types::{CommercialStatus, Invoice};

/// Operations that move an invoice through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOp {
    Register,
    Retry,
    Cancel,
}

impl RegistrationOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationOp::Register => "register",
            RegistrationOp::Retry => "retry",
            RegistrationOp::Cancel => "cancel",
        }
    }
}

/// Check that `op` may start from `current`.
pub fn check_transition(op: RegistrationOp, current: RegistrationState) -> Result<(), PreconditionError> {
    use RegistrationState as S;

    match (op, current) {
        (RegistrationOp::Register, S::NotRegistered) => Ok(()),
        (RegistrationOp::Register, S::Pending) => Err(PreconditionError::RegistrationInProgress),
        (RegistrationOp::Register, S::Registered | S::Cancelled) => {
            Err(PreconditionError::AlreadyRegistered { current })
        }
        (RegistrationOp::Register, S::Error) => Err(PreconditionError::RetryRequired),

        (RegistrationOp::Retry, S::Error) => Ok(()),
        (RegistrationOp::Retry, _) => Err(PreconditionError::NoFailedRegistration { current }),

        (RegistrationOp::Cancel, S::Registered) => Ok(()),
        (RegistrationOp::Cancel, _) => Err(PreconditionError::NotRegistered { current }),
    }
}

/// Commercial status guard for registration.
pub fn check_invoice(invoice: &Invoice) -> Result<(), PreconditionError> {
    match invoice.commercial_status {
        CommercialStatus::Draft => Err(PreconditionError::InvoiceDraft),
        CommercialStatus::Cancelled => Err(PreconditionError::InvoiceCancelled),
        CommercialStatus::Sent | CommercialStatus::Paid | CommercialStatus::Overdue => Ok(()),
    }
}
