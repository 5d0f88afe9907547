//! Registration domain: lifecycle states, transition guards and the
//! submission payload.

pub mod payload;
pub mod status;
pub mod transitions;

pub use payload::{SubmissionPayload, DEFAULT_OPERATION_DESCRIPTION, DEFAULT_RECIPIENT_NAME, INVOICE_KIND_ORDINARY};
pub use status::{
    ChainReport, RegistrationArtifacts, RegistrationRecord, RegistrationState, RegistrationStatus,
    RegistrationView,
};
pub use transitions::{check_invoice, check_transition, RegistrationOp};
