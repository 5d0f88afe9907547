use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::InvoiceId;
use std::fmt;
use uuid::Uuid;

/// Operation an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Register,
    Retry,
    Cancel,
    Query,
    ConfigUpdate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "register",
            AuditAction::Retry => "retry",
            AuditAction::Cancel => "cancel",
            AuditAction::Query => "query",
            AuditAction::ConfigUpdate => "config_update",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Pending,
    Success,
    Error,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Pending => "pending",
            AuditOutcome::Success => "success",
            AuditOutcome::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuditOutcome::Pending)
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry as requested by a caller, before the store stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    /// `None` for configuration-level actions
    pub invoice_id: Option<InvoiceId>,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    pub request_payload: Option<serde_json::Value>,
    pub response_payload: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

impl NewAuditEntry {
    pub fn new(invoice_id: Option<InvoiceId>, action: AuditAction, outcome: AuditOutcome) -> Self {
        Self {
            invoice_id,
            action,
            outcome,
            request_payload: None,
            response_payload: None,
            error_message: None,
        }
    }

    pub fn pending(invoice_id: &InvoiceId, action: AuditAction) -> Self {
        Self::new(Some(invoice_id.clone()), action, AuditOutcome::Pending)
    }

    pub fn success(invoice_id: &InvoiceId, action: AuditAction) -> Self {
        Self::new(Some(invoice_id.clone()), action, AuditOutcome::Success)
    }

    pub fn error(invoice_id: &InvoiceId, action: AuditAction, message: impl Into<String>) -> Self {
        Self::new(Some(invoice_id.clone()), action, AuditOutcome::Error).with_error(message)
    }

    pub fn with_request(mut self, payload: serde_json::Value) -> Self {
        self.request_payload = Some(payload);
        self
    }

    pub fn with_response(mut self, payload: serde_json::Value) -> Self {
        self.response_payload = Some(payload);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A persisted audit entry. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub log_id: Uuid,
    /// Global creation order across all invoices
    pub sequence: u64,
    pub invoice_id: Option<InvoiceId>,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    pub request_payload: Option<serde_json::Value>,
    pub response_payload: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Stamp a requested entry with its identity and creation time.
    pub fn stamp(entry: NewAuditEntry, sequence: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            sequence,
            invoice_id: entry.invoice_id,
            action: entry.action,
            outcome: entry.outcome,
            request_payload: entry.request_payload,
            response_payload: entry.response_payload,
            error_message: entry.error_message,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuditAction::ConfigUpdate).unwrap(),
            "\"config_update\""
        );
        assert_eq!(AuditAction::Register.to_string(), "register");
    }

    #[test]
    fn test_error_constructor_carries_message() {
        let entry = NewAuditEntry::error(&InvoiceId::new("inv-1"), AuditAction::Cancel, "not registered");
        assert_eq!(entry.outcome, AuditOutcome::Error);
        assert_eq!(entry.error_message.as_deref(), Some("not registered"));
        assert!(entry.outcome.is_terminal());
    }

    #[test]
    fn test_stamp_preserves_fields() {
        let requested = NewAuditEntry::pending(&InvoiceId::new("inv-1"), AuditAction::Register)
            .with_request(serde_json::json!({ "NumSerieFactura": "2026-0001" }));
        let stamped = AuditEntry::stamp(requested.clone(), 7, Utc::now());

        assert_eq!(stamped.sequence, 7);
        assert_eq!(stamped.invoice_id, requested.invoice_id);
        assert_eq!(stamped.request_payload, requested.request_payload);
        assert!(!stamped.outcome.is_terminal());
    }
}
