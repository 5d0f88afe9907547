//! Simulated registrar.

use crate::domain::SubmissionPayload;
use crate::error::RegistrarError;
use crate::ports::outbound::{Registrar, RegistrarReceipt};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

/// Accepts every sealed submission after a fixed latency.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRegistrar {
    latency: Duration,
}

impl SimulatedRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl Registrar for SimulatedRegistrar {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<RegistrarReceipt, RegistrarError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if !payload.is_sealed() {
            return Err(RegistrarError::Rejected {
                reason: "record has no digest".to_string(),
            });
        }

        let receipt = RegistrarReceipt {
            reference: format!("SIM-{}", Uuid::new_v4().simple()),
            accepted_at: Utc::now(),
        };
        tracing::debug!(
            invoice_number = %payload.invoice.invoice_number,
            reference = %receipt.reference,
            "[rl-04] simulated registrar accepted submission"
        );
        Ok(receipt)
    }
}
