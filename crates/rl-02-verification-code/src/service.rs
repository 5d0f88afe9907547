//! Verification Service
//!
//! Produces the code, URL, QR artifact and registration id for one
//! registration in a single call.

use crate::domain::code::{CodeGenerator, VerificationCode};
use crate::domain::qr::{QrArtifact, QrEncoder};
use crate::domain::registration_id::RegistrationId;
use crate::domain::url::{verification_url, VerificationUrl};
use crate::error::CodeResult;
use crate::ports::outbound::CodeRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Invoice, IssuerConfig};

/// Everything a registration presents to the outside world besides its digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationArtifacts {
    pub code: VerificationCode,
    pub url: VerificationUrl,
    pub qr: QrArtifact,
    pub registration_id: RegistrationId,
}

/// Code Generator + QR Encoder
#[derive(Default)]
pub struct VerificationService {
    generator: CodeGenerator,
    encoder: QrEncoder,
}

impl VerificationService {
    pub fn new(generator: CodeGenerator, encoder: QrEncoder) -> Self {
        Self { generator, encoder }
    }

    pub fn generator(&self) -> &CodeGenerator {
        &self.generator
    }

    pub fn encoder(&self) -> &QrEncoder {
        &self.encoder
    }

    /// Issue artifacts for `invoice`.
    ///
    /// Fails only on configuration, uniqueness or URL errors. A QR failure
    /// yields a placeholder artifact instead.
    pub async fn issue(
        &self,
        invoice: &Invoice,
        config: &IssuerConfig,
        registry: &dyn CodeRegistry,
        generated_at: DateTime<Utc>,
    ) -> CodeResult<VerificationArtifacts> {
        config.ensure_registrable()?;

        let code = self
            .generator
            .generate_unique(invoice.issue_date, &config.issuer_id, registry)
            .await?;
        let url = verification_url(&code, config.environment)?;
        let qr = self.encoder.encode(url.as_str());
        let registration_id = RegistrationId::generate(&config.issuer_id, generated_at, &self.generator)?;

        Ok(VerificationArtifacts {
            code,
            url,
            qr,
            registration_id,
        })
    }
}
