//! # Integration Test Flows
//!
//! End-to-end lifecycles across the hash chain (rl-01), code generator
//! (rl-02), audit log (rl-03) and state machine (rl-04).

#[cfg(test)]
mod tests {
    use crate::fixtures::{sent_invoice, Ledger, ISSUER};
    use rl_01_hash_chain::{chain_digest, Digest};
    use rl_02_verification_code::{VerificationCode, SANDBOX_BASE_URL};
    use rl_03_audit_log::{AuditAction, AuditOutcome, AuditStore};
    use rl_04_registration::{
        LedgerSettings, RegistrationApi, RegistrationState, RegistrationStore,
    };
    use shared_types::{Environment, InvoiceId, IssuerConfigUpdate, IssuerId};
    use std::io::Write;
    use std::time::Duration;

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_register_cancel_then_register_again_is_refused() {
        let ledger = Ledger::enabled();
        let id = InvoiceId::new("inv-1");
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();

        let registered = ledger.service.register(&id).await.unwrap();
        let artifacts = registered.artifacts.clone().unwrap();
        assert!(VerificationCode::parse(artifacts.verification_code.as_str()).is_ok());
        assert!(artifacts.verification_url.as_str().starts_with(SANDBOX_BASE_URL));

        let cancelled = ledger.service.cancel(&id).await.unwrap();
        assert_eq!(cancelled.state, RegistrationState::Cancelled);
        assert_eq!(cancelled.artifacts, registered.artifacts);

        let again = ledger.service.register(&id).await.unwrap_err();
        assert_eq!(again.code(), "ALREADY_REGISTERED");

        let status = ledger.service.status(&id).await.unwrap();
        assert_eq!(status.state, RegistrationState::Cancelled);

        let mut trail = ledger.service.audit_trail(&id).await.unwrap();
        trail.reverse();
        let steps: Vec<_> = trail.iter().map(|e| (e.action, e.outcome)).collect();
        assert_eq!(
            steps,
            vec![
                (AuditAction::Register, AuditOutcome::Pending),
                (AuditAction::Register, AuditOutcome::Success),
                (AuditAction::Cancel, AuditOutcome::Pending),
                (AuditAction::Cancel, AuditOutcome::Success),
                (AuditAction::Register, AuditOutcome::Error),
                (AuditAction::Query, AuditOutcome::Success),
            ]
        );
        assert!(trail.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    #[tokio::test]
    async fn test_stored_digest_matches_independent_recomputation() {
        let ledger = Ledger::enabled();
        for id in ["inv-1", "inv-2"] {
            ledger.service.upsert_invoice(sent_invoice(id)).await.unwrap();
            ledger.service.register(&InvoiceId::new(id)).await.unwrap();
        }

        let links = ledger.store.chain_links(&IssuerId::new(ISSUER)).await.unwrap();
        let first = &links[0];
        let second = &links[1];

        let preimage = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            ISSUER,
            "F-inv-1",
            "2026-01-15",
            "1210.00",
            "1000.00",
            "210.00",
            rl_01_hash_chain::format_timestamp(&first.fields.generated_at),
        );
        assert_eq!(first.fields.canonical_bytes(), preimage.as_bytes());
        assert_eq!(chain_digest(preimage.as_bytes(), &Digest::GENESIS), first.digest);
        assert_eq!(second.previous, first.digest);
    }

    #[tokio::test]
    async fn test_cancelled_invoice_cannot_be_renumbered() {
        let ledger = Ledger::enabled();
        let id = InvoiceId::new("inv-1");
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();
        ledger.service.register(&id).await.unwrap();
        ledger.service.cancel(&id).await.unwrap();

        let mut renumbered = sent_invoice("inv-1");
        renumbered.number = "F-inv-99".to_string();
        let error = ledger.service.upsert_invoice(renumbered).await.unwrap_err();

        assert_eq!(error.code(), "FISCAL_FIELDS_LOCKED");
        assert_eq!(ledger.store.load(&id).await.unwrap().unwrap().invoice.number, "F-inv-1");
        let report = ledger.service.verify_chain(&IssuerId::new(ISSUER)).await.unwrap();
        assert!(report.is_intact());
        assert_eq!(report.length, 1);
    }

    #[tokio::test]
    async fn test_disabled_issuer_leaves_no_trace_but_the_audit() {
        let ledger = Ledger::from_settings(&LedgerSettings::default());
        let id = InvoiceId::new("inv-1");
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();

        let error = ledger.service.register(&id).await.unwrap_err();

        assert_eq!(error.code(), "REGISTRATION_DISABLED");
        assert_eq!(
            ledger.store.load(&id).await.unwrap().unwrap().state(),
            RegistrationState::NotRegistered
        );
        assert!(ledger
            .store
            .chain_links(&ledger.service.config().issuer_id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(ledger.audit.len(), 1);
    }

    #[tokio::test]
    async fn test_environment_switch_changes_verification_host() {
        let ledger = Ledger::enabled();
        ledger
            .service
            .update_config(IssuerConfigUpdate {
                environment: Some(Environment::Production),
                ..Default::default()
            })
            .await
            .unwrap();
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();

        let view = ledger.service.register(&InvoiceId::new("inv-1")).await.unwrap();

        let url = view.artifacts.unwrap().verification_url;
        assert!(url.as_str().contains("agenciatributaria.gob.es"));

        let all = ledger.audit.list_all().await.unwrap();
        assert_eq!(all[0].action, AuditAction::ConfigUpdate);
        assert_eq!(all[0].request_payload.as_ref().unwrap()["environment"], "production");
    }

    #[tokio::test]
    async fn test_issuers_keep_separate_chains() {
        let ledger = Ledger::enabled();
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();
        ledger.service.upsert_invoice(sent_invoice("inv-2")).await.unwrap();

        ledger.service.register(&InvoiceId::new("inv-1")).await.unwrap();
        ledger
            .service
            .update_config(IssuerConfigUpdate {
                issuer_id: Some("A87654321".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = ledger.service.register(&InvoiceId::new("inv-2")).await.unwrap();

        let artifacts = second.artifacts.unwrap();
        assert!(artifacts.previous_digest().is_genesis());
        assert_eq!(artifacts.verification_code.issuer_segment(), "A87654321");

        for issuer in [ISSUER, "A87654321"] {
            let report = ledger.service.verify_chain(&IssuerId::new(issuer)).await.unwrap();
            assert!(report.is_intact());
            assert_eq!(report.length, 1);
        }
    }

    // =============================================================================
    // SETTINGS FILE
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_settings_file_drives_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[pipeline]
timeout_ms = 500

[registrar]
simulated_latency_ms = 2000

[issuer]
issuer_id = "{}"
issuer_name = "Acme Servicios SL"
enabled = true
"#,
            ISSUER
        )
        .unwrap();

        let settings = LedgerSettings::load(file.path()).unwrap();
        assert_eq!(settings.pipeline_timeout, Duration::from_millis(500));

        let ledger = Ledger::from_settings(&settings);
        let id = InvoiceId::new("inv-1");
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();

        let error = ledger.service.register(&id).await.unwrap_err();
        assert_eq!(error.code(), "TIMEOUT");
        assert!(error.is_retryable());

        let status = ledger.service.status(&id).await.unwrap();
        assert_eq!(status.state, RegistrationState::Error);
        assert_eq!(
            status.error_message.as_deref(),
            Some("registration timed out after 500 ms")
        );
    }
}
