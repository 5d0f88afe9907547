//! # Concurrency
//!
//! Parallel callers on a multi-threaded runtime must never fork an
//! issuer's chain or double-register an invoice.

#[cfg(test)]
mod tests {
    use crate::fixtures::{sent_invoice, Ledger, ISSUER};
    use rl_04_registration::{RegistrationApi, RegistrationState, RegistrationStore};
    use shared_types::{InvoiceId, IssuerId};
    use std::collections::HashSet;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_registrations_form_one_chain() {
        let ledger = Ledger::enabled();
        let ids: Vec<InvoiceId> = (0..50).map(|n| InvoiceId::new(format!("inv-{}", n))).collect();
        for id in &ids {
            ledger
                .service
                .upsert_invoice(sent_invoice(id.as_str()))
                .await
                .unwrap();
        }

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let service = ledger.service.clone();
                tokio::spawn(async move { service.register(&id).await })
            })
            .collect();
        let mut codes = HashSet::new();
        for handle in handles {
            let view = handle.await.unwrap().unwrap();
            codes.insert(view.artifacts.unwrap().verification_code);
        }
        assert_eq!(codes.len(), 50);

        let issuer = IssuerId::new(ISSUER);
        let links = ledger.store.chain_links(&issuer).await.unwrap();
        assert_eq!(links.len(), 50);
        assert!(links[0].previous.is_genesis());
        for pair in links.windows(2) {
            assert_eq!(pair[1].previous, pair[0].digest);
        }

        let report = ledger.service.verify_chain(&issuer).await.unwrap();
        assert!(report.is_intact());
        assert_eq!(report.head, links.last().map(|l| l.digest));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_registers_on_one_invoice() {
        let ledger = Ledger::enabled();
        let id = InvoiceId::new("inv-1");
        ledger.service.upsert_invoice(sent_invoice("inv-1")).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = ledger.service.clone();
                let id = id.clone();
                tokio::spawn(async move { service.register(&id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(
                    matches!(e.code(), "OPERATION_IN_FLIGHT" | "ALREADY_REGISTERED"),
                    "unexpected error {}",
                    e
                ),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(
            ledger.store.load(&id).await.unwrap().unwrap().state(),
            RegistrationState::Registered
        );
        assert_eq!(
            ledger.store.chain_links(&IssuerId::new(ISSUER)).await.unwrap().len(),
            1
        );
    }
}
