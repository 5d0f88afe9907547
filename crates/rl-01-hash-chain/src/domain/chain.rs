//! Chain linkage and verification
//!
//! INVARIANT: link *n* commits to its own fields and to the digest of link
//! *n-1*; the first link of an issuer commits to [`Digest::GENESIS`].

use super::digest::{Digest, DIGEST_LEN};
use super::fields::ChainFields;
use crate::error::ChainResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use shared_types::{Invoice, IssuerConfig, IssuerId};

/// Core digest function.
///
/// `SHA-256(fields || "|" || previous_hex)`. This signature is the stable
/// interface every stored digest was produced with; do not reorder inputs.
pub fn chain_digest(fields: &[u8], previous: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(fields);
    hasher.update(b"|");
    hasher.update(previous.to_hex().as_bytes());

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hasher.finalize());
    Digest(out)
}

/// One registration in an issuer's chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub fields: ChainFields,
    pub previous: Digest,
    pub digest: Digest,
}

impl ChainLink {
    /// Recompute the digest from the stored fields and previous digest.
    pub fn recompute(&self) -> Digest {
        chain_digest(&self.fields.canonical_bytes(), &self.previous)
    }

    pub fn is_self_consistent(&self) -> bool {
        self.recompute() == self.digest
    }

    /// True when `invoice`, read today, still yields the fields this link
    /// committed to at its generation time.
    pub fn matches_invoice(&self, invoice: &Invoice) -> bool {
        let issuer_id = IssuerId::new(self.fields.issuer_id.clone());
        match ChainFields::for_issuer(invoice, &issuer_id, self.fields.generated_at) {
            Ok(fields) => fields == self.fields,
            Err(_) => false,
        }
    }
}

/// Compute the next link for an invoice.
///
/// Refuses to run unless the issuer configuration is enabled and complete.
/// `previous` is `None` for the issuer's first registration.
pub fn compute_link(
    invoice: &Invoice,
    config: &IssuerConfig,
    previous: Option<&Digest>,
    generated_at: DateTime<Utc>,
) -> ChainResult<ChainLink> {
    config.ensure_registrable()?;

    let fields = ChainFields::from_invoice(invoice, config, generated_at)?;
    let previous = previous.copied().unwrap_or(Digest::GENESIS);
    let digest = chain_digest(&fields.canonical_bytes(), &previous);

    Ok(ChainLink {
        fields,
        previous,
        digest,
    })
}

/// Why a chain failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainBreakKind {
    /// The link does not point at the digest of the link before it
    PreviousMismatch,
    /// The link's digest cannot be reproduced from its fields
    DigestMismatch,
    /// The invoice behind the link no longer matches the committed fields
    FieldMismatch,
}

/// First broken link found during verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBreak {
    /// Zero-based position in registration order
    pub index: usize,
    pub kind: ChainBreakKind,
}

/// Verify a chain given in registration order.
///
/// An empty chain is valid. Stops at the first broken link.
pub fn verify_chain(links: &[ChainLink]) -> Result<(), ChainBreak> {
    let mut expected_previous = Digest::GENESIS;

    for (index, link) in links.iter().enumerate() {
        if link.previous != expected_previous {
            return Err(ChainBreak {
                index,
                kind: ChainBreakKind::PreviousMismatch,
            });
        }
        if !link.is_self_consistent() {
            return Err(ChainBreak {
                index,
                kind: ChainBreakKind::DigestMismatch,
            });
        }
        expected_previous = link.digest;
    }

    Ok(())
}
