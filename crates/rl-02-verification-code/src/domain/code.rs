//! Verification code generation
//!
//! Format: `YYYYMMDD-<ISSUER>-XXXX-YYYY`
//!
//! - `YYYYMMDD`: invoice issue date
//! - `<ISSUER>`: issuer tax id, alphanumerics only, uppercased, truncated or
//!   left-padded with `0` to [`ISSUER_SEGMENT_LEN`] characters
//! - `XXXX`, `YYYY`: random segments over `[A-Z0-9]`

use crate::error::{CodeError, CodeResult};
use crate::ports::outbound::CodeRegistry;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shared_types::IssuerId;
use std::fmt;

/// Width of the issuer segment
pub const ISSUER_SEGMENT_LEN: usize = 9;

/// Width of each random segment
pub const RANDOM_SEGMENT_LEN: usize = 4;

/// Default bound on regeneration after a collision
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Normalize an issuer id into the fixed-width code segment.
///
/// `b-1234.5678` -> `B12345678`, `A1` -> `0000000A1`.
pub fn normalize_issuer_id(issuer_id: &IssuerId) -> CodeResult<String> {
    let cleaned: String = issuer_id
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .take(ISSUER_SEGMENT_LEN)
        .collect();

    if cleaned.is_empty() {
        return Err(CodeError::UnusableIssuerId {
            issuer_id: issuer_id.as_str().to_string(),
        });
    }

    Ok(format!("{:0>width$}", cleaned, width = ISSUER_SEGMENT_LEN))
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

/// A verification code in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Validate and wrap an existing code.
    pub fn parse(text: &str) -> CodeResult<Self> {
        let invalid = || CodeError::InvalidCode {
            code: text.to_string(),
        };

        let parts: Vec<&str> = text.split('-').collect();
        let [date, issuer, first, second] = parts.as_slice() else {
            return Err(invalid());
        };

        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| invalid())?;

        if issuer.len() != ISSUER_SEGMENT_LEN || !issuer.chars().all(is_code_char) {
            return Err(invalid());
        }
        for segment in [first, second] {
            if segment.len() != RANDOM_SEGMENT_LEN || !segment.chars().all(is_code_char) {
                return Err(invalid());
            }
        }

        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Date segment (`YYYYMMDD`)
    pub fn date_segment(&self) -> &str {
        &self.0[..8]
    }

    /// Issuer segment
    pub fn issuer_segment(&self) -> &str {
        &self.0[9..9 + ISSUER_SEGMENT_LEN]
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VerificationCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VerificationCode> for String {
    fn from(code: VerificationCode) -> Self {
        code.0
    }
}

/// Generates verification codes, checking uniqueness against a registry.
pub struct CodeGenerator {
    max_attempts: u32,
    rng: Mutex<StdRng>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl CodeGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests and replays.
    pub fn with_seed(max_attempts: u32, seed: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Random `[A-Z0-9]` segment of the given length.
    pub fn random_segment(&self, len: usize) -> String {
        let mut rng = self.rng.lock();
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Build one candidate code. No uniqueness check.
    pub fn candidate(&self, issue_date: NaiveDate, issuer_id: &IssuerId) -> CodeResult<VerificationCode> {
        let issuer = normalize_issuer_id(issuer_id)?;
        let code = format!(
            "{}-{}-{}-{}",
            issue_date.format("%Y%m%d"),
            issuer,
            self.random_segment(RANDOM_SEGMENT_LEN),
            self.random_segment(RANDOM_SEGMENT_LEN),
        );
        Ok(VerificationCode(code))
    }

    /// Generate a code not yet known to `registry`.
    ///
    /// Regenerates the random segments on collision, giving up with
    /// [`CodeError::Exhausted`] after `max_attempts` candidates.
    pub async fn generate_unique(
        &self,
        issue_date: NaiveDate,
        issuer_id: &IssuerId,
        registry: &dyn CodeRegistry,
    ) -> CodeResult<VerificationCode> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.candidate(issue_date, issuer_id)?;
            if !registry.is_taken(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(
                attempt,
                code = %candidate,
                "[rl-02] verification code collision, regenerating"
            );
        }

        Err(CodeError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    struct EmptyRegistry;

    #[async_trait]
    impl CodeRegistry for EmptyRegistry {
        async fn is_taken(&self, _code: &VerificationCode) -> CodeResult<bool> {
            Ok(false)
        }
    }

    /// Reports the first `collisions` candidates as taken.
    struct CollidingRegistry {
        collisions: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl CodeRegistry for CollidingRegistry {
        async fn is_taken(&self, _code: &VerificationCode) -> CodeResult<bool> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(call < self.collisions)
        }
    }

    struct BrokenRegistry;

    #[async_trait]
    impl CodeRegistry for BrokenRegistry {
        async fn is_taken(&self, _code: &VerificationCode) -> CodeResult<bool> {
            Err(CodeError::Registry {
                reason: "connection reset".to_string(),
            })
        }
    }

    fn matches_format(code: &str, issuer: &str) -> bool {
        let parts: Vec<&str> = code.split('-').collect();
        parts.len() == 4
            && parts[0] == "20260115"
            && parts[1] == issuer
            && parts[2..]
                .iter()
                .all(|s| s.len() == 4 && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()))
    }

    #[test]
    fn test_normalize_strips_and_uppercases() {
        let id = IssuerId::new("b-1234.5678");
        assert_eq!(normalize_issuer_id(&id).unwrap(), "B12345678");
    }

    #[test]
    fn test_normalize_truncates() {
        let id = IssuerId::new("ESB123456789");
        assert_eq!(normalize_issuer_id(&id).unwrap(), "ESB123456");
    }

    #[test]
    fn test_normalize_left_pads() {
        let id = IssuerId::new("A1");
        assert_eq!(normalize_issuer_id(&id).unwrap(), "0000000A1");
    }

    #[test]
    fn test_normalize_rejects_symbols_only() {
        let id = IssuerId::new("--..");
        assert!(matches!(
            normalize_issuer_id(&id),
            Err(CodeError::UnusableIssuerId { .. })
        ));
    }

    #[test]
    fn test_candidate_format() {
        let generator = CodeGenerator::default();
        for _ in 0..50 {
            let code = generator.candidate(date(), &IssuerId::new("B12345678")).unwrap();
            assert!(matches_format(code.as_str(), "B12345678"), "bad code {}", code);
            assert_eq!(code.date_segment(), "20260115");
            assert_eq!(code.issuer_segment(), "B12345678");
        }
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = CodeGenerator::with_seed(3, 42);
        let b = CodeGenerator::with_seed(3, 42);
        let issuer = IssuerId::new("B12345678");
        assert_eq!(a.candidate(date(), &issuer).unwrap(), b.candidate(date(), &issuer).unwrap());
    }

    #[test]
    fn test_codes_are_practically_unique() {
        let generator = CodeGenerator::default();
        let issuer = IssuerId::new("B12345678");
        let codes: HashSet<_> = (0..1000)
            .map(|_| generator.candidate(date(), &issuer).unwrap())
            .collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_parse_roundtrip_and_rejections() {
        assert!(VerificationCode::parse("20260115-B12345678-ABCD-1234").is_ok());
        assert!(VerificationCode::parse("20261315-B12345678-ABCD-1234").is_err());
        assert!(VerificationCode::parse("20260115-B1234567-ABCD-1234").is_err());
        assert!(VerificationCode::parse("20260115-B12345678-abcd-1234").is_err());
        assert!(VerificationCode::parse("20260115-B12345678-ABCD").is_err());
    }

    #[tokio::test]
    async fn test_generate_unique_first_try() {
        let generator = CodeGenerator::default();
        let code = generator
            .generate_unique(date(), &IssuerId::new("B12345678"), &EmptyRegistry)
            .await
            .unwrap();
        assert!(matches_format(code.as_str(), "B12345678"));
    }

    #[tokio::test]
    async fn test_generate_unique_retries_on_collision() {
        let generator = CodeGenerator::new(5);
        let registry = CollidingRegistry {
            collisions: 3,
            calls: AtomicU32::new(0),
        };

        let result = generator
            .generate_unique(date(), &IssuerId::new("B12345678"), &registry)
            .await;

        assert!(result.is_ok());
        assert_eq!(registry.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_generate_unique_exhausts() {
        let generator = CodeGenerator::new(3);
        let registry = CollidingRegistry {
            collisions: u32::MAX,
            calls: AtomicU32::new(0),
        };

        let result = generator
            .generate_unique(date(), &IssuerId::new("B12345678"), &registry)
            .await;

        assert_eq!(result, Err(CodeError::Exhausted { attempts: 3 }));
        assert_eq!(registry.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_registry_failure_propagates() {
        let generator = CodeGenerator::default();
        let result = generator
            .generate_unique(date(), &IssuerId::new("B12345678"), &BrokenRegistry)
            .await;
        assert!(matches!(result, Err(CodeError::Registry { .. })));
    }
}
