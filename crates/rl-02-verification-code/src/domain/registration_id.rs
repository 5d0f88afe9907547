//! Registration identifier
//!
//! `VF-<ISSUER>-<TIMESTAMP>-<XXXX>` where the timestamp is the generation
//! time in milliseconds rendered in uppercase base 36.

use super::code::{normalize_issuer_id, CodeGenerator, RANDOM_SEGMENT_LEN};
use crate::error::CodeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::IssuerId;
use std::fmt;

const PREFIX: &str = "VF";

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Identifier of one successful registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(String);

impl RegistrationId {
    pub fn generate(
        issuer_id: &IssuerId,
        at: DateTime<Utc>,
        generator: &CodeGenerator,
    ) -> CodeResult<Self> {
        let issuer = normalize_issuer_id(issuer_id)?;
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        Ok(Self(format!(
            "{}-{}-{}-{}",
            PREFIX,
            issuer,
            to_base36(millis),
            generator.random_segment(RANDOM_SEGMENT_LEN)
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
