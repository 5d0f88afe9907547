//! Verification URL

use super::code::VerificationCode;
use crate::error::{CodeError, CodeResult};
use serde::{Deserialize, Serialize};
use shared_types::Environment;
use std::fmt;

/// Sandbox verification endpoint
pub const SANDBOX_BASE_URL: &str = "https://prewww2.aeat.es/wlpl/TIKE-CONT/ValidarQR";

/// Production verification endpoint
pub const PRODUCTION_BASE_URL: &str =
    "https://www2.agenciatributaria.gob.es/wlpl/TIKE-CONT/ValidarQR";

/// Query parameter carrying the verification code
pub const CODE_QUERY_PARAM: &str = "csv";

/// Fully built verification URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationUrl(String);

impl VerificationUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base endpoint for an environment
pub fn base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Sandbox => SANDBOX_BASE_URL,
        Environment::Production => PRODUCTION_BASE_URL,
    }
}

/// Map a code to its verification URL, URL-encoding the code.
pub fn verification_url(
    code: &VerificationCode,
    environment: Environment,
) -> CodeResult<VerificationUrl> {
    let url = ::url::Url::parse_with_params(
        base_url(environment),
        &[(CODE_QUERY_PARAM, code.as_str())],
    )
    .map_err(|e| CodeError::Url {
        reason: e.to_string(),
    })?;

    Ok(VerificationUrl(url.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> VerificationCode {
        VerificationCode::parse("20260115-B12345678-ABCD-1234").unwrap()
    }

    #[test]
    fn test_sandbox_url() {
        let url = verification_url(&code(), Environment::Sandbox).unwrap();
        assert_eq!(
            url.as_str(),
            "https://prewww2.aeat.es/wlpl/TIKE-CONT/ValidarQR?csv=20260115-B12345678-ABCD-1234"
        );
    }

    #[test]
    fn test_production_url() {
        let url = verification_url(&code(), Environment::Production).unwrap();
        assert!(url.as_str().starts_with(PRODUCTION_BASE_URL));
        assert!(url.as_str().ends_with("?csv=20260115-B12345678-ABCD-1234"));
    }

    #[test]
    fn test_environments_differ() {
        let sandbox = verification_url(&code(), Environment::Sandbox).unwrap();
        let production = verification_url(&code(), Environment::Production).unwrap();
        assert_ne!(sandbox, production);
    }
}
