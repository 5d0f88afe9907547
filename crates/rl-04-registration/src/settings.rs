//! Ledger settings loaded from TOML.
//!
//! # File Format
//!
//! ```toml
//! [pipeline]
//! timeout_ms = 30000
//! code_max_attempts = 5
//!
//! [qr]
//! min_size = 200
//! quiet_zone = true
//!
//! [registrar]
//! simulated_latency_ms = 0
//!
//! [issuer]
//! issuer_id = "B12345678"
//! issuer_name = "Acme Servicios SL"
//! environment = "sandbox"
//! enabled = false
//! software_id = "RL-LEDGER-001"
//! software_version = "1.0.0"
//! ```
//!
//! Every section and key is optional.

use crate::error::SettingsError;
use rl_02_verification_code::QrEncoderConfig;
use serde::Deserialize;
use shared_types::{Environment, IssuerConfig, IssuerConfigUpdate};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PIPELINE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CODE_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    pipeline: PipelineSection,
    #[serde(default)]
    qr: QrSection,
    #[serde(default)]
    registrar: RegistrarSection,
    #[serde(default)]
    issuer: IssuerSection,
}

#[derive(Debug, Deserialize, Default)]
struct PipelineSection {
    timeout_ms: Option<u64>,
    code_max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct QrSection {
    min_size: Option<u32>,
    quiet_zone: Option<bool>,
    dark_color: Option<String>,
    light_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RegistrarSection {
    simulated_latency_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct IssuerSection {
    issuer_id: Option<String>,
    issuer_name: Option<String>,
    environment: Option<Environment>,
    enabled: Option<bool>,
    software_id: Option<String>,
    software_version: Option<String>,
}

/// Static configuration of a registration service instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Upper bound on one pipeline run, from `pending` to a terminal status
    pub pipeline_timeout: Duration,
    /// Verification code candidates tried before giving up
    pub code_max_attempts: u32,
    pub qr: QrEncoderConfig,
    /// Latency of the simulated registrar
    pub registrar_latency: Duration,
    /// Issuer configuration the Config Store starts with
    pub issuer: IssuerConfig,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            pipeline_timeout: DEFAULT_PIPELINE_TIMEOUT,
            code_max_attempts: DEFAULT_CODE_MAX_ATTEMPTS,
            qr: QrEncoderConfig::default(),
            registrar_latency: Duration::ZERO,
            issuer: IssuerConfig::default(),
        }
    }
}

impl LedgerSettings {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| SettingsError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse settings from a TOML string.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile =
            toml::from_str(content).map_err(|e| SettingsError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let timeout_ms = file
            .pipeline
            .timeout_ms
            .unwrap_or(defaults.pipeline_timeout.as_millis() as u64);
        if timeout_ms == 0 {
            return Err(SettingsError::Invalid {
                field: "pipeline.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        let code_max_attempts = file
            .pipeline
            .code_max_attempts
            .unwrap_or(defaults.code_max_attempts);
        if code_max_attempts == 0 {
            return Err(SettingsError::Invalid {
                field: "pipeline.code_max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        let qr = QrEncoderConfig {
            min_size: file.qr.min_size.unwrap_or(defaults.qr.min_size),
            quiet_zone: file.qr.quiet_zone.unwrap_or(defaults.qr.quiet_zone),
            dark_color: file.qr.dark_color.unwrap_or(defaults.qr.dark_color),
            light_color: file.qr.light_color.unwrap_or(defaults.qr.light_color),
        };
        if qr.min_size == 0 {
            return Err(SettingsError::Invalid {
                field: "qr.min_size",
                reason: "must be greater than zero".to_string(),
            });
        }

        let issuer = IssuerConfigUpdate {
            issuer_id: file.issuer.issuer_id,
            issuer_name: file.issuer.issuer_name,
            environment: file.issuer.environment,
            enabled: file.issuer.enabled,
            software_id: file.issuer.software_id,
            software_version: file.issuer.software_version,
        }
        .apply(&defaults.issuer);

        Ok(Self {
            pipeline_timeout: Duration::from_millis(timeout_ms),
            code_max_attempts,
            qr,
            registrar_latency: Duration::from_millis(
                file.registrar.simulated_latency_ms.unwrap_or(0),
            ),
            issuer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(LedgerSettings::parse("").unwrap(), LedgerSettings::default());
    }

    #[test]
    fn test_full_file() {
        let settings = LedgerSettings::parse(
            r#"
            [pipeline]
            timeout_ms = 1500
            code_max_attempts = 3

            [qr]
            min_size = 320

            [registrar]
            simulated_latency_ms = 500

            [issuer]
            issuer_id = "B12345678"
            issuer_name = "Acme Servicios SL"
            environment = "production"
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.pipeline_timeout, Duration::from_millis(1500));
        assert_eq!(settings.code_max_attempts, 3);
        assert_eq!(settings.qr.min_size, 320);
        assert!(settings.qr.quiet_zone);
        assert_eq!(settings.registrar_latency, Duration::from_millis(500));
        assert_eq!(settings.issuer.environment, Environment::Production);
        assert!(settings.issuer.ensure_registrable().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = LedgerSettings::parse("[pipeline]\ntimeout_ms = 0\n");
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                field: "pipeline.timeout_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(matches!(
            LedgerSettings::parse("[telemetry]\nlevel = 1\n"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            LedgerSettings::load("/nonexistent/ledger.toml"),
            Err(SettingsError::Io { .. })
        ));
    }
}
