//! # Issuer Configuration
//!
//! Fiscal identity of the issuer plus the target environment. The Config
//! Store hands out immutable snapshots of this value; a registration in
//! flight keeps the snapshot it started with.

use crate::entities::IssuerId;
use crate::errors::IssuerConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default software identifier reported to the registrar.
pub const DEFAULT_SOFTWARE_ID: &str = "RL-LEDGER-001";

/// Target environment of the tax authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issuer identity and registration switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
    pub issuer_id: IssuerId,
    pub issuer_name: String,
    pub environment: Environment,
    pub enabled: bool,
    pub software_id: String,
    pub software_version: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            issuer_id: IssuerId::default(),
            issuer_name: String::new(),
            environment: Environment::Sandbox,
            enabled: false,
            software_id: DEFAULT_SOFTWARE_ID.to_string(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl IssuerConfig {
    /// Disabled sandbox configuration for the given issuer.
    pub fn new(issuer_id: impl Into<String>, issuer_name: impl Into<String>) -> Self {
        Self {
            issuer_id: IssuerId::new(issuer_id),
            issuer_name: issuer_name.into(),
            ..Self::default()
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_software(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.software_id = id.into();
        self.software_version = version.into();
        self
    }

    /// Tax identifier and legal name are both present.
    pub fn is_complete(&self) -> bool {
        !self.issuer_id.is_blank() && !self.issuer_name.trim().is_empty()
    }

    /// Guard used before any digest, code or registration work.
    ///
    /// The enabled flag is checked first so a disabled issuer always reports
    /// `Disabled`, whatever else is missing.
    pub fn ensure_registrable(&self) -> Result<(), IssuerConfigError> {
        if !self.enabled {
            return Err(IssuerConfigError::Disabled);
        }
        if !self.is_complete() {
            return Err(IssuerConfigError::Incomplete);
        }
        Ok(())
    }
}

/// Partial update of an [`IssuerConfig`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfigUpdate {
    pub issuer_id: Option<String>,
    pub issuer_name: Option<String>,
    pub environment: Option<Environment>,
    pub enabled: Option<bool>,
    pub software_id: Option<String>,
    pub software_version: Option<String>,
}

impl IssuerConfigUpdate {
    /// Produce the next snapshot; `current` is left untouched.
    pub fn apply(&self, current: &IssuerConfig) -> IssuerConfig {
        let mut next = current.clone();
        if let Some(id) = &self.issuer_id {
            next.issuer_id = IssuerId::new(id.clone());
        }
        if let Some(name) = &self.issuer_name {
            next.issuer_name = name.clone();
        }
        if let Some(environment) = self.environment {
            next.environment = environment;
        }
        if let Some(enabled) = self.enabled {
            next.enabled = enabled;
        }
        if let Some(software_id) = &self.software_id {
            next.software_id = software_id.clone();
        }
        if let Some(version) = &self.software_version {
            next.software_version = version.clone();
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
