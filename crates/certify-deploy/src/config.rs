//! # Deployment Configuration
//!
//! ```yaml
//! registry:
//!   address: "0x…"
//!   owner: "0x…"
//!   attestation_protocol: "0x…"
//! seal:
//!   address: "0x…"
//!   owner: "0x…"
//!   factory: "0x…"
//!   strategy: "0x…"      # optional
//! logging:
//!   filter: "info"
//!   json: false
//! ```
//!
//! Identities are 32-byte hex strings. Validation collects every problem
//! before failing so one run reports all of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use certify_core::Address;
use certify_crypto::code_fingerprint;
use certify_seal::COURSE_CODE_LABEL;

/// Errors loading or validating a deployment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("configuration not found: {path}")]
    NotFound { path: String },

    /// The configuration failed to parse or validate.
    #[error("invalid configuration: {errors:?}")]
    Invalid { errors: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Full deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub registry: RegistryConfig,
    pub seal: SealConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Profile registry identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identity of the registry itself.
    pub address: Address,
    /// Receives `CERTIFY_OWNER`.
    pub owner: Address,
    /// The only sender trusted to deliver attestations.
    pub attestation_protocol: Address,
}

/// Issuance ledger identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealConfig {
    pub address: Address,
    /// Single owner of the ledger.
    pub owner: Address,
    /// Identity of the clone factory.
    pub factory: Address,
    /// Course implementation to clone. Defaults to the in-memory course token.
    #[serde(default)]
    pub strategy: Option<Address>,
}

/// Tracing output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl DeploymentConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Invalid {
            errors: vec![format!("YAML parse error: {e}")],
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check every identity and the log filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let identities = [
            ("registry.address", self.registry.address),
            ("registry.owner", self.registry.owner),
            ("registry.attestation_protocol", self.registry.attestation_protocol),
            ("seal.address", self.seal.address),
            ("seal.owner", self.seal.owner),
            ("seal.factory", self.seal.factory),
        ];
        for (field, address) in identities {
            if address.is_zero() {
                errors.push(format!("{field} must not be the null identity"));
            }
        }
        if self.seal.strategy.is_some_and(|s| s.is_zero()) {
            errors.push("seal.strategy must not be the null identity".to_string());
        }
        if !self.registry.address.is_zero() && self.registry.address == self.seal.address {
            errors.push("registry.address and seal.address must differ".to_string());
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.filter) {
            errors.push(format!("logging.filter: {e}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { errors })
        }
    }

    /// The course implementation the ledger clones from.
    pub fn strategy(&self) -> Result<Address, ConfigError> {
        match self.seal.strategy {
            Some(strategy) => Ok(strategy),
            None => code_fingerprint(COURSE_CODE_LABEL)
                .map(|digest| Address(digest.0))
                .map_err(|e| ConfigError::Invalid {
                    errors: vec![format!("default strategy: {e}")],
                }),
        }
    }
}
