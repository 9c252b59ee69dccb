//! # Bootstrap
//!
//! Builds a [`Deployment`] from a validated [`DeploymentConfig`]. Both
//! managers share one in-memory treasury; the ledger is granted
//! `CERTIFY_ISSUER` on the registry so its credit debits are accepted.

use std::path::Path;
use std::sync::Arc;

use certify_core::CertifyError;
use certify_crypto::Ed25519Verifier;
use certify_registry::Registry;
use certify_seal::{CloneFactory, Seal};
use certify_state::{InMemoryTreasury, RoleId, RoleTable};

use crate::config::{ConfigError, DeploymentConfig, LoggingConfig};

/// Errors during deployment bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A component rejected its construction or initialization.
    #[error("component setup failed: {0}")]
    Component(#[from] CertifyError),
}

/// A running registry and ledger pair.
pub struct Deployment {
    pub treasury: Arc<InMemoryTreasury>,
    pub registry: Arc<Registry>,
    pub factory: Arc<CloneFactory>,
    pub seal: Arc<Seal>,
}

impl std::fmt::Debug for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployment")
            .field("registry", &self.registry.address())
            .field("seal", &self.seal.address())
            .field("strategy", &self.seal.strategy())
            .finish()
    }
}

/// Install the global tracing subscriber described by `logging`.
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is kept.
pub fn init_tracing(logging: &LoggingConfig) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_new(&logging.filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

/// Construct, initialize and link a registry and a ledger.
pub fn deploy(config: &DeploymentConfig) -> Result<Deployment, BootstrapError> {
    config.validate()?;
    let strategy = config.strategy()?;
    let treasury = Arc::new(InMemoryTreasury::new());

    let registry = Arc::new(Registry::new(
        config.registry.address,
        Box::new(RoleTable::new()),
        treasury.clone(),
    )?);
    registry.initialize(config.registry.owner, config.registry.attestation_protocol)?;

    let factory = Arc::new(CloneFactory::new(config.seal.factory, treasury.clone()));
    let seal = Arc::new(Seal::new(
        config.seal.address,
        factory.clone(),
        Arc::new(Ed25519Verifier),
        treasury.clone(),
        strategy,
    )?);
    seal.initialize(config.seal.owner, registry.clone())?;

    registry.grant_role(config.registry.owner, RoleId::CertifyIssuer, config.seal.address)?;

    let deployment = Deployment {
        treasury,
        registry,
        factory,
        seal,
    };
    log_banner(config, &deployment);
    Ok(deployment)
}

/// Load the configuration at `path`, initialise tracing from it, and deploy.
pub fn deploy_from_path(path: &Path) -> Result<Deployment, BootstrapError> {
    let config = DeploymentConfig::load(path)?;
    init_tracing(&config.logging);
    deploy(&config)
}

fn log_banner(config: &DeploymentConfig, deployment: &Deployment) {
    tracing::info!("========================================");
    tracing::info!("  Certify deployment ready");
    tracing::info!("========================================");
    tracing::info!(
        registry = %deployment.registry.address(),
        owner = %config.registry.owner,
        attestation_protocol = %config.registry.attestation_protocol,
        "registry"
    );
    tracing::info!(
        seal = %deployment.seal.address(),
        owner = %config.seal.owner,
        factory = %config.seal.factory,
        strategy = %deployment.seal.strategy(),
        "seal"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use certify_core::Address;
    use certify_seal::InstanceFactory;
    use std::io::Write;

    use crate::config::{RegistryConfig, SealConfig};

    fn config() -> DeploymentConfig {
        DeploymentConfig {
            registry: RegistryConfig {
                address: Address([0x11; 32]),
                owner: Address([0x22; 32]),
                attestation_protocol: Address([0x33; 32]),
            },
            seal: SealConfig {
                address: Address([0x44; 32]),
                owner: Address([0x55; 32]),
                factory: Address([0x66; 32]),
                strategy: None,
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_deploy_links_components() {
        let d = deploy(&config()).unwrap();
        assert!(d.registry.is_initialized());
        assert!(d.seal.is_initialized());
        assert_eq!(d.seal.registry(), Some(Address([0x11; 32])));
        assert_eq!(d.seal.owner(), Address([0x55; 32]));
        assert_eq!(d.factory.address(), Address([0x66; 32]));
        assert_eq!(d.registry.attestation_protocol(), Address([0x33; 32]));
        assert!(d
            .registry
            .has_role(&RoleId::CertifyIssuer, &Address([0x44; 32])));
        assert_eq!(d.seal.strategy(), config().strategy().unwrap());
    }

    #[test]
    fn test_deploy_rejects_invalid_config() {
        let mut bad = config();
        bad.seal.owner = Address::ZERO;
        assert!(matches!(
            deploy(&bad),
            Err(BootstrapError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(&LoggingConfig::default());
        assert!(!init_tracing(&LoggingConfig::default()));
    }

    #[test]
    fn test_deploy_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = format!(
            "registry:\n  address: \"{}\"\n  owner: \"{}\"\n  attestation_protocol: \"{}\"\n\
             seal:\n  address: \"{}\"\n  owner: \"{}\"\n  factory: \"{}\"\n\
             logging:\n  filter: \"warn\"\n",
            "11".repeat(32),
            "22".repeat(32),
            "33".repeat(32),
            "44".repeat(32),
            "55".repeat(32),
            "66".repeat(32),
        );
        file.write_all(yaml.as_bytes()).unwrap();
        let d = deploy_from_path(file.path()).unwrap();
        assert_eq!(d.registry.address(), Address([0x11; 32]));
        assert!(matches!(
            deploy_from_path(Path::new("/nonexistent/certify.yaml")),
            Err(BootstrapError::Config(ConfigError::NotFound { .. }))
        ));
    }
}
