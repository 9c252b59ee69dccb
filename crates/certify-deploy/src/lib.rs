//! # certify-deploy — Deployment Wiring
//!
//! Assembles a running Certify deployment from configuration:
//!
//! - **Config** (`config.rs`): the YAML [`DeploymentConfig`] naming the
//!   identities of the registry, the ledger and their administrators.
//!
//! - **Bootstrap** (`bootstrap.rs`): tracing initialisation and
//!   [`deploy`], which constructs, initializes and links both managers.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Load** the configuration and validate every identity.
//! 2. **Initialise tracing** from the `logging` section.
//! 3. **Deploy the registry** and initialize it with owner and protocol.
//! 4. **Deploy the ledger** with a clone factory and Ed25519 verifier,
//!    initialized against the registry.
//! 5. **Grant `CERTIFY_ISSUER`** to the ledger so it may spend credits.
//! 6. **Log** a startup banner.

pub mod bootstrap;
pub mod config;

pub use bootstrap::{deploy, deploy_from_path, init_tracing, BootstrapError, Deployment};
pub use config::{ConfigError, DeploymentConfig, LoggingConfig, RegistryConfig, SealConfig};
