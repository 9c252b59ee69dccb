//! # certify-crypto — Cryptographic Primitives
//!
//! - **Ed25519** account keys. An account's [`Address`](certify_core::Address)
//!   is its verifying key, so a signature is checked against the identity
//!   that presents it, with no separate key registry.
//! - **Signature verification** behind the [`SignatureVerifier`] capability,
//!   consumed by the issuance ledger for self-signed credential claims.
//! - **Deterministic derivation** of profile ids, anchor salts,
//!   content-addressed deployment addresses and clone-instance addresses.
//!
//! ## Crate Policy
//!
//! - Depends only on `certify-core` internally.
//! - Tests use real SHA-256 and real Ed25519.

pub mod derive;
pub mod ed25519;
pub mod verifier;

pub use derive::{
    anchor_salt, code_fingerprint, deployment_address, instance_address, profile_id,
};
pub use ed25519::{verify_digest, Ed25519KeyPair, Ed25519Signature};
pub use verifier::{Ed25519Verifier, SignatureVerifier};
