//! # Signature Verifier Capability
//!
//! The issuance ledger accepts a credential claim only when the claimant
//! proves possession of their own key: the supplied signature over the
//! supplied digest must verify against the claimant's address. The check is
//! abstracted behind [`SignatureVerifier`] so the ledger does not depend on a
//! particular scheme.

use certify_core::{Address, ContentDigest};

use crate::ed25519::{verify_digest, Ed25519Signature};

/// Verifies that a digest was signed by a claimed identity.
pub trait SignatureVerifier: Send + Sync {
    /// Whether `signature` over `digest` was produced by `signer`.
    fn is_valid_signature(
        &self,
        signer: &Address,
        digest: &ContentDigest,
        signature: &Ed25519Signature,
    ) -> bool;
}

/// Ed25519 verification with the address as verifying key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn is_valid_signature(
        &self,
        signer: &Address,
        digest: &ContentDigest,
        signature: &Ed25519Signature,
    ) -> bool {
        verify_digest(signer, digest, signature).is_ok()
    }
}
