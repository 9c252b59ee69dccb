//! # Error Types
//!
//! `CertifyError` names every condition under which the registry or the
//! issuance ledger rejects an operation. A rejected operation leaves no state
//! change behind; the error is returned to the caller unchanged.
//!
//! Supporting enums cover canonical serialization and key/signature parsing.

use thiserror::Error;

use crate::identity::{Address, ProfileId};

/// Top-level error type for Certify.
#[derive(Error, Debug)]
pub enum CertifyError {
    /// A null identity was supplied where one is forbidden.
    #[error("null identity supplied where a real identity is required")]
    ZeroAddress,

    /// The caller lacks the required role, ownership, or membership.
    #[error("account {account} is not authorized for this operation")]
    Unauthorized {
        /// The identity that was refused.
        account: Address,
    },

    /// Ownership acceptance attempted by an identity that was not proposed.
    #[error("account {account} is not the pending owner")]
    NotPendingOwner {
        /// The identity that attempted to accept.
        account: Address,
    },

    /// A profile already occupies the id derived from `(nonce, owner)`.
    #[error("profile id {profile_id} is already taken")]
    NonceUnavailable {
        /// The colliding profile id.
        profile_id: ProfileId,
    },

    /// The deterministic anchor address is occupied by an object that does
    /// not report the expected profile.
    #[error("anchor {anchor} is not bound to profile {profile_id}")]
    AnchorError {
        /// The derived anchor address.
        anchor: Address,
        /// The profile the anchor was derived for.
        profile_id: ProfileId,
    },

    /// An attestation callback arrived from an untrusted sender.
    #[error("sender {sender} is not the configured attestation protocol")]
    NotAttestationProvider {
        /// The identity that invoked the callback.
        sender: Address,
    },

    /// A debit would drive a profile's credit balance negative.
    #[error("profile {profile_id} holds {available} credits, {required} required")]
    InsufficientCredits {
        /// The profile being debited.
        profile_id: ProfileId,
        /// Credits currently available.
        available: u64,
        /// Credits the operation needs.
        required: u64,
    },

    /// A batch that must contain at least one entry was empty.
    #[error("empty batch")]
    EmptyArray,

    /// Inconsistent batch input, or an instantiated object failed its
    /// binding check.
    #[error("mismatch: {0}")]
    Mismatch(String),

    /// `initialize` was called on an already-initialized component.
    #[error("component is already initialized")]
    AlreadyInitialized,

    /// The component has not been initialized yet.
    #[error("component is not initialized")]
    NotInitialized,

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An attestation payload could not be decoded.
    #[error("malformed attestation payload: {0}")]
    MalformedPayload(String),

    /// A fund transfer was refused by the asset holder.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// Canonical serialization of a hash preimage failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Key or signature material was malformed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in hash preimages.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in key, digest or signature handling.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Hex input could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Key material could not be parsed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}
