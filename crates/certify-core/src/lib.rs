//! # certify-core — Foundational Types for Certify
//!
//! This crate is the leaf of the Certify workspace. It defines the identity
//! newtypes, hashing pipeline, error hierarchy and attestation contract that
//! the profile registry and the issuance ledger share.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identities.** `Address`, `ProfileId`, `CourseId`,
//!    `AttestationId` and `TokenId` are distinct types. A course id cannot be
//!    passed where an attestation id is expected.
//!
//! 2. **`CanonicalBytes` newtype.** Every hash preimage (profile ids, anchor
//!    salts, deployment addresses) flows through `CanonicalBytes::new()`, so two
//!    callers hashing the same logical value always agree on the bytes.
//!
//! 3. **`sha256_digest()` accepts only `&CanonicalBytes`.** Raw byte slices
//!    cannot be hashed into an identity by accident.
//!
//! 4. **One error enum.** `CertifyError` names every rejection condition the
//!    managers can raise. Errors are surfaced verbatim, never retried.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `certify-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod attestation;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod hex;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use attestation::{decode_extra_data, encode_extra_data, AttestationHook};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CertifyError, CryptoError};
pub use identity::{Address, AttestationId, CourseId, ProfileId, TokenId};
pub use temporal::Timestamp;
