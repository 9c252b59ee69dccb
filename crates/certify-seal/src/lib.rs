//! # certify-seal — Issuance Ledger
//!
//! Turns issuance attestations into courses and credentials:
//!
//! - **Course** (`course.rs`): the course record, the [`CourseInstance`]
//!   contract every course object honours, and [`CourseToken`], the
//!   in-memory credential token minted per course.
//!
//! - **Factory** (`factory.rs`): the [`InstanceFactory`] seam and the
//!   stateless [`CloneFactory`], which places clones of a shared
//!   implementation at addresses derived from `(creator, nonce)`.
//!
//! - **Seal** (`seal.rs`): the ledger itself. Attestation-driven batch
//!   issuance metered by profile credits, self-signed single mints, and
//!   owner-gated administration.
//!
//! ## Security Invariant
//!
//! A batch either mints every credential and debits the profile's credits,
//! or does neither. A course instance is recorded only after it reports
//! back the course id it was assigned and the ledger as its owner.
//!
//! ## Crate Policy
//!
//! - Profile facts come only through
//!   [`ProfileAuthority`](certify_registry::ProfileAuthority); the ledger
//!   never holds a copy of a credit balance.
//! - Signature checks go through
//!   [`SignatureVerifier`](certify_crypto::SignatureVerifier).

pub mod course;
pub mod events;
pub mod factory;
pub mod seal;

pub use course::{Course, CourseInstance, CourseToken, Credential, COURSE_CODE_LABEL};
pub use events::SealEvent;
pub use factory::{CloneFactory, InstanceFactory};
pub use seal::{IssuanceAttestation, Seal};
