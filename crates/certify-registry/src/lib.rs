//! # certify-registry — Profile Lifecycle Manager
//!
//! Owns profile records: creation (by an administrator or by an attestation
//! callback), renaming, two-phase ownership transfer, membership, and the
//! credit balance the issuance ledger spends.
//!
//! ## Components
//!
//! - **Profile** (`profile.rs`): the record and the creation-authorization
//!   grant levels.
//! - **Anchor** (`anchor.rs`): deterministic companion identities with
//!   create-or-discover semantics.
//! - **Registry** (`registry.rs`): the manager itself, with every table
//!   behind one lock.
//! - **Authority** (`authority.rs`): the narrow `ProfileAuthority` seam the
//!   issuance ledger consumes.
//! - **Events** (`events.rs`): what the registry records.
//!
//! ## Invariants
//!
//! - A profile id is `hash(nonce, owner)`, immutable, and never reused.
//! - The anchor index maps exactly the *current* anchor of each profile.
//! - Credits never go negative.
//! - Membership (a profile role grant) is independent of ownership.

pub mod anchor;
pub mod authority;
pub mod events;
pub mod profile;
pub mod registry;

pub use anchor::{AnchorDeriver, AnchorPlan, CompanionAnchor, ANCHOR_CODE_LABEL};
pub use authority::ProfileAuthority;
pub use events::RegistryEvent;
pub use profile::{Authorization, Profile, ProfileAttestation};
pub use registry::Registry;
