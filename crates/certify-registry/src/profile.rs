//! # Profile Record
//!
//! A profile is an organization identity: an owner, a set of members (held
//! in the role store), a mutable name with a companion anchor derived from
//! it, and a consumable credit balance.
//!
//! ## Creation Authorization
//!
//! Creating a profile for an owner consumes that owner's [`Authorization`].
//! The level decides what the creation may include:
//!
//! ```text
//! None ──(admin createProfile)──▶ Implicit ──▶ profile without members
//!   │
//!   └──(authorizeProfileCreation(true))──▶ Explicit ──▶ profile with or without members
//! ```
//!
//! Either level resets to `None` once a profile is created for the owner.

use serde::{Deserialize, Serialize};

use certify_core::{Address, AttestationId, ProfileId};

/// An organization profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// `hash(nonce, owner-at-creation)`.
    pub id: ProfileId,
    /// Uniqueness salt chosen by the creator.
    pub nonce: u64,
    /// Attestation the profile was created from.
    pub attestation_id: AttestationId,
    /// Display name. Renaming regenerates the anchor.
    pub name: String,
    /// Current owner.
    pub owner: Address,
    /// Companion identity derived from `(id, name)`.
    pub anchor: Address,
    /// Credits available for credential issuance.
    pub credits: u64,
}

/// Creation-authorization level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Authorization {
    /// No pending authorization.
    #[default]
    None,
    /// Set by an administrator creating a profile on the owner's behalf.
    /// Does not allow adding members at creation.
    Implicit,
    /// Granted through `authorize_profile_creation`.
    Explicit,
}

impl Authorization {
    /// Whether a profile may be created at all.
    pub fn permits_creation(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether members may be added at creation.
    pub fn permits_members(&self) -> bool {
        matches!(self, Self::Explicit)
    }

    /// The level after an administrator implicitly authorizes the account.
    /// An explicit grant is never downgraded.
    pub fn with_implicit(self) -> Self {
        match self {
            Self::None => Self::Implicit,
            other => other,
        }
    }
}

impl std::fmt::Display for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Implicit => "IMPLICIT",
            Self::Explicit => "EXPLICIT",
        };
        f.write_str(s)
    }
}

/// Payload of a profile-creation attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttestation {
    /// Uniqueness salt.
    pub nonce: u64,
    /// Initial profile name.
    pub name: String,
    /// Initial members.
    #[serde(default)]
    pub members: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_levels() {
        assert!(!Authorization::None.permits_creation());
        assert!(Authorization::Implicit.permits_creation());
        assert!(!Authorization::Implicit.permits_members());
        assert!(Authorization::Explicit.permits_members());
    }

    #[test]
    fn test_implicit_never_downgrades() {
        assert_eq!(Authorization::None.with_implicit(), Authorization::Implicit);
        assert_eq!(Authorization::Explicit.with_implicit(), Authorization::Explicit);
    }

    #[test]
    fn test_attestation_members_default_empty() {
        let payload: ProfileAttestation =
            serde_json::from_str(r#"{"nonce": 4, "name": "Acme"}"#).unwrap();
        assert!(payload.members.is_empty());
    }
}
