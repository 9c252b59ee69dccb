//! # Role Store
//!
//! A capability store mapping a role to the identities holding it. Two kinds
//! of role share the one store:
//!
//! - **Fixed roles** with a semantic meaning: `CERTIFY_OWNER` (registry
//!   administration) and `CERTIFY_ISSUER` (allowed to debit profile credits).
//! - **Profile roles**, keyed by a profile id. Holding a profile role is what
//!   being a member of that profile means.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use certify_core::{Address, ProfileId};

/// Identifier of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleId {
    /// Registry administrator.
    CertifyOwner,
    /// Component allowed to debit profile credits.
    CertifyIssuer,
    /// Membership of one profile.
    Profile(ProfileId),
}

impl RoleId {
    /// Whether this is one of the fixed semantic roles.
    pub fn is_fixed(&self) -> bool {
        !matches!(self, Self::Profile(_))
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CertifyOwner => f.write_str("CERTIFY_OWNER"),
            Self::CertifyIssuer => f.write_str("CERTIFY_ISSUER"),
            Self::Profile(id) => write!(f, "{id}"),
        }
    }
}

/// Grant / revoke / query role membership.
///
/// Implementations perform no authorization of their own; the caller of
/// `grant_role` / `revoke_role` is responsible for gating access.
pub trait RoleStore: Send + Sync {
    /// Whether `member` holds `role`.
    fn has_role(&self, role: &RoleId, member: &Address) -> bool;

    /// Grant `role` to `member`. Returns `false` if it was already held.
    fn grant_role(&mut self, role: RoleId, member: Address) -> bool;

    /// Revoke `role` from `member`. Returns `false` if it was not held.
    fn revoke_role(&mut self, role: &RoleId, member: &Address) -> bool;

    /// All holders of `role`, in address order.
    fn members(&self, role: &RoleId) -> Vec<Address>;
}

/// In-memory role store.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    grants: HashMap<RoleId, BTreeSet<Address>>,
}

impl RoleTable {
    /// Create an empty role table.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleStore for RoleTable {
    fn has_role(&self, role: &RoleId, member: &Address) -> bool {
        self.grants
            .get(role)
            .map(|holders| holders.contains(member))
            .unwrap_or(false)
    }

    fn grant_role(&mut self, role: RoleId, member: Address) -> bool {
        self.grants.entry(role).or_default().insert(member)
    }

    fn revoke_role(&mut self, role: &RoleId, member: &Address) -> bool {
        let Some(holders) = self.grants.get_mut(role) else {
            return false;
        };
        let removed = holders.remove(member);
        if holders.is_empty() {
            self.grants.remove(role);
        }
        removed
    }

    fn members(&self, role: &RoleId) -> Vec<Address> {
        self.grants
            .get(role)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 32])
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut roles = RoleTable::new();
        assert!(roles.grant_role(RoleId::CertifyOwner, addr(1)));
        assert!(!roles.grant_role(RoleId::CertifyOwner, addr(1)));
        assert!(roles.has_role(&RoleId::CertifyOwner, &addr(1)));
        assert!(roles.revoke_role(&RoleId::CertifyOwner, &addr(1)));
        assert!(!roles.revoke_role(&RoleId::CertifyOwner, &addr(1)));
        assert!(!roles.has_role(&RoleId::CertifyOwner, &addr(1)));
    }

    #[test]
    fn test_profile_roles_are_independent() {
        let mut roles = RoleTable::new();
        let p1 = RoleId::Profile(ProfileId([1; 32]));
        let p2 = RoleId::Profile(ProfileId([2; 32]));
        roles.grant_role(p1, addr(9));
        assert!(roles.has_role(&p1, &addr(9)));
        assert!(!roles.has_role(&p2, &addr(9)));
        assert!(!roles.has_role(&RoleId::CertifyOwner, &addr(9)));
    }

    #[test]
    fn test_members_sorted() {
        let mut roles = RoleTable::new();
        let role = RoleId::Profile(ProfileId([7; 32]));
        roles.grant_role(role, addr(3));
        roles.grant_role(role, addr(1));
        roles.grant_role(role, addr(2));
        assert_eq!(roles.members(&role), vec![addr(1), addr(2), addr(3)]);
        assert!(roles.members(&RoleId::CertifyIssuer).is_empty());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(RoleId::CertifyOwner.to_string(), "CERTIFY_OWNER");
        assert_eq!(RoleId::CertifyIssuer.to_string(), "CERTIFY_ISSUER");
        assert!(RoleId::CertifyIssuer.is_fixed());
        assert!(!RoleId::Profile(ProfileId([0; 32])).is_fixed());
    }
}
