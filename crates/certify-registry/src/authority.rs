//! # Profile Authority
//!
//! The issuance ledger never owns profile state. It reads profile facts and
//! spends credits through this trait, which [`Registry`](crate::Registry)
//! implements. Credit spending is a write on the registry's own store, gated
//! by the `CERTIFY_ISSUER` role, so a debit persists where the balance lives.

use certify_core::{Address, CertifyError, ProfileId};

use crate::profile::Profile;

/// What the issuance ledger needs from the profile registry.
pub trait ProfileAuthority: Send + Sync {
    /// Identity of the registry.
    fn address(&self) -> Address;

    /// The trusted attestation protocol identity.
    fn attestation_protocol(&self) -> Address;

    /// A snapshot of a profile.
    fn profile(&self, profile_id: &ProfileId) -> Option<Profile>;

    /// Whether `account` is the owner of, or a member of, the profile.
    fn is_owner_or_member(&self, profile_id: &ProfileId, account: &Address) -> bool;

    /// Spend `amount` credits of a profile on behalf of `caller`.
    ///
    /// Returns the remaining balance.
    fn debit_credits(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        amount: u64,
    ) -> Result<u64, CertifyError>;
}
