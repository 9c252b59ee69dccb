//! Events recorded by the registry.

use serde::{Deserialize, Serialize};

use certify_core::{Address, AttestationId, ProfileId};
use certify_state::{Asset, RoleId};

/// A registry state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RegistryEvent {
    ProfileCreated {
        profile_id: ProfileId,
        nonce: u64,
        attestation_id: AttestationId,
        name: String,
        owner: Address,
        anchor: Address,
    },
    ProfileOwnerUpdated {
        profile_id: ProfileId,
        owner: Address,
    },
    ProfilePendingOwnerUpdated {
        profile_id: ProfileId,
        pending_owner: Address,
    },
    ProfileNameUpdated {
        profile_id: ProfileId,
        name: String,
        anchor: Address,
    },
    AccountAuthorized {
        account: Address,
        status: bool,
    },
    AttestationProtocolUpdated {
        attestation_protocol: Address,
    },
    MembersAdded {
        profile_id: ProfileId,
        members: Vec<Address>,
    },
    MembersRemoved {
        profile_id: ProfileId,
        members: Vec<Address>,
    },
    CreditsFunded {
        profile_id: ProfileId,
        amount: u64,
        balance: u64,
    },
    CreditsDebited {
        profile_id: ProfileId,
        amount: u64,
        balance: u64,
    },
    RoleGranted {
        role: RoleId,
        account: Address,
    },
    RoleRevoked {
        role: RoleId,
        account: Address,
    },
    FundsRecovered {
        asset: Asset,
        recipient: Address,
        amount: u128,
    },
}
