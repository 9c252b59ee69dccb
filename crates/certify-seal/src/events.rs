//! Events recorded by the issuance ledger.

use serde::{Deserialize, Serialize};

use certify_core::{Address, AttestationId, CourseId, ProfileId, TokenId};
use certify_state::Asset;

/// A ledger state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SealEvent {
    RegistryUpdated {
        registry: Address,
    },
    StrategyUpdated {
        strategy: Address,
    },
    CourseCreated {
        course_id: CourseId,
        profile_id: ProfileId,
        attestation_id: AttestationId,
        instance: Address,
        credits: u64,
    },
    CredentialsIssued {
        course_id: CourseId,
        recipients: Vec<Address>,
        token_ids: Vec<TokenId>,
    },
    CredentialMinted {
        course_id: CourseId,
        holder: Address,
        token_id: TokenId,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    FundsRecovered {
        /// `None` for the ledger's own holdings.
        course_id: Option<CourseId>,
        asset: Asset,
        recipient: Address,
        amount: u128,
    },
}
