//! # Companion Anchors
//!
//! Every profile has a companion identity, its *anchor*, derived from the
//! profile id and current name:
//!
//! ```text
//! salt   = hash(profile_id, name)
//! anchor = deployment_address(deployer, salt, code_fingerprint(ANCHOR_CODE_LABEL))
//! ```
//!
//! Deriving an anchor is create-or-discover. The deriver first looks up the
//! target address in its table of deployed companions:
//!
//! - **vacant**: a companion constructed with `(profile_id, deployer)` is
//!   placed there;
//! - **occupied by the same profile**: the existing companion is reused and
//!   nothing is deployed;
//! - **occupied by another profile**: a hash collision or a forged occupant,
//!   rejected with [`CertifyError::AnchorError`].
//!
//! Resolution ([`AnchorDeriver::resolve`]) is side-effect free and installation
//! ([`AnchorDeriver::install`]) cannot fail, so a caller can validate every
//! other precondition between the two.

use serde::{Deserialize, Serialize};

use certify_core::{Address, CertifyError, ContentDigest, ProfileId};
use certify_crypto::{anchor_salt, code_fingerprint, deployment_address};
use certify_state::Table;

/// Label of the anchor implementation, hashed into every anchor address.
pub const ANCHOR_CODE_LABEL: &str = "certify.profile-anchor";

/// A deployed companion object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionAnchor {
    /// Where the companion lives.
    pub address: Address,
    /// The profile it was constructed for.
    pub profile_id: ProfileId,
    /// Who deployed it.
    pub deployer: Address,
}

/// Outcome of resolving an anchor, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPlan {
    /// The deterministic anchor address.
    pub address: Address,
    /// The profile the anchor belongs to.
    pub profile_id: ProfileId,
    /// `true` if nothing occupies the address yet.
    pub fresh: bool,
}

/// Derives and deploys companion anchors for one deployer.
#[derive(Debug, Clone)]
pub struct AnchorDeriver {
    deployer: Address,
    code: ContentDigest,
    deployed: Table<Address, CompanionAnchor>,
}

impl AnchorDeriver {
    /// Create a deriver deploying on behalf of `deployer`.
    pub fn new(deployer: Address) -> Result<Self, CertifyError> {
        Ok(Self {
            deployer,
            code: code_fingerprint(ANCHOR_CODE_LABEL)?,
            deployed: Table::new(),
        })
    }

    /// The address an anchor for `(profile_id, name)` lives at.
    pub fn target(&self, profile_id: &ProfileId, name: &str) -> Result<Address, CertifyError> {
        let salt = anchor_salt(profile_id, name)?;
        Ok(deployment_address(&self.deployer, &salt, &self.code)?)
    }

    /// Decide how `(profile_id, name)` maps onto an anchor without deploying.
    pub fn resolve(&self, profile_id: &ProfileId, name: &str) -> Result<AnchorPlan, CertifyError> {
        let address = self.target(profile_id, name)?;
        match self.deployed.get(&address) {
            None => Ok(AnchorPlan {
                address,
                profile_id: *profile_id,
                fresh: true,
            }),
            Some(occupant) if occupant.profile_id == *profile_id => Ok(AnchorPlan {
                address,
                profile_id: *profile_id,
                fresh: false,
            }),
            Some(_) => Err(CertifyError::AnchorError {
                anchor: address,
                profile_id: *profile_id,
            }),
        }
    }

    /// Apply a plan from [`resolve`](Self::resolve), deploying if the address is vacant.
    pub fn install(&mut self, plan: &AnchorPlan) -> Address {
        if plan.fresh {
            self.deployed.insert(
                plan.address,
                CompanionAnchor {
                    address: plan.address,
                    profile_id: plan.profile_id,
                    deployer: self.deployer,
                },
            );
            tracing::debug!(anchor = %plan.address, profile_id = %plan.profile_id, "anchor deployed");
        } else {
            tracing::debug!(anchor = %plan.address, profile_id = %plan.profile_id, "anchor reused");
        }
        plan.address
    }

    /// Resolve and install in one step.
    pub fn derive(&mut self, profile_id: &ProfileId, name: &str) -> Result<Address, CertifyError> {
        let plan = self.resolve(profile_id, name)?;
        Ok(self.install(&plan))
    }

    /// The companion deployed at `address`, if any.
    pub fn companion(&self, address: &Address) -> Option<&CompanionAnchor> {
        self.deployed.get(address)
    }

    /// Number of companions deployed so far.
    pub fn deployed_count(&self) -> usize {
        self.deployed.len()
    }
}
