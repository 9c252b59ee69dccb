//! # Registry
//!
//! The profile lifecycle manager. All tables (profiles, anchor index,
//! pending owners, creation authorizations, roles, deployed anchors, events)
//! live in one `RegistryState` behind a single `parking_lot::RwLock`.
//!
//! ## Operation Discipline
//!
//! Every mutating operation takes the write lock once, runs every check that
//! can fail, and only then mutates. A rejected operation therefore leaves the
//! registry exactly as it found it. Checks run in a fixed order so the error
//! reported for a request that violates several rules is deterministic.
//!
//! ## Access Control
//!
//! | Operation | Gate |
//! |---|---|
//! | `create_profile`, `authorize_profile_creation`, `update_attestation_protocol`, `recover_funds`, `fund_credits`, `grant_role`, `revoke_role` | `CERTIFY_OWNER` role |
//! | `did_receive_attestation` | sender is the configured attestation protocol |
//! | `add_members`, `remove_members`, `update_profile_name`, `update_profile_pending_owner` | current profile owner |
//! | `accept_profile_ownership` | recorded pending owner |
//! | `debit_credits` | `CERTIFY_ISSUER` role |

use std::sync::Arc;

use parking_lot::RwLock;

use certify_core::{
    decode_extra_data, Address, AttestationHook, AttestationId, CertifyError, ProfileId,
};
use certify_crypto::profile_id;
use certify_state::{sweep, Asset, EventLog, EventRecord, RoleId, RoleStore, Table, Treasury};

use crate::anchor::{AnchorDeriver, CompanionAnchor};
use crate::authority::ProfileAuthority;
use crate::events::RegistryEvent;
use crate::profile::{Authorization, Profile, ProfileAttestation};

/// The profile lifecycle manager.
pub struct Registry {
    address: Address,
    treasury: Arc<dyn Treasury>,
    state: RwLock<RegistryState>,
}

struct RegistryState {
    initialized: bool,
    attestation_protocol: Address,
    roles: Box<dyn RoleStore>,
    profiles: Table<ProfileId, Profile>,
    anchors: Table<Address, ProfileId>,
    pending_owners: Table<ProfileId, Address>,
    authorizations: Table<Address, Authorization>,
    deriver: AnchorDeriver,
    events: EventLog<RegistryEvent>,
}

/// Arguments of the shared creation routine.
struct NewProfile<'a> {
    attestation_id: AttestationId,
    nonce: u64,
    name: &'a str,
    owner: Address,
    members: &'a [Address],
}

impl RegistryState {
    fn ensure_role(&self, role: RoleId, account: &Address) -> Result<(), CertifyError> {
        if self.roles.has_role(&role, account) {
            Ok(())
        } else {
            tracing::warn!(%account, %role, "role check failed");
            Err(CertifyError::Unauthorized { account: *account })
        }
    }

    fn ensure_owner(&self, profile_id: &ProfileId, caller: &Address) -> Result<&Profile, CertifyError> {
        match self.profiles.get(profile_id) {
            Some(profile) if profile.owner == *caller => Ok(profile),
            _ => {
                tracing::warn!(account = %caller, %profile_id, "owner check failed");
                Err(CertifyError::Unauthorized { account: *caller })
            }
        }
    }

    fn authorization(&self, account: &Address) -> Authorization {
        self.authorizations.get_cloned(account).unwrap_or_default()
    }

    fn is_owner_or_member(&self, profile_id: &ProfileId, account: &Address) -> bool {
        let is_owner = self
            .profiles
            .get(profile_id)
            .map(|p| p.owner == *account)
            .unwrap_or(false);
        is_owner || self.roles.has_role(&RoleId::Profile(*profile_id), account)
    }

    /// The creation routine shared by the administrative and attestation paths.
    fn create_profile(
        &mut self,
        new: NewProfile<'_>,
        authorization: Authorization,
    ) -> Result<ProfileId, CertifyError> {
        if !authorization.permits_creation() {
            tracing::warn!(owner = %new.owner, "profile creation not authorized");
            return Err(CertifyError::Unauthorized { account: new.owner });
        }
        let id = profile_id(new.nonce, &new.owner)?;
        if self.profiles.contains(&id) {
            return Err(CertifyError::NonceUnavailable { profile_id: id });
        }
        if new.owner.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        let plan = self.deriver.resolve(&id, new.name)?;
        if !new.members.is_empty() && !authorization.permits_members() {
            tracing::warn!(owner = %new.owner, "members at creation require explicit authorization");
            return Err(CertifyError::Unauthorized { account: new.owner });
        }
        if new.members.iter().any(Address::is_zero) {
            return Err(CertifyError::ZeroAddress);
        }

        let anchor = self.deriver.install(&plan);
        self.profiles.insert(
            id,
            Profile {
                id,
                nonce: new.nonce,
                attestation_id: new.attestation_id,
                name: new.name.to_string(),
                owner: new.owner,
                anchor,
                credits: 0,
            },
        );
        self.anchors.insert(anchor, id);
        self.authorizations.remove(&new.owner);
        let role = RoleId::Profile(id);
        for member in new.members {
            self.roles.grant_role(role, *member);
        }

        self.events.append(RegistryEvent::ProfileCreated {
            profile_id: id,
            nonce: new.nonce,
            attestation_id: new.attestation_id,
            name: new.name.to_string(),
            owner: new.owner,
            anchor,
        });
        if !new.members.is_empty() {
            self.events.append(RegistryEvent::MembersAdded {
                profile_id: id,
                members: new.members.to_vec(),
            });
        }
        tracing::info!(
            profile_id = %id,
            owner = %new.owner,
            %anchor,
            attestation_id = %new.attestation_id,
            members = new.members.len(),
            "profile created"
        );
        Ok(id)
    }
}

impl Registry {
    /// Create an uninitialized registry living at `address`.
    pub fn new(
        address: Address,
        roles: Box<dyn RoleStore>,
        treasury: Arc<dyn Treasury>,
    ) -> Result<Self, CertifyError> {
        Ok(Self {
            address,
            treasury,
            state: RwLock::new(RegistryState {
                initialized: false,
                attestation_protocol: Address::ZERO,
                roles,
                profiles: Table::new(),
                anchors: Table::new(),
                pending_owners: Table::new(),
                authorizations: Table::new(),
                deriver: AnchorDeriver::new(address)?,
                events: EventLog::new(),
            }),
        })
    }

    /// One-time setup: grant `CERTIFY_OWNER` to `owner` and trust `attestation_protocol`.
    pub fn initialize(&self, owner: Address, attestation_protocol: Address) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        if state.initialized {
            return Err(CertifyError::AlreadyInitialized);
        }
        if owner.is_zero() || attestation_protocol.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.roles.grant_role(RoleId::CertifyOwner, owner);
        state.attestation_protocol = attestation_protocol;
        state.initialized = true;
        state.events.append(RegistryEvent::RoleGranted {
            role: RoleId::CertifyOwner,
            account: owner,
        });
        state
            .events
            .append(RegistryEvent::AttestationProtocolUpdated { attestation_protocol });
        tracing::info!(registry = %self.address, %owner, %attestation_protocol, "registry initialized");
        Ok(())
    }

    /// Create a profile for `owner` as an administrator.
    ///
    /// Implicitly authorizes `owner` for this one creation. Adding members at
    /// creation additionally requires an explicit grant from
    /// [`authorize_profile_creation`](Self::authorize_profile_creation).
    pub fn create_profile(
        &self,
        caller: Address,
        attestation_id: AttestationId,
        nonce: u64,
        name: &str,
        owner: Address,
        members: &[Address],
    ) -> Result<ProfileId, CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        let authorization = state.authorization(&owner).with_implicit();
        state.create_profile(
            NewProfile {
                attestation_id,
                nonce,
                name,
                owner,
                members,
            },
            authorization,
        )
    }

    /// Grant (`status = true`) or withdraw an explicit creation authorization.
    pub fn authorize_profile_creation(
        &self,
        caller: Address,
        account: Address,
        status: bool,
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        if account.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        if status {
            state.authorizations.insert(account, Authorization::Explicit);
        } else {
            state.authorizations.remove(&account);
        }
        state
            .events
            .append(RegistryEvent::AccountAuthorized { account, status });
        tracing::info!(%account, status, "profile creation authorization updated");
        Ok(())
    }

    /// Grant profile membership to each of `members`.
    pub fn add_members(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        members: &[Address],
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(profile_id, &caller)?;
        if members.iter().any(Address::is_zero) {
            return Err(CertifyError::ZeroAddress);
        }
        let role = RoleId::Profile(*profile_id);
        for member in members {
            state.roles.grant_role(role, *member);
        }
        state.events.append(RegistryEvent::MembersAdded {
            profile_id: *profile_id,
            members: members.to_vec(),
        });
        tracing::info!(%profile_id, count = members.len(), "members added");
        Ok(())
    }

    /// Revoke profile membership from each of `members`.
    pub fn remove_members(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        members: &[Address],
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(profile_id, &caller)?;
        let role = RoleId::Profile(*profile_id);
        for member in members {
            state.roles.revoke_role(&role, member);
        }
        state.events.append(RegistryEvent::MembersRemoved {
            profile_id: *profile_id,
            members: members.to_vec(),
        });
        tracing::info!(%profile_id, count = members.len(), "members removed");
        Ok(())
    }

    /// Rename a profile, moving it to the anchor derived from the new name.
    ///
    /// Returns the new anchor. The old anchor no longer resolves to the profile.
    pub fn update_profile_name(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        name: &str,
    ) -> Result<Address, CertifyError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let old_anchor = state.ensure_owner(profile_id, &caller)?.anchor;
        let plan = state.deriver.resolve(profile_id, name)?;

        let anchor = state.deriver.install(&plan);
        state.anchors.remove(&old_anchor);
        state.anchors.insert(anchor, *profile_id);
        if let Some(profile) = state.profiles.get_mut(profile_id) {
            profile.name = name.to_string();
            profile.anchor = anchor;
        }
        state.events.append(RegistryEvent::ProfileNameUpdated {
            profile_id: *profile_id,
            name: name.to_string(),
            anchor,
        });
        tracing::info!(%profile_id, %old_anchor, %anchor, "profile renamed");
        Ok(anchor)
    }

    /// Propose a new owner. The proposal takes effect when that identity accepts.
    ///
    /// A null pending owner is accepted and blocks acceptance until replaced.
    pub fn update_profile_pending_owner(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        pending_owner: Address,
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(profile_id, &caller)?;
        state.pending_owners.insert(*profile_id, pending_owner);
        state.events.append(RegistryEvent::ProfilePendingOwnerUpdated {
            profile_id: *profile_id,
            pending_owner,
        });
        tracing::info!(%profile_id, %pending_owner, "pending owner proposed");
        Ok(())
    }

    /// Complete an ownership transfer as the proposed owner.
    pub fn accept_profile_ownership(
        &self,
        caller: Address,
        profile_id: &ProfileId,
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        match state.pending_owners.get(profile_id) {
            Some(pending) if *pending == caller && !caller.is_zero() => {}
            _ => {
                tracing::warn!(account = %caller, %profile_id, "ownership acceptance refused");
                return Err(CertifyError::NotPendingOwner { account: caller });
            }
        }
        let profile = state
            .profiles
            .get_mut(profile_id)
            .ok_or_else(|| CertifyError::NotFound(profile_id.to_string()))?;
        profile.owner = caller;
        state.pending_owners.remove(profile_id);
        state.events.append(RegistryEvent::ProfileOwnerUpdated {
            profile_id: *profile_id,
            owner: caller,
        });
        tracing::info!(%profile_id, owner = %caller, "profile ownership accepted");
        Ok(())
    }

    /// Replace the trusted attestation protocol identity.
    pub fn update_attestation_protocol(
        &self,
        caller: Address,
        attestation_protocol: Address,
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        if attestation_protocol.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.attestation_protocol = attestation_protocol;
        state
            .events
            .append(RegistryEvent::AttestationProtocolUpdated { attestation_protocol });
        tracing::info!(%attestation_protocol, "attestation protocol updated");
        Ok(())
    }

    /// Sweep the registry's whole balance of `asset` to `recipient`.
    pub fn recover_funds(
        &self,
        caller: Address,
        asset: Asset,
        recipient: Address,
    ) -> Result<u128, CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        let amount = sweep(self.treasury.as_ref(), &asset, &self.address, &recipient)?;
        state.events.append(RegistryEvent::FundsRecovered {
            asset,
            recipient,
            amount,
        });
        Ok(amount)
    }

    /// Add `amount` credits to a profile. Returns the new balance.
    pub fn fund_credits(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        amount: u64,
    ) -> Result<u64, CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        let balance = state
            .profiles
            .try_update(profile_id, |profile| -> Result<u64, CertifyError> {
                profile.credits = profile
                    .credits
                    .checked_add(amount)
                    .ok_or_else(|| CertifyError::Mismatch("credit balance overflow".into()))?;
                Ok(profile.credits)
            })
            .ok_or_else(|| CertifyError::NotFound(profile_id.to_string()))??;
        state.events.append(RegistryEvent::CreditsFunded {
            profile_id: *profile_id,
            amount,
            balance,
        });
        tracing::info!(%profile_id, amount, balance, "credits funded");
        Ok(balance)
    }

    /// Grant a fixed role. Profile roles are managed through `add_members`.
    pub fn grant_role(&self, caller: Address, role: RoleId, account: Address) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        if !role.is_fixed() {
            return Err(CertifyError::Unauthorized { account: caller });
        }
        if account.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        if state.roles.grant_role(role, account) {
            state.events.append(RegistryEvent::RoleGranted { role, account });
            tracing::info!(%role, %account, "role granted");
        }
        Ok(())
    }

    /// Revoke a fixed role.
    pub fn revoke_role(&self, caller: Address, role: RoleId, account: Address) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyOwner, &caller)?;
        if !role.is_fixed() {
            return Err(CertifyError::Unauthorized { account: caller });
        }
        if state.roles.revoke_role(&role, &account) {
            state.events.append(RegistryEvent::RoleRevoked { role, account });
            tracing::info!(%role, %account, "role revoked");
        }
        Ok(())
    }

    // -- Queries ---------------------------------------------------------

    /// Identity of this registry.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// The trusted attestation protocol identity.
    pub fn attestation_protocol(&self) -> Address {
        self.state.read().attestation_protocol
    }

    /// Profile by id.
    pub fn profile(&self, profile_id: &ProfileId) -> Option<Profile> {
        self.state.read().profiles.get_cloned(profile_id)
    }

    /// Profile whose *current* anchor is `anchor`.
    pub fn profile_by_anchor(&self, anchor: &Address) -> Option<Profile> {
        let state = self.state.read();
        let id = state.anchors.get(anchor)?;
        state.profiles.get_cloned(id)
    }

    /// The companion deployed at `anchor`, current or historical.
    pub fn companion_anchor(&self, anchor: &Address) -> Option<CompanionAnchor> {
        self.state.read().deriver.companion(anchor).cloned()
    }

    /// The proposed owner of a profile, if a transfer is pending.
    pub fn pending_owner(&self, profile_id: &ProfileId) -> Option<Address> {
        self.state.read().pending_owners.get_cloned(profile_id)
    }

    /// The creation authorization currently held by `account`.
    pub fn authorization(&self, account: &Address) -> Authorization {
        self.state.read().authorization(account)
    }

    /// Whether `account` owns the profile.
    pub fn is_owner(&self, profile_id: &ProfileId, account: &Address) -> bool {
        self.state
            .read()
            .profiles
            .get(profile_id)
            .map(|p| p.owner == *account)
            .unwrap_or(false)
    }

    /// Whether `account` is a member of the profile.
    pub fn is_member(&self, profile_id: &ProfileId, account: &Address) -> bool {
        self.state
            .read()
            .roles
            .has_role(&RoleId::Profile(*profile_id), account)
    }

    /// Whether `account` owns or is a member of the profile.
    pub fn is_owner_or_member(&self, profile_id: &ProfileId, account: &Address) -> bool {
        self.state.read().is_owner_or_member(profile_id, account)
    }

    /// Members of a profile.
    pub fn members(&self, profile_id: &ProfileId) -> Vec<Address> {
        self.state.read().roles.members(&RoleId::Profile(*profile_id))
    }

    /// Whether `account` holds `role`.
    pub fn has_role(&self, role: &RoleId, account: &Address) -> bool {
        self.state.read().roles.has_role(role, account)
    }

    /// Every event recorded so far, in call order.
    pub fn events(&self) -> Vec<EventRecord<RegistryEvent>> {
        self.state.read().events.records().to_vec()
    }
}

impl AttestationHook for Registry {
    /// Create a profile owned by `attester` from a [`ProfileAttestation`] payload.
    ///
    /// Uses the attester's standing authorization; there is no implicit grant
    /// on this path.
    fn did_receive_attestation(
        &self,
        sender: Address,
        attester: Address,
        _schema_id: u64,
        attestation_id: AttestationId,
        extra_data: &[u8],
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        if !state.initialized {
            return Err(CertifyError::NotInitialized);
        }
        if sender != state.attestation_protocol {
            tracing::warn!(%sender, "attestation from untrusted sender");
            return Err(CertifyError::NotAttestationProvider { sender });
        }
        let payload: ProfileAttestation = decode_extra_data(extra_data)?;
        let authorization = state.authorization(&attester);
        state
            .create_profile(
                NewProfile {
                    attestation_id,
                    nonce: payload.nonce,
                    name: &payload.name,
                    owner: attester,
                    members: &payload.members,
                },
                authorization,
            )
            .map(|_| ())
    }
}

impl ProfileAuthority for Registry {
    fn address(&self) -> Address {
        self.address
    }

    fn attestation_protocol(&self) -> Address {
        Registry::attestation_protocol(self)
    }

    fn profile(&self, profile_id: &ProfileId) -> Option<Profile> {
        Registry::profile(self, profile_id)
    }

    fn is_owner_or_member(&self, profile_id: &ProfileId, account: &Address) -> bool {
        Registry::is_owner_or_member(self, profile_id, account)
    }

    fn debit_credits(
        &self,
        caller: Address,
        profile_id: &ProfileId,
        amount: u64,
    ) -> Result<u64, CertifyError> {
        let mut state = self.state.write();
        state.ensure_role(RoleId::CertifyIssuer, &caller)?;
        let balance = state
            .profiles
            .try_update(profile_id, |profile| {
                if profile.credits < amount {
                    return Err(CertifyError::InsufficientCredits {
                        profile_id: *profile_id,
                        available: profile.credits,
                        required: amount,
                    });
                }
                profile.credits -= amount;
                Ok(profile.credits)
            })
            .ok_or_else(|| CertifyError::NotFound(profile_id.to_string()))??;
        state.events.append(RegistryEvent::CreditsDebited {
            profile_id: *profile_id,
            amount,
            balance,
        });
        tracing::info!(%profile_id, amount, balance, issuer = %caller, "credits debited");
        Ok(balance)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("address", &self.address)
            .field("initialized", &state.initialized)
            .field("attestation_protocol", &state.attestation_protocol)
            .field("profiles", &state.profiles.len())
            .finish()
    }
}
