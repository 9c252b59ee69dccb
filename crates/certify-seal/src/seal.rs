//! # Seal
//!
//! The issuance ledger. An issuance attestation names a profile and a batch
//! of `(recipient, uri)` pairs; the ledger creates one course for the batch,
//! mints one credential per recipient on the course's instance, and spends
//! one profile credit per credential.
//!
//! ## Batch Issuance
//!
//! ```text
//! sender == registry.attestation_protocol        else NotAttestationProvider
//! decode IssuanceAttestation                     else MalformedPayload
//! credits(profile) >= |recipients|               else InsufficientCredits
//! attester is owner or member of profile         else Unauthorized
//! create + initialize instance, check binding    else Mismatch
//! recipients non-empty                           else EmptyArray
//! |recipients| == |uris|                         else Mismatch
//! no null recipient                              else ZeroAddress
//! mint each credential on the fresh instance
//! registry.debit_credits(ledger, profile, n)
//! record course, bump attester nonce, emit events
//! ```
//!
//! Everything before the debit touches only the fresh, unrecorded instance.
//! If any step fails that instance is dropped and neither the ledger nor the
//! registry has changed.
//!
//! ## Reentrancy
//!
//! The ledger holds its write lock across calls into the factory, the course
//! instance and the registry. Those collaborators must not call back into
//! the ledger; `parking_lot` locks are not reentrant.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use certify_core::{
    decode_extra_data, Address, AttestationHook, AttestationId, CertifyError, ContentDigest,
    CourseId, ProfileId, TokenId,
};
use certify_crypto::{Ed25519Signature, SignatureVerifier};
use certify_registry::ProfileAuthority;
use certify_state::{sweep, Asset, EventLog, EventRecord, Table, Treasury};

use crate::course::{Course, CourseInstance, Credential};
use crate::events::SealEvent;
use crate::factory::InstanceFactory;

/// Payload of an issuance attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceAttestation {
    pub profile_id: ProfileId,
    pub recipients: Vec<Address>,
    pub uris: Vec<String>,
}

/// The issuance ledger.
pub struct Seal {
    address: Address,
    factory: Arc<dyn InstanceFactory>,
    verifier: Arc<dyn SignatureVerifier>,
    treasury: Arc<dyn Treasury>,
    state: RwLock<SealState>,
}

struct SealState {
    initialized: bool,
    owner: Address,
    registry: Option<Arc<dyn ProfileAuthority>>,
    strategy: Address,
    next_course_id: CourseId,
    courses: Table<CourseId, CourseEntry>,
    nonces: Table<Address, u64>,
    events: EventLog<SealEvent>,
}

struct CourseEntry {
    record: Course,
    instance: Arc<dyn CourseInstance>,
}

/// A course built and bound but not yet recorded.
struct StagedCourse {
    record: Course,
    instance: Arc<dyn CourseInstance>,
    nonce: u64,
}

impl SealState {
    fn ensure_owner(&self, caller: &Address) -> Result<(), CertifyError> {
        if self.owner == *caller && !caller.is_zero() {
            Ok(())
        } else {
            tracing::warn!(account = %caller, "ledger owner check failed");
            Err(CertifyError::Unauthorized { account: *caller })
        }
    }

    fn registry(&self) -> Result<Arc<dyn ProfileAuthority>, CertifyError> {
        self.registry.clone().ok_or(CertifyError::NotInitialized)
    }

    fn course(&self, course_id: &CourseId) -> Result<&CourseEntry, CertifyError> {
        self.courses
            .get(course_id)
            .ok_or_else(|| CertifyError::NotFound(course_id.to_string()))
    }
}

impl Seal {
    /// Create an uninitialized ledger cloning course instances from `strategy`.
    pub fn new(
        address: Address,
        factory: Arc<dyn InstanceFactory>,
        verifier: Arc<dyn SignatureVerifier>,
        treasury: Arc<dyn Treasury>,
        strategy: Address,
    ) -> Result<Self, CertifyError> {
        if address.is_zero() || strategy.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        Ok(Self {
            address,
            factory,
            verifier,
            treasury,
            state: RwLock::new(SealState {
                initialized: false,
                owner: Address::ZERO,
                registry: None,
                strategy,
                next_course_id: CourseId(1),
                courses: Table::new(),
                nonces: Table::new(),
                events: EventLog::new(),
            }),
        })
    }

    /// One-time setup of the ledger owner and the profile registry.
    pub fn initialize(
        &self,
        owner: Address,
        registry: Arc<dyn ProfileAuthority>,
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        if state.initialized {
            return Err(CertifyError::AlreadyInitialized);
        }
        let registry_address = registry.address();
        if owner.is_zero() || registry_address.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.owner = owner;
        state.registry = Some(registry);
        state.initialized = true;
        state.events.append(SealEvent::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: owner,
        });
        state.events.append(SealEvent::RegistryUpdated {
            registry: registry_address,
        });
        tracing::info!(seal = %self.address, %owner, registry = %registry_address, "seal initialized");
        Ok(())
    }

    /// Create, initialize and bind a course instance for `attester`.
    fn stage_course(
        &self,
        state: &SealState,
        registry: &dyn ProfileAuthority,
        attester: Address,
        profile_id: ProfileId,
        attestation_id: AttestationId,
        credits: u64,
    ) -> Result<StagedCourse, CertifyError> {
        if !registry.is_owner_or_member(&profile_id, &attester) {
            tracing::warn!(%attester, %profile_id, "attester is neither owner nor member");
            return Err(CertifyError::Unauthorized { account: attester });
        }
        let course_id = state.next_course_id;
        let nonce = state.nonces.get_cloned(&attester).unwrap_or(0);
        let instance = self
            .factory
            .create_instance(state.strategy, attester, nonce)?;
        instance.initialize(self.address, course_id)?;
        if instance.course_id() != Some(course_id) || instance.owner() != self.address {
            return Err(CertifyError::Mismatch(format!(
                "instance {} is not bound to {course_id} under {}",
                instance.address(),
                self.address
            )));
        }
        Ok(StagedCourse {
            record: Course {
                id: course_id,
                profile_id,
                attestation_id,
                instance: instance.address(),
                credits,
            },
            instance,
            nonce,
        })
    }

    /// Mint one credential to the caller on a course.
    ///
    /// `signature` must be the caller's own signature over `hash`.
    pub fn safe_mint(
        &self,
        caller: Address,
        course_id: CourseId,
        hash: &ContentDigest,
        signature: &Ed25519Signature,
        uri: &str,
    ) -> Result<TokenId, CertifyError> {
        let mut state = self.state.write();
        if !self.verifier.is_valid_signature(&caller, hash, signature) {
            tracing::warn!(account = %caller, %course_id, "self-signed mint rejected");
            return Err(CertifyError::Unauthorized { account: caller });
        }
        let instance = Arc::clone(&state.course(&course_id)?.instance);
        let token_id = instance.safe_mint(self.address, caller, uri)?;
        state.events.append(SealEvent::CredentialMinted {
            course_id,
            holder: caller,
            token_id,
        });
        tracing::info!(%course_id, holder = %caller, %token_id, "credential minted");
        Ok(token_id)
    }

    /// Point the ledger at another profile registry.
    pub fn update_registry(
        &self,
        caller: Address,
        registry: Arc<dyn ProfileAuthority>,
    ) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(&caller)?;
        let registry_address = registry.address();
        if registry_address.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.registry = Some(registry);
        state.events.append(SealEvent::RegistryUpdated {
            registry: registry_address,
        });
        tracing::info!(registry = %registry_address, "registry updated");
        Ok(())
    }

    /// Change the implementation future course instances are cloned from.
    pub fn update_strategy(&self, caller: Address, strategy: Address) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(&caller)?;
        if strategy.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.strategy = strategy;
        state.events.append(SealEvent::StrategyUpdated { strategy });
        tracing::info!(%strategy, "strategy updated");
        Ok(())
    }

    /// Hand ledger ownership to `new_owner`.
    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(&caller)?;
        if new_owner.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.owner = new_owner;
        state.events.append(SealEvent::OwnershipTransferred {
            previous_owner: caller,
            new_owner,
        });
        tracing::info!(previous_owner = %caller, %new_owner, "seal ownership transferred");
        Ok(())
    }

    /// Sweep the ledger's balance of `asset` to `recipient`.
    pub fn recover_funds(
        &self,
        caller: Address,
        asset: Asset,
        recipient: Address,
    ) -> Result<u128, CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(&caller)?;
        let amount = sweep(self.treasury.as_ref(), &asset, &self.address, &recipient)?;
        state.events.append(SealEvent::FundsRecovered {
            course_id: None,
            asset,
            recipient,
            amount,
        });
        Ok(amount)
    }

    /// Sweep a course instance's balance of `asset` to `recipient`.
    pub fn recover_funds_of_course(
        &self,
        caller: Address,
        course_id: CourseId,
        asset: Asset,
        recipient: Address,
    ) -> Result<u128, CertifyError> {
        let mut state = self.state.write();
        state.ensure_owner(&caller)?;
        let instance = Arc::clone(&state.course(&course_id)?.instance);
        let amount = instance.recover_funds(self.address, &asset, recipient)?;
        state.events.append(SealEvent::FundsRecovered {
            course_id: Some(course_id),
            asset,
            recipient,
            amount,
        });
        Ok(amount)
    }

    // -- Queries ---------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// The ledger owner, `Address::ZERO` before initialization.
    pub fn owner(&self) -> Address {
        self.state.read().owner
    }

    /// Address of the configured profile registry.
    pub fn registry(&self) -> Option<Address> {
        self.state.read().registry.as_ref().map(|r| r.address())
    }

    /// The implementation new course instances are cloned from.
    pub fn strategy(&self) -> Address {
        self.state.read().strategy
    }

    pub fn course(&self, course_id: &CourseId) -> Option<Course> {
        self.state
            .read()
            .courses
            .get(course_id)
            .map(|entry| entry.record.clone())
    }

    pub fn course_instance(&self, course_id: &CourseId) -> Option<Arc<dyn CourseInstance>> {
        self.state
            .read()
            .courses
            .get(course_id)
            .map(|entry| Arc::clone(&entry.instance))
    }

    /// Credentials minted on a course, empty for an unknown course.
    pub fn credentials(&self, course_id: &CourseId) -> Vec<Credential> {
        self.course_instance(course_id)
            .map(|instance| instance.credentials())
            .unwrap_or_default()
    }

    /// Number of courses `attester` has triggered so far.
    pub fn nonce_of(&self, attester: &Address) -> u64 {
        self.state.read().nonces.get_cloned(attester).unwrap_or(0)
    }

    /// Number of recorded courses.
    pub fn course_count(&self) -> usize {
        self.state.read().courses.len()
    }

    pub fn events(&self) -> Vec<EventRecord<SealEvent>> {
        self.state.read().events.records().to_vec()
    }
}

impl AttestationHook for Seal {
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
        let registry = state.registry()?;
        if sender != registry.attestation_protocol() {
            tracing::warn!(%sender, "attestation from untrusted sender");
            return Err(CertifyError::NotAttestationProvider { sender });
        }
        let payload: IssuanceAttestation = decode_extra_data(extra_data)?;
        let profile_id = payload.profile_id;
        let required = payload.recipients.len() as u64;

        let available = registry
            .profile(&profile_id)
            .map(|profile| profile.credits)
            .unwrap_or(0);
        if available < required {
            return Err(CertifyError::InsufficientCredits {
                profile_id,
                available,
                required,
            });
        }

        let staged = self.stage_course(
            &state,
            registry.as_ref(),
            attester,
            profile_id,
            attestation_id,
            required,
        )?;

        if payload.recipients.is_empty() {
            return Err(CertifyError::EmptyArray);
        }
        if payload.recipients.len() != payload.uris.len() {
            return Err(CertifyError::Mismatch(format!(
                "{} recipients, {} uris",
                payload.recipients.len(),
                payload.uris.len()
            )));
        }
        if payload.recipients.iter().any(Address::is_zero) {
            return Err(CertifyError::ZeroAddress);
        }

        let token_ids = payload
            .recipients
            .iter()
            .zip(&payload.uris)
            .map(|(recipient, uri)| staged.instance.safe_mint(self.address, *recipient, uri))
            .collect::<Result<Vec<_>, _>>()?;

        let balance = registry.debit_credits(self.address, &profile_id, required)?;

        let course_id = staged.record.id;
        let instance = staged.record.instance;
        state.next_course_id = course_id.next();
        state.nonces.insert(attester, staged.nonce + 1);
        state.courses.insert(
            course_id,
            CourseEntry {
                record: staged.record,
                instance: staged.instance,
            },
        );
        state.events.append(SealEvent::CourseCreated {
            course_id,
            profile_id,
            attestation_id,
            instance,
            credits: required,
        });
        state.events.append(SealEvent::CredentialsIssued {
            course_id,
            recipients: payload.recipients,
            token_ids,
        });
        tracing::info!(
            %course_id,
            %profile_id,
            %attester,
            %instance,
            issued = required,
            remaining_credits = balance,
            "course created"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Seal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Seal")
            .field("address", &self.address)
            .field("owner", &state.owner)
            .field("strategy", &state.strategy)
            .field("courses", &state.courses.len())
            .finish()
    }
}
