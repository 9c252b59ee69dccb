//! # Courses
//!
//! One course is created per issuance attestation. The ledger keeps the
//! [`Course`] record; the credentials themselves live on a separate course
//! object reached through [`CourseInstance`].
//!
//! A course object is initialized exactly once, by the ledger, which thereby
//! becomes its owner. Only the owner mints.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use certify_core::{Address, AttestationId, CertifyError, CourseId, ProfileId, TokenId};
use certify_state::{sweep, Asset, Table, Treasury};

/// Label of the default course implementation.
pub const COURSE_CODE_LABEL: &str = "certify.course-token";

/// Ledger record of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub profile_id: ProfileId,
    pub attestation_id: AttestationId,
    /// Address of the course object holding the credentials.
    pub instance: Address,
    /// Number of credentials paid for when the course was created.
    pub credits: u64,
}

/// A minted credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token_id: TokenId,
    pub holder: Address,
    pub uri: String,
}

/// A course object.
///
/// Implementations are called by the ledger while it holds its own lock and
/// must not call back into the ledger.
pub trait CourseInstance: Send + Sync {
    /// Where the instance lives.
    fn address(&self) -> Address;

    /// The implementation this instance is a clone of.
    fn implementation(&self) -> Address;

    /// Bind the instance to `course_id`, making `caller` its owner.
    fn initialize(&self, caller: Address, course_id: CourseId) -> Result<(), CertifyError>;

    /// The course id the instance was bound to, if initialized.
    fn course_id(&self) -> Option<CourseId>;

    /// The owning identity, `Address::ZERO` before initialization.
    fn owner(&self) -> Address;

    /// Mint one credential with `uri` to `to`.
    fn safe_mint(&self, caller: Address, to: Address, uri: &str) -> Result<TokenId, CertifyError>;

    /// Every credential minted so far, in token order.
    fn credentials(&self) -> Vec<Credential>;

    /// Sweep the instance's balance of `asset` to `recipient`.
    fn recover_funds(
        &self,
        caller: Address,
        asset: &Asset,
        recipient: Address,
    ) -> Result<u128, CertifyError>;
}

/// In-memory credential token for one course.
pub struct CourseToken {
    address: Address,
    implementation: Address,
    treasury: Arc<dyn Treasury>,
    state: RwLock<TokenState>,
}

#[derive(Default)]
struct TokenState {
    course_id: Option<CourseId>,
    owner: Address,
    next_token: u64,
    tokens: Table<TokenId, Credential>,
    order: Vec<TokenId>,
    balances: HashMap<Address, u64>,
}

impl CourseToken {
    /// An uninitialized token at `address`, cloned from `implementation`.
    pub fn new(address: Address, implementation: Address, treasury: Arc<dyn Treasury>) -> Self {
        Self {
            address,
            implementation,
            treasury,
            state: RwLock::new(TokenState {
                next_token: 1,
                ..TokenState::default()
            }),
        }
    }

    /// Number of credentials held by `holder`.
    pub fn balance_of(&self, holder: &Address) -> u64 {
        self.state.read().balances.get(holder).copied().unwrap_or(0)
    }

    /// Holder of a token.
    pub fn owner_of(&self, token_id: &TokenId) -> Option<Address> {
        self.state.read().tokens.get(token_id).map(|c| c.holder)
    }

    /// URI of a token.
    pub fn token_uri(&self, token_id: &TokenId) -> Option<String> {
        self.state.read().tokens.get(token_id).map(|c| c.uri.clone())
    }

    /// Number of credentials minted.
    pub fn total_supply(&self) -> usize {
        self.state.read().tokens.len()
    }

    fn ensure_owner(state: &TokenState, caller: &Address) -> Result<(), CertifyError> {
        if state.course_id.is_none() {
            return Err(CertifyError::NotInitialized);
        }
        if state.owner != *caller {
            return Err(CertifyError::Unauthorized { account: *caller });
        }
        Ok(())
    }
}

impl CourseInstance for CourseToken {
    fn address(&self) -> Address {
        self.address
    }

    fn implementation(&self) -> Address {
        self.implementation
    }

    fn initialize(&self, caller: Address, course_id: CourseId) -> Result<(), CertifyError> {
        let mut state = self.state.write();
        if state.course_id.is_some() {
            return Err(CertifyError::AlreadyInitialized);
        }
        if caller.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        state.course_id = Some(course_id);
        state.owner = caller;
        tracing::debug!(instance = %self.address, %course_id, owner = %caller, "course token initialized");
        Ok(())
    }

    fn course_id(&self) -> Option<CourseId> {
        self.state.read().course_id
    }

    fn owner(&self) -> Address {
        self.state.read().owner
    }

    fn safe_mint(&self, caller: Address, to: Address, uri: &str) -> Result<TokenId, CertifyError> {
        let mut state = self.state.write();
        Self::ensure_owner(&state, &caller)?;
        if to.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        let token_id = TokenId(state.next_token);
        state.next_token += 1;
        state.tokens.insert(
            token_id,
            Credential {
                token_id,
                holder: to,
                uri: uri.to_string(),
            },
        );
        state.order.push(token_id);
        *state.balances.entry(to).or_insert(0) += 1;
        Ok(token_id)
    }

    fn credentials(&self) -> Vec<Credential> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|id| state.tokens.get_cloned(id))
            .collect()
    }

    fn recover_funds(
        &self,
        caller: Address,
        asset: &Asset,
        recipient: Address,
    ) -> Result<u128, CertifyError> {
        let state = self.state.read();
        Self::ensure_owner(&state, &caller)?;
        sweep(self.treasury.as_ref(), asset, &self.address, &recipient)
    }
}

impl std::fmt::Debug for CourseToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("CourseToken")
            .field("address", &self.address)
            .field("course_id", &state.course_id)
            .field("owner", &state.owner)
            .field("minted", &state.tokens.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certify_state::InMemoryTreasury;

    const LEDGER: Address = Address([0x5e; 32]);

    fn token() -> (CourseToken, Arc<InMemoryTreasury>) {
        let treasury = Arc::new(InMemoryTreasury::new());
        let token = CourseToken::new(Address([0xc0; 32]), Address([0x1f; 32]), treasury.clone());
        (token, treasury)
    }

    #[test]
    fn test_initialize_binds_course_and_owner() {
        let (token, _) = token();
        assert_eq!(token.course_id(), None);
        token.initialize(LEDGER, CourseId(4)).unwrap();
        assert_eq!(token.course_id(), Some(CourseId(4)));
        assert_eq!(token.owner(), LEDGER);
        assert!(matches!(
            token.initialize(LEDGER, CourseId(5)),
            Err(CertifyError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_mint_sequential_tokens() {
        let (token, _) = token();
        token.initialize(LEDGER, CourseId(1)).unwrap();
        let holder = Address([0x0a; 32]);
        let first = token.safe_mint(LEDGER, holder, "ipfs://a").unwrap();
        let second = token.safe_mint(LEDGER, holder, "ipfs://b").unwrap();
        assert_eq!(first, TokenId(1));
        assert_eq!(second, TokenId(2));
        assert_eq!(token.balance_of(&holder), 2);
        assert_eq!(token.token_uri(&second).as_deref(), Some("ipfs://b"));
        assert_eq!(token.owner_of(&first), Some(holder));
        let uris: Vec<_> = token.credentials().into_iter().map(|c| c.uri).collect();
        assert_eq!(uris, vec!["ipfs://a", "ipfs://b"]);
    }

    #[test]
    fn test_mint_restricted_to_owner() {
        let (token, _) = token();
        let holder = Address([0x0a; 32]);
        assert!(matches!(
            token.safe_mint(LEDGER, holder, "x"),
            Err(CertifyError::NotInitialized)
        ));
        token.initialize(LEDGER, CourseId(1)).unwrap();
        assert!(matches!(
            token.safe_mint(holder, holder, "x"),
            Err(CertifyError::Unauthorized { .. })
        ));
        assert!(matches!(
            token.safe_mint(LEDGER, Address::ZERO, "x"),
            Err(CertifyError::ZeroAddress)
        ));
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn test_recover_funds_of_instance() {
        let (token, treasury) = token();
        token.initialize(LEDGER, CourseId(1)).unwrap();
        let asset = Asset::Token(Address([0x77; 32]));
        treasury.deposit(asset, token.address(), 30);
        assert!(matches!(
            token.recover_funds(Address([0x0a; 32]), &asset, LEDGER),
            Err(CertifyError::Unauthorized { .. })
        ));
        assert_eq!(token.recover_funds(LEDGER, &asset, LEDGER).unwrap(), 30);
        assert_eq!(treasury.balance_of(&asset, &LEDGER), 30);
    }
}
