//! # Instance Factory
//!
//! Course objects are lightweight clones of a shared implementation. The
//! factory places each clone at
//! `instance_address(factory, implementation, creator, nonce)`; the ledger
//! supplies the attester as `creator` and the attester's running nonce.
//!
//! [`CloneFactory`] keeps no record of what it created. Asking it twice for
//! the same key yields two fresh handles at the same address, so a caller
//! that discards an unrecorded instance can reuse the key.

use std::sync::Arc;

use certify_core::{Address, CertifyError};
use certify_crypto::instance_address;
use certify_state::Treasury;

use crate::course::{CourseInstance, CourseToken};

/// Creates course instances.
pub trait InstanceFactory: Send + Sync {
    /// Identity of the factory.
    fn address(&self) -> Address;

    /// Address the `nonce`-th clone of `implementation` for `creator` lives at.
    fn instance_address(
        &self,
        implementation: &Address,
        creator: &Address,
        nonce: u64,
    ) -> Result<Address, CertifyError>;

    /// Create an uninitialized clone of `implementation`.
    fn create_instance(
        &self,
        implementation: Address,
        creator: Address,
        nonce: u64,
    ) -> Result<Arc<dyn CourseInstance>, CertifyError>;
}

/// Factory producing [`CourseToken`] clones.
pub struct CloneFactory {
    address: Address,
    treasury: Arc<dyn Treasury>,
}

impl CloneFactory {
    pub fn new(address: Address, treasury: Arc<dyn Treasury>) -> Self {
        Self { address, treasury }
    }
}

impl InstanceFactory for CloneFactory {
    fn address(&self) -> Address {
        self.address
    }

    fn instance_address(
        &self,
        implementation: &Address,
        creator: &Address,
        nonce: u64,
    ) -> Result<Address, CertifyError> {
        Ok(instance_address(&self.address, implementation, creator, nonce)?)
    }

    fn create_instance(
        &self,
        implementation: Address,
        creator: Address,
        nonce: u64,
    ) -> Result<Arc<dyn CourseInstance>, CertifyError> {
        if implementation.is_zero() {
            return Err(CertifyError::ZeroAddress);
        }
        let address = self.instance_address(&implementation, &creator, nonce)?;
        tracing::debug!(%address, %implementation, %creator, nonce, "course instance cloned");
        Ok(Arc::new(CourseToken::new(
            address,
            implementation,
            Arc::clone(&self.treasury),
        )))
    }
}

impl std::fmt::Debug for CloneFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloneFactory")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certify_state::InMemoryTreasury;

    fn factory() -> CloneFactory {
        CloneFactory::new(Address([0xfa; 32]), Arc::new(InMemoryTreasury::new()))
    }

    #[test]
    fn test_instance_address_keyed_by_creator_and_nonce() {
        let f = factory();
        let implementation = Address([0x1f; 32]);
        let a = f.instance_address(&implementation, &Address([1; 32]), 0).unwrap();
        let b = f.instance_address(&implementation, &Address([1; 32]), 1).unwrap();
        let c = f.instance_address(&implementation, &Address([2; 32]), 0).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, f.instance_address(&implementation, &Address([1; 32]), 0).unwrap());
    }

    #[test]
    fn test_created_instance_is_uninitialized_clone() {
        let f = factory();
        let implementation = Address([0x1f; 32]);
        let instance = f.create_instance(implementation, Address([1; 32]), 3).unwrap();
        assert_eq!(instance.implementation(), implementation);
        assert_eq!(
            instance.address(),
            f.instance_address(&implementation, &Address([1; 32]), 3).unwrap()
        );
        assert_eq!(instance.course_id(), None);
        assert!(instance.owner().is_zero());
    }

    #[test]
    fn test_null_implementation_rejected() {
        assert!(matches!(
            factory().create_instance(Address::ZERO, Address([1; 32]), 0),
            Err(CertifyError::ZeroAddress)
        ));
    }
}
