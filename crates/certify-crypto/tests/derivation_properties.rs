//! # Derivation Properties
//!
//! Clone instances and anchors are addressed before they exist, so two
//! distinct inputs must never land on the same address.

use std::collections::HashSet;

use certify_core::Address;
use certify_crypto::{anchor_salt, code_fingerprint, deployment_address, instance_address, profile_id};
use proptest::prelude::*;

fn arb_address() -> impl Strategy<Value = Address> {
    prop::array::uniform32(any::<u8>()).prop_map(Address)
}

proptest! {
    #[test]
    fn instance_address_is_injective_over_creator_and_nonce(
        factory in arb_address(),
        implementation in arb_address(),
        inputs in prop::collection::hash_set((prop::array::uniform32(any::<u8>()), any::<u64>()), 1..24)
    ) {
        let addresses: HashSet<_> = inputs
            .iter()
            .map(|(creator, nonce)| {
                instance_address(&factory, &implementation, &Address(*creator), *nonce).unwrap()
            })
            .collect();
        prop_assert_eq!(addresses.len(), inputs.len());
    }

    #[test]
    fn instance_address_depends_on_implementation(
        factory in arb_address(),
        creator in arb_address(),
        nonce in any::<u64>(),
        a in arb_address(),
        b in arb_address(),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(
            instance_address(&factory, &a, &creator, nonce).unwrap(),
            instance_address(&factory, &b, &creator, nonce).unwrap()
        );
    }

    #[test]
    fn renamed_profile_gets_a_new_anchor(
        nonce in any::<u64>(),
        owner in arb_address(),
        deployer in arb_address(),
        first in "[A-Za-z ]{1,16}",
        second in "[A-Za-z ]{1,16}",
    ) {
        prop_assume!(first != second);
        let id = profile_id(nonce, &owner).unwrap();
        let code = code_fingerprint("certify.profile-anchor").unwrap();
        let a = deployment_address(&deployer, &anchor_salt(&id, &first).unwrap(), &code).unwrap();
        let b = deployment_address(&deployer, &anchor_salt(&id, &second).unwrap(), &code).unwrap();
        prop_assert_ne!(a, b);
    }
}
