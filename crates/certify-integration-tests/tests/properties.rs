//! # Property Tests
//!
//! Profile-id determinism and uniqueness, and credit conservation across
//! arbitrary sequences of funding and issuance batches.

use std::collections::HashSet;

use proptest::prelude::*;

use certify_core::{encode_extra_data, Address, AttestationHook, AttestationId};
use certify_crypto::profile_id;
use certify_deploy::{deploy, DeploymentConfig, LoggingConfig, RegistryConfig, SealConfig};
use certify_seal::IssuanceAttestation;

const ADMIN: Address = Address([0xa0; 32]);
const PROTOCOL: Address = Address([0xa1; 32]);
const OWNER: Address = Address([0x10; 32]);

fn config() -> DeploymentConfig {
    DeploymentConfig {
        registry: RegistryConfig {
            address: Address([0xb0; 32]),
            owner: ADMIN,
            attestation_protocol: PROTOCOL,
        },
        seal: SealConfig {
            address: Address([0xb1; 32]),
            owner: Address([0xb2; 32]),
            factory: Address([0xb3; 32]),
            strategy: None,
        },
        logging: LoggingConfig::default(),
    }
}

fn arb_address() -> impl Strategy<Value = Address> {
    prop::array::uniform32(any::<u8>()).prop_map(Address)
}

proptest! {
    #[test]
    fn profile_id_is_deterministic(nonce in any::<u64>(), owner in arb_address()) {
        prop_assert_eq!(profile_id(nonce, &owner).unwrap(), profile_id(nonce, &owner).unwrap());
    }

    #[test]
    fn distinct_pairs_yield_distinct_ids(
        pairs in prop::collection::hash_set((any::<u64>(), prop::array::uniform32(any::<u8>())), 1..24)
    ) {
        let ids: HashSet<_> = pairs
            .iter()
            .map(|(nonce, owner)| profile_id(*nonce, &Address(*owner)).unwrap())
            .collect();
        prop_assert_eq!(ids.len(), pairs.len());
    }

    #[test]
    fn second_creation_with_same_pair_fails(nonce in any::<u64>(), owner in arb_address()) {
        prop_assume!(!owner.is_zero());
        let d = deploy(&config()).unwrap();
        d.registry.create_profile(ADMIN, AttestationId(1), nonce, "First", owner, &[]).unwrap();
        let second = d.registry.create_profile(ADMIN, AttestationId(2), nonce, "Second", owner, &[]);
        let rejected = matches!(second, Err(certify_core::CertifyError::NonceUnavailable { .. }));
        prop_assert!(rejected);
    }

    /// Credits only move through funding and successful batches.
    #[test]
    fn credits_are_conserved(
        funding in prop::collection::vec(0u64..6, 1..4),
        batches in prop::collection::vec(0u8..5, 1..8),
    ) {
        let d = deploy(&config()).unwrap();
        let profile = d
            .registry
            .create_profile(ADMIN, AttestationId(1), 1, "Acme", OWNER, &[])
            .unwrap();
        let funded: u64 = funding.iter().sum();
        for amount in &funding {
            d.registry.fund_credits(ADMIN, &profile, *amount).unwrap();
        }

        let mut spent = 0u64;
        let mut courses = 0usize;
        for (i, size) in batches.iter().enumerate() {
            let recipients: Vec<Address> = (0..*size).map(|j| Address([0x40 + j; 32])).collect();
            let uris: Vec<String> = (0..*size).map(|j| format!("ipfs://{i}/{j}")).collect();
            let payload = encode_extra_data(&IssuanceAttestation {
                profile_id: profile,
                recipients,
                uris,
            })
            .unwrap();
            let before = d.registry.profile(&profile).unwrap().credits;
            let result = d
                .seal
                .did_receive_attestation(PROTOCOL, OWNER, 0, AttestationId(i as u64), &payload);
            let expect_ok = *size > 0 && u64::from(*size) <= before;
            prop_assert_eq!(result.is_ok(), expect_ok);
            if expect_ok {
                spent += u64::from(*size);
                courses += 1;
            }
        }

        prop_assert_eq!(d.registry.profile(&profile).unwrap().credits, funded - spent);
        prop_assert_eq!(d.seal.course_count(), courses);
        prop_assert_eq!(d.seal.nonce_of(&OWNER), courses as u64);
    }
}
