//! # Issuance Flow
//!
//! End-to-end issuance across a deployed registry and ledger sharing one
//! treasury: funded profiles, attestation-driven batches, self-signed
//! claims, rollback on every failure class, and fund recovery.

use certify_core::{
    encode_extra_data, sha256_digest, Address, AttestationHook, AttestationId, CanonicalBytes,
    CertifyError, CourseId, ProfileId, TokenId,
};
use certify_crypto::Ed25519KeyPair;
use certify_deploy::{deploy, Deployment, DeploymentConfig, LoggingConfig, RegistryConfig, SealConfig};
use certify_seal::{IssuanceAttestation, SealEvent};
use certify_state::{Asset, Treasury};

const ADMIN: Address = Address([0xa0; 32]);
const PROTOCOL: Address = Address([0xa1; 32]);
const SEAL: Address = Address([0xb1; 32]);
const SEAL_OWNER: Address = Address([0xb2; 32]);
const ALICE: Address = Address([0x10; 32]);
const BOB: Address = Address([0x11; 32]);
const EVE: Address = Address([0x66; 32]);

struct World {
    d: Deployment,
    profile: ProfileId,
}

fn world(credits: u64) -> World {
    let d = deploy(&DeploymentConfig {
        registry: RegistryConfig {
            address: Address([0xb0; 32]),
            owner: ADMIN,
            attestation_protocol: PROTOCOL,
        },
        seal: SealConfig {
            address: SEAL,
            owner: SEAL_OWNER,
            factory: Address([0xb3; 32]),
            strategy: None,
        },
        logging: LoggingConfig::default(),
    })
    .unwrap();
    let profile = d
        .registry
        .create_profile(ADMIN, AttestationId(1), 1, "Acme", ALICE, &[])
        .unwrap();
    d.registry.add_members(ALICE, &profile, &[BOB]).unwrap();
    if credits > 0 {
        d.registry.fund_credits(ADMIN, &profile, credits).unwrap();
    }
    World { d, profile }
}

fn batch(n: u8) -> (Vec<Address>, Vec<String>) {
    let recipients = (0..n).map(|i| Address([0xc0 + i; 32])).collect();
    let uris = (0..n).map(|i| format!("ipfs://cert/{i}")).collect();
    (recipients, uris)
}

fn issue(w: &World, attester: Address, recipients: Vec<Address>, uris: Vec<String>) -> Result<(), CertifyError> {
    let payload = encode_extra_data(&IssuanceAttestation {
        profile_id: w.profile,
        recipients,
        uris,
    })
    .unwrap();
    w.d.seal
        .did_receive_attestation(PROTOCOL, attester, 7, AttestationId(100), &payload)
}

fn credits(w: &World) -> u64 {
    w.d.registry.profile(&w.profile).unwrap().credits
}

#[test]
fn three_credits_cover_three_recipients() {
    let w = world(3);
    let (recipients, uris) = batch(3);
    issue(&w, ALICE, recipients.clone(), uris).unwrap();
    assert_eq!(credits(&w), 0);

    let holders: Vec<Address> = w
        .d
        .seal
        .credentials(&CourseId(1))
        .into_iter()
        .map(|c| c.holder)
        .collect();
    assert_eq!(holders, recipients);

    // the debit is visible in the registry's own log
    assert!(w.d.registry.events().iter().any(|r| matches!(
        r.event,
        certify_registry::RegistryEvent::CreditsDebited { amount: 3, balance: 0, .. }
    )));
}

#[test]
fn four_recipients_exceed_three_credits() {
    let w = world(3);
    let (recipients, uris) = batch(4);
    assert!(matches!(
        issue(&w, ALICE, recipients, uris),
        Err(CertifyError::InsufficientCredits { .. })
    ));
    assert_eq!(credits(&w), 3);
    assert!(w.d.seal.course(&CourseId(1)).is_none());
}

#[test]
fn outsider_attestation_is_rolled_back() {
    let w = world(3);
    let (recipients, uris) = batch(2);
    assert!(matches!(
        issue(&w, EVE, recipients, uris),
        Err(CertifyError::Unauthorized { .. })
    ));
    assert_eq!(credits(&w), 3);
    assert_eq!(w.d.seal.course_count(), 0);
    assert_eq!(w.d.seal.nonce_of(&EVE), 0);
}

#[test]
fn member_issues_on_behalf_of_profile() {
    let w = world(2);
    let (recipients, uris) = batch(2);
    issue(&w, BOB, recipients, uris).unwrap();
    let course = w.d.seal.course(&CourseId(1)).unwrap();
    assert_eq!(course.profile_id, w.profile);
    assert_eq!(course.credits, 2);
    assert_eq!(credits(&w), 0);
}

#[test]
fn self_signed_claim_requires_own_key() {
    let w = world(1);
    let (recipients, uris) = batch(1);
    issue(&w, ALICE, recipients, uris).unwrap();

    let student = Ed25519KeyPair::generate();
    let impostor = Ed25519KeyPair::generate();
    let hash = sha256_digest(
        &CanonicalBytes::new(&serde_json::json!({"course": 1, "claim": "completed"})).unwrap(),
    );

    assert!(matches!(
        w.d.seal.safe_mint(
            student.address(),
            CourseId(1),
            &hash,
            &impostor.sign_digest(&hash),
            "ipfs://claim"
        ),
        Err(CertifyError::Unauthorized { .. })
    ));

    let token = w
        .d
        .seal
        .safe_mint(
            student.address(),
            CourseId(1),
            &hash,
            &student.sign_digest(&hash),
            "ipfs://claim",
        )
        .unwrap();
    assert_eq!(token, TokenId(2));
    assert!(w.d.seal.events().iter().any(|r| matches!(
        &r.event,
        SealEvent::CredentialMinted { holder, .. } if *holder == student.address()
    )));
}

#[test]
fn funds_recovered_from_every_holder() {
    let w = world(1);
    let (recipients, uris) = batch(1);
    issue(&w, ALICE, recipients, uris).unwrap();
    let instance = w.d.seal.course(&CourseId(1)).unwrap().instance;
    let usdc = Asset::Token(Address([0xee; 32]));

    w.d.treasury.deposit(usdc, w.d.registry.address(), 500);
    w.d.treasury.deposit(usdc, SEAL, 70);
    w.d.treasury.deposit(usdc, instance, 9);

    let vault = Address([0x99; 32]);
    assert_eq!(w.d.registry.recover_funds(ADMIN, usdc, vault).unwrap(), 500);
    assert_eq!(w.d.seal.recover_funds(SEAL_OWNER, usdc, vault).unwrap(), 70);
    assert_eq!(
        w.d.seal
            .recover_funds_of_course(SEAL_OWNER, CourseId(1), usdc, vault)
            .unwrap(),
        9
    );
    assert_eq!(w.d.treasury.balance_of(&usdc, &vault), 579);
}

#[test]
fn protocol_rotation_applies_to_ledger() {
    let w = world(2);
    let rotated = Address([0xa2; 32]);
    w.d.registry.update_attestation_protocol(ADMIN, rotated).unwrap();

    let (recipients, uris) = batch(1);
    assert!(matches!(
        issue(&w, ALICE, recipients.clone(), uris.clone()),
        Err(CertifyError::NotAttestationProvider { .. })
    ));
    let payload = encode_extra_data(&IssuanceAttestation {
        profile_id: w.profile,
        recipients,
        uris,
    })
    .unwrap();
    w.d.seal
        .did_receive_attestation(rotated, ALICE, 7, AttestationId(101), &payload)
        .unwrap();
    assert_eq!(credits(&w), 1);
}
