//! # Deterministic Identity Derivation
//!
//! Every derived identity is `SHA-256(JCS(preimage))` where the preimage is
//! a JSON object tagged with a `domain` string. Distinct domains keep the
//! namespaces apart: a profile id can never equal an anchor salt computed
//! from the same bytes.
//!
//! | Function | Domain | Preimage fields |
//! |---|---|---|
//! | [`profile_id`] | `certify.profile-id` | nonce, owner |
//! | [`anchor_salt`] | `certify.anchor-salt` | profile_id, name |
//! | [`code_fingerprint`] | `certify.code` | label |
//! | [`deployment_address`] | `certify.create2` | deployer, salt, code |
//! | [`instance_address`] | `certify.clone` | factory, implementation, creator, nonce |
//!
//! `deployment_address` is the content-addressed deployment scheme: the
//! resulting address depends only on who deploys, with what salt, and which
//! implementation, so it can be computed before (or instead of) deploying.

use serde_json::json;

use certify_core::{
    sha256_digest, Address, CanonicalBytes, CanonicalizationError, ContentDigest, ProfileId,
};

fn hash(preimage: &serde_json::Value) -> Result<ContentDigest, CanonicalizationError> {
    Ok(sha256_digest(&CanonicalBytes::new(preimage)?))
}

/// `id = hash(nonce, owner)`.
pub fn profile_id(nonce: u64, owner: &Address) -> Result<ProfileId, CanonicalizationError> {
    let digest = hash(&json!({
        "domain": "certify.profile-id",
        "nonce": nonce,
        "owner": owner,
    }))?;
    Ok(ProfileId(digest.0))
}

/// `salt = hash(profile_id, name)`.
pub fn anchor_salt(
    profile_id: &ProfileId,
    name: &str,
) -> Result<ContentDigest, CanonicalizationError> {
    hash(&json!({
        "domain": "certify.anchor-salt",
        "profile_id": profile_id,
        "name": name,
    }))
}

/// Fingerprint of an implementation, identified by a stable label.
pub fn code_fingerprint(label: &str) -> Result<ContentDigest, CanonicalizationError> {
    hash(&json!({
        "domain": "certify.code",
        "label": label,
    }))
}

/// Address at which `deployer` would place `code` under `salt`.
pub fn deployment_address(
    deployer: &Address,
    salt: &ContentDigest,
    code: &ContentDigest,
) -> Result<Address, CanonicalizationError> {
    let digest = hash(&json!({
        "domain": "certify.create2",
        "deployer": deployer,
        "salt": salt,
        "code": code,
    }))?;
    Ok(Address(digest.0))
}

/// Address of the `nonce`-th clone of `implementation` made by `factory` for `creator`.
pub fn instance_address(
    factory: &Address,
    implementation: &Address,
    creator: &Address,
    nonce: u64,
) -> Result<Address, CanonicalizationError> {
    let digest = hash(&json!({
        "domain": "certify.clone",
        "factory": factory,
        "implementation": implementation,
        "creator": creator,
        "nonce": nonce,
    }))?;
    Ok(Address(digest.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address([0x11; 32])
    }

    #[test]
    fn test_profile_id_deterministic() {
        assert_eq!(profile_id(1, &owner()).unwrap(), profile_id(1, &owner()).unwrap());
    }

    #[test]
    fn test_profile_id_depends_on_both_inputs() {
        let base = profile_id(1, &owner()).unwrap();
        assert_ne!(base, profile_id(2, &owner()).unwrap());
        assert_ne!(base, profile_id(1, &Address([0x12; 32])).unwrap());
    }

    #[test]
    fn test_anchor_salt_depends_on_name() {
        let id = profile_id(1, &owner()).unwrap();
        assert_ne!(
            anchor_salt(&id, "Acme").unwrap(),
            anchor_salt(&id, "Acme Ltd").unwrap()
        );
    }

    #[test]
    fn test_domains_are_separated() {
        // Same field values hashed in two namespaces must not collide.
        let id = profile_id(5, &owner()).unwrap();
        let code = code_fingerprint("certify.anchor").unwrap();
        assert_ne!(id.0, code.0);
    }

    #[test]
    fn test_deployment_address_depends_on_deployer() {
        let salt = anchor_salt(&profile_id(1, &owner()).unwrap(), "Acme").unwrap();
        let code = code_fingerprint("certify.anchor").unwrap();
        let a = deployment_address(&Address([1; 32]), &salt, &code).unwrap();
        let b = deployment_address(&Address([2; 32]), &salt, &code).unwrap();
        assert_ne!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn test_instance_address_unique_per_nonce() {
        let factory = Address([3; 32]);
        let implementation = Address([4; 32]);
        let a = instance_address(&factory, &implementation, &owner(), 0).unwrap();
        let b = instance_address(&factory, &implementation, &owner(), 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, instance_address(&factory, &implementation, &owner(), 0).unwrap());
    }
}
