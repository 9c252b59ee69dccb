//! # Attestation Callback Contract
//!
//! An external attestation protocol delivers certified facts by invoking
//! [`AttestationHook::did_receive_attestation`] on a receiving component.
//! Each receiver checks that `sender` is its configured protocol identity
//! before acting, and decodes `extra_data` into its own payload schema.
//!
//! ## Wire Format
//!
//! `extra_data` is the JSON encoding of the receiver's payload struct.
//! [`encode_extra_data`] and [`decode_extra_data`] are the only supported
//! codec; a payload that fails to decode is rejected with
//! [`CertifyError::MalformedPayload`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CertifyError;
use crate::identity::{Address, AttestationId};

/// Inbound handler for attestation callbacks.
///
/// The handler is an event sink, not a request/response call: it either
/// applies the attested fact in full or returns an error and changes nothing.
pub trait AttestationHook: Send + Sync {
    /// Handle an attestation delivered by `sender` on behalf of `attester`.
    ///
    /// `schema_id` identifies the attestation schema; receivers in this
    /// workspace accept any schema and rely on `extra_data` decoding.
    fn did_receive_attestation(
        &self,
        sender: Address,
        attester: Address,
        schema_id: u64,
        attestation_id: AttestationId,
        extra_data: &[u8],
    ) -> Result<(), CertifyError>;
}

/// Encode an attestation payload for delivery.
pub fn encode_extra_data<T: Serialize>(payload: &T) -> Result<Vec<u8>, CertifyError> {
    serde_json::to_vec(payload).map_err(|e| CertifyError::MalformedPayload(e.to_string()))
}

/// Decode an attestation payload received by a hook.
pub fn decode_extra_data<T: DeserializeOwned>(extra_data: &[u8]) -> Result<T, CertifyError> {
    serde_json::from_slice(extra_data).map_err(|e| CertifyError::MalformedPayload(e.to_string()))
}
