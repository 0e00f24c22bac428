//! # Proof value codec
//!
//! The binary proof payload: a 3-byte tag prefix distinguishing base
//! from derived proofs, a CBOR array of the payload fields, and a
//! multibase `u` (base64url, no padding) text encoding for embedding as
//! the proof's `proofValue` string.
//!
//! Tag layout: `0xd9` opens a 16-bit CBOR tag, `0x5d` is the ECDSA-SD
//! tag family, and the final byte is the proof mode — `0x00` base,
//! `0x01` derived. Decoding dispatches on that byte into the
//! [`ProofPayload`] union immediately; raw bytes are never re-inspected
//! downstream.
//!
//! Every field is validated on decode: signatures must be exactly 64
//! bytes, the public key exactly 35, the HMAC key exactly 32, the label
//! map a finite string→string mapping. Any violation collapses into a
//! single "invalid proofValue" error with the low-level cause attached.

use ciborium::Value as Cbor;
use multibase::Base;
use sdi_core::LabelMap;
use sdi_crypto::{
    EcdsaSignature, HmacKey, PublicKeyBytes, DIGEST_LENGTH, HMAC_KEY_LENGTH, PUBLIC_KEY_LENGTH,
};

use crate::error::{ProofValueError, SuiteError};
use crate::proof::DataIntegrityProof;

/// Tag prefix for a base proof value.
const PREFIX_BASE: [u8; 3] = [0xd9, 0x5d, 0x00];

/// Tag prefix for a derived proof value.
const PREFIX_DERIVED: [u8; 3] = [0xd9, 0x5d, 0x01];

/// Payload of a base proof, created once at signing time.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseProofPayload {
    /// Holder-binding signature over the commitment.
    pub base_signature: EcdsaSignature,
    /// Single-use per-statement public key.
    pub public_key: PublicKeyBytes,
    /// The blank-node label-derivation key.
    pub hmac_key: HmacKey,
    /// One signature per non-mandatory statement, in canonical order.
    pub signatures: Vec<EcdsaSignature>,
    /// The mandatory selection, fixed at signing time.
    pub mandatory_pointers: Vec<String>,
}

/// Payload of a derived proof, created per disclosure.
#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureProofPayload {
    /// Holder-binding signature, copied from the base proof.
    pub base_signature: EcdsaSignature,
    /// Single-use public key, copied from the base proof.
    pub public_key: PublicKeyBytes,
    /// The per-statement signatures for the revealed non-mandatory
    /// statements, in original relative order.
    pub signatures: Vec<EcdsaSignature>,
    /// Canonical label → stable label, covering only labels appearing in
    /// the revealed statements.
    pub label_map: LabelMap,
    /// Positions of mandatory statements within the revealed sequence.
    pub mandatory_indexes: Vec<usize>,
}

/// A decoded proof value, discriminated by the mode byte.
#[derive(Debug, Clone, PartialEq)]
pub enum ProofPayload {
    Base(BaseProofPayload),
    Disclosure(DisclosureProofPayload),
}

/// Serialize a base proof payload into a multibase proof value string.
pub fn encode_base(payload: &BaseProofPayload) -> Result<String, SuiteError> {
    let fields = Cbor::Array(vec![
        Cbor::Bytes(payload.base_signature.as_bytes().to_vec()),
        Cbor::Bytes(payload.public_key.as_bytes().to_vec()),
        Cbor::Bytes(payload.hmac_key.as_bytes().to_vec()),
        Cbor::Array(
            payload
                .signatures
                .iter()
                .map(|s| Cbor::Bytes(s.as_bytes().to_vec()))
                .collect(),
        ),
        Cbor::Array(
            payload
                .mandatory_pointers
                .iter()
                .map(|p| Cbor::Text(p.clone()))
                .collect(),
        ),
    ]);
    encode_tagged(&PREFIX_BASE, &fields)
}

/// Serialize a disclosure proof payload into a multibase proof value
/// string.
pub fn encode_disclosure(payload: &DisclosureProofPayload) -> Result<String, SuiteError> {
    let fields = Cbor::Array(vec![
        Cbor::Bytes(payload.base_signature.as_bytes().to_vec()),
        Cbor::Bytes(payload.public_key.as_bytes().to_vec()),
        Cbor::Array(
            payload
                .signatures
                .iter()
                .map(|s| Cbor::Bytes(s.as_bytes().to_vec()))
                .collect(),
        ),
        compress_label_map(&payload.label_map)?,
        Cbor::Array(
            payload
                .mandatory_indexes
                .iter()
                .map(|i| Cbor::Integer((*i as u64).into()))
                .collect(),
        ),
    ]);
    encode_tagged(&PREFIX_DERIVED, &fields)
}

/// Decode a proof value string into the tagged payload union.
pub fn decode_proof_value(proof_value: &str) -> Result<ProofPayload, SuiteError> {
    decode_inner(proof_value).map_err(SuiteError::InvalidProofValue)
}

/// Parse the base proof payload off a proof object.
pub fn parse_base(proof: &DataIntegrityProof) -> Result<BaseProofPayload, SuiteError> {
    let value = proof
        .proof_value
        .as_deref()
        .ok_or(SuiteError::InvalidProofValue(ProofValueError::NotAString))?;
    match decode_proof_value(value)? {
        ProofPayload::Base(payload) => Ok(payload),
        ProofPayload::Disclosure(_) => Err(SuiteError::InvalidProofValue(
            ProofValueError::ExpectedBase,
        )),
    }
}

/// Parse the disclosure proof payload off a proof object.
pub fn parse_disclosure(proof: &DataIntegrityProof) -> Result<DisclosureProofPayload, SuiteError> {
    let value = proof
        .proof_value
        .as_deref()
        .ok_or(SuiteError::InvalidProofValue(ProofValueError::NotAString))?;
    match decode_proof_value(value)? {
        ProofPayload::Disclosure(payload) => Ok(payload),
        ProofPayload::Base(_) => Err(SuiteError::InvalidProofValue(
            ProofValueError::ExpectedDerived,
        )),
    }
}

/// The commitment input: `proofHash ∥ publicKey ∥ mandatoryHash`, in
/// that order. Signed by the long-term key at signing time and verified
/// against it at disclosure-verification time.
pub fn base_verify_data(
    proof_hash: &[u8; DIGEST_LENGTH],
    public_key: &PublicKeyBytes,
    mandatory_hash: &[u8; DIGEST_LENGTH],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(DIGEST_LENGTH * 2 + PUBLIC_KEY_LENGTH);
    data.extend_from_slice(proof_hash);
    data.extend_from_slice(public_key.as_bytes());
    data.extend_from_slice(mandatory_hash);
    data
}

// ---------------------------------------------------------------------------
// Encoding internals
// ---------------------------------------------------------------------------

fn encode_tagged(prefix: &[u8; 3], fields: &Cbor) -> Result<String, SuiteError> {
    let mut bytes = prefix.to_vec();
    ciborium::into_writer(fields, &mut bytes)
        .map_err(|e| SuiteError::Document(format!("proof value encoding failed: {e}")))?;
    Ok(multibase::encode(Base::Base64Url, bytes))
}

fn compress_label_map(label_map: &LabelMap) -> Result<Cbor, SuiteError> {
    let mut entries = Vec::with_capacity(label_map.len());
    for (canonical, stable) in label_map.iter() {
        let index: u64 = canonical
            .strip_prefix("c14n")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| {
                SuiteError::Document(format!("not a canonical blank-node label: {canonical:?}"))
            })?;
        let (base, bytes) = multibase::decode(stable).map_err(|_| {
            SuiteError::Document(format!("not a multibase stable label: {stable:?}"))
        })?;
        if base != Base::Base64Url {
            return Err(SuiteError::Document(format!(
                "stable label must be base64url multibase: {stable:?}"
            )));
        }
        entries.push((Cbor::Integer(index.into()), Cbor::Bytes(bytes)));
    }
    Ok(Cbor::Map(entries))
}

// ---------------------------------------------------------------------------
// Decoding internals — every failure is a ProofValueError cause
// ---------------------------------------------------------------------------

fn decode_inner(proof_value: &str) -> Result<ProofPayload, ProofValueError> {
    if !proof_value.starts_with('u') {
        return Err(ProofValueError::Encoding);
    }
    let (base, bytes) =
        multibase::decode(proof_value).map_err(|_| ProofValueError::Encoding)?;
    if base != Base::Base64Url {
        return Err(ProofValueError::Encoding);
    }
    if bytes.len() < 3 {
        return Err(ProofValueError::UnknownTag);
    }
    let (prefix, payload) = bytes.split_at(3);
    let fields: Cbor = ciborium::from_reader(payload)
        .map_err(|e| ProofValueError::Payload(e.to_string()))?;

    if prefix == PREFIX_BASE {
        Ok(ProofPayload::Base(decode_base_fields(fields)?))
    } else if prefix == PREFIX_DERIVED {
        Ok(ProofPayload::Disclosure(decode_disclosure_fields(fields)?))
    } else {
        Err(ProofValueError::UnknownTag)
    }
}

fn decode_base_fields(fields: Cbor) -> Result<BaseProofPayload, ProofValueError> {
    let [a, b, c, d, e] = take_fields(fields)?;
    let base_signature = signature_field(a, "baseSignature")?;
    let public_key = public_key_field(b)?;
    let hmac_key = hmac_key_field(c)?;
    let signatures = signature_array_field(d)?;
    let mandatory_pointers = pointer_array_field(e)?;
    Ok(BaseProofPayload {
        base_signature,
        public_key,
        hmac_key,
        signatures,
        mandatory_pointers,
    })
}

fn decode_disclosure_fields(fields: Cbor) -> Result<DisclosureProofPayload, ProofValueError> {
    let [a, b, c, d, e] = take_fields(fields)?;
    let base_signature = signature_field(a, "baseSignature")?;
    let public_key = public_key_field(b)?;
    let signatures = signature_array_field(c)?;
    let label_map = label_map_field(d)?;
    let mandatory_indexes = index_array_field(e)?;
    Ok(DisclosureProofPayload {
        base_signature,
        public_key,
        signatures,
        label_map,
        mandatory_indexes,
    })
}

fn take_fields(fields: Cbor) -> Result<[Cbor; 5], ProofValueError> {
    let Cbor::Array(items) = fields else {
        return Err(ProofValueError::Payload("payload must be an array".into()));
    };
    items.try_into().map_err(|items: Vec<Cbor>| {
        ProofValueError::Payload(format!("expected 5 payload fields, got {}", items.len()))
    })
}

fn signature_field(field: Cbor, name: &str) -> Result<EcdsaSignature, ProofValueError> {
    let Cbor::Bytes(bytes) = field else {
        return Err(ProofValueError::Field(format!("{name} must be a byte string")));
    };
    EcdsaSignature::from_bytes(&bytes).map_err(|_| {
        ProofValueError::Field(format!(
            "{name} must be exactly 64 bytes, got {}",
            bytes.len()
        ))
    })
}

fn public_key_field(field: Cbor) -> Result<PublicKeyBytes, ProofValueError> {
    let Cbor::Bytes(bytes) = field else {
        return Err(ProofValueError::Field("publicKey must be a byte string".into()));
    };
    if bytes.len() != PUBLIC_KEY_LENGTH {
        return Err(ProofValueError::Field(format!(
            "publicKey must be exactly {PUBLIC_KEY_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }
    PublicKeyBytes::from_bytes(&bytes)
        .map_err(|e| ProofValueError::Field(format!("publicKey rejected: {e}")))
}

fn hmac_key_field(field: Cbor) -> Result<HmacKey, ProofValueError> {
    let Cbor::Bytes(bytes) = field else {
        return Err(ProofValueError::Field("hmacKey must be a byte string".into()));
    };
    HmacKey::from_bytes(&bytes).map_err(|_| {
        ProofValueError::Field(format!(
            "hmacKey must be exactly {HMAC_KEY_LENGTH} bytes, got {}",
            bytes.len()
        ))
    })
}

fn signature_array_field(field: Cbor) -> Result<Vec<EcdsaSignature>, ProofValueError> {
    let Cbor::Array(items) = field else {
        return Err(ProofValueError::Field("signatures must be an array".into()));
    };
    items
        .into_iter()
        .map(|item| signature_field(item, "signature"))
        .collect()
}

fn pointer_array_field(field: Cbor) -> Result<Vec<String>, ProofValueError> {
    let Cbor::Array(items) = field else {
        return Err(ProofValueError::Field(
            "mandatoryPointers must be an array".into(),
        ));
    };
    items
        .into_iter()
        .map(|item| match item {
            Cbor::Text(pointer) => Ok(pointer),
            _ => Err(ProofValueError::Field(
                "mandatoryPointers must contain only strings".into(),
            )),
        })
        .collect()
}

fn label_map_field(field: Cbor) -> Result<LabelMap, ProofValueError> {
    let Cbor::Map(entries) = field else {
        return Err(ProofValueError::Field("labelMap must be a map".into()));
    };
    let mut label_map = LabelMap::new();
    for (key, value) in entries {
        let Cbor::Integer(index) = key else {
            return Err(ProofValueError::Field("labelMap keys must be integers".into()));
        };
        let index = u64::try_from(index)
            .map_err(|_| ProofValueError::Field("labelMap keys must be non-negative".into()))?;
        let Cbor::Bytes(bytes) = value else {
            return Err(ProofValueError::Field(
                "labelMap values must be byte strings".into(),
            ));
        };
        if bytes.len() != DIGEST_LENGTH {
            return Err(ProofValueError::Field(format!(
                "labelMap values must be {DIGEST_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        label_map
            .insert(
                format!("c14n{index}"),
                multibase::encode(Base::Base64Url, bytes),
            )
            .map_err(|e| ProofValueError::Field(format!("labelMap not bijective: {e}")))?;
    }
    Ok(label_map)
}

fn index_array_field(field: Cbor) -> Result<Vec<usize>, ProofValueError> {
    let Cbor::Array(items) = field else {
        return Err(ProofValueError::Field(
            "mandatoryIndexes must be an array".into(),
        ));
    };
    items
        .into_iter()
        .map(|item| match item {
            Cbor::Integer(index) => u64::try_from(index)
                .map(|i| i as usize)
                .map_err(|_| ProofValueError::Field("mandatoryIndexes must be non-negative".into())),
            _ => Err(ProofValueError::Field(
                "mandatoryIndexes must contain only integers".into(),
            )),
        })
        .collect()
}
