//! Signature verification for signed payloads.
//!
//! The checks, cheapest first:
//!
//! 1. **Layout**: size field matches, type is known, aggregate block fits.
//! 2. **Hash**: recomputed from the payload and compared.
//! 3. **Initiator signature**: over `generation_hash ++ payload[100..core_end]`.
//! 4. **Cosignatures**: each over the hash, in payload order.

use super::codec::signable_range;
use super::error::VerificationError;
use super::signing::{create_transaction_hash, GenerationHash, SignedTransaction};
use crate::config::{
    COSIGNATURE_SIZE, HASH_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, SIGNATURE_OFFSET,
    SIGNER_OFFSET,
};
use crate::crypto::{PublicKey, SignSchema, Signature};
use crate::identity::NetworkType;

/// Verify `signed` against the network identified by `generation_hash`.
pub fn verify_signed_transaction(
    signed: &SignedTransaction,
    generation_hash: &GenerationHash,
) -> Result<(), VerificationError> {
    let hash = verify_payload(
        signed.payload_bytes(),
        signed.signer().network_type,
        generation_hash,
    )?;
    if &hash != signed.hash_bytes() {
        return Err(VerificationError::HashMismatch {
            computed: hex::encode_upper(hash),
            expected: signed.hash(),
        });
    }
    Ok(())
}

/// Verify a raw payload and return its hash.
pub fn verify_payload(
    payload: &[u8],
    network_type: NetworkType,
    generation_hash: &GenerationHash,
) -> Result<[u8; HASH_LENGTH], VerificationError> {
    let schema = network_type.sign_schema();
    let range = signable_range(payload)?;
    let core_end = range.end;
    let hash = create_transaction_hash(payload, generation_hash, schema)?;

    let signer = key_at(payload, SIGNER_OFFSET);
    let signature = signature_at(payload, SIGNATURE_OFFSET);
    let mut signed_bytes = Vec::with_capacity(HASH_LENGTH + range.len());
    signed_bytes.extend_from_slice(generation_hash.as_bytes());
    signed_bytes.extend_from_slice(&payload[range]);
    if !signer.verify(&signed_bytes, &signature, schema) {
        return Err(VerificationError::InvalidSignature {
            signer: signer.to_hex(),
        });
    }

    verify_cosignatures(&payload[core_end..], &hash, schema)?;
    Ok(hash)
}

fn verify_cosignatures(
    section: &[u8],
    hash: &[u8; HASH_LENGTH],
    schema: SignSchema,
) -> Result<(), VerificationError> {
    for (index, chunk) in section.chunks(COSIGNATURE_SIZE).enumerate() {
        if chunk.len() != COSIGNATURE_SIZE {
            return Err(VerificationError::InvalidCosignature {
                index,
                signer: hex::encode_upper(chunk),
            });
        }
        let signer = key_at(chunk, 0);
        let signature = signature_at(chunk, PUBLIC_KEY_LENGTH);
        if !signer.verify(hash, &signature, schema) {
            return Err(VerificationError::InvalidCosignature {
                index,
                signer: signer.to_hex(),
            });
        }
    }
    Ok(())
}

// Callers have already bounds-checked the payload through `signable_range`.
fn key_at(bytes: &[u8], offset: usize) -> PublicKey {
    let mut key = [0u8; PUBLIC_KEY_LENGTH];
    key.copy_from_slice(&bytes[offset..offset + PUBLIC_KEY_LENGTH]);
    PublicKey::from_bytes(key)
}

fn signature_at(bytes: &[u8], offset: usize) -> Signature {
    let mut sig = [0u8; SIGNATURE_LENGTH];
    sig.copy_from_slice(&bytes[offset..offset + SIGNATURE_LENGTH]);
    Signature::from_bytes(sig)
}
