//! Transaction signing.
//!
//! Signing is a separate step from building because the signer may not be
//! around at construction time (hardware wallet, remote signer). The
//! procedure:
//!
//! 1. Encode the transaction.
//! 2. Sign `generation_hash ++ payload[100..core_end]`. `core_end` is the end
//!    of the payload, or for aggregates the end of the inner-transaction
//!    block, so appended cosignatures never change what was signed.
//! 3. Splice the signature in at offset 4 and the signer key at offset 68.
//! 4. Hash `signature[0..32] ++ signer ++ generation_hash ++
//!    payload[100..core_end]` with the network's 256-bit digest.
//!
//! The network picks the schema. A signer whose schema doesn't match is
//! rejected before anything is signed.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::builder::Transaction;
use super::codec::{encode, signable_range};
use super::error::{CodecError, TransactionError, ValidationError};
use super::types::TransactionType;
use crate::config::{HASH_LENGTH, SIGNABLE_OFFSET, SIGNATURE_OFFSET, SIGNER_OFFSET};
use crate::crypto::{DsaSigner, SignSchema};
use crate::identity::PublicAccount;

// ---------------------------------------------------------------------------
// GenerationHash
// ---------------------------------------------------------------------------

/// Hash of the network's nemesis block. Mixed into every signature so a
/// transaction signed for one network can't be replayed on another.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GenerationHash([u8; HASH_LENGTH]);

impl GenerationHash {
    pub fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::Invalid {
            field: "generation_hash",
            reason,
        };
        let bytes = hex::decode(s).map_err(|e| invalid(e.to_string()))?;
        let bytes: [u8; HASH_LENGTH] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for GenerationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for GenerationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenerationHash({})", self.to_hex())
    }
}

impl FromStr for GenerationHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for GenerationHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<GenerationHash> for String {
    fn from(hash: GenerationHash) -> Self {
        hash.to_hex()
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A signed, announce-ready payload and its hash.
///
/// Immutable. The only way to get a longer payload with the same hash is
/// through the cosignature aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    payload: Vec<u8>,
    hash: [u8; HASH_LENGTH],
    signer: PublicAccount,
    transaction_type: TransactionType,
}

impl SignedTransaction {
    pub(crate) fn new(
        payload: Vec<u8>,
        hash: [u8; HASH_LENGTH],
        signer: PublicAccount,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            payload,
            hash,
            signer,
            transaction_type,
        }
    }

    /// Upper-case hex payload, as announced over REST.
    pub fn payload(&self) -> String {
        hex::encode_upper(&self.payload)
    }

    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Upper-case hex transaction hash.
    pub fn hash(&self) -> String {
        hex::encode_upper(self.hash)
    }

    pub fn hash_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.hash
    }

    pub fn signer(&self) -> &PublicAccount {
        &self.signer
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// Copy with `appended` added to the end of the payload and the size
    /// field rewritten. The hash stays the same.
    pub(crate) fn with_appended(&self, appended: &[u8]) -> Result<Self, CodecError> {
        let mut payload = Vec::with_capacity(self.payload.len() + appended.len());
        payload.extend_from_slice(&self.payload);
        payload.extend_from_slice(appended);
        let size = u32::try_from(payload.len()).map_err(|_| CodecError::Overflow {
            field: "size",
            len: payload.len(),
            max: u32::MAX as usize,
        })?;
        payload[..4].copy_from_slice(&size.to_le_bytes());
        Ok(Self {
            payload,
            ..self.clone()
        })
    }
}

impl Serialize for SignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            payload: String,
            hash: String,
            signer: &'a PublicAccount,
            #[serde(rename = "type")]
            transaction_type: TransactionType,
        }

        Wire {
            payload: self.payload(),
            hash: self.hash(),
            signer: &self.signer,
            transaction_type: self.transaction_type,
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Transaction hash of a serialized payload under `schema`.
///
/// Works on any signed payload, including aggregates with cosignatures
/// already appended.
pub fn create_transaction_hash(
    payload: &[u8],
    generation_hash: &GenerationHash,
    schema: SignSchema,
) -> Result<[u8; HASH_LENGTH], CodecError> {
    let range = signable_range(payload)?;
    Ok(schema.hash256(&[
        &payload[SIGNATURE_OFFSET..SIGNATURE_OFFSET + HASH_LENGTH],
        &payload[SIGNER_OFFSET..SIGNABLE_OFFSET],
        generation_hash.as_bytes(),
        &payload[range],
    ]))
}

pub(crate) fn check_schema<S: DsaSigner + ?Sized>(
    signer: &S,
    expected: SignSchema,
) -> Result<(), ValidationError> {
    if signer.schema() != expected {
        return Err(ValidationError::SchemaMismatch {
            signer: signer.schema(),
            expected,
        });
    }
    Ok(())
}

/// Sign `tx` for the network identified by `generation_hash`.
pub fn sign_transaction<S: DsaSigner + ?Sized>(
    tx: &Transaction,
    signer: &S,
    generation_hash: &GenerationHash,
) -> Result<SignedTransaction, TransactionError> {
    let schema = tx.network_type.sign_schema();
    check_schema(signer, schema)?;

    let mut payload = encode(tx)?;
    let range = signable_range(&payload)?;

    let mut signing_bytes = Vec::with_capacity(HASH_LENGTH + range.len());
    signing_bytes.extend_from_slice(generation_hash.as_bytes());
    signing_bytes.extend_from_slice(&payload[range]);
    let signature = signer.sign(&signing_bytes)?;
    let public_key = signer.public_key();

    payload[SIGNATURE_OFFSET..SIGNER_OFFSET].copy_from_slice(signature.as_bytes());
    payload[SIGNER_OFFSET..SIGNABLE_OFFSET].copy_from_slice(public_key.as_bytes());
    let hash = create_transaction_hash(&payload, generation_hash, schema)?;

    let transaction_type = tx.transaction_type();
    debug!(
        hash = %hex::encode_upper(hash),
        %transaction_type,
        signer = %public_key,
        "signed transaction"
    );

    Ok(SignedTransaction::new(
        payload,
        hash,
        PublicAccount::new(public_key, tx.network_type),
        transaction_type,
    ))
}

impl Transaction {
    /// See [`sign_transaction`].
    pub fn sign_with<S: DsaSigner + ?Sized>(
        &self,
        signer: &S,
        generation_hash: &GenerationHash,
    ) -> Result<SignedTransaction, TransactionError> {
        sign_transaction(self, signer, generation_hash)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
