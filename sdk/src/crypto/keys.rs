//! # Key Management
//!
//! Ed25519 key pairs the way Catapult expects them.
//!
//! Catapult signs with Ed25519, but not with the SHA-512 flavour everyone
//! else uses: the digest that expands the private key and derives the
//! nonce comes from the network's [`SignSchema`] (SHA3-512 or Keccak-512).
//! `ed25519-dalek` exposes exactly that knob through its `hazmat` API, so
//! the curve arithmetic stays audited and only the hash is swapped.
//!
//! ## Security considerations
//!
//! - Key bytes are never logged. `Debug` prints the public key only.
//! - `KeyPair` doesn't implement `Serialize`. Exporting a private key should
//!   be a deliberate call to [`KeyPair::private_key_hex`], not a side effect
//!   of shoving an account into a JSON response.

use ed25519_dalek::hazmat::{raw_sign, raw_verify, ExpandedSecretKey};
use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha3::{Keccak512, Sha3_512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hash::SignSchema;
use crate::config::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur while parsing key material.
///
/// Vague on purpose about *why* a secret was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid private key: expected {PRIVATE_KEY_LENGTH} hex-encoded bytes")]
    InvalidPrivateKey,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// An Ed25519 key pair bound to a [`SignSchema`].
///
/// # Examples
///
/// ```
/// use catapult_sdk::crypto::{KeyPair, SignSchema};
///
/// let kp = KeyPair::generate(SignSchema::Sha3);
/// let sig = kp.sign(b"announce");
/// assert!(kp.public_key().verify(b"announce", &sig, SignSchema::Sha3));
/// ```
pub struct KeyPair {
    private_key: [u8; PRIVATE_KEY_LENGTH],
    expanded: ExpandedSecretKey,
    verifying_key: VerifyingKey,
    schema: SignSchema,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate(schema: SignSchema) -> Self {
        let mut private_key = [0u8; PRIVATE_KEY_LENGTH];
        OsRng.fill_bytes(&mut private_key);
        Self::from_private_key(&private_key, schema)
    }

    /// Derive the key pair from raw private key bytes.
    ///
    /// The private key is expanded with the schema's 512-bit digest (after
    /// reversing it for [`SignSchema::KeccakReversedKey`]); the lower half
    /// is clamped into the signing scalar and the upper half becomes the
    /// nonce prefix.
    pub fn from_private_key(private_key: &[u8; PRIVATE_KEY_LENGTH], schema: SignSchema) -> Self {
        let mut seed = *private_key;
        if schema == SignSchema::KeccakReversedKey {
            seed.reverse();
        }
        let expanded = ExpandedSecretKey::from_bytes(&schema.hash512(&seed));
        let verifying_key = VerifyingKey::from(&expanded);
        Self {
            private_key: *private_key,
            expanded,
            verifying_key,
            schema,
        }
    }

    /// Parse a hex-encoded private key.
    pub fn from_hex(private_key_hex: &str, schema: SignSchema) -> Result<Self, KeyError> {
        let bytes = hex::decode(private_key_hex).map_err(|_| KeyError::InvalidPrivateKey)?;
        let private_key: [u8; PRIVATE_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_private_key(&private_key, schema))
    }

    /// The public half.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.verifying_key.to_bytes())
    }

    /// Schema this key pair signs with.
    pub fn schema(&self) -> SignSchema {
        self.schema
    }

    /// Sign a message. Deterministic for a given (key, message) pair.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = match self.schema {
            SignSchema::Sha3 => raw_sign::<Sha3_512>(&self.expanded, message, &self.verifying_key),
            SignSchema::KeccakReversedKey => {
                raw_sign::<Keccak512>(&self.expanded, message, &self.verifying_key)
            }
        };
        Signature::from_bytes(sig.to_bytes())
    }

    /// Hex export of the private key. **Handle with care.**
    pub fn private_key_hex(&self) -> String {
        hex::encode_upper(self.private_key)
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_private_key(&self.private_key, self.schema)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(pub={})", self.public_key())
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.public_key() == other.public_key()
    }
}

impl Eq for KeyPair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A 32-byte Ed25519 public key. Displays and serializes as upper-case hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse from a slice; only the length is checked. Catapult happily
    /// carries all-zero keys in unsigned payloads, so point validation is
    /// left to [`PublicKey::verify`].
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = slice.try_into().map_err(|_| {
            KeyError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                slice.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.bytes)
    }

    /// Verify `signature` over `message` under the given schema.
    ///
    /// Returns `false` for anything that isn't a valid signature, including
    /// keys that aren't curve points.
    pub fn verify(&self, message: &[u8], signature: &Signature, schema: SignSchema) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(signature.as_bytes());
        match schema {
            SignSchema::Sha3 => raw_verify::<Sha3_512>(&verifying_key, message, &sig).is_ok(),
            SignSchema::KeccakReversedKey => {
                raw_verify::<Keccak512>(&verifying_key, message, &sig).is_ok()
            }
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_hex()
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature. Displays and serializes as upper-case hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] = slice.try_into().map_err(|_| {
            KeyError::InvalidSignature(format!(
                "expected {SIGNATURE_LENGTH} bytes, got {}",
                slice.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|e| KeyError::InvalidSignature(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl TryFrom<String> for Signature {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_hex()
    }
}
