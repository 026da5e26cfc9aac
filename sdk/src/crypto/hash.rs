//! # Hashing Utilities
//!
//! Digest functions used by the wire format. Catapult networks pick one of
//! two families and stick with it for everything:
//!
//! - **SHA3**: FIPS 202 SHA3-256 / SHA3-512. Private (Mijin) networks.
//! - **Keccak**: the pre-standard Keccak padding. Public networks, kept for
//!   NIS1 key compatibility.
//!
//! Plus RIPEMD-160, which only shows up in address derivation.
//!
//! The family is described by [`SignSchema`]; callers never pick a hasher
//! by hand.

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256, Keccak512, Sha3_256, Sha3_512};

/// Signature scheme used by a network: which 512-bit digest feeds Ed25519,
/// which 256-bit digest produces transaction hashes, and whether private
/// keys are byte-reversed before expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignSchema {
    /// Ed25519 over SHA3-512, SHA3-256 hashes.
    Sha3,
    /// Ed25519 over Keccak-512 with a byte-reversed private key, Keccak-256
    /// hashes.
    KeccakReversedKey,
}

impl SignSchema {
    /// 32-byte digest in this schema (transaction hashes, address checksum).
    pub fn hash256(self, parts: &[&[u8]]) -> [u8; 32] {
        match self {
            Self::Sha3 => digest_parts::<Sha3_256>(parts).into(),
            Self::KeccakReversedKey => digest_parts::<Keccak256>(parts).into(),
        }
    }

    /// 64-byte digest in this schema (private key expansion).
    pub fn hash512(self, data: &[u8]) -> [u8; 64] {
        let digest = match self {
            Self::Sha3 => Sha3_512::digest(data),
            Self::KeccakReversedKey => Keccak512::digest(data),
        };
        let mut out = [0u8; 64];
        out.copy_from_slice(&digest);
        out
    }
}

/// Feeds every slice into a fresh hasher. Saves callers from concatenating
/// into a temporary buffer first.
fn digest_parts<D: Digest>(parts: &[&[u8]]) -> sha3::digest::Output<D> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// SHA3-256 of the input.
///
/// # Example
///
/// ```
/// use catapult_sdk::crypto::sha3_256;
///
/// assert_eq!(sha3_256(b"catapult").len(), 32);
/// ```
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// Keccak-256 of the input (original Keccak padding, not FIPS 202).
pub fn keccak_256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// RIPEMD-160 of the input. Only used to shorten public-key digests into
/// addresses.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha3_256_empty_vector() {
        // FIPS 202 test vector for the empty string.
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn keccak_256_empty_vector() {
        // The famous Ethereum empty hash, because Keccak != SHA3.
        assert_eq!(
            hex::encode(keccak_256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn ripemd160_empty_vector() {
        assert_eq!(
            hex::encode(ripemd160(b"")),
            "9c1185a5c5e9fc54612808977ee8f548b2258d31"
        );
    }

    #[test]
    fn hash256_parts_equal_concatenation() {
        let joined = sha3_256(b"catapult sdk");
        let parts = SignSchema::Sha3.hash256(&[b"cata", b"pult", b" sdk"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn schemas_disagree() {
        let data = b"same input, different family";
        assert_ne!(
            SignSchema::Sha3.hash256(&[data]),
            SignSchema::KeccakReversedKey.hash256(&[data])
        );
        assert_ne!(
            SignSchema::Sha3.hash512(data),
            SignSchema::KeccakReversedKey.hash512(data)
        );
    }
}
