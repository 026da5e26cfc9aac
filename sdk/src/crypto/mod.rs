//! # Cryptographic Primitives
//!
//! Everything the transaction pipeline needs from cryptography, and nothing
//! more:
//!
//! - **Ed25519** with a network-selected digest (SHA3-512 or Keccak-512).
//! - **SHA3-256 / Keccak-256** for transaction hashes and address checksums.
//! - **RIPEMD-160** for address derivation.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. The curve math is `ed25519-dalek`; the hashes are RustCrypto.
//! This module only decides which digest goes where.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak_256, ripemd160, sha3_256, SignSchema};
pub use keys::{KeyError, KeyPair, PublicKey, Signature};
pub use signatures::{verify, DsaSigner, SigningError};
