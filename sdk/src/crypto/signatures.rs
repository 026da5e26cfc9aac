//! # Signer Capability
//!
//! The transaction pipeline never touches key material directly. It asks a
//! [`DsaSigner`] for a public key and for signatures over byte buffers, and
//! that's it. A local [`KeyPair`] is one implementation; a hardware wallet or
//! remote signing service is another, and those *can* fail, which is why
//! [`DsaSigner::sign`] returns a `Result`.
//!
//! Failures are surfaced as-is. Nothing in this crate retries a signature.

use thiserror::Error;

use super::hash::SignSchema;
use super::keys::{KeyPair, PublicKey, Signature};

/// Errors raised by a signer backend.
///
/// The message is whatever the backend reported; this crate doesn't try to
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The backend refused or failed to produce a signature.
    #[error("signer {signer} failed: {reason}")]
    Backend {
        /// Public key of the signer that failed.
        signer: String,
        /// Backend-provided reason.
        reason: String,
    },
}

/// Something that can sign bytes on behalf of one public key.
pub trait DsaSigner {
    /// Public key matching the signatures this signer produces.
    fn public_key(&self) -> PublicKey;

    /// Schema the signatures are produced under.
    fn schema(&self) -> SignSchema;

    /// Sign `data`.
    fn sign(&self, data: &[u8]) -> Result<Signature, SigningError>;
}

impl DsaSigner for KeyPair {
    fn public_key(&self) -> PublicKey {
        KeyPair::public_key(self)
    }

    fn schema(&self) -> SignSchema {
        KeyPair::schema(self)
    }

    fn sign(&self, data: &[u8]) -> Result<Signature, SigningError> {
        Ok(KeyPair::sign(self, data))
    }
}

/// Verify a signature produced by any [`DsaSigner`] of the given schema.
pub fn verify(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
    schema: SignSchema,
) -> bool {
    public_key.verify(message, signature, schema)
}
