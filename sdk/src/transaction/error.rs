//! Error types for the transaction pipeline.
//!
//! Each stage has its own enum so callers can match on the stage that failed:
//! building ([`ValidationError`]), wire encoding ([`CodecError`]), and
//! checking a received payload ([`VerificationError`]). [`TransactionError`]
//! is the union returned by the signing entry points.

use thiserror::Error;

use crate::crypto::SigningError;
use crate::identity::AddressError;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Raised synchronously while building or preparing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required builder field was never set.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A collection is larger than its wire count field allows.
    #[error("too many {field}: {len} exceeds the maximum of {max}")]
    TooMany {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// An aggregate was placed inside another aggregate.
    #[error("aggregate transactions cannot be nested")]
    NestedAggregate,

    /// An inner transaction was given to an aggregate without a signer.
    #[error("inner transaction {index} has no signer; convert it with to_aggregate first")]
    MissingInnerSigner { index: usize },

    /// An operation that only applies to aggregates received something else.
    #[error("expected an aggregate transaction, got {0}")]
    NotAggregate(String),

    /// The signer's scheme doesn't match the transaction's network.
    #[error("signer uses {signer:?} but the network expects {expected:?}")]
    SchemaMismatch {
        signer: crate::crypto::SignSchema,
        expected: crate::crypto::SignSchema,
    },

    /// A value could not be parsed.
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// CodecError
// ---------------------------------------------------------------------------

/// Raised while encoding or decoding the binary wire format. Decode errors
/// name the field being read and its absolute offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("truncated payload reading '{field}' at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("size field says {declared} bytes but '{field}' spans {actual}")]
    SizeMismatch {
        field: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("{count} trailing bytes after '{field}' at offset {offset}")]
    TrailingBytes {
        field: &'static str,
        offset: usize,
        count: usize,
    },

    #[error("unsupported transaction type 0x{code:04X} at offset {offset}")]
    UnsupportedType { code: u16, offset: usize },

    #[error("invalid '{field}' at offset {offset}: {reason}")]
    InvalidField {
        field: &'static str,
        offset: usize,
        reason: String,
    },

    #[error("invalid address in '{field}' at offset {offset}: {source}")]
    InvalidAddress {
        field: &'static str,
        offset: usize,
        #[source]
        source: AddressError,
    },

    #[error("'{field}' does not fit the wire format: {len} exceeds {max}")]
    Overflow {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("embedded transaction has no signer")]
    MissingEmbeddedSigner,

    #[error("aggregate transactions cannot be nested (offset {offset})")]
    NestedAggregate { offset: usize },

    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
}

// ---------------------------------------------------------------------------
// VerificationError
// ---------------------------------------------------------------------------

/// Raised when a signed payload does not check out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed payload: {0}")]
    Codec(#[from] CodecError),

    #[error("hash mismatch: payload hashes to {computed}, expected {expected}")]
    HashMismatch { computed: String, expected: String },

    #[error("signature by {signer} does not verify")]
    InvalidSignature { signer: String },

    #[error("cosignature {index} by {signer} does not verify")]
    InvalidCosignature { index: usize, signer: String },
}

// ---------------------------------------------------------------------------
// TransactionError
// ---------------------------------------------------------------------------

/// Anything that can go wrong between a built transaction and a signed
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}
