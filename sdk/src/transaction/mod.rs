//! # Transaction Module
//!
//! Building, encoding, signing, cosigning and verifying Catapult
//! transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        - Type codes, deadlines, mosaics, messages, metadata
//! builder.rs      - The Transaction model and one fluent builder per variant
//! codec.rs        - Byte-exact binary encode/decode
//! signing.rs      - sign_with, SignedTransaction, transaction hashes
//! cosigning.rs    - Cosignature aggregation for aggregate transactions
//! verification.rs - Checking a signed payload end to end
//! error.rs        - One error enum per stage
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: e.g. [`TransferTransactionBuilder`]; validation happens here.
//! 2. **Sign**: [`Transaction::sign_with`] or, for aggregates,
//!    [`Transaction::sign_transaction_with_cosigners`].
//! 3. **Announce**: hand [`SignedTransaction::payload`] to a transport.
//! 4. **Track**: wait on the listener for the hash.

pub mod builder;
pub mod codec;
pub mod cosigning;
pub mod error;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{
    AccountLinkBody, AccountLinkTransactionBuilder, AggregateBody, AggregateTransactionBuilder,
    MultisigModificationBody, MultisigModificationTransactionBuilder, Transaction,
    TransactionBody, TransferBody, TransferTransactionBuilder,
};
pub use codec::{decode, decode_embedded, decode_hex, encode, encode_embedded};
pub use cosigning::{
    cosign_aggregate, cosign_aggregate_hash, sign_transaction_given_signatures,
    sign_transaction_with_cosigners, CosignatureSignedTransaction,
};
pub use error::{CodecError, TransactionError, ValidationError, VerificationError};
pub use signing::{create_transaction_hash, sign_transaction, GenerationHash, SignedTransaction};
pub use types::{
    AggregateKind, Cosignature, CosignatoryModification, Deadline, LinkAction, Message,
    ModificationType, Mosaic, MosaicId, TransactionInfo, TransactionType,
};
pub use verification::{verify_payload, verify_signed_transaction};
