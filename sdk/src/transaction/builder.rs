//! The transaction model and its builders.
//!
//! A [`Transaction`] is a shared header plus one [`TransactionBody`] variant.
//! The type code and version follow from the body, so a transfer can't be
//! stamped with an aggregate's type by accident.
//!
//! Builders never touch the network or key material. `build()` either
//! returns a transaction that the codec can encode, or a
//! [`ValidationError`] naming what's wrong.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::types::{
    AggregateKind, Cosignature, CosignatoryModification, Deadline, LinkAction, Message, Mosaic,
    TransactionInfo, TransactionType,
};
use crate::config::{MAX_MESSAGE_PAYLOAD, MAX_U8_COUNT};
use crate::crypto::{PublicKey, Signature};
use crate::identity::{NetworkType, PublicAccount, UnresolvedAddress};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A Catapult transaction.
///
/// Top-level transactions have both `signer` and `signature` or neither.
/// Inner transactions of an aggregate carry a signer only, and their
/// `max_fee` and `deadline` are zero (the aggregate's apply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub network_type: NetworkType,
    pub version: u8,
    pub max_fee: u64,
    pub deadline: Deadline,
    pub signer: Option<PublicAccount>,
    pub signature: Option<Signature>,
    pub info: Option<TransactionInfo>,
    pub body: TransactionBody,
}

/// Variant-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TransactionBody {
    Transfer(TransferBody),
    AccountLink(AccountLinkBody),
    MultisigModification(MultisigModificationBody),
    Aggregate(AggregateBody),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub recipient: UnresolvedAddress,
    pub mosaics: Vec<Mosaic>,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLinkBody {
    pub remote_public_key: PublicKey,
    pub action: LinkAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigModificationBody {
    pub min_approval_delta: i8,
    pub min_removal_delta: i8,
    pub modifications: Vec<CosignatoryModification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBody {
    pub aggregate_kind: AggregateKind,
    pub inner_transactions: Vec<Transaction>,
    pub cosignatures: Vec<Cosignature>,
}

impl TransactionBody {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Transfer(_) => TransactionType::Transfer,
            Self::AccountLink(_) => TransactionType::AccountLink,
            Self::MultisigModification(_) => TransactionType::MultisigModification,
            Self::Aggregate(body) => body.aggregate_kind.transaction_type(),
        }
    }
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn as_aggregate(&self) -> Option<&AggregateBody> {
        match &self.body {
            TransactionBody::Aggregate(body) => Some(body),
            _ => None,
        }
    }

    /// Inner transactions of an aggregate; empty for everything else.
    pub fn inner_transactions(&self) -> &[Transaction] {
        self.as_aggregate()
            .map(|body| body.inner_transactions.as_slice())
            .unwrap_or_default()
    }

    /// Convert into the embedded form used inside an aggregate: signed by
    /// `signer`, no fee, no deadline, no signature.
    pub fn to_aggregate(&self, signer: &PublicAccount) -> Transaction {
        Transaction {
            max_fee: 0,
            deadline: Deadline::from_raw(0),
            signer: Some(*signer),
            signature: None,
            info: None,
            ..self.clone()
        }
    }

    /// True if `account` signed this transaction, either as initiator or,
    /// for aggregates, as one of the cosigners.
    pub fn signed_by_account(&self, account: &PublicAccount) -> bool {
        let initiator = self
            .signer
            .is_some_and(|signer| signer.public_key == account.public_key);
        initiator
            || self.as_aggregate().is_some_and(|body| {
                body.cosignatures
                    .iter()
                    .any(|c| c.signer == account.public_key)
            })
    }

    /// Attach event/query metadata.
    pub fn with_info(mut self, info: TransactionInfo) -> Self {
        self.info = Some(info);
        self
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn header(
    network_type: NetworkType,
    transaction_type: TransactionType,
    max_fee: u64,
    deadline: Option<Deadline>,
    body: TransactionBody,
) -> Transaction {
    Transaction {
        network_type,
        version: transaction_type.current_version(),
        max_fee,
        deadline: deadline.unwrap_or_default(),
        signer: None,
        signature: None,
        info: None,
        body,
    }
}

fn check_count(field: &'static str, len: usize, max: usize) -> Result<(), ValidationError> {
    if len > max {
        return Err(ValidationError::TooMany { field, len, max });
    }
    Ok(())
}

/// Builds a transfer of mosaics and an optional message.
///
/// ```
/// use catapult_sdk::identity::{Address, NetworkType};
/// use catapult_sdk::transaction::{Mosaic, MosaicId, TransferTransactionBuilder};
///
/// let recipient = Address::from_raw("SDUP5PLHDXKBX3UU5Q52LAY4WYEKGEWC6IB3VBFM").unwrap();
/// let tx = TransferTransactionBuilder::new(NetworkType::MijinTest)
///     .recipient(recipient)
///     .mosaic(Mosaic::new(MosaicId(95_442_763_262_823), 100))
///     .build()
///     .unwrap();
/// assert_eq!(tx.version, 1);
/// ```
#[derive(Debug, Clone)]
pub struct TransferTransactionBuilder {
    network_type: NetworkType,
    max_fee: u64,
    deadline: Option<Deadline>,
    recipient: Option<UnresolvedAddress>,
    mosaics: Vec<Mosaic>,
    message: Message,
}

impl TransferTransactionBuilder {
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            network_type,
            max_fee: 0,
            deadline: None,
            recipient: None,
            mosaics: Vec::new(),
            message: Message::empty(),
        }
    }

    pub fn max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn recipient(mut self, recipient: impl Into<UnresolvedAddress>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn mosaic(mut self, mosaic: Mosaic) -> Self {
        self.mosaics.push(mosaic);
        self
    }

    pub fn mosaics(mut self, mosaics: Vec<Mosaic>) -> Self {
        self.mosaics = mosaics;
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.message = message;
        self
    }

    pub fn build(self) -> Result<Transaction, ValidationError> {
        let recipient = self
            .recipient
            .ok_or(ValidationError::MissingField("recipient"))?;
        check_count("mosaics", self.mosaics.len(), MAX_U8_COUNT)?;
        check_count(
            "message bytes",
            self.message.payload().len(),
            MAX_MESSAGE_PAYLOAD,
        )?;

        Ok(header(
            self.network_type,
            TransactionType::Transfer,
            self.max_fee,
            self.deadline,
            TransactionBody::Transfer(TransferBody {
                recipient,
                mosaics: self.mosaics,
                message: self.message,
            }),
        ))
    }
}

/// Links (or unlinks) a remote harvesting key to an account.
#[derive(Debug, Clone)]
pub struct AccountLinkTransactionBuilder {
    network_type: NetworkType,
    max_fee: u64,
    deadline: Option<Deadline>,
    remote_public_key: Option<PublicKey>,
    action: Option<LinkAction>,
}

impl AccountLinkTransactionBuilder {
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            network_type,
            max_fee: 0,
            deadline: None,
            remote_public_key: None,
            action: None,
        }
    }

    pub fn max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn remote_public_key(mut self, key: PublicKey) -> Self {
        self.remote_public_key = Some(key);
        self
    }

    pub fn action(mut self, action: LinkAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn build(self) -> Result<Transaction, ValidationError> {
        let remote_public_key = self
            .remote_public_key
            .ok_or(ValidationError::MissingField("remote_public_key"))?;
        let action = self.action.ok_or(ValidationError::MissingField("action"))?;

        Ok(header(
            self.network_type,
            TransactionType::AccountLink,
            self.max_fee,
            self.deadline,
            TransactionBody::AccountLink(AccountLinkBody {
                remote_public_key,
                action,
            }),
        ))
    }
}

/// Changes the cosignatories and thresholds of a multisig account.
#[derive(Debug, Clone)]
pub struct MultisigModificationTransactionBuilder {
    network_type: NetworkType,
    max_fee: u64,
    deadline: Option<Deadline>,
    min_approval_delta: Option<i8>,
    min_removal_delta: Option<i8>,
    modifications: Vec<CosignatoryModification>,
}

impl MultisigModificationTransactionBuilder {
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            network_type,
            max_fee: 0,
            deadline: None,
            min_approval_delta: None,
            min_removal_delta: None,
            modifications: Vec::new(),
        }
    }

    pub fn max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn min_approval_delta(mut self, delta: i8) -> Self {
        self.min_approval_delta = Some(delta);
        self
    }

    pub fn min_removal_delta(mut self, delta: i8) -> Self {
        self.min_removal_delta = Some(delta);
        self
    }

    pub fn modification(mut self, modification: CosignatoryModification) -> Self {
        self.modifications.push(modification);
        self
    }

    pub fn modifications(mut self, modifications: Vec<CosignatoryModification>) -> Self {
        self.modifications = modifications;
        self
    }

    pub fn build(self) -> Result<Transaction, ValidationError> {
        let min_approval_delta = self
            .min_approval_delta
            .ok_or(ValidationError::MissingField("min_approval_delta"))?;
        let min_removal_delta = self
            .min_removal_delta
            .ok_or(ValidationError::MissingField("min_removal_delta"))?;
        check_count("modifications", self.modifications.len(), MAX_U8_COUNT)?;

        Ok(header(
            self.network_type,
            TransactionType::MultisigModification,
            self.max_fee,
            self.deadline,
            TransactionBody::MultisigModification(MultisigModificationBody {
                min_approval_delta,
                min_removal_delta,
                modifications: self.modifications,
            }),
        ))
    }
}

/// Bundles inner transactions into one complete or bonded aggregate.
///
/// Inner transactions must already be in embedded form
/// ([`Transaction::to_aggregate`]).
#[derive(Debug, Clone)]
pub struct AggregateTransactionBuilder {
    network_type: NetworkType,
    kind: AggregateKind,
    max_fee: u64,
    deadline: Option<Deadline>,
    inner_transactions: Option<Vec<Transaction>>,
    cosignatures: Vec<Cosignature>,
}

impl AggregateTransactionBuilder {
    pub fn complete(network_type: NetworkType) -> Self {
        Self::new(network_type, AggregateKind::Complete)
    }

    pub fn bonded(network_type: NetworkType) -> Self {
        Self::new(network_type, AggregateKind::Bonded)
    }

    fn new(network_type: NetworkType, kind: AggregateKind) -> Self {
        Self {
            network_type,
            kind,
            max_fee: 0,
            deadline: None,
            inner_transactions: None,
            cosignatures: Vec::new(),
        }
    }

    pub fn max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn inner_transactions(mut self, inner: Vec<Transaction>) -> Self {
        self.inner_transactions = Some(inner);
        self
    }

    pub fn cosignatures(mut self, cosignatures: Vec<Cosignature>) -> Self {
        self.cosignatures = cosignatures;
        self
    }

    pub fn build(self) -> Result<Transaction, ValidationError> {
        let inner_transactions = self
            .inner_transactions
            .ok_or(ValidationError::MissingField("inner_transactions"))?;
        for (index, inner) in inner_transactions.iter().enumerate() {
            if inner.transaction_type().is_aggregate() {
                return Err(ValidationError::NestedAggregate);
            }
            if inner.signer.is_none() {
                return Err(ValidationError::MissingInnerSigner { index });
            }
        }

        Ok(header(
            self.network_type,
            self.kind.transaction_type(),
            self.max_fee,
            self.deadline,
            TransactionBody::Aggregate(AggregateBody {
                aggregate_kind: self.kind,
                inner_transactions,
                cosignatures: self.cosignatures,
            }),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
