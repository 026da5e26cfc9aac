//! Serde mappings from push-message JSON into the model.
//!
//! The node has shipped several encodings for the same fields over time, so
//! these DTOs are deliberately lenient on input shape and strict on content:
//!
//! - 64-bit integers arrive as numbers, decimal strings or `[lower, higher]`
//!   32-bit pairs.
//! - Mosaic ids arrive as hex strings or `[lower, higher]` pairs.
//! - Addresses arrive as 50-char hex or 40-char base32.
//! - `version` is either the combined `network << 8 | version` word, or the
//!   bare version next to a separate `network` field.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::channel::ListenerChannel;
use super::error::ListenerError;
use super::message::{BlockInfo, TransactionStatusError};
use crate::config::ADDRESS_DECODED_LENGTH;
use crate::crypto::{PublicKey, Signature};
use crate::identity::{Address, NetworkType, PublicAccount, UnresolvedAddress};
use crate::transaction::{
    AccountLinkBody, AggregateBody, AggregateKind, Cosignature, CosignatoryModification,
    CosignatureSignedTransaction, Deadline, LinkAction, Message, ModificationType, Mosaic,
    MosaicId, MultisigModificationBody, Transaction, TransactionBody, TransactionInfo,
    TransactionType, TransferBody,
};

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UInt64Dto {
    Number(u64),
    Text(String),
    Pair([u32; 2]),
}

impl UInt64Dto {
    pub fn to_u64(&self) -> Result<u64, ListenerError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(text) => text
                .parse()
                .map_err(|_| ListenerError::malformed(format!("'{text}' is not a u64"))),
            Self::Pair([lower, higher]) => Ok((u64::from(*higher) << 32) | u64::from(*lower)),
        }
    }
}

fn optional_u64(value: &Option<UInt64Dto>) -> Result<u64, ListenerError> {
    value.as_ref().map_or(Ok(0), UInt64Dto::to_u64)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MosaicIdDto {
    Hex(String),
    Pair([u32; 2]),
}

impl MosaicIdDto {
    pub fn to_mosaic_id(&self) -> Result<MosaicId, ListenerError> {
        match self {
            Self::Hex(hex) => MosaicId::from_hex(hex).map_err(ListenerError::malformed),
            Self::Pair([lower, higher]) => {
                Ok(MosaicId((u64::from(*higher) << 32) | u64::from(*lower)))
            }
        }
    }
}

fn public_key(hex: &str) -> Result<PublicKey, ListenerError> {
    PublicKey::from_hex(hex).map_err(ListenerError::malformed)
}

fn signature(hex: &str) -> Result<Signature, ListenerError> {
    Signature::from_hex(hex).map_err(ListenerError::malformed)
}

fn address(raw: &str) -> Result<Address, ListenerError> {
    let parsed = if raw.len() == ADDRESS_DECODED_LENGTH * 2 {
        Address::from_encoded(raw)
    } else {
        Address::from_raw(raw)
    };
    parsed.map_err(ListenerError::malformed)
}

fn unresolved_address(raw: &str) -> Result<UnresolvedAddress, ListenerError> {
    if raw.len() != ADDRESS_DECODED_LENGTH * 2 {
        return address(raw).map(UnresolvedAddress::from);
    }
    let decoded = hex::decode(raw).map_err(ListenerError::malformed)?;
    let mut bytes = [0u8; ADDRESS_DECODED_LENGTH];
    bytes.copy_from_slice(&decoded);
    UnresolvedAddress::from_bytes(bytes).map_err(ListenerError::malformed)
}

fn missing(field: &str) -> ListenerError {
    ListenerError::malformed(format!("missing field '{field}'"))
}

fn parse<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, ListenerError> {
    T::deserialize(value).map_err(|e| ListenerError::malformed(format!("{what}: {e}")))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetaDto {
    pub height: Option<UInt64Dto>,
    pub hash: Option<String>,
    pub merkle_component_hash: Option<String>,
    pub index: Option<u32>,
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub aggregate_hash: Option<String>,
    pub aggregate_id: Option<String>,
    pub channel_name: Option<String>,
}

impl TransactionMetaDto {
    pub fn to_info(&self) -> Result<TransactionInfo, ListenerError> {
        Ok(TransactionInfo {
            height: optional_u64(&self.height)?,
            index: self.index,
            id: self.id.clone(),
            hash: self.hash.clone(),
            merkle_component_hash: self.merkle_component_hash.clone(),
            aggregate_hash: self.aggregate_hash.clone(),
            aggregate_id: self.aggregate_id.clone(),
        })
    }

    fn channel(&self) -> Result<ListenerChannel, ListenerError> {
        self.channel_name
            .as_deref()
            .ok_or_else(|| missing("meta.channelName"))?
            .parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MosaicDto {
    pub id: MosaicIdDto,
    pub amount: UInt64Dto,
}

impl MosaicDto {
    fn to_mosaic(&self) -> Result<Mosaic, ListenerError> {
        Ok(Mosaic::new(self.id.to_mosaic_id()?, self.amount.to_u64()?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    #[serde(rename = "type")]
    pub message_type: u8,
    #[serde(default)]
    pub payload: String,
}

impl MessageDto {
    fn to_message(&self) -> Result<Message, ListenerError> {
        let payload = hex::decode(&self.payload).map_err(ListenerError::malformed)?;
        Ok(Message::from_parts(self.message_type, payload))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationDto {
    #[serde(alias = "type")]
    pub modification_type: u8,
    pub cosignatory_public_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregateCosignatureDto {
    #[serde(alias = "signerPublicKey")]
    pub signer: String,
    pub signature: String,
}

/// Flat transaction object. Variant-specific fields are optional here and
/// required by [`TransactionDto::to_transaction`] according to `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub signature: Option<String>,
    #[serde(alias = "signerPublicKey")]
    pub signer: Option<String>,
    pub version: u32,
    pub network: Option<u8>,
    #[serde(rename = "type")]
    pub transaction_type: u16,
    #[serde(alias = "fee")]
    pub max_fee: Option<UInt64Dto>,
    pub deadline: Option<UInt64Dto>,

    #[serde(alias = "recipientAddress")]
    pub recipient: Option<String>,
    pub mosaics: Option<Vec<MosaicDto>>,
    pub message: Option<MessageDto>,

    #[serde(alias = "remoteAccountKey")]
    pub remote_public_key: Option<String>,
    #[serde(alias = "action")]
    pub link_action: Option<u8>,

    pub min_approval_delta: Option<i8>,
    pub min_removal_delta: Option<i8>,
    pub modifications: Option<Vec<ModificationDto>>,

    pub transactions: Option<Vec<TransactionEnvelopeDto>>,
    pub cosignatures: Option<Vec<AggregateCosignatureDto>>,
}

/// `{ "transaction": …, "meta": … }`, as pushed and as nested in aggregates.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionEnvelopeDto {
    pub transaction: TransactionDto,
    #[serde(default)]
    pub meta: Option<TransactionMetaDto>,
}

impl TransactionEnvelopeDto {
    pub fn to_transaction(&self) -> Result<Transaction, ListenerError> {
        self.transaction.to_transaction(self.meta.as_ref())
    }
}

impl TransactionDto {
    fn network_and_version(&self) -> Result<(NetworkType, u8), ListenerError> {
        let (network, version) = match self.network {
            Some(network) => (network, (self.version & 0xFF) as u8),
            None => (((self.version >> 8) & 0xFF) as u8, (self.version & 0xFF) as u8),
        };
        let network_type = NetworkType::from_identifier(network).map_err(ListenerError::malformed)?;
        Ok((network_type, version))
    }

    pub fn to_transaction(
        &self,
        meta: Option<&TransactionMetaDto>,
    ) -> Result<Transaction, ListenerError> {
        let (network_type, version) = self.network_and_version()?;
        let transaction_type = TransactionType::from_code(self.transaction_type).ok_or_else(|| {
            ListenerError::malformed(format!(
                "unsupported transaction type 0x{:04X}",
                self.transaction_type
            ))
        })?;
        let signer = self
            .signer
            .as_deref()
            .map(|hex| public_key(hex).map(|key| PublicAccount::new(key, network_type)))
            .transpose()?;
        let signature = self.signature.as_deref().map(signature).transpose()?;

        Ok(Transaction {
            network_type,
            version,
            max_fee: optional_u64(&self.max_fee)?,
            deadline: Deadline::from_raw(optional_u64(&self.deadline)?),
            signer,
            signature,
            info: meta.map(TransactionMetaDto::to_info).transpose()?,
            body: self.body(transaction_type, network_type)?,
        })
    }

    fn body(
        &self,
        transaction_type: TransactionType,
        network_type: NetworkType,
    ) -> Result<TransactionBody, ListenerError> {
        let body = match transaction_type {
            TransactionType::Transfer => {
                let recipient = self.recipient.as_deref().ok_or_else(|| missing("recipient"))?;
                TransactionBody::Transfer(TransferBody {
                    recipient: unresolved_address(recipient)?,
                    mosaics: self
                        .mosaics
                        .iter()
                        .flatten()
                        .map(MosaicDto::to_mosaic)
                        .collect::<Result<_, _>>()?,
                    message: self
                        .message
                        .as_ref()
                        .map(MessageDto::to_message)
                        .transpose()?
                        .unwrap_or_default(),
                })
            }
            TransactionType::AccountLink => {
                let key = self
                    .remote_public_key
                    .as_deref()
                    .ok_or_else(|| missing("remotePublicKey"))?;
                let code = self.link_action.ok_or_else(|| missing("linkAction"))?;
                TransactionBody::AccountLink(AccountLinkBody {
                    remote_public_key: public_key(key)?,
                    action: LinkAction::from_code(code).ok_or_else(|| {
                        ListenerError::malformed(format!("unknown link action {code}"))
                    })?,
                })
            }
            TransactionType::MultisigModification => {
                let modifications = self
                    .modifications
                    .iter()
                    .flatten()
                    .map(|m| -> Result<CosignatoryModification, ListenerError> {
                        let modification_type = ModificationType::from_code(m.modification_type)
                            .ok_or_else(|| {
                                ListenerError::malformed(format!(
                                    "unknown modification type {}",
                                    m.modification_type
                                ))
                            })?;
                        Ok(CosignatoryModification {
                            modification_type,
                            cosignatory: PublicAccount::new(
                                public_key(&m.cosignatory_public_key)?,
                                network_type,
                            ),
                        })
                    })
                    .collect::<Result<_, _>>()?;
                TransactionBody::MultisigModification(MultisigModificationBody {
                    min_approval_delta: self
                        .min_approval_delta
                        .ok_or_else(|| missing("minApprovalDelta"))?,
                    min_removal_delta: self
                        .min_removal_delta
                        .ok_or_else(|| missing("minRemovalDelta"))?,
                    modifications,
                })
            }
            TransactionType::AggregateComplete | TransactionType::AggregateBonded => {
                let aggregate_kind = if transaction_type == TransactionType::AggregateBonded {
                    AggregateKind::Bonded
                } else {
                    AggregateKind::Complete
                };
                TransactionBody::Aggregate(AggregateBody {
                    aggregate_kind,
                    inner_transactions: self
                        .transactions
                        .iter()
                        .flatten()
                        .map(TransactionEnvelopeDto::to_transaction)
                        .collect::<Result<_, _>>()?,
                    cosignatures: self
                        .cosignatures
                        .iter()
                        .flatten()
                        .map(|c| -> Result<Cosignature, ListenerError> {
                            Ok(Cosignature {
                                signer: public_key(&c.signer)?,
                                signature: signature(&c.signature)?,
                            })
                        })
                        .collect::<Result<_, _>>()?,
                })
            }
        };
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDto {
    pub signature: String,
    #[serde(alias = "signerPublicKey")]
    pub signer: String,
    pub version: u32,
    pub network: Option<u8>,
    #[serde(rename = "type")]
    pub block_type: u16,
    pub height: UInt64Dto,
    pub timestamp: UInt64Dto,
    pub difficulty: UInt64Dto,
    pub fee_multiplier: Option<u32>,
    pub previous_block_hash: String,
    #[serde(alias = "transactionsHash")]
    pub block_transactions_hash: String,
    #[serde(alias = "receiptsHash")]
    pub block_receipts_hash: Option<String>,
    pub state_hash: Option<String>,
    #[serde(alias = "beneficiaryPublicKey")]
    pub beneficiary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetaDto {
    pub hash: String,
    pub generation_hash: String,
    pub total_fee: Option<UInt64Dto>,
    pub num_transactions: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockEnvelopeDto {
    pub block: BlockDto,
    pub meta: BlockMetaDto,
}

impl BlockEnvelopeDto {
    pub fn to_block_info(&self) -> Result<BlockInfo, ListenerError> {
        let block = &self.block;
        let (network, version) = match block.network {
            Some(network) => (network, (block.version & 0xFF) as u8),
            None => (((block.version >> 8) & 0xFF) as u8, (block.version & 0xFF) as u8),
        };
        let network_type = NetworkType::from_identifier(network).map_err(ListenerError::malformed)?;
        let beneficiary = block
            .beneficiary
            .as_deref()
            .map(|hex| public_key(hex).map(|key| PublicAccount::new(key, network_type)))
            .transpose()?;

        Ok(BlockInfo {
            hash: self.meta.hash.clone(),
            generation_hash: self.meta.generation_hash.clone(),
            total_fee: self.meta.total_fee.as_ref().map(UInt64Dto::to_u64).transpose()?,
            num_transactions: self.meta.num_transactions,
            signature: signature(&block.signature)?,
            signer: PublicAccount::new(public_key(&block.signer)?, network_type),
            network_type,
            version,
            block_type: block.block_type,
            height: block.height.to_u64()?,
            timestamp: block.timestamp.to_u64()?,
            difficulty: block.difficulty.to_u64()?,
            fee_multiplier: block.fee_multiplier,
            previous_block_hash: block.previous_block_hash.clone(),
            block_transactions_hash: block.block_transactions_hash.clone(),
            block_receipts_hash: block.block_receipts_hash.clone(),
            state_hash: block.state_hash.clone(),
            beneficiary,
        })
    }
}

// ---------------------------------------------------------------------------
// Status, cosignature and hash-only events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStatusDto {
    pub address: String,
    pub hash: String,
    #[serde(alias = "status")]
    pub code: String,
    pub deadline: UInt64Dto,
}

impl TransactionStatusDto {
    pub fn to_status(&self) -> Result<TransactionStatusError, ListenerError> {
        Ok(TransactionStatusError {
            address: address(&self.address)?,
            hash: self.hash.clone(),
            code: self.code.clone(),
            deadline: Deadline::from_raw(self.deadline.to_u64()?),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignatureEventDto {
    pub parent_hash: String,
    pub signature: String,
    #[serde(alias = "signerPublicKey")]
    pub signer: String,
}

impl CosignatureEventDto {
    pub fn to_cosignature(&self) -> Result<CosignatureSignedTransaction, ListenerError> {
        Ok(CosignatureSignedTransaction {
            parent_hash: self.parent_hash.clone(),
            signature: signature(&self.signature)?,
            signer_public_key: public_key(&self.signer)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HashMetaDto {
    channel_name: String,
    hash: String,
}

#[derive(Debug, Clone, Deserialize)]
struct HashEventDto {
    meta: HashMetaDto,
}

// ---------------------------------------------------------------------------
// Entry points used by the router
// ---------------------------------------------------------------------------

/// `{ "transaction": …, "meta": { "channelName": … } }`
pub fn transaction_event(value: &Value) -> Result<(ListenerChannel, Transaction), ListenerError> {
    let envelope: TransactionEnvelopeDto = parse(value, "transaction event")?;
    let channel = envelope
        .meta
        .as_ref()
        .ok_or_else(|| missing("meta"))?
        .channel()?;
    Ok((channel, envelope.to_transaction()?))
}

pub fn block_event(value: &Value) -> Result<BlockInfo, ListenerError> {
    parse::<BlockEnvelopeDto>(value, "block event")?.to_block_info()
}

pub fn status_event(value: &Value) -> Result<TransactionStatusError, ListenerError> {
    parse::<TransactionStatusDto>(value, "status event")?.to_status()
}

pub fn cosignature_event(value: &Value) -> Result<CosignatureSignedTransaction, ListenerError> {
    parse::<CosignatureEventDto>(value, "cosignature event")?.to_cosignature()
}

/// `{ "meta": { "channelName": …, "hash": … } }`
pub fn hash_event(value: &Value) -> Result<(ListenerChannel, String), ListenerError> {
    let event: HashEventDto = parse(value, "hash event")?;
    Ok((event.meta.channel_name.parse()?, event.meta.hash))
}
