//! Classified push events as they travel on the listener bus.

use serde::{Deserialize, Serialize};

use super::channel::ListenerChannel;
use crate::crypto::Signature;
use crate::identity::{Address, NetworkType, PublicAccount};
use crate::transaction::{CosignatureSignedTransaction, Deadline, Transaction};

/// A harvested block as pushed on the `block` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub hash: String,
    pub generation_hash: String,
    pub total_fee: Option<u64>,
    pub num_transactions: Option<u32>,
    pub signature: Signature,
    pub signer: PublicAccount,
    pub network_type: NetworkType,
    pub version: u8,
    pub block_type: u16,
    pub height: u64,
    pub timestamp: u64,
    pub difficulty: u64,
    pub fee_multiplier: Option<u32>,
    pub previous_block_hash: String,
    pub block_transactions_hash: String,
    pub block_receipts_hash: Option<String>,
    pub state_hash: Option<String>,
    pub beneficiary: Option<PublicAccount>,
}

/// A transaction the node rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusError {
    pub address: Address,
    pub hash: String,
    pub code: String,
    pub deadline: Deadline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerPayload {
    Block(Box<BlockInfo>),
    Transaction(Box<Transaction>),
    Status(TransactionStatusError),
    Cosignature(CosignatureSignedTransaction),
    /// Channels that only carry the affected hash (`unconfirmedRemoved`,
    /// `partialRemoved`).
    Hash(String),
}

/// One classified message, tagged with the channel it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerMessage {
    pub channel: ListenerChannel,
    pub payload: ListenerPayload,
}

impl ListenerMessage {
    pub fn new(channel: ListenerChannel, payload: ListenerPayload) -> Self {
        Self { channel, payload }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match &self.payload {
            ListenerPayload::Transaction(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_status(&self) -> Option<&TransactionStatusError> {
        match &self.payload {
            ListenerPayload::Status(status) => Some(status),
            _ => None,
        }
    }
}
