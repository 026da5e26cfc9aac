//! Value types shared by every transaction variant.
//!
//! Small, mostly `Copy`, and free of any wire-format knowledge beyond their
//! numeric codes. The codec decides where the bytes go.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValidationError;
use crate::config::{
    ACCOUNT_LINK_TYPE, ACCOUNT_LINK_VERSION, AGGREGATE_BONDED_TYPE, AGGREGATE_COMPLETE_TYPE,
    AGGREGATE_VERSION, DEFAULT_DEADLINE_HOURS, MULTISIG_MODIFICATION_TYPE,
    MULTISIG_MODIFICATION_VERSION, NEMESIS_EPOCH_MS, TRANSFER_TYPE, TRANSFER_VERSION,
};
use crate::crypto::{PublicKey, Signature};
use crate::identity::PublicAccount;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The type codes this crate can build, encode and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Transfer,
    AccountLink,
    MultisigModification,
    AggregateComplete,
    AggregateBonded,
}

impl TransactionType {
    /// Wire code.
    pub fn code(self) -> u16 {
        match self {
            Self::Transfer => TRANSFER_TYPE,
            Self::AccountLink => ACCOUNT_LINK_TYPE,
            Self::MultisigModification => MULTISIG_MODIFICATION_TYPE,
            Self::AggregateComplete => AGGREGATE_COMPLETE_TYPE,
            Self::AggregateBonded => AGGREGATE_BONDED_TYPE,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            TRANSFER_TYPE => Some(Self::Transfer),
            ACCOUNT_LINK_TYPE => Some(Self::AccountLink),
            MULTISIG_MODIFICATION_TYPE => Some(Self::MultisigModification),
            AGGREGATE_COMPLETE_TYPE => Some(Self::AggregateComplete),
            AGGREGATE_BONDED_TYPE => Some(Self::AggregateBonded),
            _ => None,
        }
    }

    /// Version the builders stamp on new transactions of this type.
    pub fn current_version(self) -> u8 {
        match self {
            Self::Transfer => TRANSFER_VERSION,
            Self::AccountLink => ACCOUNT_LINK_VERSION,
            Self::MultisigModification => MULTISIG_MODIFICATION_VERSION,
            Self::AggregateComplete | Self::AggregateBonded => AGGREGATE_VERSION,
        }
    }

    pub fn is_aggregate(self) -> bool {
        matches!(self, Self::AggregateComplete | Self::AggregateBonded)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "Transfer"),
            Self::AccountLink => write!(f, "AccountLink"),
            Self::MultisigModification => write!(f, "MultisigModification"),
            Self::AggregateComplete => write!(f, "AggregateComplete"),
            Self::AggregateBonded => write!(f, "AggregateBonded"),
        }
    }
}

/// Whether an aggregate carries all its signatures up front or collects
/// them on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateKind {
    Complete,
    Bonded,
}

impl AggregateKind {
    pub fn transaction_type(self) -> TransactionType {
        match self {
            Self::Complete => TransactionType::AggregateComplete,
            Self::Bonded => TransactionType::AggregateBonded,
        }
    }
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// Milliseconds since the Catapult nemesis block (2016-04-01T00:00:00Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deadline(u64);

impl Deadline {
    /// `now + hours`.
    pub fn create(hours: i64) -> Self {
        Self::create_after(Duration::hours(hours))
    }

    pub fn create_after(duration: Duration) -> Self {
        Self::from_datetime(Utc::now() + duration)
    }

    /// Deadlines before the nemesis epoch clamp to zero.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let ms = at.timestamp_millis() - NEMESIS_EPOCH_MS;
        Self(u64::try_from(ms).unwrap_or(0))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Wall-clock time this deadline falls on, if representable.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let ms = i64::try_from(self.0).ok()?.checked_add(NEMESIS_EPOCH_MS)?;
        Utc.timestamp_millis_opt(ms).single()
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::create(DEFAULT_DEADLINE_HOURS)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(at) => write!(f, "{}", at.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Mosaics
// ---------------------------------------------------------------------------

/// 64-bit mosaic identifier. Rendered as 16 upper-case hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MosaicId(pub u64);

impl MosaicId {
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| ValidationError::Invalid {
                field: "mosaic id",
                reason: e.to_string(),
            })
    }

    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }
}

impl fmt::Display for MosaicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An amount of one mosaic, in its smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mosaic {
    pub id: MosaicId,
    pub amount: u64,
}

impl Mosaic {
    pub fn new(id: MosaicId, amount: u64) -> Self {
        Self { id, amount }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

pub const PLAIN_MESSAGE_TYPE: u8 = 0x00;
pub const SECURE_MESSAGE_TYPE: u8 = 0x01;

/// Transfer message. The type byte travels on the wire ahead of the payload.
///
/// `Secure` carries an already-encrypted payload; encryption itself lives
/// outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum Message {
    Plain(String),
    Secure(Vec<u8>),
    Raw { message_type: u8, payload: Vec<u8> },
}

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    pub fn empty() -> Self {
        Self::Plain(String::new())
    }

    pub fn message_type(&self) -> u8 {
        match self {
            Self::Plain(_) => PLAIN_MESSAGE_TYPE,
            Self::Secure(_) => SECURE_MESSAGE_TYPE,
            Self::Raw { message_type, .. } => *message_type,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Plain(text) => text.as_bytes(),
            Self::Secure(bytes) | Self::Raw { payload: bytes, .. } => bytes,
        }
    }

    /// Rebuild a message from its wire parts. Plain messages that aren't
    /// valid UTF-8 stay raw so they re-encode byte-for-byte.
    pub fn from_parts(message_type: u8, payload: Vec<u8>) -> Self {
        match message_type {
            PLAIN_MESSAGE_TYPE => match String::from_utf8(payload) {
                Ok(text) => Self::Plain(text),
                Err(e) => Self::Raw {
                    message_type,
                    payload: e.into_bytes(),
                },
            },
            SECURE_MESSAGE_TYPE => Self::Secure(payload),
            _ => Self::Raw {
                message_type,
                payload,
            },
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Account link / multisig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkAction {
    Link,
    Unlink,
}

impl LinkAction {
    pub fn code(self) -> u8 {
        match self {
            Self::Link => 0,
            Self::Unlink => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Link),
            1 => Some(Self::Unlink),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModificationType {
    Add,
    Remove,
}

impl ModificationType {
    pub fn code(self) -> u8 {
        match self {
            Self::Add => 0,
            Self::Remove => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Add),
            1 => Some(Self::Remove),
            _ => None,
        }
    }
}

/// Add or remove one cosignatory of a multisig account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignatoryModification {
    pub modification_type: ModificationType,
    pub cosignatory: PublicAccount,
}

impl CosignatoryModification {
    pub fn add(cosignatory: PublicAccount) -> Self {
        Self {
            modification_type: ModificationType::Add,
            cosignatory,
        }
    }

    pub fn remove(cosignatory: PublicAccount) -> Self {
        Self {
            modification_type: ModificationType::Remove,
            cosignatory,
        }
    }
}

// ---------------------------------------------------------------------------
// Cosignature / metadata
// ---------------------------------------------------------------------------

/// A cosigner's signature over an aggregate's hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cosignature {
    pub signer: PublicKey,
    pub signature: Signature,
}

/// Where a transaction landed. Only the event and query paths fill this in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub height: u64,
    pub index: Option<u32>,
    pub id: Option<String>,
    pub hash: Option<String>,
    pub merkle_component_hash: Option<String>,
    pub aggregate_hash: Option<String>,
    pub aggregate_id: Option<String>,
}

impl TransactionInfo {
    /// Case-insensitive comparison against this transaction's hash.
    pub fn hash_matches(&self, hash: &str) -> bool {
        self.hash
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_roundtrip() {
        for t in [
            TransactionType::Transfer,
            TransactionType::AccountLink,
            TransactionType::MultisigModification,
            TransactionType::AggregateComplete,
            TransactionType::AggregateBonded,
        ] {
            assert_eq!(TransactionType::from_code(t.code()), Some(t));
        }
        assert_eq!(TransactionType::from_code(0x4E42), None);
    }

    #[test]
    fn versions_match_wire_layout() {
        assert_eq!(TransactionType::Transfer.current_version(), 1);
        assert_eq!(TransactionType::AccountLink.current_version(), 2);
        assert_eq!(TransactionType::AggregateBonded.current_version(), 2);
    }

    #[test]
    fn deadline_is_relative_to_nemesis() {
        let nemesis = Utc.timestamp_millis_opt(NEMESIS_EPOCH_MS).unwrap();
        assert_eq!(Deadline::from_datetime(nemesis).raw(), 0);
        assert_eq!(
            Deadline::from_raw(1_000).to_datetime().unwrap(),
            nemesis + Duration::seconds(1)
        );
    }

    #[test]
    fn default_deadline_is_two_hours_out() {
        let before = Deadline::create_after(Duration::hours(2) - Duration::seconds(1));
        let deadline = Deadline::default();
        let after = Deadline::create_after(Duration::hours(2) + Duration::seconds(1));
        assert!(before <= deadline && deadline <= after);
    }

    #[test]
    fn pre_nemesis_deadline_clamps() {
        let early = Utc.timestamp_millis_opt(0).unwrap();
        assert_eq!(Deadline::from_datetime(early).raw(), 0);
    }

    #[test]
    fn mosaic_id_hex() {
        let id = MosaicId(95_442_763_262_823);
        assert_eq!(id.to_hex(), "000056CE00002B67");
        assert_eq!(MosaicId::from_hex("56ce00002b67").unwrap(), id);
        assert!(MosaicId::from_hex("zz").is_err());
    }

    #[test]
    fn message_parts() {
        let plain = Message::plain("hi");
        assert_eq!(plain.message_type(), 0);
        assert_eq!(plain.payload(), b"hi");

        assert_eq!(Message::from_parts(0, b"hi".to_vec()), plain);
        assert_eq!(
            Message::from_parts(1, vec![1, 2]),
            Message::Secure(vec![1, 2])
        );
        assert_eq!(
            Message::from_parts(0, vec![0xFF]),
            Message::Raw {
                message_type: 0,
                payload: vec![0xFF]
            }
        );
    }

    #[test]
    fn link_and_modification_codes() {
        assert_eq!(LinkAction::from_code(1), Some(LinkAction::Unlink));
        assert_eq!(LinkAction::from_code(2), None);
        assert_eq!(ModificationType::Remove.code(), 1);
        assert_eq!(ModificationType::from_code(0), Some(ModificationType::Add));
    }

    #[test]
    fn info_hash_match_ignores_case() {
        let info = TransactionInfo {
            hash: Some("ABCDEF".into()),
            ..Default::default()
        };
        assert!(info.hash_matches("abcdef"));
        assert!(!info.hash_matches("abcde0"));
        assert!(!TransactionInfo::default().hash_matches("abcdef"));
    }
}
