//! # Protocol Configuration & Constants
//!
//! Every magic number of the Catapult wire format lives here. If you're
//! hardcoding an offset somewhere else, you're doing it wrong and you owe the
//! team coffee.
//!
//! Most of these values are dictated by the remote node. Changing them here
//! doesn't change the network; it just makes your payloads get rejected.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Public main network.
pub const NETWORK_MAIN_NET: u8 = 0x68;

/// Public test network.
pub const NETWORK_TEST_NET: u8 = 0x98;

/// Private (Mijin) network.
pub const NETWORK_MIJIN: u8 = 0x60;

/// Private test network. Every golden vector in this crate uses it.
pub const NETWORK_MIJIN_TEST: u8 = 0x90;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Nemesis block timestamp (2016-04-01T00:00:00Z) in Unix milliseconds.
/// Deadlines on the wire are counted from here, not from 1970.
pub const NEMESIS_EPOCH_MS: i64 = 1_459_468_800_000;

/// Deadline applied by the builders when the caller doesn't set one.
pub const DEFAULT_DEADLINE_HOURS: i64 = 2;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Private key length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Transaction hashes and generation hashes are 32-byte digests.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Decoded address length: network byte + RIPEMD-160 + 4-byte checksum.
pub const ADDRESS_DECODED_LENGTH: usize = 25;

/// Base32 (plain) address length.
pub const ADDRESS_ENCODED_LENGTH: usize = 40;

/// Checksum bytes appended to a raw address.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// Flag OR-ed into the first byte of an unresolved address that points to a
/// namespace alias instead of an account.
pub const ALIAS_ADDRESS_FLAG: u8 = 0x01;

// ---------------------------------------------------------------------------
// Transaction Layout
// ---------------------------------------------------------------------------

/// Offset of the signature inside a serialized transaction.
pub const SIGNATURE_OFFSET: usize = 4;

/// Offset of the signer public key inside a serialized transaction.
pub const SIGNER_OFFSET: usize = SIGNATURE_OFFSET + SIGNATURE_LENGTH;

/// First byte covered by the signature: everything from the version field on.
pub const SIGNABLE_OFFSET: usize = SIGNER_OFFSET + PUBLIC_KEY_LENGTH;

/// Size of the common header of a top-level transaction.
pub const TRANSACTION_HEADER_SIZE: usize = SIGNABLE_OFFSET + 2 + 2 + 8 + 8;

/// Size of the header of an embedded (aggregate inner) transaction.
pub const EMBEDDED_HEADER_SIZE: usize = 4 + PUBLIC_KEY_LENGTH + 2 + 2;

/// Inner transactions are padded to this boundary inside an aggregate.
pub const AGGREGATE_ALIGNMENT: usize = 8;

/// One appended cosignature: public key followed by signature.
pub const COSIGNATURE_SIZE: usize = PUBLIC_KEY_LENGTH + SIGNATURE_LENGTH;

/// Largest message payload that still fits the u16 size field (the type
/// byte takes one slot).
pub const MAX_MESSAGE_PAYLOAD: usize = u16::MAX as usize - 1;

/// Largest number of entries a one-byte count field can describe (mosaics,
/// multisig modifications).
pub const MAX_U8_COUNT: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// Transaction Types
// ---------------------------------------------------------------------------

pub const TRANSFER_TYPE: u16 = 0x4154;
pub const ACCOUNT_LINK_TYPE: u16 = 0x414C;
pub const MULTISIG_MODIFICATION_TYPE: u16 = 0x4155;
pub const AGGREGATE_COMPLETE_TYPE: u16 = 0x4141;
pub const AGGREGATE_BONDED_TYPE: u16 = 0x4241;

pub const TRANSFER_VERSION: u8 = 1;
pub const ACCOUNT_LINK_VERSION: u8 = 2;
pub const MULTISIG_MODIFICATION_VERSION: u8 = 1;
pub const AGGREGATE_VERSION: u8 = 2;

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Capacity of the internal multicast bus. Slow subscribers that fall this
/// far behind start losing events (and get a warning in the logs).
pub const LISTENER_BUS_CAPACITY: usize = 1024;

/// Deepest inner-transaction nesting the address matcher walks. Aggregates
/// can't nest today; this keeps the matcher finite if that ever changes.
pub const MAX_MATCH_DEPTH: usize = 8;

/// Runtime knobs for the event channel router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Capacity of the broadcast bus feeding every derived stream.
    pub bus_capacity: usize,
    /// Depth limit for recursive address matching through aggregates.
    pub max_match_depth: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bus_capacity: LISTENER_BUS_CAPACITY,
            max_match_depth: MAX_MATCH_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_offsets_match_wire_layout() {
        assert_eq!(SIGNER_OFFSET, 68);
        assert_eq!(SIGNABLE_OFFSET, 100);
        assert_eq!(TRANSACTION_HEADER_SIZE, 120);
        assert_eq!(EMBEDDED_HEADER_SIZE, 40);
    }

    #[test]
    fn listener_config_default_uses_constants() {
        let cfg = ListenerConfig::default();
        assert_eq!(cfg.bus_capacity, LISTENER_BUS_CAPACITY);
        assert_eq!(cfg.max_match_depth, MAX_MATCH_DEPTH);
    }

    #[test]
    fn listener_config_json_roundtrip() {
        let cfg = ListenerConfig {
            bus_capacity: 16,
            max_match_depth: 3,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ListenerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
