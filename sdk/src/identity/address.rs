//! # Addresses
//!
//! A Catapult address is 25 bytes derived from a public key:
//!
//! ```text
//! public_key (32 bytes)
//!     -> H256(public_key)                       (SHA3-256 or Keccak-256)
//!     -> RIPEMD-160                             -> 20 bytes
//!     -> network byte ++ ripemd                 -> 21 bytes
//!     -> ++ H256(those 21 bytes)[0..4]          -> 25 bytes (checksum)
//!     -> base32                                 -> 40 chars, e.g. SDUP5P...
//! ```
//!
//! Humans get the "pretty" form with a dash every six characters. The wire
//! gets the raw 25 bytes. REST and websocket payloads use the hex of those
//! bytes ("encoded").
//!
//! A transfer recipient may also be a namespace alias instead of an account:
//! see [`UnresolvedAddress`].

use data_encoding::BASE32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::network::NetworkType;
use crate::config::{
    ADDRESS_CHECKSUM_LENGTH, ADDRESS_DECODED_LENGTH, ADDRESS_ENCODED_LENGTH, ALIAS_ADDRESS_FLAG,
};
use crate::crypto::{ripemd160, PublicKey};

/// Errors that can occur while parsing addresses and network identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("address is not valid base32: {0}")]
    InvalidBase32(String),

    #[error("address is not valid hex: {0}")]
    InvalidHex(String),

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("unknown network identifier 0x{0:02X}")]
    UnknownNetwork(u8),

    #[error("unknown network name '{0}'")]
    UnknownNetworkName(String),

    #[error("unresolved alias has non-zero fill bytes")]
    InvalidAliasPadding,
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A resolved account address. Serializes as the plain base32 form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    bytes: [u8; ADDRESS_DECODED_LENGTH],
}

impl Address {
    /// Derive the address of `public_key` on `network`.
    pub fn from_public_key(public_key: &PublicKey, network: NetworkType) -> Self {
        let schema = network.sign_schema();
        let key_hash = schema.hash256(&[public_key.as_bytes()]);
        let ripemd = ripemd160(&key_hash);

        let mut bytes = [0u8; ADDRESS_DECODED_LENGTH];
        bytes[0] = network.identifier();
        bytes[1..21].copy_from_slice(&ripemd);
        let checksum = schema.hash256(&[&bytes[..21]]);
        bytes[21..].copy_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);
        Self { bytes }
    }

    /// Validate raw address bytes: known network byte and matching checksum.
    pub fn from_bytes(bytes: [u8; ADDRESS_DECODED_LENGTH]) -> Result<Self, AddressError> {
        let network = NetworkType::from_identifier(bytes[0])?;
        let checksum = network.sign_schema().hash256(&[&bytes[..21]]);
        if checksum[..ADDRESS_CHECKSUM_LENGTH] != bytes[21..] {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(Self { bytes })
    }

    /// Parse a plain (`SDUP5P...`) or pretty (`SDUP5P-LHDXKB-...`) address.
    pub fn from_raw(raw: &str) -> Result<Self, AddressError> {
        let plain: String = raw.trim().replace('-', "").to_ascii_uppercase();
        if plain.len() != ADDRESS_ENCODED_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_ENCODED_LENGTH,
                got: plain.len(),
            });
        }
        let decoded = BASE32
            .decode(plain.as_bytes())
            .map_err(|e| AddressError::InvalidBase32(e.to_string()))?;
        Self::from_slice(&decoded)
    }

    /// Parse the hex form used by REST and websocket payloads.
    pub fn from_encoded(encoded: &str) -> Result<Self, AddressError> {
        let decoded = hex::decode(encoded).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&decoded)
    }

    fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; ADDRESS_DECODED_LENGTH] =
            slice.try_into().map_err(|_| AddressError::InvalidLength {
                expected: ADDRESS_DECODED_LENGTH,
                got: slice.len(),
            })?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_DECODED_LENGTH] {
        &self.bytes
    }

    /// Network this address lives on. Validated at construction.
    pub fn network_type(&self) -> NetworkType {
        NetworkType::from_identifier(self.bytes[0]).unwrap_or(NetworkType::MijinTest)
    }

    /// Base32 form without dashes.
    pub fn plain(&self) -> String {
        BASE32.encode(&self.bytes)
    }

    /// Base32 form with a dash every six characters.
    pub fn pretty(&self) -> String {
        self.plain()
            .as_bytes()
            .chunks(6)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Upper-case hex of the raw bytes.
    pub fn encoded(&self) -> String {
        hex::encode_upper(self.bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.plain())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_raw(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.plain()
    }
}

// ---------------------------------------------------------------------------
// UnresolvedAddress
// ---------------------------------------------------------------------------

/// A recipient as it appears on the wire: either a concrete account or a
/// namespace alias the node resolves at execution time.
///
/// Aliases are laid out as `network | 0x01`, the namespace id as u64 LE, and
/// sixteen zero bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum UnresolvedAddress {
    Address { address: Address },
    Alias { network_type: NetworkType, namespace_id: u64 },
}

impl UnresolvedAddress {
    /// The 25-byte wire form.
    pub fn to_bytes(&self) -> [u8; ADDRESS_DECODED_LENGTH] {
        match self {
            Self::Address { address } => *address.as_bytes(),
            Self::Alias {
                network_type,
                namespace_id,
            } => {
                let mut bytes = [0u8; ADDRESS_DECODED_LENGTH];
                bytes[0] = network_type.identifier() | ALIAS_ADDRESS_FLAG;
                bytes[1..9].copy_from_slice(&namespace_id.to_le_bytes());
                bytes
            }
        }
    }

    /// Parse the 25-byte wire form.
    pub fn from_bytes(bytes: [u8; ADDRESS_DECODED_LENGTH]) -> Result<Self, AddressError> {
        if bytes[0] & ALIAS_ADDRESS_FLAG == 0 {
            return Ok(Self::Address {
                address: Address::from_bytes(bytes)?,
            });
        }
        let network_type = NetworkType::from_identifier(bytes[0] & !ALIAS_ADDRESS_FLAG)?;
        if bytes[9..].iter().any(|b| *b != 0) {
            return Err(AddressError::InvalidAliasPadding);
        }
        let mut id = [0u8; 8];
        id.copy_from_slice(&bytes[1..9]);
        Ok(Self::Alias {
            network_type,
            namespace_id: u64::from_le_bytes(id),
        })
    }

    /// The concrete address, if this isn't an alias.
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address { address } => Some(address),
            Self::Alias { .. } => None,
        }
    }
}

impl From<Address> for UnresolvedAddress {
    fn from(address: Address) -> Self {
        Self::Address { address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyPair, SignSchema};

    const RECIPIENT: &str = "SDUP5PLHDXKBX3UU5Q52LAY4WYEKGEWC6IB3VBFM";

    #[test]
    fn parses_plain_and_pretty_forms() {
        let plain = Address::from_raw(RECIPIENT).unwrap();
        let pretty = Address::from_raw("SDGLFW-DSHILT-IUHGIB-H5UGX2-VYF5VN-JEKCCD-BR26").unwrap();
        assert_eq!(plain.plain(), RECIPIENT);
        assert_eq!(pretty.pretty(), "SDGLFW-DSHILT-IUHGIB-H5UGX2-VYF5VN-JEKCCD-BR26");
        assert_eq!(plain.network_type(), NetworkType::MijinTest);
    }

    #[test]
    fn encoded_form_is_raw_hex() {
        let address = Address::from_raw(RECIPIENT).unwrap();
        assert_eq!(
            address.encoded(),
            "90E8FEBD671DD41BEE94EC3BA5831CB608A312C2F203BA84AC"
        );
        assert_eq!(Address::from_encoded(&address.encoded()).unwrap(), address);
    }

    #[test]
    fn derives_address_from_public_key() {
        let kp = KeyPair::from_hex(
            "787225aaff3d2c71f4ffa32d4f19ec4922f3cd869747f267378f81f8e3fcb12d",
            SignSchema::Sha3,
        )
        .unwrap();
        let address = Address::from_public_key(&kp.public_key(), NetworkType::MijinTest);
        assert_eq!(address.plain(), "SDRDGFTDLLCB67D4HPGIMIHPNSRYRJRT7DOBGWZY");
    }

    #[test]
    fn derived_address_starts_with_network_prefix() {
        for network in [NetworkType::MainNet, NetworkType::TestNet, NetworkType::Mijin] {
            let kp = KeyPair::generate(network.sign_schema());
            let address = Address::from_public_key(&kp.public_key(), network);
            assert!(address.plain().starts_with(network.address_prefix()));
            assert_eq!(Address::from_raw(&address.plain()).unwrap(), address);
        }
    }

    #[test]
    fn checksum_is_enforced() {
        // Last character flipped.
        let err = Address::from_raw("SDUP5PLHDXKBX3UU5Q52LAY4WYEKGEWC6IB3VBFA").unwrap_err();
        assert_eq!(err, AddressError::ChecksumMismatch);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(matches!(
            Address::from_raw("SDUP5P").unwrap_err(),
            AddressError::InvalidLength { got: 6, .. }
        ));
    }

    #[test]
    fn alias_wire_roundtrip() {
        let alias = UnresolvedAddress::Alias {
            network_type: NetworkType::MijinTest,
            namespace_id: 0x85BB_EA6C_C462_B244,
        };
        let bytes = alias.to_bytes();
        assert_eq!(bytes[0], 0x91);
        assert_eq!(UnresolvedAddress::from_bytes(bytes).unwrap(), alias);
        assert!(alias.as_address().is_none());
    }

    #[test]
    fn alias_with_garbage_fill_rejected() {
        let mut bytes = UnresolvedAddress::Alias {
            network_type: NetworkType::MijinTest,
            namespace_id: 1,
        }
        .to_bytes();
        bytes[24] = 0xFF;
        assert_eq!(
            UnresolvedAddress::from_bytes(bytes).unwrap_err(),
            AddressError::InvalidAliasPadding
        );
    }

    #[test]
    fn address_serializes_as_plain_string() {
        let address = Address::from_raw(RECIPIENT).unwrap();
        assert_eq!(
            serde_json::to_string(&address).unwrap(),
            format!("\"{RECIPIENT}\"")
        );
    }
}
