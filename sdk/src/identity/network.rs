//! Network identifiers.
//!
//! The network byte shows up in three places: the high byte of every
//! transaction's version field, the first byte of every address, and
//! (indirectly) the signature scheme, since public and private networks
//! disagree on which hash family Ed25519 runs over.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::address::AddressError;
use crate::config::{NETWORK_MAIN_NET, NETWORK_MIJIN, NETWORK_MIJIN_TEST, NETWORK_TEST_NET};
use crate::crypto::SignSchema;

/// The Catapult network a transaction or address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    MainNet,
    TestNet,
    Mijin,
    MijinTest,
}

impl NetworkType {
    /// Wire identifier.
    pub fn identifier(self) -> u8 {
        match self {
            Self::MainNet => NETWORK_MAIN_NET,
            Self::TestNet => NETWORK_TEST_NET,
            Self::Mijin => NETWORK_MIJIN,
            Self::MijinTest => NETWORK_MIJIN_TEST,
        }
    }

    /// Inverse of [`NetworkType::identifier`].
    pub fn from_identifier(identifier: u8) -> Result<Self, AddressError> {
        match identifier {
            NETWORK_MAIN_NET => Ok(Self::MainNet),
            NETWORK_TEST_NET => Ok(Self::TestNet),
            NETWORK_MIJIN => Ok(Self::Mijin),
            NETWORK_MIJIN_TEST => Ok(Self::MijinTest),
            other => Err(AddressError::UnknownNetwork(other)),
        }
    }

    /// Signature scheme (and hash family) used on this network.
    pub fn sign_schema(self) -> SignSchema {
        match self {
            Self::MainNet | Self::TestNet => SignSchema::KeccakReversedKey,
            Self::Mijin | Self::MijinTest => SignSchema::Sha3,
        }
    }

    /// First character of a base32 address on this network.
    pub fn address_prefix(self) -> char {
        match self {
            Self::MainNet => 'N',
            Self::TestNet => 'T',
            Self::Mijin => 'M',
            Self::MijinTest => 'S',
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MainNet => "MAIN_NET",
            Self::TestNet => "TEST_NET",
            Self::Mijin => "MIJIN",
            Self::MijinTest => "MIJIN_TEST",
        };
        f.write_str(name)
    }
}

impl FromStr for NetworkType {
    type Err = AddressError;

    /// Accepts the canonical names (case-insensitive, `-` or `_`) and the
    /// decimal wire identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "MAIN_NET" | "MAINNET" => Ok(Self::MainNet),
            "TEST_NET" | "TESTNET" => Ok(Self::TestNet),
            "MIJIN" => Ok(Self::Mijin),
            "MIJIN_TEST" => Ok(Self::MijinTest),
            other => other
                .parse::<u8>()
                .map_err(|_| AddressError::UnknownNetworkName(s.to_string()))
                .and_then(Self::from_identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_roundtrip() {
        for network in [
            NetworkType::MainNet,
            NetworkType::TestNet,
            NetworkType::Mijin,
            NetworkType::MijinTest,
        ] {
            assert_eq!(
                NetworkType::from_identifier(network.identifier()).unwrap(),
                network
            );
            assert_eq!(network.to_string().parse::<NetworkType>().unwrap(), network);
        }
    }

    #[test]
    fn unknown_identifier_rejected() {
        assert_eq!(
            NetworkType::from_identifier(0x42).unwrap_err(),
            AddressError::UnknownNetwork(0x42)
        );
    }

    #[test]
    fn parses_decimal_identifier_and_loose_names() {
        assert_eq!("144".parse::<NetworkType>().unwrap(), NetworkType::MijinTest);
        assert_eq!("mijin-test".parse::<NetworkType>().unwrap(), NetworkType::MijinTest);
        assert!("moonnet".parse::<NetworkType>().is_err());
    }

    #[test]
    fn private_networks_use_sha3() {
        assert_eq!(NetworkType::MijinTest.sign_schema(), SignSchema::Sha3);
        assert_eq!(
            NetworkType::MainNet.sign_schema(),
            SignSchema::KeccakReversedKey
        );
    }
}
