//! Accounts: a public key bound to a network, with or without the private
//! half.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::Address;
use super::network::NetworkType;
use crate::crypto::{DsaSigner, KeyError, KeyPair, PublicKey, SignSchema, Signature, SigningError};

/// A public key on a specific network. This is what cosigners, signers of
/// embedded transactions, and listener filters deal in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub public_key: PublicKey,
    pub network_type: NetworkType,
}

impl PublicAccount {
    pub fn new(public_key: PublicKey, network_type: NetworkType) -> Self {
        Self {
            public_key,
            network_type,
        }
    }

    pub fn from_hex(public_key_hex: &str, network_type: NetworkType) -> Result<Self, KeyError> {
        Ok(Self::new(PublicKey::from_hex(public_key_hex)?, network_type))
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key, self.network_type)
    }

    /// Verify `signature` over `data` with this account's network schema.
    pub fn verify(&self, data: &[u8], signature: &Signature) -> bool {
        self.public_key
            .verify(data, signature, self.network_type.sign_schema())
    }
}

impl fmt::Display for PublicAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address().pretty(), self.network_type)
    }
}

/// A local account holding its private key. The key schema always follows
/// the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    key_pair: KeyPair,
    network_type: NetworkType,
}

impl Account {
    pub fn generate(network_type: NetworkType) -> Self {
        Self {
            key_pair: KeyPair::generate(network_type.sign_schema()),
            network_type,
        }
    }

    pub fn from_private_key_hex(
        private_key_hex: &str,
        network_type: NetworkType,
    ) -> Result<Self, KeyError> {
        Ok(Self {
            key_pair: KeyPair::from_hex(private_key_hex, network_type.sign_schema())?,
            network_type,
        })
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn public_account(&self) -> PublicAccount {
        PublicAccount::new(self.key_pair.public_key(), self.network_type)
    }

    pub fn address(&self) -> Address {
        self.public_account().address()
    }

    pub fn private_key_hex(&self) -> String {
        self.key_pair.private_key_hex()
    }
}

impl DsaSigner for Account {
    fn public_key(&self) -> PublicKey {
        self.key_pair.public_key()
    }

    fn schema(&self) -> SignSchema {
        self.key_pair.schema()
    }

    fn sign(&self, data: &[u8]) -> Result<Signature, SigningError> {
        Ok(self.key_pair.sign(data))
    }
}
