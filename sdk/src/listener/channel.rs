//! Push channel names and subscription keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ListenerError;
use crate::identity::Address;

/// One of the server's push channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenerChannel {
    #[serde(rename = "block")]
    Block,
    #[serde(rename = "confirmedAdded")]
    ConfirmedAdded,
    #[serde(rename = "unconfirmedAdded")]
    UnconfirmedAdded,
    #[serde(rename = "unconfirmedRemoved")]
    UnconfirmedRemoved,
    #[serde(rename = "partialAdded")]
    AggregateBondedAdded,
    #[serde(rename = "partialRemoved")]
    AggregateBondedRemoved,
    #[serde(rename = "cosignature")]
    Cosignature,
    #[serde(rename = "status")]
    Status,
}

impl ListenerChannel {
    pub const ALL: [ListenerChannel; 8] = [
        Self::Block,
        Self::ConfirmedAdded,
        Self::UnconfirmedAdded,
        Self::UnconfirmedRemoved,
        Self::AggregateBondedAdded,
        Self::AggregateBondedRemoved,
        Self::Cosignature,
        Self::Status,
    ];

    /// Name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::ConfirmedAdded => "confirmedAdded",
            Self::UnconfirmedAdded => "unconfirmedAdded",
            Self::UnconfirmedRemoved => "unconfirmedRemoved",
            Self::AggregateBondedAdded => "partialAdded",
            Self::AggregateBondedRemoved => "partialRemoved",
            Self::Cosignature => "cosignature",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for ListenerChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListenerChannel {
    type Err = ListenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.name() == s)
            .ok_or_else(|| ListenerError::malformed(format!("unknown channel '{s}'")))
    }
}

/// A physical subscription: a channel, optionally scoped to an address.
/// Renders as `channel` or `channel/ADDRESS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub channel: ListenerChannel,
    pub address: Option<Address>,
}

impl ChannelKey {
    pub fn global(channel: ListenerChannel) -> Self {
        Self {
            channel,
            address: None,
        }
    }

    pub fn scoped(channel: ListenerChannel, address: Address) -> Self {
        Self {
            channel,
            address: Some(address),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{}/{}", self.channel, address.plain()),
            None => write!(f, "{}", self.channel),
        }
    }
}
