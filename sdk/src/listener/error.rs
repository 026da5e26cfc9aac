//! Listener error types.

use thiserror::Error;

use crate::identity::Address;

/// Raised by a [`super::ListenerTransport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("failed to send frame: {0}")]
    Send(String),

    #[error("failed to close: {0}")]
    Close(String),
}

/// A status event arrived for the transaction being waited on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction {hash} for {address} failed: {code}")]
pub struct CorrelationError {
    /// Status code reported by the node, e.g. `Failure_Core_Insufficient_Balance`.
    pub code: String,
    pub address: Address,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("listener has not been opened; call open() before subscribing")]
    NotOpened,

    #[error("listener is closed")]
    Closed,

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The bus overran this receiver; the awaited outcome may have been
    /// among the skipped events.
    #[error("listener fell behind by {skipped} events")]
    Lagged { skipped: u64 },

    #[error("malformed push message: {0}")]
    Malformed(String),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

impl ListenerError {
    pub(crate) fn malformed(what: impl std::fmt::Display) -> Self {
        Self::Malformed(what.to_string())
    }
}
