//! Waiting for the outcome of an announced transaction.
//!
//! The node reports a transaction either on its target channel (confirmed,
//! or partial for bonded aggregates) or on `status` when it rejects it.
//! Whichever arrives first settles the wait.

use futures::future::{BoxFuture, FutureExt};
use futures::StreamExt;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use super::channel::{ChannelKey, ListenerChannel};
use super::error::{CorrelationError, ListenerError};
use super::filter::transaction_from_address;
use super::message::ListenerPayload;
use super::router::Listener;
use crate::identity::Address;
use crate::transaction::Transaction;

/// A pending transaction outcome. Resolves once; there is no timeout, so
/// wrap it in `tokio::time::timeout` when one is needed.
///
/// Fails with [`ListenerError::Lagged`] if the bus overran the correlation
/// before it saw an outcome, since the outcome may have been dropped.
pub type Correlation = BoxFuture<'static, Result<Transaction, ListenerError>>;

impl Listener {
    /// Resolve with the confirmed transaction whose hash is `hash`, or fail
    /// with [`CorrelationError`] if a status error for it arrives first.
    ///
    /// Both channels are subscribed before this returns, so the transaction
    /// may be announced right after the call.
    pub fn confirmed_with_hash(
        &self,
        address: &Address,
        hash: &str,
    ) -> Result<Correlation, ListenerError> {
        self.correlate(ListenerChannel::ConfirmedAdded, address, hash)
    }

    /// Like [`Listener::confirmed_with_hash`], for a bonded aggregate
    /// reaching the partial pool.
    pub fn aggregate_bonded_added_with_hash(
        &self,
        address: &Address,
        hash: &str,
    ) -> Result<Correlation, ListenerError> {
        self.correlate(ListenerChannel::AggregateBondedAdded, address, hash)
    }

    fn correlate(
        &self,
        target: ListenerChannel,
        address: &Address,
        hash: &str,
    ) -> Result<Correlation, ListenerError> {
        let (uid, rx) = self.session()?;
        let target_guard = self.acquire(ChannelKey::scoped(target, *address), &uid)?;
        let status_guard = self.acquire(ChannelKey::scoped(ListenerChannel::Status, *address), &uid)?;

        let address = *address;
        let hash = hash.to_owned();
        let depth = self.config().max_match_depth;
        debug!(channel = %target, %address, hash = %hash, "awaiting transaction outcome");

        Ok(async move {
            let _guards = (target_guard, status_guard);
            // One receiver for both channels keeps arrival order intact.
            let mut events = BroadcastStream::new(rx);
            while let Some(item) = events.next().await {
                let message = match item {
                    Ok(message) => message,
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, hash = %hash, "correlation lagged; outcome may be lost");
                        return Err(ListenerError::Lagged { skipped });
                    }
                };
                match &message.payload {
                    ListenerPayload::Transaction(tx)
                        if message.channel == target
                            && tx.info.as_ref().is_some_and(|info| info.hash_matches(&hash))
                            && transaction_from_address(tx, &address, depth) =>
                    {
                        debug!(channel = %target, hash = %hash, "transaction settled");
                        return Ok((**tx).clone());
                    }
                    ListenerPayload::Status(status)
                        if message.channel == ListenerChannel::Status
                            && status.address == address
                            && status.hash.eq_ignore_ascii_case(&hash) =>
                    {
                        debug!(hash = %hash, code = %status.code, "transaction rejected");
                        return Err(CorrelationError {
                            code: status.code.clone(),
                            address,
                            hash: status.hash.clone(),
                        }
                        .into());
                    }
                    _ => {}
                }
            }
            Err(ListenerError::Closed)
        }
        .boxed())
    }
}
