//! The event channel router.
//!
//! ```text
//!  transport reader ──handle()──► classify ──► broadcast bus ──┬─► confirmed(a)
//!                                                             ├─► status(a)
//!                                                             └─► ...
//! ```
//!
//! Every derived stream holds one reference on its physical channel
//! (`name/ADDRESS`). The first reference sends the subscribe frame; dropping
//! the last one sends the unsubscribe frame.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, trace, warn};

use super::channel::{ChannelKey, ListenerChannel};
use super::dto;
use super::error::ListenerError;
use super::filter::transaction_from_address;
use super::message::{BlockInfo, ListenerMessage, ListenerPayload, TransactionStatusError};
use super::transport::ListenerTransport;
use crate::config::ListenerConfig;
use crate::identity::Address;
use crate::transaction::{CosignatureSignedTransaction, Transaction};

type Bus = broadcast::Sender<Arc<ListenerMessage>>;
type BusReceiver = broadcast::Receiver<Arc<ListenerMessage>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Opening,
    Open,
    Closed,
}

struct Inner {
    transport: Arc<dyn ListenerTransport>,
    config: ListenerConfig,
    state: watch::Sender<ConnectionState>,
    uid: RwLock<Option<String>>,
    /// Taken on close so every derived stream ends.
    bus: RwLock<Option<Bus>>,
    /// Physical channel name -> number of live derived streams.
    subscriptions: DashMap<String, usize>,
}

/// Routes push messages from one connection to any number of typed streams.
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct Listener {
    inner: Arc<Inner>,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("state", &self.state())
            .field("uid", &self.uid())
            .field("channels", &self.inner.subscriptions.len())
            .finish()
    }
}

impl Listener {
    pub fn new(transport: Arc<dyn ListenerTransport>) -> Self {
        Self::with_config(transport, ListenerConfig::default())
    }

    pub fn with_config(transport: Arc<dyn ListenerTransport>, config: ListenerConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Unopened);
        let (bus, _) = broadcast::channel(config.bus_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                state,
                uid: RwLock::new(None),
                bus: RwLock::new(Some(bus)),
                subscriptions: DashMap::new(),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Session id assigned by the server, once the connection is open.
    pub fn uid(&self) -> Option<String> {
        self.inner.uid.read().clone()
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.inner.config
    }

    /// Connect and wait for the server's `uid` message.
    ///
    /// Concurrent callers share one connection attempt. Returns immediately
    /// if the session is already open.
    pub async fn open(&self) -> Result<(), ListenerError> {
        let mut started = false;
        self.inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Unopened {
                *state = ConnectionState::Opening;
                started = true;
                return true;
            }
            false
        });

        match self.state() {
            ConnectionState::Open => return Ok(()),
            ConnectionState::Closed => return Err(ListenerError::Closed),
            _ => {}
        }

        if started {
            debug!("listener connecting");
            if let Err(e) = self.inner.transport.connect().await {
                warn!(error = %e, "listener failed to connect");
                self.inner.state.send_if_modified(|state| {
                    let reset = *state == ConnectionState::Opening;
                    if reset {
                        *state = ConnectionState::Unopened;
                    }
                    reset
                });
                return Err(e.into());
            }
        }

        let mut state = self.inner.state.subscribe();
        let reached = *state
            .wait_for(|s| matches!(s, ConnectionState::Open | ConnectionState::Closed))
            .await
            .map_err(|_| ListenerError::Closed)?;
        match reached {
            ConnectionState::Open => Ok(()),
            _ => Err(ListenerError::Closed),
        }
    }

    /// Close the connection. Every derived stream ends and pending
    /// correlations fail with [`ListenerError::Closed`].
    pub async fn close(&self) -> Result<(), ListenerError> {
        let previous = self.inner.state.send_replace(ConnectionState::Closed);
        if previous == ConnectionState::Closed {
            return Ok(());
        }
        self.inner.bus.write().take();
        self.inner.subscriptions.clear();
        debug!(previous = ?previous, "listener closed");

        if previous != ConnectionState::Unopened {
            self.inner.transport.close().await?;
        }
        Ok(())
    }

    /// Feed one raw text frame from the transport.
    pub fn handle_text(&self, text: &str) -> Result<Option<ListenerChannel>, ListenerError> {
        let value: Value = serde_json::from_str(text).map_err(ListenerError::malformed)?;
        self.handle(&value)
    }

    /// Classify one inbound message and publish it on the bus.
    ///
    /// Returns the channel the message was routed to, or `None` for the
    /// session ack and for messages that were dropped.
    pub fn handle(&self, message: &Value) -> Result<Option<ListenerChannel>, ListenerError> {
        let Some(object) = message.as_object() else {
            return Err(ListenerError::malformed("push message is not a JSON object"));
        };

        if let Some(uid) = object.get("uid") {
            let uid = uid
                .as_str()
                .ok_or_else(|| ListenerError::malformed("uid is not a string"))?;
            self.accept_uid(uid);
            return Ok(None);
        }

        let state = self.state();
        if state != ConnectionState::Open {
            debug!(state = ?state, "dropping push message outside an open session");
            return Ok(None);
        }

        let classified = if object.contains_key("transaction") {
            let (channel, tx) = dto::transaction_event(message)?;
            ListenerMessage::new(channel, ListenerPayload::Transaction(Box::new(tx)))
        } else if object.contains_key("block") {
            let block = dto::block_event(message)?;
            ListenerMessage::new(ListenerChannel::Block, ListenerPayload::Block(Box::new(block)))
        } else if object.contains_key("code") {
            let status = dto::status_event(message)?;
            ListenerMessage::new(ListenerChannel::Status, ListenerPayload::Status(status))
        } else if object.contains_key("parentHash") {
            let cosignature = dto::cosignature_event(message)?;
            ListenerMessage::new(
                ListenerChannel::Cosignature,
                ListenerPayload::Cosignature(cosignature),
            )
        } else if object.contains_key("meta") {
            let (channel, hash) = dto::hash_event(message)?;
            ListenerMessage::new(channel, ListenerPayload::Hash(hash))
        } else {
            debug!("dropping unrecognised push message");
            return Ok(None);
        };

        let channel = classified.channel;
        self.publish(classified);
        Ok(Some(channel))
    }

    fn accept_uid(&self, uid: &str) {
        let inner = &self.inner;
        let opened = inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Opening {
                *inner.uid.write() = Some(uid.to_owned());
                *state = ConnectionState::Open;
                return true;
            }
            false
        });
        if opened {
            debug!(uid, "listener session open");
        } else {
            debug!(uid, state = ?self.state(), "ignoring uid outside a connection attempt");
        }
    }

    fn publish(&self, message: ListenerMessage) {
        let channel = message.channel;
        let bus = self.inner.bus.read();
        let Some(bus) = bus.as_ref() else {
            return;
        };
        match bus.send(Arc::new(message)) {
            Ok(receivers) => trace!(%channel, receivers, "published"),
            Err(_) => trace!(%channel, "no receivers; event dropped"),
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Session uid plus a fresh bus receiver. The receiver is created before
    /// any subscribe frame goes out so no event can slip past it.
    pub(super) fn session(&self) -> Result<(String, BusReceiver), ListenerError> {
        match self.state() {
            ConnectionState::Open => {}
            ConnectionState::Closed => return Err(ListenerError::Closed),
            ConnectionState::Unopened | ConnectionState::Opening => {
                return Err(ListenerError::NotOpened)
            }
        }
        let uid = self.uid().ok_or(ListenerError::NotOpened)?;
        let rx = self
            .inner
            .bus
            .read()
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or(ListenerError::Closed)?;
        Ok((uid, rx))
    }

    pub(super) fn acquire(&self, key: ChannelKey, uid: &str) -> Result<ChannelGuard, ListenerError> {
        let name = key.to_string();
        match self.inner.subscriptions.entry(name.clone()) {
            Entry::Occupied(mut entry) => *entry.get_mut() += 1,
            Entry::Vacant(entry) => {
                self.inner.transport.subscribe(uid, &name)?;
                debug!(channel = %name, "subscribed");
                entry.insert(1);
            }
        }
        Ok(ChannelGuard {
            inner: Arc::clone(&self.inner),
            name,
        })
    }

    fn derive<T, F>(&self, key: ChannelKey, mut pick: F) -> Result<Subscription<T>, ListenerError>
    where
        T: Send + 'static,
        F: FnMut(&ListenerMessage) -> Option<T> + Send + 'static,
    {
        let (uid, rx) = self.session()?;
        let guard = self.acquire(key, &uid)?;
        let channel = key.channel;
        let events = bus_events(rx)
            .filter_map(move |message| {
                let picked = if message.channel == channel {
                    pick(&*message)
                } else {
                    None
                };
                future::ready(picked)
            })
            .boxed();
        Ok(Subscription {
            events,
            _guard: guard,
        })
    }

    fn transactions(
        &self,
        channel: ListenerChannel,
        address: &Address,
    ) -> Result<Subscription<Transaction>, ListenerError> {
        let address = *address;
        let depth = self.inner.config.max_match_depth;
        self.derive(ChannelKey::scoped(channel, address), move |message| {
            message
                .as_transaction()
                .filter(|tx| transaction_from_address(tx, &address, depth))
                .cloned()
        })
    }

    fn hashes(
        &self,
        channel: ListenerChannel,
        address: &Address,
    ) -> Result<Subscription<String>, ListenerError> {
        self.derive(ChannelKey::scoped(channel, *address), |message| {
            match &message.payload {
                ListenerPayload::Hash(hash) => Some(hash.clone()),
                _ => None,
            }
        })
    }

    // -----------------------------------------------------------------------
    // Derived streams
    // -----------------------------------------------------------------------

    pub fn new_block(&self) -> Result<Subscription<BlockInfo>, ListenerError> {
        self.derive(ChannelKey::global(ListenerChannel::Block), |message| {
            match &message.payload {
                ListenerPayload::Block(block) => Some((**block).clone()),
                _ => None,
            }
        })
    }

    pub fn confirmed(&self, address: &Address) -> Result<Subscription<Transaction>, ListenerError> {
        self.transactions(ListenerChannel::ConfirmedAdded, address)
    }

    pub fn unconfirmed_added(
        &self,
        address: &Address,
    ) -> Result<Subscription<Transaction>, ListenerError> {
        self.transactions(ListenerChannel::UnconfirmedAdded, address)
    }

    /// Hashes of transactions leaving the unconfirmed pool.
    pub fn unconfirmed_removed(
        &self,
        address: &Address,
    ) -> Result<Subscription<String>, ListenerError> {
        self.hashes(ListenerChannel::UnconfirmedRemoved, address)
    }

    pub fn aggregate_bonded_added(
        &self,
        address: &Address,
    ) -> Result<Subscription<Transaction>, ListenerError> {
        self.transactions(ListenerChannel::AggregateBondedAdded, address)
    }

    pub fn aggregate_bonded_removed(
        &self,
        address: &Address,
    ) -> Result<Subscription<String>, ListenerError> {
        self.hashes(ListenerChannel::AggregateBondedRemoved, address)
    }

    pub fn status(
        &self,
        address: &Address,
    ) -> Result<Subscription<TransactionStatusError>, ListenerError> {
        let address = *address;
        self.derive(
            ChannelKey::scoped(ListenerChannel::Status, address),
            move |message| message.as_status().filter(|s| s.address == address).cloned(),
        )
    }

    pub fn cosignature_added(
        &self,
        address: &Address,
    ) -> Result<Subscription<CosignatureSignedTransaction>, ListenerError> {
        self.derive(
            ChannelKey::scoped(ListenerChannel::Cosignature, *address),
            |message| match &message.payload {
                ListenerPayload::Cosignature(cosignature) => Some(cosignature.clone()),
                _ => None,
            },
        )
    }
}

/// Bus receiver as a stream. Lag drops events for this receiver only.
fn bus_events(rx: BusReceiver) -> BoxStream<'static, Arc<ListenerMessage>> {
    BroadcastStream::new(rx)
        .filter_map(|item| {
            future::ready(match item {
                Ok(message) => Some(message),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "listener subscriber lagged; events dropped");
                    None
                }
            })
        })
        .boxed()
}

/// One reference on a physical channel subscription.
pub(super) struct ChannelGuard {
    inner: Arc<Inner>,
    name: String,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        let inner = &self.inner;
        // The unsubscribe frame goes out under the map's shard lock so a
        // concurrent re-subscribe can't be overtaken by it.
        inner.subscriptions.remove_if_mut(&self.name, |name, count| {
            *count = count.saturating_sub(1);
            if *count > 0 {
                return false;
            }
            if *inner.state.borrow() == ConnectionState::Open {
                if let Some(uid) = inner.uid.read().as_deref() {
                    match inner.transport.unsubscribe(uid, name) {
                        Ok(()) => debug!(channel = %name, "unsubscribed"),
                        Err(e) => warn!(channel = %name, error = %e, "failed to unsubscribe"),
                    }
                }
            }
            true
        });
    }
}

/// A typed event stream. Dropping it releases the channel subscription.
#[must_use = "dropping a subscription unsubscribes it"]
pub struct Subscription<T> {
    events: BoxStream<'static, T>,
    _guard: ChannelGuard,
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self._guard.name)
            .finish()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.events.poll_next_unpin(cx)
    }
}
