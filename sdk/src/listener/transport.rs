//! The outbound half of a push connection.
//!
//! The listener never owns a socket. A transport connects, sends
//! subscribe/unsubscribe frames, and closes; whatever reads from the socket
//! feeds inbound messages to [`super::Listener::handle`].

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;

use super::error::TransportError;

#[async_trait]
pub trait ListenerTransport: Send + Sync + 'static {
    /// Start connecting. The session is established once the server's `uid`
    /// message reaches the listener.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Queue a subscribe frame for `channel` (`name` or `name/ADDRESS`).
    /// Must not block; called from subscription setup and teardown paths.
    fn subscribe(&self, uid: &str, channel: &str) -> Result<(), TransportError>;

    fn unsubscribe(&self, uid: &str, channel: &str) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// `{"uid": …, "subscribe": …}`
pub fn subscribe_frame(uid: &str, channel: &str) -> String {
    json!({ "uid": uid, "subscribe": channel }).to_string()
}

/// `{"uid": …, "unsubscribe": …}`
pub fn unsubscribe_frame(uid: &str, channel: &str) -> String {
    json!({ "uid": uid, "unsubscribe": channel }).to_string()
}

/// Something a [`QueuedTransport`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Connect,
    Frame(String),
    Close,
}

/// Transport that forwards every request to an mpsc queue. A websocket
/// writer task (or a test) drains the receiving end.
#[derive(Debug, Clone)]
pub struct QueuedTransport {
    outbound: mpsc::UnboundedSender<TransportCommand>,
}

impl QueuedTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportCommand>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { outbound }, rx)
    }

    fn push(&self, command: TransportCommand) -> Result<(), TransportError> {
        self.outbound
            .send(command)
            .map_err(|_| TransportError::Send("outbound queue closed".into()))
    }
}

#[async_trait]
impl ListenerTransport for QueuedTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        self.push(TransportCommand::Connect)
            .map_err(|e| TransportError::Connect(e.to_string()))
    }

    fn subscribe(&self, uid: &str, channel: &str) -> Result<(), TransportError> {
        self.push(TransportCommand::Frame(subscribe_frame(uid, channel)))
    }

    fn unsubscribe(&self, uid: &str, channel: &str) -> Result<(), TransportError> {
        self.push(TransportCommand::Frame(unsubscribe_frame(uid, channel)))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.push(TransportCommand::Close)
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn frames_are_json_objects() {
        let frame: Value = serde_json::from_str(&subscribe_frame("abc", "block")).unwrap();
        assert_eq!(frame, json!({ "uid": "abc", "subscribe": "block" }));
        let frame: Value =
            serde_json::from_str(&unsubscribe_frame("abc", "status/SDUP")).unwrap();
        assert_eq!(frame, json!({ "uid": "abc", "unsubscribe": "status/SDUP" }));
    }

    #[tokio::test]
    async fn queued_transport_forwards_in_order() {
        let (transport, mut rx) = QueuedTransport::new();
        transport.connect().await.unwrap();
        transport.subscribe("u", "block").unwrap();
        transport.close().await.unwrap();

        assert_eq!(rx.recv().await, Some(TransportCommand::Connect));
        assert_eq!(
            rx.recv().await,
            Some(TransportCommand::Frame(subscribe_frame("u", "block")))
        );
        assert_eq!(rx.recv().await, Some(TransportCommand::Close));
    }

    #[tokio::test]
    async fn dropped_receiver_surfaces_as_error() {
        let (transport, rx) = QueuedTransport::new();
        drop(rx);
        assert!(matches!(
            transport.connect().await,
            Err(TransportError::Connect(_))
        ));
        assert!(matches!(
            transport.subscribe("u", "block"),
            Err(TransportError::Send(_))
        ));
    }
}
