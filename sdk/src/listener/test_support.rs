//! Push-message fixtures shared by the listener tests.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use super::router::Listener;
use super::transport::{QueuedTransport, TransportCommand};
use crate::config::ListenerConfig;

pub const TEST_UID: &str = "TEST-UID";
pub const HASH: &str = "B54321C382FA3CC53EB6559FDDE03832898E7E89C8F90C10DF8567AD41A926A2";
pub const SIGNER: &str = "1026D70E1954775749C6811084D6450A3184D977383F0E4282CD47118AF37755";
pub const SIGNER_ADDRESS_HEX: &str = "90E23316635AC41F7C7C3BCC8620EF6CA388A633F8DC135B38";
pub const RECIPIENT: &str = "SDUP5PLHDXKBX3UU5Q52LAY4WYEKGEWC6IB3VBFM";
pub const RECIPIENT_HEX: &str = "90E8FEBD671DD41BEE94EC3BA5831CB608A312C2F203BA84AC";
/// Address of `9A4936...5B24`, a key that neither signs nor receives
/// anything in these fixtures.
pub const STRANGER: &str = "SAAYCQNRFXW5KTKOOS4A6XCFEZUYGEY6AO25PVKP";

/// Opens a listener the way a transport would: the server's `uid` answers
/// the connect request.
pub async fn open_listener(config: ListenerConfig) -> (Listener, UnboundedReceiver<TransportCommand>) {
    let (transport, mut outbound) = QueuedTransport::new();
    let listener = Listener::with_config(Arc::new(transport), config);
    let opener = tokio::spawn({
        let listener = listener.clone();
        async move { listener.open().await }
    });
    assert_eq!(outbound.recv().await, Some(TransportCommand::Connect));
    listener.handle(&json!({ "uid": TEST_UID })).unwrap();
    opener.await.unwrap().unwrap();
    (listener, outbound)
}

/// Every subscribe/unsubscribe frame queued so far.
pub fn drain_frames(outbound: &mut UnboundedReceiver<TransportCommand>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(command) = outbound.try_recv() {
        if let TransportCommand::Frame(frame) = command {
            frames.push(frame);
        }
    }
    frames
}

/// Transfer from `SIGNER` to `RECIPIENT`.
pub fn transfer_event(channel: &str, hash: &str) -> Value {
    json!({
        "transaction": {
            "signature": "CD".repeat(64),
            "signer": SIGNER,
            "version": 36865,
            "type": 16724,
            "maxFee": [0, 0],
            "deadline": [1, 0],
            "recipient": RECIPIENT_HEX,
            "mosaics": [ { "id": [11111, 22222], "amount": [100, 0] } ]
        },
        "meta": { "channelName": channel, "hash": hash, "height": [0, 0] }
    })
}

pub fn status_event(address_hex: &str, hash: &str, code: &str) -> Value {
    json!({ "address": address_hex, "hash": hash, "code": code, "deadline": [1, 0] })
}

pub fn cosignature_event(parent_hash: &str) -> Value {
    json!({ "parentHash": parent_hash, "signature": "EF".repeat(64), "signer": SIGNER })
}

pub fn hash_event(channel: &str, hash: &str) -> Value {
    json!({ "meta": { "channelName": channel, "hash": hash } })
}

pub fn block_event(height: u64) -> Value {
    json!({
        "block": {
            "signature": "01".repeat(64),
            "signer": SIGNER,
            "version": 36867,
            "type": 33091,
            "height": height.to_string(),
            "timestamp": [0, 0],
            "difficulty": [0, 0],
            "previousBlockHash": "00",
            "blockTransactionsHash": "00"
        },
        "meta": { "hash": "AA", "generationHash": "BB" }
    })
}
