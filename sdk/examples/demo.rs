//! Walkthrough of the client pipeline: accounts, a signed transfer, and a
//! listener that sees it confirmed.
//!
//! The node is simulated: push messages are written by hand and fed to the
//! listener the way a websocket reader would.
//!
//! Run with:
//!   cargo run --example demo --release

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use catapult_sdk::identity::{Account, Address, NetworkType};
use catapult_sdk::listener::{Listener, QueuedTransport, TransportCommand};
use catapult_sdk::transaction::{
    decode, verify_signed_transaction, Deadline, GenerationHash, Message, Mosaic, MosaicId,
    TransferTransactionBuilder,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const MAGENTA: &str = "\x1b[35m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                            {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    CATAPULT SDK  --  Transaction Pipeline Demo             {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                            {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]================================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    banner();
    let network = NetworkType::MijinTest;
    let generation_hash =
        GenerationHash::from_hex("57F7DA205008026C776CB6AED843393F04CD458E0AA2D9F1D5F31A402072B2D6")?;

    section(1, "Accounts");
    let alice = Account::generate(network);
    let bob = Account::generate(network);
    info("alice", &alice.address().pretty());
    info("bob", &bob.address().pretty());

    section(2, "Build and sign a transfer");
    let tx = TransferTransactionBuilder::new(network)
        .recipient(bob.address())
        .mosaic(Mosaic::new(MosaicId(95_442_763_262_823), 1_000))
        .message(Message::plain("lunch money"))
        .deadline(Deadline::create(2))
        .build()?;
    let started = Instant::now();
    let signed = tx.sign_with(&alice, &generation_hash)?;
    timing("sign", started.elapsed());
    info("hash", &signed.hash());
    info("payload bytes", &signed.payload_bytes().len().to_string());

    verify_signed_transaction(&signed, &generation_hash)?;
    let decoded = decode(signed.payload_bytes())?;
    success(&format!("signature verifies, payload decodes to {}", decoded.transaction_type()));

    section(3, "Follow it through the listener");
    let (transport, mut outbound) = QueuedTransport::new();
    let listener = Listener::new(Arc::new(transport));
    let opener = tokio::spawn({
        let listener = listener.clone();
        async move { listener.open().await }
    });
    if outbound.recv().await == Some(TransportCommand::Connect) {
        listener.handle_text(r#"{"uid":"demo-session"}"#)?;
    }
    opener.await??;
    success("session open");

    let pending = listener.confirmed_with_hash(&bob.address(), &signed.hash())?;
    while let Ok(TransportCommand::Frame(frame)) = outbound.try_recv() {
        info("frame", &frame);
    }

    let recipient: Address = bob.address();
    listener.handle(&json!({
        "transaction": {
            "signer": alice.public_account().public_key.to_hex(),
            "version": 36865,
            "type": 16724,
            "maxFee": "0",
            "deadline": tx.deadline.raw().to_string(),
            "recipient": recipient.encoded(),
            "mosaics": [ { "id": "000056CE00002B67", "amount": "1000" } ]
        },
        "meta": { "channelName": "confirmedAdded", "hash": signed.hash(), "height": "1" }
    }))?;

    let confirmed = pending.await?;
    success(&format!(
        "confirmed at height {}",
        confirmed.info.map(|i| i.height).unwrap_or_default()
    ));

    listener.close().await?;
    println!();
    Ok(())
}
