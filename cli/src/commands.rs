//! Command implementations. Each returns the JSON document `main` prints.

use anyhow::{Context, Result};
use serde_json::{json, Value};

use catapult_sdk::identity::Account;
use catapult_sdk::transaction::{
    decode_hex, verify_payload, Deadline, Message, TransferTransactionBuilder,
};

use crate::cli::{DecodeArgs, KeygenArgs, SignTransferArgs, VerifyArgs};

pub fn keygen(args: &KeygenArgs) -> Value {
    let account = Account::generate(args.network.network);
    let public = account.public_account();
    tracing::debug!(network = %public.network_type, "generated account");
    json!({
        "network": public.network_type,
        "privateKey": account.private_key_hex(),
        "publicKey": public.public_key,
        "address": account.address().plain(),
        "prettyAddress": account.address().pretty(),
    })
}

pub fn sign_transfer(args: &SignTransferArgs) -> Result<Value> {
    let network = args.network.network;
    let account = Account::from_private_key_hex(&args.private_key, network)
        .context("invalid private key")?;
    let deadline = match args.deadline {
        Some(raw) => Deadline::from_raw(raw),
        None => Deadline::create(args.deadline_hours),
    };

    let tx = TransferTransactionBuilder::new(network)
        .recipient(args.recipient)
        .mosaics(args.mosaics.clone())
        .message(Message::plain(args.message.as_str()))
        .max_fee(args.max_fee)
        .deadline(deadline)
        .build()
        .context("invalid transfer")?;
    let signed = tx
        .sign_with(&account, &args.generation_hash)
        .context("signing failed")?;

    tracing::info!(hash = %signed.hash(), recipient = %args.recipient, "transfer signed");
    serde_json::to_value(&signed).context("failed to serialize signed transaction")
}

pub fn decode(args: &DecodeArgs) -> Result<Value> {
    let tx = decode_hex(args.payload.trim()).context("failed to decode payload")?;
    tracing::debug!(kind = %tx.transaction_type(), "payload decoded");
    serde_json::to_value(&tx).context("failed to serialize transaction")
}

pub fn verify(args: &VerifyArgs) -> Result<Value> {
    let payload = hex::decode(args.payload.trim()).context("payload is not hex")?;
    let hash = verify_payload(&payload, args.network.network, &args.generation_hash)
        .context("verification failed")?;
    Ok(json!({ "valid": true, "hash": hex::encode_upper(hash) }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CatapultCli, Commands};
    use clap::Parser;

    const PRIVATE_KEY: &str = "787225aaff3d2c71f4ffa32d4f19ec4922f3cd869747f267378f81f8e3fcb12d";
    const GENERATION_HASH: &str =
        "57F7DA205008026C776CB6AED843393F04CD458E0AA2D9F1D5F31A402072B2D6";

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["catapult"];
        argv.extend_from_slice(args);
        CatapultCli::try_parse_from(argv).unwrap().command
    }

    fn golden_signed() -> Value {
        let Commands::SignTransfer(args) = parse(&[
            "sign-transfer",
            "--private-key",
            PRIVATE_KEY,
            "--generation-hash",
            GENERATION_HASH,
            "--recipient",
            "SDUP5PLHDXKBX3UU5Q52LAY4WYEKGEWC6IB3VBFM",
            "--mosaic",
            "000056CE00002B67:100",
            "--deadline",
            "1",
        ]) else {
            panic!("expected sign-transfer");
        };
        sign_transfer(&args).unwrap()
    }

    #[test]
    fn sign_transfer_matches_known_hash() {
        let signed = golden_signed();
        assert_eq!(
            signed["hash"],
            "B54321C382FA3CC53EB6559FDDE03832898E7E89C8F90C10DF8567AD41A926A2"
        );
    }

    #[test]
    fn signed_payload_verifies_and_decodes() {
        let payload = golden_signed()["payload"].as_str().unwrap().to_string();

        let Commands::Verify(args) = parse(&[
            "verify",
            "--generation-hash",
            GENERATION_HASH,
            payload.as_str(),
        ]) else {
            panic!("expected verify");
        };
        assert_eq!(verify(&args).unwrap()["valid"], true);

        let Commands::Decode(args) = parse(&["decode", payload.as_str()]) else {
            panic!("expected decode");
        };
        let decoded = decode(&args).unwrap();
        assert_eq!(decoded["deadline"], 1);
    }

    #[test]
    fn keygen_produces_usable_key() {
        let Commands::Keygen(args) = parse(&["keygen", "--network", "TEST_NET"]) else {
            panic!("expected keygen");
        };
        let out = keygen(&args);
        assert!(out["address"].as_str().unwrap().starts_with('T'));
        let key = out["privateKey"].as_str().unwrap();
        assert!(Account::from_private_key_hex(key, args.network.network).is_ok());
    }

    #[test]
    fn verify_rejects_garbage() {
        let Commands::Verify(args) = parse(&[
            "verify",
            "--generation-hash",
            GENERATION_HASH,
            "00",
        ]) else {
            panic!("expected verify");
        };
        assert!(verify(&args).is_err());
    }
}
