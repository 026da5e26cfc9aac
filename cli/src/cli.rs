//! # CLI Interface
//!
//! Defines the command-line argument structure for `catapult` using
//! `clap` derive. Secrets and network parameters can come from the
//! environment so they stay out of shell history.

use clap::{Args, Parser, Subcommand};

use catapult_sdk::identity::{Address, NetworkType};
use catapult_sdk::transaction::{GenerationHash, Mosaic, MosaicId};

use crate::logging::LogFormat;

/// Offline tooling for Catapult transactions.
///
/// Generates accounts, signs transfers, and decodes or verifies signed
/// payloads. Nothing is sent to a node.
#[derive(Parser, Debug)]
#[command(
    name = "catapult",
    about = "Offline tooling for Catapult transactions",
    version,
    propagate_version = true
)]
pub struct CatapultCli {
    /// Log output format for diagnostics on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Log debug detail from the SDK.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh account.
    Keygen(KeygenArgs),
    /// Build and sign a transfer; prints the payload and hash as JSON.
    SignTransfer(SignTransferArgs),
    /// Decode a hex payload into JSON.
    Decode(DecodeArgs),
    /// Check the signatures of a hex payload.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

/// Network selection shared by every command that needs one.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// MAIN_NET, TEST_NET, MIJIN or MIJIN_TEST (or the numeric identifier).
    #[arg(long, env = "CATAPULT_NETWORK", default_value = "MIJIN_TEST")]
    pub network: NetworkType,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct SignTransferArgs {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Hex-encoded private key of the signer.
    #[arg(long, env = "CATAPULT_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Generation hash of the target network.
    #[arg(long, env = "CATAPULT_GENERATION_HASH")]
    pub generation_hash: GenerationHash,

    /// Recipient address, plain or dashed.
    #[arg(long)]
    pub recipient: Address,

    /// Mosaic to send as `HEX_ID:AMOUNT`. Repeatable.
    #[arg(long = "mosaic", value_parser = parse_mosaic)]
    pub mosaics: Vec<Mosaic>,

    /// Plain-text message.
    #[arg(long, default_value = "")]
    pub message: String,

    #[arg(long, default_value_t = 0)]
    pub max_fee: u64,

    /// Hours from now until the transaction expires.
    #[arg(long, default_value_t = 2, conflicts_with = "deadline")]
    pub deadline_hours: i64,

    /// Raw deadline in milliseconds since the nemesis block.
    #[arg(long)]
    pub deadline: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex payload as produced by `sign-transfer`.
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub network: NetworkArgs,

    #[arg(long, env = "CATAPULT_GENERATION_HASH")]
    pub generation_hash: GenerationHash,

    pub payload: String,
}

fn parse_mosaic(s: &str) -> Result<Mosaic, String> {
    let (id, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HEX_ID:AMOUNT, got '{s}'"))?;
    let id = MosaicId::from_hex(id).map_err(|e| e.to_string())?;
    let amount = amount
        .parse::<u64>()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok(Mosaic::new(id, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        CatapultCli::command().debug_assert();
    }

    #[test]
    fn parses_sign_transfer() {
        let cli = CatapultCli::try_parse_from([
            "catapult",
            "sign-transfer",
            "--network",
            "MIJIN_TEST",
            "--private-key",
            "787225aaff3d2c71f4ffa32d4f19ec4922f3cd869747f267378f81f8e3fcb12d",
            "--generation-hash",
            "57F7DA205008026C776CB6AED843393F04CD458E0AA2D9F1D5F31A402072B2D6",
            "--recipient",
            "SDUP5P-LHDXKB-X3UU5Q-52LAY4-WYEKGE-WC6IB3-VBFM",
            "--mosaic",
            "000056CE00002B67:100",
            "--deadline",
            "1",
        ])
        .unwrap();

        let Commands::SignTransfer(args) = cli.command else {
            panic!("expected sign-transfer");
        };
        assert_eq!(args.network.network, NetworkType::MijinTest);
        assert_eq!(args.mosaics, vec![Mosaic::new(MosaicId(95_442_763_262_823), 100)]);
        assert_eq!(args.deadline, Some(1));
    }

    #[test]
    fn rejects_bad_mosaic() {
        assert!(parse_mosaic("nocolon").is_err());
        assert!(parse_mosaic("ZZ:1").is_err());
        assert!(parse_mosaic("01:-1").is_err());
    }
}
