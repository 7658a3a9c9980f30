use std::path::PathBuf;

use chainlog_ledger::DigestAlgorithm;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chainlog",
    about = "Chainlog — tamper-evident, hash-chained record ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Ledger config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Digest algorithm, overriding the config file (blake3, sha256)
    #[arg(long, global = true)]
    pub algorithm: Option<DigestAlgorithm>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Append payloads to a fresh ledger and print the records
    Append(AppendArgs),
    /// Append payloads, optionally tamper, and check chain integrity
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct AppendArgs {
    /// Payloads to append; read one per line from stdin when omitted
    pub payloads: Vec<String>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Payloads to append; read one per line from stdin when omitted
    pub payloads: Vec<String>,

    /// Overwrite the payload of the record at this index before checking
    #[arg(long)]
    pub tamper: Option<usize>,

    /// Recompute every stored digest after tampering
    #[arg(long)]
    pub rehash: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_append() {
        let cli = Cli::try_parse_from(["chainlog", "append", "a", "b"]).unwrap();
        if let Command::Append(args) = cli.command {
            assert_eq!(args.payloads, vec!["a".to_string(), "b".to_string()]);
        } else {
            panic!("wrong command");
        }
        assert!(!cli.verbose);
        assert!(cli.algorithm.is_none());
    }

    #[test]
    fn parse_verify_with_tamper() {
        let cli =
            Cli::try_parse_from(["chainlog", "verify", "x", "y", "--tamper", "0", "--rehash"])
                .unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.tamper, Some(0));
            assert!(args.rehash);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::try_parse_from([
            "chainlog",
            "verify",
            "--algorithm",
            "sha256",
            "--format",
            "json",
            "--config",
            "ledger.toml",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.algorithm, Some(DigestAlgorithm::Sha256));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("ledger.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(Cli::try_parse_from(["chainlog", "append", "--algorithm", "md5"]).is_err());
    }
}
