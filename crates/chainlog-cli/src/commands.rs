use std::io::BufRead;

use anyhow::{anyhow, Context};
use chainlog_ledger::{AuditReport, Ledger, LedgerConfig, Record};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Append(args) => cmd_append(config, args, &cli.format),
        Command::Verify(args) => cmd_verify(config, args, &cli.format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            LedgerConfig::from_toml_str(&text)?
        }
        None => LedgerConfig::default(),
    };
    if let Some(algorithm) = cli.algorithm {
        config.algorithm = algorithm;
    }
    Ok(config)
}

fn cmd_append(config: LedgerConfig, args: AppendArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let ledger = build_ledger(config, payloads_or_stdin(args.payloads)?)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(ledger.get_all())?);
        }
        OutputFormat::Text => {
            for record in &ledger {
                print_record(record);
            }
            let head = ledger
                .head_digest()
                .map(|d| d.short_hex())
                .unwrap_or_else(|| "none".into());
            println!(
                "{} {} records ({}), head {}",
                "✓".green().bold(),
                ledger.len(),
                ledger.config().algorithm,
                head.yellow()
            );
        }
    }
    Ok(())
}

fn cmd_verify(config: LedgerConfig, args: VerifyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut ledger = build_ledger(config, payloads_or_stdin(args.payloads)?)?;
    if let Some(index) = args.tamper {
        ledger = tamper(ledger, index, b"tampered")?;
    }
    if args.rehash {
        ledger.recompute_all()?;
    }

    let self_consistent = ledger.validate_all()?;
    let linked = ledger.verify_links();
    let report = ledger.audit()?;

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "self_consistent": self_consistent,
                "linked": linked,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_report(self_consistent, linked, &report),
    }

    if report.is_valid() {
        Ok(())
    } else {
        Err(anyhow!(
            "ledger failed verification with {} violation(s)",
            report.violations.len()
        ))
    }
}

fn payloads_or_stdin(payloads: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !payloads.is_empty() {
        return Ok(payloads);
    }
    let lines = std::io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .context("reading payloads from stdin")?;
    Ok(lines)
}

fn build_ledger(config: LedgerConfig, payloads: Vec<String>) -> anyhow::Result<Ledger> {
    let mut ledger = Ledger::with_config(config);
    for payload in payloads {
        ledger.append(payload)?;
    }
    Ok(ledger)
}

/// Overwrite one record's payload behind the ledger's back, keeping its digest.
fn tamper(ledger: Ledger, index: usize, data: &[u8]) -> anyhow::Result<Ledger> {
    let config = ledger.config().clone();
    let mut records = serde_json::to_value(ledger.into_records())?;
    let record = records
        .get_mut(index)
        .ok_or_else(|| anyhow!("no record at index {index}"))?;
    record["data"] = serde_json::json!(data);
    let records: Vec<Record> = serde_json::from_value(records)?;
    Ok(Ledger::from_records(config, records))
}

fn print_record(record: &Record) {
    println!("{}", format!("record #{}", record.id()).yellow().bold());
    for line in record.to_string().lines() {
        println!("  {line}");
    }
}

fn print_report(self_consistent: bool, linked: bool, report: &AuditReport) {
    let mark = |ok: bool| if ok { "✓".green().bold() } else { "✗".red().bold() };
    println!("{} Records: {}", mark(true), report.record_count);
    println!("{} Self-consistency: {}", mark(self_consistent), verdict(self_consistent));
    println!("{} Predecessor links: {}", mark(linked), verdict(linked));
    println!("{} Sequence: {}", mark(report.sequence_valid), verdict(report.sequence_valid));
    for violation in &report.violations {
        println!(
            "  {} #{} {:?}: {}",
            "!".red(),
            violation.index,
            violation.kind,
            violation.description
        );
    }
}

fn verdict(ok: bool) -> colored::ColoredString {
    if ok {
        "valid".green()
    } else {
        "INVALID".red()
    }
}

#[cfg(test)]
mod tests {
    use chainlog_ledger::{DigestAlgorithm, ViolationKind};
    use clap::Parser;

    use super::*;

    fn payloads(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn build_ledger_appends_in_order() {
        let ledger = build_ledger(LedgerConfig::default(), payloads(&["a", "b", "c"])).unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get_at(2).unwrap().data(), b"c");
        assert!(ledger.validate_chain().unwrap());
    }

    #[test]
    fn tamper_keeps_digest_but_breaks_validation() {
        let ledger = build_ledger(LedgerConfig::default(), payloads(&["a", "b"])).unwrap();
        let digest = ledger.get_at(0).unwrap().digest();

        let tampered = tamper(ledger, 0, b"evil").unwrap();
        assert_eq!(tampered.get_at(0).unwrap().data(), b"evil");
        assert_eq!(tampered.get_at(0).unwrap().digest(), digest);
        assert!(!tampered.validate_all().unwrap());
        assert!(tampered.validate_at(1).unwrap());

        let report = tampered.audit().unwrap();
        assert_eq!(report.violations[0].kind, ViolationKind::DigestMismatch);
    }

    #[test]
    fn tamper_out_of_range_fails() {
        let ledger = build_ledger(LedgerConfig::default(), payloads(&["a"])).unwrap();
        assert!(tamper(ledger, 3, b"x").is_err());
    }

    #[test]
    fn algorithm_flag_overrides_config() {
        let cli = Cli::try_parse_from(["chainlog", "--algorithm", "sha256", "append", "a"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn verify_reports_failure_for_tampered_ledger() {
        let args = VerifyArgs {
            payloads: payloads(&["a", "b"]),
            tamper: Some(1),
            rehash: false,
        };
        assert!(cmd_verify(LedgerConfig::default(), args, &OutputFormat::Json).is_err());

        let clean = VerifyArgs {
            payloads: payloads(&["a", "b"]),
            tamper: None,
            rehash: false,
        };
        assert!(cmd_verify(LedgerConfig::default(), clean, &OutputFormat::Text).is_ok());
    }
}
