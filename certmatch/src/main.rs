//! certmatch: Command-line tool for checking that X.509 certificates
//! represent a hostname.

use anyhow::{Context, Result};
use certmatch_lib::{CertificateIdentity, ValidationOutcome, ValidationReport};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "certmatch",
    about = "Check that an X.509 certificate legitimately represents a hostname",
    long_about = "certmatch compares a hostname against the identities of X.509\n\
                  certificates in PEM or DER format. Subject Alternative Name dNSName\n\
                  entries take precedence; the subject Common Name is consulted only\n\
                  when the SAN extension is absent. Identity strings with an embedded\n\
                  NUL byte are rejected as malformed.\n\n\
                  Input format (PEM vs DER) is auto-detected unless --pem or --der\n\
                  is specified. All commands read from stdin when no file is given.",
    after_help = "EXIT CODES:\n\
                  \n  0  every certificate matches the hostname\
                  \n  1  at least one certificate does not match\
                  \n  2  at least one certificate carries a malformed identity\
                  \n  3  input, parse, or validation error\
                  \n\nEXAMPLES:\n\
                  \n  certmatch check www.example.com cert.pem\
                  \n  certmatch check --json www.example.com cert.der\
                  \n  certmatch check -r --failures-only www.example.com certs/\
                  \n  certmatch names cert.pem\
                  \n  cat cert.pem | certmatch check www.example.com"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check certificates against a hostname (exit code 0 = match)
    #[command(after_help = "FILE may be a single certificate, a PEM bundle (every\n\
                      certificate is checked), or a directory of .pem/.der/.crt/.cer\n\
                      files which are checked in parallel.\n\
                      \nEXAMPLES:\n\
                      \n  certmatch check www.example.com cert.pem\
                      \n  certmatch check www.example.com bundle.pem\
                      \n  certmatch check --recurse www.example.com /etc/ssl/certs")]
    Check {
        /// Hostname the certificate is expected to represent
        hostname: String,
        /// Certificate file or directory. Reads from stdin if omitted.
        file: Option<PathBuf>,
        /// Force DER input parsing (default: auto-detect)
        #[arg(long, conflicts_with = "pem")]
        der: bool,
        /// Force PEM input parsing (default: auto-detect)
        #[arg(long)]
        pem: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Only print failures (directory mode)
        #[arg(long)]
        failures_only: bool,
        /// Recurse into subdirectories (directory mode)
        #[arg(short, long)]
        recurse: bool,
    },
    /// List the identities a certificate presents for hostname matching
    #[command(after_help = "Every SAN entry and the subject Common Name are listed.\n\
                      dNSName entries and the CN whose declared length differs from\n\
                      the position of their first NUL byte are flagged MALFORMED.\n\
                      \nEXAMPLES:\n\
                      \n  certmatch names cert.pem\
                      \n  certmatch names --json cert.der")]
    Names {
        /// Certificate file. Reads from stdin if omitted.
        file: Option<PathBuf>,
        /// Force DER input parsing (default: auto-detect)
        #[arg(long, conflicts_with = "pem")]
        der: bool,
        /// Force PEM input parsing (default: auto-detect)
        #[arg(long)]
        pem: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Maximum file size for certificate inputs (10 MiB).
const MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

const EXIT_MATCH: i32 = 0;
const EXIT_MISMATCH: i32 = 1;
const EXIT_MALFORMED: i32 = 2;
const EXIT_ERROR: i32 = 3;

fn read_input(file: Option<&PathBuf>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            let meta = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat file: {}", path.display()))?;
            if meta.len() > MAX_INPUT_BYTES {
                anyhow::bail!(
                    "File too large ({} bytes, max {} bytes): {}",
                    meta.len(),
                    MAX_INPUT_BYTES,
                    path.display()
                );
            }
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
        }
        None => read_capped(std::io::stdin().lock(), "stdin"),
    }
}

/// Read a stream up to `MAX_INPUT_BYTES`, failing rather than truncating.
fn read_capped<R: Read>(reader: R, source: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .with_context(|| format!("Failed to read from {}", source))?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        anyhow::bail!(
            "Input too large (more than {} bytes): {}",
            MAX_INPUT_BYTES,
            source
        );
    }
    Ok(buf)
}

/// Parse every certificate in the input. PEM input may be a bundle; DER
/// input always holds exactly one certificate.
fn parse_input(input: &[u8], der: bool, pem: bool) -> Result<Vec<CertificateIdentity>> {
    let as_pem = if der {
        false
    } else {
        pem || certmatch_lib::is_pem(input)
    };
    let certs = if as_pem {
        certmatch_lib::parse_pem_bundle(input)?
    } else {
        vec![certmatch_lib::parse_der(input)?]
    };
    debug!(count = certs.len(), pem = as_pem, "parsed certificate input");
    Ok(certs)
}

/// Map an outcome to the process exit code it calls for.
fn exit_code(outcome: &ValidationOutcome) -> i32 {
    match outcome {
        ValidationOutcome::MatchFound => EXIT_MATCH,
        ValidationOutcome::MatchNotFound => EXIT_MISMATCH,
        ValidationOutcome::MalformedIdentity(_) => EXIT_MALFORMED,
        ValidationOutcome::ValidationError(_) => EXIT_ERROR,
    }
}

/// The most severe exit code of a run; an empty run counts as a match.
fn worst_code(codes: impl IntoIterator<Item = i32>) -> i32 {
    codes.into_iter().max().unwrap_or(EXIT_MATCH)
}

/// Label a certificate within a file, indexing bundle members.
fn cert_label(label: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{}[{}]", label, index)
    } else {
        label.to_string()
    }
}

/// Check if a path has a certificate file extension (.pem, .der, .crt, .cer).
fn is_cert_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("pem") || ext.eq_ignore_ascii_case("der")
            || ext.eq_ignore_ascii_case("crt") || ext.eq_ignore_ascii_case("cer")
    )
}

/// Find all certificate files in a directory, sorted by path.
fn find_cert_files(dir: &Path, recurse: bool) -> Vec<PathBuf> {
    let walker = if recurse {
        walkdir::WalkDir::new(dir)
    } else {
        walkdir::WalkDir::new(dir).max_depth(1)
    };
    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_cert_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// A single result from batch processing.
struct BatchResult {
    path: String,
    code: i32,
    detail: String,
    report: Option<ValidationReport>,
}

impl BatchResult {
    fn failed(path: String, detail: String) -> Self {
        Self {
            path,
            code: EXIT_ERROR,
            detail,
            report: None,
        }
    }

    fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path,
            "exit_code": self.code,
            "detail": self.detail,
            "report": self.report,
        })
    }
}

/// Check every certificate of one file against `hostname`.
fn check_file(path: &Path, hostname: &str, der: bool, pem: bool) -> Vec<BatchResult> {
    let label = path.display().to_string();
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => return vec![BatchResult::failed(label, format!("ERROR (read error: {})", e))],
    };
    let certs = match parse_input(&data, der, pem) {
        Ok(c) => c,
        Err(e) => return vec![BatchResult::failed(label, format!("ERROR (parse error: {})", e))],
    };
    certs
        .iter()
        .enumerate()
        .map(|(i, cert)| {
            let report = ValidationReport::new(hostname, cert);
            BatchResult {
                path: cert_label(&label, i, certs.len()),
                code: exit_code(&report.outcome),
                detail: report.verdict(),
                report: Some(report),
            }
        })
        .collect()
}

/// Process certificate files in parallel, printing `filename: result`.
///
/// The closure may return multiple results per file (e.g. for CA bundles
/// containing many independent certificates).
///
/// Returns the most severe exit code.
fn run_batch<F>(files: &[PathBuf], failures_only: bool, json: bool, op: F) -> Result<i32>
where
    F: Fn(&Path) -> Vec<BatchResult> + Sync,
{
    let results: Vec<BatchResult> = files.par_iter().flat_map(|f| op(f)).collect();
    let shown: Vec<&BatchResult> = results
        .iter()
        .filter(|r| !(failures_only && r.code == EXIT_MATCH))
        .collect();

    if json {
        let values: Vec<serde_json::Value> =
            shown.iter().map(|r| r.to_json_value()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for r in &shown {
            if r.code == EXIT_MATCH {
                println!("{}: {}", r.path, r.detail);
            } else {
                eprintln!("{}: {}", r.path, r.detail);
            }
        }
    }
    Ok(worst_code(results.iter().map(|r| r.code)))
}

fn print_reports(reports: &[ValidationReport], json: bool) -> Result<()> {
    match reports {
        [report] if json => println!("{}", certmatch_lib::to_json(report)?),
        _ if json => println!("{}", serde_json::to_string_pretty(reports)?),
        _ => {
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", certmatch_lib::display_text(report));
            }
        }
    }
    Ok(())
}

/// Default log filter for a `-v` count.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Check {
            hostname,
            file,
            der,
            pem,
            json,
            failures_only,
            recurse,
        } => {
            // Directory mode: process all cert files in parallel
            if let Some(path) = file {
                if path.is_dir() {
                    let files = find_cert_files(path, *recurse);
                    if files.is_empty() {
                        anyhow::bail!(
                            "No certificate files (.pem, .der, .crt, .cer) found in {}",
                            path.display()
                        );
                    }
                    info!(files = files.len(), dir = %path.display(), "checking directory");
                    let (force_der, force_pem) = (*der, *pem);
                    return run_batch(&files, *failures_only, *json, |f| {
                        check_file(f, hostname, force_der, force_pem)
                    });
                }
            }

            // Single file mode
            let input = read_input(file.as_ref())?;
            let certs = parse_input(&input, *der, *pem)?;
            let reports: Vec<ValidationReport> = certs
                .iter()
                .map(|cert| ValidationReport::new(hostname, cert))
                .collect();
            print_reports(&reports, *json)?;
            Ok(worst_code(reports.iter().map(|r| exit_code(&r.outcome))))
        }
        Commands::Names {
            file,
            der,
            pem,
            json,
        } => {
            let input = read_input(file.as_ref())?;
            let certs = parse_input(&input, *der, *pem)?;

            if *json {
                match certs.as_slice() {
                    [cert] => println!("{}", serde_json::to_string_pretty(cert)?),
                    _ => println!("{}", serde_json::to_string_pretty(&certs)?),
                }
            } else {
                for (i, cert) in certs.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    print!("{}", certmatch_lib::display_names(cert));
                }
            }
            Ok(EXIT_MATCH)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}
