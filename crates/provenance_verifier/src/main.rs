// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use provenance_verifier::fetch::{fetch_provenance, fetch_provenances};
use provenance_verifier::reproduce::{ProcessExecutor, ReproducibleBuildVerifier};
use provenance_verifier::{
    ParsedProvenance, VerificationResult, load_reference_values, parse_provenance, verify,
    verify_consistency,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "provenance_verifier", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify one or more provenances of the same binary against reference values.
    Verify {
        /// Provenance location: a path, file:// URI or http(s):// URI. Repeatable.
        #[arg(long = "provenance", required = true)]
        provenances: Vec<String>,

        /// JSON file with the reference values to check against.
        #[arg(long)]
        reference_values: PathBuf,
    },
    /// Rebuild the binary a provenance describes and compare digests.
    Reproduce {
        /// Provenance location: a path, file:// URI or http(s):// URI.
        #[arg(long)]
        provenance: String,

        /// Build from this checkout instead of cloning. Must be at the provenance's commit.
        #[arg(long)]
        git_root_dir: Option<PathBuf>,

        /// Give up on the containerized build after this many seconds.
        #[arg(long, default_value_t = 3600)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG takes precedence over -v
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(true);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let result = match cli.command {
        Commands::Verify {
            provenances,
            reference_values,
        } => handle_commands_verify(provenances, reference_values).await?,

        Commands::Reproduce {
            provenance,
            git_root_dir,
            timeout_secs,
        } => handle_commands_reproduce(provenance, git_root_dir, timeout_secs).await?,
    };

    if !report(&result) {
        process::exit(1);
    }
    Ok(())
}

async fn handle_commands_verify(
    uris: Vec<String>,
    reference_values: PathBuf,
) -> Result<VerificationResult> {
    let want = load_reference_values(&reference_values).with_context(|| {
        format!(
            "Failed to load reference values from '{}'",
            reference_values.display()
        )
    })?;

    let fetched = fetch_provenances(&uris).await;
    let mut provenances = Vec::with_capacity(uris.len());
    for (uri, bytes) in uris.iter().zip(fetched) {
        let bytes = bytes.with_context(|| format!("Failed to fetch provenance '{}'", uri))?;
        let provenance = parse_provenance(&bytes)
            .with_context(|| format!("Failed to parse provenance '{}'", uri))?;
        provenances.push(provenance);
    }

    let mut result = verify_consistency(provenances.iter().map(ParsedProvenance::ir));
    for (uri, provenance) in uris.iter().zip(&provenances) {
        let checked = verify(provenance.ir(), &want)
            .with_context(|| format!("Failed to verify provenance '{}'", uri))?;
        for justification in checked.justifications() {
            result.fail(format!("{uri}: {justification}"));
        }
    }
    Ok(result)
}

async fn handle_commands_reproduce(
    uri: String,
    git_root_dir: Option<PathBuf>,
    timeout_secs: u64,
) -> Result<VerificationResult> {
    let bytes = fetch_provenance(&uri, &reqwest::Client::new())
        .await
        .with_context(|| format!("Failed to fetch provenance '{}'", uri))?;
    let provenance =
        parse_provenance(&bytes).with_context(|| format!("Failed to parse provenance '{}'", uri))?;

    let mut verifier =
        ReproducibleBuildVerifier::new(ProcessExecutor::new(Duration::from_secs(timeout_secs)));
    if let Some(dir) = git_root_dir {
        verifier = verifier.with_git_root(dir);
    }
    verifier
        .verify(&provenance)
        .await
        .with_context(|| format!("Failed to reproduce the build of '{}'", uri))
}

/// Prints the verdict. Returns whether verification succeeded.
fn report(result: &VerificationResult) -> bool {
    if result.is_verified() {
        info!("verification succeeded");
        println!("Verification succeeded");
        return true;
    }
    warn!(failures = result.justifications().len(), "verification failed");
    println!("Verification failed:");
    for justification in result.justifications() {
        println!("  - {}", justification);
    }
    false
}
