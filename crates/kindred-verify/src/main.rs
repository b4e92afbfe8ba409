//! # kindred-verify
//!
//! Post-build check for the web bundle: `dist/index.html` must exist, must
//! not reference development sources, and should reference bundled assets.
//!
//! ```bash
//! kindred-verify --dist dist
//! kindred-verify --dist dist --strict
//! ```

mod error;
mod verify;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Verify that a production build is deployable.
#[derive(Parser, Debug)]
#[command(name = "kindred-verify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Build output directory containing index.html
    #[arg(long, default_value = "dist")]
    dist: PathBuf,

    /// Treat a missing bundled-asset reference as an error
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    info!(dist = %cli.dist.display(), "Verifying production build");

    let mut report = verify::verify_dist(&cli.dist)?;
    if cli.strict {
        report = report.strict();
    }

    for warning in &report.warnings {
        warn!("{warning}");
    }
    for e in &report.errors {
        error!("{e}");
    }

    if report.passed() {
        info!("Build verification passed");
    } else {
        error!(errors = report.errors.len(), "Build verification failed");
    }
    Ok(report.passed())
}
