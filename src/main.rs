//! oif-extract - Split an OIF microscopy file into per-channel PNG z-stacks.
//!
//! Usage errors are reported by clap (exit status 2). Runtime failures exit
//! with 1, a declined overwrite with 3.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oif_extract::{
    config::{Cli, JobDescriptor},
    error::EXIT_FAILURE,
    extract::Extractor,
    format::OifSource,
    output::{AlwaysOverwrite, InteractivePrompt, OverwritePolicy},
    ExtractError,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let job = match JobDescriptor::load(&cli.descriptor) {
        Ok(job) => job,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    info!("Job:");
    info!("  Source: {}", job.oif_file.display());
    info!("  Output: {}", job.out_dir.display());
    info!("  Stains: {}", job.stains.join(", "));

    let policy: Box<dyn OverwritePolicy> = if cli.yes {
        Box::new(AlwaysOverwrite)
    } else {
        Box::new(InteractivePrompt::stdio())
    };

    let mut extractor = Extractor::new(OifSource, policy);
    match extractor.run(&job) {
        Ok(summary) => {
            info!(
                "Wrote {} slices ({} channels x {} depths) to {}",
                summary.slices_written,
                summary.channels,
                summary.depths,
                summary.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            match &e {
                ExtractError::Declined { path } => {
                    error!("Aborted: not overwriting {}", path.display())
                }
                other => error!("Extraction failed: {}", other),
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so overwrite prompts on stdout stay readable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "oif_extract=debug"
    } else {
        "oif_extract=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
