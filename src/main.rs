use anyhow::Result;
use clap::Parser;
use colored::*;

use eslint_embed::cli::Cli;
use eslint_embed::config::PipelineConfig;
use eslint_embed::{Pipeline, PipelineError};

/// CLI entry point
///
/// - Parses arguments
/// - Renders fatal errors without a Rust backtrace
/// - Drives the embedding pipeline
fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<PipelineError>() {
            Some(failure) => eprintln!(
                "{} [{}] {}",
                "[ERROR]".red().bold(),
                failure.stage(),
                e
            ),
            None => eprintln!("{} {}", "[ERROR]".red().bold(), e),
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let profile = cli.profile();
    let pipeline = Pipeline::standard(PipelineConfig::load());

    let report = pipeline.run(profile)?;

    println!(
        "{} Pipeline completed in {:.2}s → {} for {} (host: {})",
        "[DONE]".green().bold(),
        report.elapsed.as_secs_f64(),
        report.bundle_path.display(),
        report.package,
        report.host_output_dir.display()
    );

    Ok(())
}
