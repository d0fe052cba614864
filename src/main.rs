use anyhow::{Context, Result};
use clap::Parser;
use kmer_unitigs::cli::{Cli, Commands};
use kmer_unitigs::configs::{AssemblyConfig, HistogramConfig};
use kmer_unitigs::pipeline;
use std::io::{self, Write};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_writer(io::stderr)
        .init();

    // diagnostics go to stdout, logging to stderr
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match &cli.command {
        Commands::Assemble(args) => {
            let config = AssemblyConfig::from(args);
            pipeline::run_assembly(&config, &mut out)
                .with_context(|| format!("Assembly of {} failed", config.input_fastq.display()))?;
            info!("Assembly finished");
        }
        Commands::Histogram(args) => {
            let config = HistogramConfig::from(args);
            pipeline::run_histogram(&config, &mut out)
                .with_context(|| format!("Counting kmers of {} failed", config.input_fastq.display()))?;
        }
    }

    out.flush()?;
    Ok(())
}
