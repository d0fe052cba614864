use crate::configs::{DEFAULT_KMER_SIZE, DEFAULT_MIN_KMER_COUNT, DEFAULT_MIN_QUALITY};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kmer_unitigs", version, about = "Paired-end read assembly into a kmer adjacency graph of unitigs")]
pub struct Cli {
    /// Log debug details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {

    /// Build contigs, export FASTA/GFA/DOT and path the read pairs
    Assemble(AssembleArgs),

    /// Print the kmer count histogram and the auto-detected threshold
    Histogram(HistogramArgs),
}

#[derive(Args)]
pub struct KmerArgs {

    /// Kmer size (odd, 3..=63)
    #[arg(short = 'k', long = "k-size", default_value_t = DEFAULT_KMER_SIZE)]
    pub kmer_size: usize,

    /// Minimum base quality; lower calls are masked
    #[arg(short = 'q', long = "min-q", default_value_t = DEFAULT_MIN_QUALITY)]
    pub min_quality: u8,
}

#[derive(Args)]
pub struct AssembleArgs {

    /// Interleaved paired-end FASTQ file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output base name for the .fasta, .gfa and .dot files
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub kmer: KmerArgs,

    /// Minimum reliable kmer count (<= 0 detects it from the histogram)
    #[arg(short = 'c', long = "min-k-count", default_value_t = DEFAULT_MIN_KMER_COUNT, allow_negative_numbers = true)]
    pub min_kmer_count: i32,

    /// Also write the read paths as a bincode file
    #[arg(long)]
    pub paths_binary: Option<PathBuf>,
}

impl From<&AssembleArgs> for crate::configs::AssemblyConfig {
    fn from(args: &AssembleArgs) -> Self {
        Self {
            input_fastq: args.input.clone(),
            output_base: args.output.clone(),
            params: crate::configs::KmerParams {
                kmer_size: args.kmer.kmer_size,
                min_quality: args.kmer.min_quality,
                min_kmer_count: args.min_kmer_count,
            },
            paths_binary: args.paths_binary.clone(),
        }
    }
}

#[derive(Args)]
pub struct HistogramArgs {

    /// Interleaved paired-end FASTQ file
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub kmer: KmerArgs,
}

impl From<&HistogramArgs> for crate::configs::HistogramConfig {
    fn from(args: &HistogramArgs) -> Self {
        Self {
            input_fastq: args.input.clone(),
            params: crate::configs::KmerParams {
                kmer_size: args.kmer.kmer_size,
                min_quality: args.kmer.min_quality,
                // auto-detect so the suggested threshold is printed
                min_kmer_count: 0,
            },
        }
    }
}
