//! Error types for the assembler.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the assembly graph.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The FASTQ input is not made of interleaved pairs.
    #[error("FASTQ input must be interleaved pairs, but there are an odd number of reads ({0})")]
    OddReadCount(usize),

    /// The window length cannot be used (must be odd, 3..=63).
    #[error("invalid kmer size {0}: must be odd and between 3 and 63")]
    InvalidKmerSize(usize),

    /// Malformed FASTQ record.
    #[error("FASTQ parse error in {path} at line {line}: {message}")]
    FastqParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A window that must be present in the adjacency graph is absent.
    #[error("can't find expected kmer {0} in adjacencies set")]
    MissingKmer(String),

    /// An output artifact could not be created or written.
    #[error("failed to write {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error during file reading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during serialization of read paths.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}
