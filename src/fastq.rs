/// FASTQ loading module
/// reads an interleaved paired-end FASTQ file: record 2i and record 2i+1 are mates

use crate::error::AssemblyError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Offset of the Phred quality encoding in FASTQ quality lines.
const PHRED_OFFSET: u8 = 33;

/// A single read: name, base calls and per-base Phred qualities
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastqRead {
    pub name: String,
    pub bases: Vec<u8>,
    pub quals: Vec<u8>,
}

impl FastqRead {
    pub fn new(name: impl Into<String>, bases: Vec<u8>, quals: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bases,
            quals,
        }
    }
}

/// Make sure the reads can be split into mates.
pub fn check_interleaved(reads: &[FastqRead]) -> Result<(), AssemblyError> {
    if reads.len() % 2 != 0 {
        return Err(AssemblyError::OddReadCount(reads.len()));
    }
    Ok(())
}

/// Load all records of a FASTQ file into memory.
pub fn load_fastq(path: &Path) -> Result<Vec<FastqRead>, AssemblyError> {
    let reader = BufReader::new(File::open(path)?);
    parse_fastq(reader, path)
}

/// Parse FASTQ records from any buffered reader. `path` only labels errors.
pub fn parse_fastq<R: BufRead>(reader: R, path: &Path) -> Result<Vec<FastqRead>, AssemblyError> {
    let parse_error = |line: usize, message: String| AssemblyError::FastqParse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut reads: Vec<FastqRead> = Vec::new();
    let mut lines = reader.lines().enumerate();

    while let Some((line_idx, header)) = lines.next() {
        let header = header?;
        // tolerate trailing blank lines
        if header.trim().is_empty() {
            continue;
        }
        let line_no = line_idx + 1;
        let Some(name) = header.strip_prefix('@') else {
            return Err(parse_error(
                line_no,
                format!("expected header line starting with '@', got '{}'", header),
            ));
        };
        let name = name.split_whitespace().next().unwrap_or_default().to_string();

        let bases = match lines.next() {
            Some((_, seq)) => seq?.trim_end().as_bytes().to_vec(),
            None => return Err(parse_error(line_no + 1, "missing sequence line".to_string())),
        };
        match lines.next() {
            Some((_, plus)) if plus.as_deref().is_ok_and(|p| p.starts_with('+')) => {}
            Some((_, plus)) => {
                let plus = plus?;
                return Err(parse_error(line_no + 2, format!("expected '+' separator, got '{}'", plus)));
            }
            None => return Err(parse_error(line_no + 2, "missing '+' separator line".to_string())),
        }
        let quals: Vec<u8> = match lines.next() {
            Some((_, qual)) => qual?
                .trim_end()
                .bytes()
                .map(|q| q.saturating_sub(PHRED_OFFSET))
                .collect(),
            None => return Err(parse_error(line_no + 3, "missing quality line".to_string())),
        };
        if quals.len() != bases.len() {
            return Err(parse_error(
                line_no + 3,
                format!(
                    "read '{}' has {} bases but {} qualities",
                    name,
                    bases.len(),
                    quals.len()
                ),
            ));
        }

        reads.push(FastqRead { name, bases, quals });
    }

    debug!("Loaded {} reads from {}", reads.len(), path.display());
    Ok(reads)
}
