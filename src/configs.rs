use crate::error::AssemblyError;
use crate::kmer::MAX_KMER_SIZE;
use std::path::PathBuf;

pub const DEFAULT_KMER_SIZE: usize = 39;
pub const DEFAULT_MIN_QUALITY: u8 = 7;
pub const DEFAULT_MIN_KMER_COUNT: i32 = 4;

/// Parameters shared by every stage that cuts reads into windows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KmerParams {
    pub kmer_size: usize,
    pub min_quality: u8,
    /// values <= 0 request auto-detection from the count histogram
    pub min_kmer_count: i32,
}

impl Default for KmerParams {
    fn default() -> Self {
        Self {
            kmer_size: DEFAULT_KMER_SIZE,
            min_quality: DEFAULT_MIN_QUALITY,
            min_kmer_count: DEFAULT_MIN_KMER_COUNT,
        }
    }
}

impl KmerParams {
    /// Odd sizes have no reverse-complement palindromes, which the contig
    /// bookkeeping relies on.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        let k = self.kmer_size;
        if k < 3 || k > MAX_KMER_SIZE || k % 2 == 0 {
            return Err(AssemblyError::InvalidKmerSize(k));
        }
        Ok(())
    }

    /// Length of the node windows (k - 2).
    pub fn interior_size(&self) -> usize {
        self.kmer_size - 2
    }
}

pub struct AssemblyConfig {
    pub input_fastq: PathBuf,
    pub output_base: PathBuf,
    pub params: KmerParams,
    pub paths_binary: Option<PathBuf>,
}

impl AssemblyConfig {
    /// `<base>.<extension>` next to the other artifacts
    pub fn artifact_path(&self, extension: &str) -> PathBuf {
        let mut name = self.output_base.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

pub struct HistogramConfig {
    pub input_fastq: PathBuf,
    pub params: KmerParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kmer_size_validation() {
        assert!(KmerParams::default().validate().is_ok());
        for k in [1, 2, 4, 38, 65, 101] {
            let params = KmerParams { kmer_size: k, ..KmerParams::default() };
            assert!(matches!(params.validate(), Err(AssemblyError::InvalidKmerSize(_))), "k={}", k);
        }
        let params = KmerParams { kmer_size: 3, ..KmerParams::default() };
        assert!(params.validate().is_ok());
        assert_eq!(params.interior_size(), 1);
    }

    #[test]
    fn test_artifact_path_appends_extension() {
        let config = AssemblyConfig {
            input_fastq: PathBuf::from("reads.fq"),
            output_base: PathBuf::from("out/sample.v1"),
            params: KmerParams::default(),
            paths_binary: None,
        };
        assert_eq!(config.artifact_path("gfa"), PathBuf::from("out/sample.v1.gfa"));
    }
}
