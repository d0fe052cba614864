/// kmer counting module
/// 1) mask calls below the quality threshold with 'N'
/// 2) count every canonical kmer of every read
/// 3) histogram the counts and pick the trusted-count threshold
/// 4) keep the kmers that reach the threshold

use crate::configs::KmerParams;
use crate::fastq::FastqRead;
use crate::kmer::{self, Kmer};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use tracing::info;

/// Wildcard written over low-quality calls.
pub const MASK_CALL: u8 = b'N';

/// Threshold used when the histogram has no trough.
pub const FALLBACK_MIN_KMER_COUNT: u32 = 3;

/// Result of the frequency filter
pub struct KmerCounts {
    /// kmers seen at least `min_kmer_count` times, canonical and sorted
    pub trusted: Vec<Kmer>,
    /// count -> number of distinct kmers with that count
    pub histogram: BTreeMap<u32, usize>,
    pub min_kmer_count: u32,
}

impl KmerCounts {
    /// Diagnostic dump: the threshold, then one `count\tdistinct` line per bucket
    pub fn write_histogram<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "min_kmer_count={}", self.min_kmer_count)?;
        for (count, distinct) in &self.histogram {
            writeln!(out, "{}\t{}", count, distinct)?;
        }
        Ok(())
    }
}

/// Copy of the read's calls with low-quality positions replaced by the wildcard.
/// Positions are kept, so windows never join across a masked call.
pub fn masked_sequence(read: &FastqRead, min_quality: u8) -> Vec<u8> {
    let mut calls = read.bases.clone();
    for (call, &qual) in calls.iter_mut().zip(read.quals.iter()) {
        if qual < min_quality {
            *call = MASK_CALL;
        }
    }
    calls
}

/// First local minimum of the histogram: the trough that follows at least one
/// strict decrease and is followed by a strict increase. Equal neighbours keep
/// the scan going.
pub fn find_min_kmer_count(histogram: &BTreeMap<u32, usize>) -> u32 {
    let mut trough: Option<(u32, usize)> = None;
    let mut descended = false;

    for (&count, &distinct) in histogram {
        match trough {
            None => trough = Some((count, distinct)),
            Some((trough_count, trough_distinct)) => {
                if distinct < trough_distinct {
                    trough = Some((count, distinct));
                    descended = true;
                } else if distinct > trough_distinct {
                    if descended {
                        return trough_count;
                    }
                    // still climbing, the trough has to come later
                    trough = Some((count, distinct));
                }
            }
        }
    }

    FALLBACK_MIN_KMER_COUNT
}

/// Count the canonical kmers of all reads and keep the reliable ones.
pub fn count_kmers(reads: &[FastqRead], params: &KmerParams) -> KmerCounts {

    info!("=== KMER COUNTING ===");
    let k = params.kmer_size;
    let expected: usize = reads.iter().map(|r| r.bases.len().saturating_sub(k - 1)).sum();
    let mut counts: HashMap<Kmer, u32> = HashMap::with_capacity(expected);

    for read in reads {
        let calls = masked_sequence(read, params.min_quality);
        for kmer in kmer::kmers(&calls, k) {
            *counts.entry(kmer.canonical()).or_insert(0) += 1;
        }
    }

    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for &count in counts.values() {
        *histogram.entry(count).or_insert(0) += 1;
    }

    let min_kmer_count = if params.min_kmer_count <= 0 {
        let detected = find_min_kmer_count(&histogram);
        info!("Auto-detected minimum kmer count: {}", detected);
        detected
    } else {
        params.min_kmer_count as u32
    };

    let mut trusted: Vec<Kmer> = counts
        .into_iter()
        .filter(|&(_, count)| count >= min_kmer_count)
        .map(|(kmer, _)| kmer)
        .collect();
    trusted.sort_unstable();

    let distinct: usize = histogram.values().sum();
    info!("Distinct kmers: {}", distinct);
    info!("Trusted kmers (count >= {}): {}", min_kmer_count, trusted.len());
    info!("=== KMER COUNTING FINISHED ===");

    KmerCounts {
        trusted,
        histogram,
        min_kmer_count,
    }
}
