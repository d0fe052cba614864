/// read pathing module
/// re-project every read pair onto the contigs
/// 1) index each (k-2)-mer of each contig to its contig and offset
/// 2) walk read 2i and the reverse complement of read 2i+1 kmer by kmer
/// 3) join consecutive hits into spans, count misses as gaps

use crate::compress_graph::{Contig, StrandedContig};
use crate::fastq::FastqRead;
use crate::kmer::{self, Kmer};
use crate::utils;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::info;

/// One element of a read path
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PathSegment {
    /// consecutive read kmers found at consecutive contig offsets; `end` is exclusive
    Span {
        contig: StrandedContig,
        start: usize,
        end: usize,
    },
    /// number of consecutive read kmers not found in any contig
    Gap(usize),
}

/// The ordered segments of one read
#[derive(Clone, Default, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ReadPath {
    pub segments: Vec<PathSegment>,
}

/// Contig kmer -> (contig id, offset), for literal contig orientation only
pub struct ContigKmerIndex {
    pub node_size: usize,
    kmers: HashMap<Kmer, (usize, usize)>,
    contig_lengths: Vec<usize>,
}

impl ContigKmerIndex {
    pub fn new(contigs: &[Contig], node_size: usize) -> Self {
        let expected: usize = contigs.iter().map(|c| c.len().saturating_sub(node_size - 1)).sum();
        let mut kmers: HashMap<Kmer, (usize, usize)> = HashMap::with_capacity(expected);
        for (contig_id, contig) in contigs.iter().enumerate() {
            for (offset, kmer) in kmer::kmers(contig.sequence.as_bytes(), node_size).enumerate() {
                kmers.insert(kmer, (contig_id, offset));
            }
        }
        Self {
            node_size,
            kmers,
            contig_lengths: contigs.iter().map(|c| c.len()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    pub fn contig_length(&self, contig_id: usize) -> usize {
        self.contig_lengths[contig_id]
    }

    /// Where `kmer` lies, as `(contig, start, end)`. A hit on the reverse
    /// complement is translated into coordinates along the reverse strand.
    pub fn locate(&self, kmer: &Kmer) -> Option<(StrandedContig, usize, usize)> {
        if let Some(&(contig_id, offset)) = self.kmers.get(kmer) {
            return Some((StrandedContig::forward(contig_id), offset, offset + self.node_size));
        }
        let &(contig_id, offset) = self.kmers.get(&kmer.reverse_complement())?;
        let contig_len = self.contig_lengths[contig_id];
        Some((
            StrandedContig::reverse(contig_id),
            contig_len - (offset + self.node_size),
            contig_len - offset,
        ))
    }
}

/// Path a single sequence of calls. Calls outside ACGT are read as T here,
/// unlike kmer counting where they break the window run.
pub fn path_read(calls: &[u8], index: &ContigKmerIndex) -> ReadPath {
    let mut segments: Vec<PathSegment> = Vec::new();
    let mut current: Option<(StrandedContig, usize, usize)> = None;
    let mut miss_count = 0usize;

    for kmer in kmer::kmers_reading_ambiguous_as_t(calls, index.node_size) {
        match index.locate(&kmer) {
            None => {
                if let Some((contig, start, end)) = current.take() {
                    segments.push(PathSegment::Span { contig, start, end });
                }
                miss_count += 1;
            }
            Some(hit) => {
                if miss_count > 0 {
                    segments.push(PathSegment::Gap(miss_count));
                    miss_count = 0;
                }
                current = match current {
                    Some((contig, start, end)) if contig == hit.0 && hit.2 == end + 1 => {
                        Some((contig, start, hit.2))
                    }
                    Some((contig, start, end)) => {
                        segments.push(PathSegment::Span { contig, start, end });
                        Some(hit)
                    }
                    None => Some(hit),
                };
            }
        }
    }

    if miss_count > 0 {
        segments.push(PathSegment::Gap(miss_count));
    }
    if let Some((contig, start, end)) = current {
        segments.push(PathSegment::Span { contig, start, end });
    }

    ReadPath { segments }
}

/// Path every pair: the first mate as is, the second mate reverse-complemented,
/// so both run along the same strand. Returns two paths per pair.
pub fn path_read_pairs(reads: &[FastqRead], index: &ContigKmerIndex) -> Vec<ReadPath> {

    info!("=== READ PATHING ===");
    let mut read_paths: Vec<ReadPath> = Vec::with_capacity(reads.len());
    for pair in reads.chunks_exact(2) {
        read_paths.push(path_read(&pair[0].bases, index));
        read_paths.push(path_read(&utils::rev_comp(&pair[1].bases), index));
    }

    let spans: usize = read_paths
        .iter()
        .flat_map(|p| p.segments.iter())
        .filter(|s| matches!(s, PathSegment::Span { .. }))
        .count();
    let fully_matched = read_paths
        .iter()
        .filter(|p| matches!(p.segments.as_slice(), [PathSegment::Span { .. }]))
        .count();
    info!("Read paths: {}", read_paths.len());
    info!("Spans: {}", spans);
    info!("Reads on a single span: {}", fully_matched);
    info!("=== READ PATHING FINISHED ===");
    read_paths
}

/// `3:0-49/59` for a span, `4X` for a gap; contig lengths come from the index
pub fn describe_path(path: &ReadPath, index: &ContigKmerIndex) -> String {
    path.segments
        .iter()
        .map(|segment| match segment {
            PathSegment::Span { contig, start, end } => format!(
                "{}:{}-{}/{}",
                contig,
                start,
                end - 1,
                index.contig_length(contig.contig_id) - 1
            ),
            PathSegment::Gap(misses) => format!("{}X", misses),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `Pair <n>: <mate 1> | <mate 2>` line per read pair
pub fn write_pair_paths<W: Write>(out: &mut W, read_paths: &[ReadPath], index: &ContigKmerIndex) -> io::Result<()> {
    for (pair_id, pair) in read_paths.chunks(2).enumerate() {
        let first = describe_path(&pair[0], index);
        let second = pair.get(1).map(|p| describe_path(p, index)).unwrap_or_default();
        writeln!(out, "Pair {}: {} | {}", pair_id, first, second)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress_graph::build_contigs;
    use crate::create_adjacency_graph::{AdjacencyRecord, build_adjacency_graph};

    fn single_contig(sequence: &str, node_size: usize) -> Vec<Contig> {
        let first = Kmer::from_ascii(&sequence.as_bytes()[..node_size]).unwrap();
        let last = Kmer::from_ascii(&sequence.as_bytes()[sequence.len() - node_size..]).unwrap();
        vec![Contig {
            sequence: sequence.to_string(),
            first: AdjacencyRecord::new(first, None, None),
            last: AdjacencyRecord::new(last, None, None),
        }]
    }

    #[test]
    fn test_forward_read_is_one_span() {
        let contigs = single_contig("GATTACAGGCTTCAAGTCCGATAGC", 5);
        let index = ContigKmerIndex::new(&contigs, 5);
        assert_eq!(index.len(), 21);
        let path = path_read(b"TACAGGCTTCAAG", &index);
        assert_eq!(
            path.segments,
            vec![PathSegment::Span { contig: StrandedContig::forward(0), start: 3, end: 16 }]
        );
        assert_eq!(describe_path(&path, &index), "0:3-15/24");
    }

    #[test]
    fn test_reverse_strand_coordinates() {
        let contigs = single_contig("GATTACAGGCTTCAAGTCCGATAGC", 5);
        let index = ContigKmerIndex::new(&contigs, 5);
        // reverse complement of contig[3..16]
        let read = utils::rev_comp(b"TACAGGCTTCAAG");
        let path = path_read(&read, &index);
        assert_eq!(
            path.segments,
            vec![PathSegment::Span { contig: StrandedContig::reverse(0), start: 9, end: 22 }]
        );
        assert_eq!(describe_path(&path, &index), "~0:9-21/24");
    }

    #[test]
    fn test_misses_become_gaps() {
        let contigs = single_contig("GATTACAGGCTTCAAGTCCGATAGC", 5);
        let index = ContigKmerIndex::new(&contigs, 5);
        // 7 contig bases, 4 foreign bases, 6 contig bases further along
        let path = path_read(b"GATTACACCCCCAAGTC", &index);
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Span { contig: StrandedContig::forward(0), start: 0, end: 7 },
                PathSegment::Gap(8),
                PathSegment::Span { contig: StrandedContig::forward(0), start: 12, end: 18 },
            ]
        );
        assert_eq!(describe_path(&path, &index), "0:0-6/24 8X 0:12-17/24");

        let path = path_read(b"CCCCCCCC", &index);
        assert_eq!(path.segments, vec![PathSegment::Gap(4)]);
        assert!(path_read(b"GAT", &index).segments.is_empty());
    }

    #[test]
    fn test_offset_jump_splits_span() {
        let contigs = single_contig("GATTACAGGCTTCAAGTCCGATAGC", 5);
        let index = ContigKmerIndex::new(&contigs, 5);
        // GATTAC followed directly by TCCGA: both on contig 0 but not contiguous
        let path = path_read(b"GATTACTCCGA", &index);
        assert_eq!(path.segments.len(), 3);
        assert!(matches!(path.segments[0], PathSegment::Span { start: 0, end: 6, .. }));
        assert!(matches!(path.segments[1], PathSegment::Gap(_)));
        assert!(matches!(path.segments[2], PathSegment::Span { start: 16, end: 21, .. }));
    }

    // Ambiguous calls are read as T when pathing, whereas kmer counting drops
    // every window over them. The N below only matches because the contig has a T there.
    #[test]
    fn test_ambiguous_call_is_read_as_t() {
        let contigs = single_contig("GATTACAGGCTTCAAGTCCGATAGC", 5);
        let index = ContigKmerIndex::new(&contigs, 5);
        let path = path_read(b"GGCNTCAAG", &index);
        assert_eq!(
            path.segments,
            vec![PathSegment::Span { contig: StrandedContig::forward(0), start: 7, end: 16 }]
        );
        let path = path_read(b"GGCTTNAAG", &index);
        assert!(path.segments.iter().any(|s| matches!(s, PathSegment::Gap(_))));
    }

    #[test]
    fn test_pairs_are_written_per_line() {
        let genome = "GATTACAGGCTTCAAGTCCGATAGC";
        let trusted: Vec<Kmer> = kmer::kmers(genome.as_bytes(), 7).map(|w| w.canonical()).collect();
        let graph = build_adjacency_graph(&trusted, 7);
        let contig_set = build_contigs(&graph).unwrap();
        let index = ContigKmerIndex::new(&contig_set.contigs, 5);

        let mate1 = FastqRead::new("p/1", genome.as_bytes()[..15].to_vec(), vec![30; 15]);
        let mate2 = FastqRead::new("p/2", utils::rev_comp(&genome.as_bytes()[10..]), vec![30; 15]);
        let paths = path_read_pairs(&[mate1, mate2], &index);
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert_eq!(path.segments.len(), 1);
            let PathSegment::Span { start, end, .. } = path.segments[0] else {
                panic!("expected a span");
            };
            assert_eq!(end - start, 15);
        }

        let mut out = Vec::new();
        write_pair_paths(&mut out, &paths, &index).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Pair 0: "));
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains(" | "));
    }
}
