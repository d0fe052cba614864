use crate::compress_graph::Contig;
use crate::create_adjacency_graph::AdjacencyGraph;
use std::collections::BTreeMap;

/// Degree distributions of the adjacency graph: (predecessor count -> nodes, successor count -> nodes).
/// Counts are taken on the canonical orientation of each node.
pub fn analyze_degrees(graph: &AdjacencyGraph) -> (BTreeMap<usize, usize>, BTreeMap<usize, usize>) {
    let mut predecessor_dist: BTreeMap<usize, usize> = BTreeMap::new();
    let mut successor_dist: BTreeMap<usize, usize> = BTreeMap::new();
    for record in graph.records() {
        *predecessor_dist.entry(record.predecessor_count()).or_default() += 1;
        *successor_dist.entry(record.successor_count()).or_default() += 1;
    }
    (predecessor_dist, successor_dist)
}

/// Nodes with more than one edge on either side
pub fn branching_node_count(graph: &AdjacencyGraph) -> usize {
    graph
        .records()
        .filter(|r| r.predecessor_count() > 1 || r.successor_count() > 1)
        .count()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ContigStats {
    pub count: usize,
    pub total_length: usize,
    pub longest: usize,
    pub n50: usize,
}

/// Convenience: contig count, total and longest length, N50
pub fn contig_stats(contigs: &[Contig]) -> ContigStats {
    let mut lengths: Vec<usize> = contigs.iter().map(|c| c.len()).collect();
    lengths.sort_unstable_by(|a, b| b.cmp(a));

    let total_length: usize = lengths.iter().sum();
    let mut running = 0usize;
    let mut n50 = 0usize;
    for &len in &lengths {
        running += len;
        // first length at which half of the assembly is covered
        if 2 * running >= total_length {
            n50 = len;
            break;
        }
    }

    ContigStats {
        count: lengths.len(),
        total_length,
        longest: lengths.first().copied().unwrap_or(0),
        n50,
    }
}
