/// graph compression module
/// collapses the adjacency graph into maximal non-branching contigs (unitigs)
/// 1. visit the canonical nodes in sorted order
/// 2. get linear contigs (seeded at nodes that start or end a run on either strand)
/// 3. get circular contigs (remaining unclaimed nodes)
/// 4. record the contig ends so contigs can be linked to each other

use crate::create_adjacency_graph::{AdjacencyGraph, AdjacencyRecord};
use crate::error::AssemblyError;
use crate::kmer::Kmer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn flip(self) -> Strand {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// GFA orientation marker
    pub fn sign(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// A contig together with the strand it is traversed on
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct StrandedContig {
    pub contig_id: usize,
    pub strand: Strand,
}

impl StrandedContig {
    pub fn forward(contig_id: usize) -> Self {
        Self { contig_id, strand: Strand::Forward }
    }

    pub fn reverse(contig_id: usize) -> Self {
        Self { contig_id, strand: Strand::Reverse }
    }

    pub fn flip(self) -> Self {
        Self { contig_id: self.contig_id, strand: self.strand.flip() }
    }
}

/// `3` for the forward strand, `~3` for the reverse strand
impl fmt::Display for StrandedContig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strand {
            Strand::Forward => write!(f, "{}", self.contig_id),
            Strand::Reverse => write!(f, "~{}", self.contig_id),
        }
    }
}

/// A maximal unbranched run of nodes
pub struct Contig {
    pub sequence: String,
    /// first node, in contig orientation
    pub first: AdjacencyRecord,
    /// last node, in contig orientation
    pub last: AdjacencyRecord,
}

impl Contig {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// All contigs plus the bookkeeping needed to link them
pub struct ContigSet {
    pub node_size: usize,
    pub contigs: Vec<Contig>,
    /// first node -> (id, Forward); reverse complement of last node -> (id, Reverse)
    pub ends: HashMap<Kmer, StrandedContig>,
    /// every claimed node in both orientations
    claims: HashMap<Kmer, StrandedContig>,
}

impl ContigSet {
    fn new(node_size: usize) -> Self {
        Self {
            node_size,
            contigs: Vec::new(),
            ends: HashMap::new(),
            claims: HashMap::new(),
        }
    }

    /// Assemble a set from ready-made contigs, claiming every window of each.
    #[cfg(test)]
    pub(crate) fn from_contigs(node_size: usize, contigs: Vec<Contig>) -> Self {
        let mut contig_set = Self::new(node_size);
        for contig in contigs {
            let contig_id = contig_set.len();
            let windows: Vec<Kmer> = crate::kmer::kmers(contig.sequence.as_bytes(), node_size).collect();
            for window in windows {
                contig_set.claim(window, contig_id);
            }
            contig_set.register(contig);
        }
        contig_set
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Which contig (and on which strand) holds `kmer` in this orientation
    pub fn claim_of(&self, kmer: &Kmer) -> Option<StrandedContig> {
        self.claims.get(kmer).copied()
    }

    pub fn is_claimed(&self, kmer: &Kmer) -> bool {
        self.claims.contains_key(kmer)
    }

    fn claim(&mut self, kmer: Kmer, contig_id: usize) {
        self.claims.insert(kmer, StrandedContig::forward(contig_id));
        self.claims.insert(kmer.reverse_complement(), StrandedContig::reverse(contig_id));
    }

    fn register(&mut self, contig: Contig) -> usize {
        let contig_id = self.contigs.len();
        self.ends.insert(contig.first.kmer, StrandedContig::forward(contig_id));
        self.ends.insert(contig.last.kmer.reverse_complement(), StrandedContig::reverse(contig_id));
        self.contigs.push(contig);
        contig_id
    }

    /// Contigs that can precede `contig`, seen from the reverse strand of `contig`:
    /// `(j, Forward)` means rc(contig) continues into j, `(j, Reverse)` into rc(j).
    pub fn predecessor_contigs(&self, contig: &Contig) -> Vec<StrandedContig> {
        contig
            .first
            .predecessor_kmers()
            .filter_map(|kmer| self.ends.get(&kmer.reverse_complement()).copied())
            .collect()
    }

    /// Contigs that can follow `contig`: `(j, Forward)` means contig continues
    /// into j, `(j, Reverse)` into rc(j).
    pub fn successor_contigs(&self, contig: &Contig) -> Vec<StrandedContig> {
        contig
            .last
            .successor_kmers()
            .filter_map(|kmer| self.ends.get(&kmer).copied())
            .collect()
    }
}

/// A run starts here if there is no unique predecessor, or the unique
/// predecessor branches out.
pub fn is_contig_start(record: &AdjacencyRecord, graph: &AdjacencyGraph) -> Result<bool, AssemblyError> {
    let Some(predecessor) = record.sole_predecessor() else {
        return Ok(true);
    };
    Ok(graph.lookup(&predecessor)?.successor_count() > 1)
}

/// A run ends here if there is no unique successor, or the unique successor
/// has other ways in.
pub fn is_contig_end(record: &AdjacencyRecord, graph: &AdjacencyGraph) -> Result<bool, AssemblyError> {
    let Some(successor) = record.sole_successor() else {
        return Ok(true);
    };
    Ok(graph.lookup(&successor)?.predecessor_count() > 1)
}

/// Walk forward from `seed`, claiming every node of the new contig.
fn extend_contig(
    seed: AdjacencyRecord,
    graph: &AdjacencyGraph,
    contig_set: &mut ContigSet,
) -> Result<usize, AssemblyError> {
    let contig_id = contig_set.len();
    let mut sequence = seed.kmer.to_string();
    contig_set.claim(seed.kmer, contig_id);

    let mut current = seed;
    while let Some(successor) = current.sole_successor() {
        let next = graph.lookup(&successor)?;
        // don't add the node that breaks the chain
        if next.predecessor_count() > 1 {
            break;
        }
        // stop when a cycle (or a hairpin onto the other strand) closes
        if contig_set.is_claimed(&next.kmer) {
            break;
        }
        sequence.push(next.kmer.last_base().to_char());
        contig_set.claim(next.kmer, contig_id);
        current = next;
    }

    let registered = contig_set.register(Contig {
        sequence,
        first: seed,
        last: current,
    });
    debug_assert_eq!(registered, contig_id);
    Ok(contig_id)
}

/// Main function: compress maximal non-branching paths into contigs.
/// Seeds are taken in ascending canonical order, so numbering is reproducible.
pub fn build_contigs(graph: &AdjacencyGraph) -> Result<ContigSet, AssemblyError> {

    info!("=== CONTIG EXTRACTION ===");
    let records = graph.sorted_records();
    let mut contig_set = ContigSet::new(graph.node_size);

    // 1) linear contigs
    for record in &records {
        if contig_set.is_claimed(&record.kmer) {
            continue;
        }
        if is_contig_start(record, graph)? {
            extend_contig(*record, graph, &mut contig_set)?;
        } else if is_contig_end(record, graph)? {
            extend_contig(record.reverse_complement(), graph, &mut contig_set)?;
        }
    }
    let linear = contig_set.len();

    // 2) circular contigs, every node left over sits on an unbranched cycle
    for record in &records {
        if contig_set.is_claimed(&record.kmer) {
            continue;
        }
        extend_contig(*record, graph, &mut contig_set)?;
    }

    info!("Linear contigs: {}", linear);
    info!("Circular contigs: {}", contig_set.len() - linear);
    debug!("Claimed {} oriented nodes", contig_set.claims.len());
    info!("=== CONTIG EXTRACTION FINISHED ===");
    Ok(contig_set)
}
