/// Adjacency graph creation module
/// turn the trusted kmers into a bidirected graph whose nodes are (k-2)-mers
/// Each node is stored once under its canonical orientation together with the bases
/// seen immediately before (predecessors) and after (successors) it.

use crate::error::AssemblyError;
use crate::kmer::{Base, Kmer};
use std::collections::HashMap;
use tracing::info;

/// Set of single-base extensions, one bit per base
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct EdgeSet(u8);

impl EdgeSet {
    pub fn empty() -> Self {
        EdgeSet(0)
    }

    pub fn from_base(base: Option<Base>) -> Self {
        let mut set = EdgeSet::empty();
        if let Some(base) = base {
            set.insert(base);
        }
        set
    }

    pub fn insert(&mut self, base: Base) {
        self.0 |= 1 << base as u8;
    }

    pub fn contains(&self, base: Base) -> bool {
        self.0 & (1 << base as u8) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: EdgeSet) -> EdgeSet {
        EdgeSet(self.0 | other.0)
    }

    /// Complement every member (A<->T, C<->G), i.e. mirror the 4 bits.
    pub fn complement(self) -> EdgeSet {
        let b = self.0;
        EdgeSet(((b & 1) << 3) | ((b & 2) << 1) | ((b & 4) >> 1) | ((b & 8) >> 3))
    }

    /// The only member, if there is exactly one.
    pub fn sole(&self) -> Option<Base> {
        if self.len() == 1 {
            Some(Base::from_code(self.0.trailing_zeros() as u8))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Base> + '_ {
        Base::ALL.into_iter().filter(|&base| self.contains(base))
    }
}

/// The value stored per node: which bases extend it on either side
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Adjacencies {
    pub predecessors: EdgeSet,
    pub successors: EdgeSet,
}

impl Adjacencies {
    /// Union of both edge sets; idempotent, commutative and associative.
    pub fn merge(self, other: Adjacencies) -> Adjacencies {
        Adjacencies {
            predecessors: self.predecessors.union(other.predecessors),
            successors: self.successors.union(other.successors),
        }
    }

    /// The same edges seen from the opposite strand.
    pub fn reverse_complement(self) -> Adjacencies {
        Adjacencies {
            predecessors: self.successors.complement(),
            successors: self.predecessors.complement(),
        }
    }
}

/// A node window together with its edges, in the window's own orientation
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AdjacencyRecord {
    pub kmer: Kmer,
    pub adjacencies: Adjacencies,
}

impl AdjacencyRecord {
    pub fn new(kmer: Kmer, predecessor: Option<Base>, successor: Option<Base>) -> Self {
        Self {
            kmer,
            adjacencies: Adjacencies {
                predecessors: EdgeSet::from_base(predecessor),
                successors: EdgeSet::from_base(successor),
            },
        }
    }

    pub fn reverse_complement(&self) -> Self {
        Self {
            kmer: self.kmer.reverse_complement(),
            adjacencies: self.adjacencies.reverse_complement(),
        }
    }

    /// The record as stored in the graph: canonical window, edges re-oriented.
    pub fn canonical(&self) -> Self {
        if self.kmer.is_canonical() {
            *self
        } else {
            self.reverse_complement()
        }
    }

    pub fn predecessor_count(&self) -> usize {
        self.adjacencies.predecessors.len()
    }

    pub fn successor_count(&self) -> usize {
        self.adjacencies.successors.len()
    }

    /// Full neighbour window on the left when there is exactly one predecessor.
    pub fn sole_predecessor(&self) -> Option<Kmer> {
        self.adjacencies.predecessors.sole().map(|base| self.kmer.predecessor(base))
    }

    /// Full neighbour window on the right when there is exactly one successor.
    pub fn sole_successor(&self) -> Option<Kmer> {
        self.adjacencies.successors.sole().map(|base| self.kmer.successor(base))
    }

    pub fn predecessor_kmers(&self) -> impl Iterator<Item = Kmer> + '_ {
        self.adjacencies.predecessors.iter().map(|base| self.kmer.predecessor(base))
    }

    pub fn successor_kmers(&self) -> impl Iterator<Item = Kmer> + '_ {
        self.adjacencies.successors.iter().map(|base| self.kmer.successor(base))
    }
}

/// Node collection keyed by canonical (k-2)-mer
pub struct AdjacencyGraph {
    /// length of the node windows (k - 2)
    pub node_size: usize,
    records: HashMap<Kmer, Adjacencies>,
}

impl AdjacencyGraph {

    /// Create a new empty graph for nodes of length `node_size`
    pub fn new(node_size: usize) -> Self {
        Self {
            node_size,
            records: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonicalize the record and union its edges into the stored node.
    pub fn merge_record(&mut self, record: AdjacencyRecord) {
        let record = record.canonical();
        self.records
            .entry(record.kmer)
            .and_modify(|stored| *stored = stored.merge(record.adjacencies))
            .or_insert(record.adjacencies);
    }

    /// The stored record for a canonical window, if any
    pub fn get(&self, canonical: &Kmer) -> Option<AdjacencyRecord> {
        self.records.get(canonical).map(|&adjacencies| AdjacencyRecord {
            kmer: *canonical,
            adjacencies,
        })
    }

    /// Fetch the node for `kmer` in `kmer`'s orientation.
    /// A miss means the graph was built inconsistently.
    pub fn lookup(&self, kmer: &Kmer) -> Result<AdjacencyRecord, AssemblyError> {
        let canonical = kmer.canonical();
        let record = self
            .get(&canonical)
            .ok_or_else(|| AssemblyError::MissingKmer(kmer.to_string()))?;
        Ok(if *kmer == canonical { record } else { record.reverse_complement() })
    }

    /// All canonical records in ascending window order.
    pub fn sorted_records(&self) -> Vec<AdjacencyRecord> {
        let mut records: Vec<AdjacencyRecord> = self
            .records
            .iter()
            .map(|(&kmer, &adjacencies)| AdjacencyRecord { kmer, adjacencies })
            .collect();
        records.sort_unstable_by_key(|r| r.kmer);
        records
    }

    pub fn records(&self) -> impl Iterator<Item = AdjacencyRecord> + '_ {
        self.records
            .iter()
            .map(|(&kmer, &adjacencies)| AdjacencyRecord { kmer, adjacencies })
    }
}

/// Build the adjacency graph from trusted kmers of length `kmer_size`.
/// Every kmer contributes its interior with both edges, plus the leading and
/// trailing (k-2)-mers with the one edge the kmer proves for them, so that nodes
/// at read ends exist too.
pub fn build_adjacency_graph(trusted: &[Kmer], kmer_size: usize) -> AdjacencyGraph {

    info!("=== ADJACENCY GRAPH CREATION ===");
    let mut graph = AdjacencyGraph::new(kmer_size - 2);

    for kmer in trusted {
        let interior = kmer.interior();
        let first = kmer.first_base();
        let last = kmer.last_base();

        graph.merge_record(AdjacencyRecord::new(interior, Some(first), Some(last)));

        // kmer[0..k-2] -> interior
        graph.merge_record(AdjacencyRecord::new(
            interior.predecessor(first),
            None,
            Some(interior.last_base()),
        ));

        // interior -> kmer[2..k]
        graph.merge_record(AdjacencyRecord::new(
            interior.successor(last),
            Some(interior.first_base()),
            None,
        ));
    }

    info!("Graph nodes: {}", graph.len());
    info!("=== ADJACENCY GRAPH CREATION FINISHED ===");
    graph
}
