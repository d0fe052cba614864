/// assembly pipeline
/// 1) check the pairing and the kmer size
/// 2) count kmers and keep the trusted ones
/// 3) build the adjacency graph and extract contigs
/// 4) path every read pair through the contigs
/// 5) write FASTA, GFA, DOT and optionally the binary read paths

use crate::compress_graph::{ContigSet, build_contigs};
use crate::configs::{AssemblyConfig, HistogramConfig, KmerParams};
use crate::count_kmers::{KmerCounts, count_kmers};
use crate::create_adjacency_graph::build_adjacency_graph;
use crate::error::AssemblyError;
use crate::export_graph::{write_artifact, write_dot, write_fasta, write_gfa};
use crate::fastq::{FastqRead, check_interleaved, load_fastq};
use crate::graph_analysis::{analyze_degrees, branching_node_count, contig_stats};
use crate::path_reads::{ContigKmerIndex, ReadPath, path_read_pairs, write_pair_paths};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Everything an assembly run produces in memory
pub struct Assembly {
    pub counts: KmerCounts,
    pub contig_set: ContigSet,
    pub read_paths: Vec<ReadPath>,
}

/// Run the in-memory part of the assembly. The histogram and the per-pair
/// paths are written to `diagnostics` as they become available.
pub fn assemble_reads<W: Write>(
    reads: &[FastqRead],
    params: &KmerParams,
    diagnostics: &mut W,
) -> Result<Assembly, AssemblyError> {
    check_interleaved(reads)?;
    params.validate()?;

    let counts = count_kmers(reads, params);
    counts.write_histogram(diagnostics)?;

    let graph = build_adjacency_graph(&counts.trusted, params.kmer_size);
    info!("Branching nodes: {}", branching_node_count(&graph));
    let (predecessor_dist, successor_dist) = analyze_degrees(&graph);
    for (degree, nodes) in &predecessor_dist {
        debug!("Predecessor degree {}: {} nodes", degree, nodes);
    }
    for (degree, nodes) in &successor_dist {
        debug!("Successor degree {}: {} nodes", degree, nodes);
    }

    let contig_set = build_contigs(&graph)?;
    let stats = contig_stats(&contig_set.contigs);
    info!(
        "Contigs: {} (total {} bp, longest {} bp, N50 {} bp)",
        stats.count, stats.total_length, stats.longest, stats.n50
    );

    let index = ContigKmerIndex::new(&contig_set.contigs, params.interior_size());
    let read_paths = path_read_pairs(reads, &index);
    write_pair_paths(diagnostics, &read_paths, &index)?;

    Ok(Assembly {
        counts,
        contig_set,
        read_paths,
    })
}

/// Dump the read paths with bincode
pub fn write_read_paths(path: &Path, read_paths: &[ReadPath]) -> Result<(), AssemblyError> {
    let encoded = bincode::serialize(read_paths)?;
    write_artifact(path, |w| w.write_all(&encoded))
}

/// Load reads, assemble, and write every artifact next to `output_base`.
pub fn run_assembly<W: Write>(config: &AssemblyConfig, diagnostics: &mut W) -> Result<Assembly, AssemblyError> {
    // fail on a bad kmer size before touching the input
    config.params.validate()?;

    info!("=== LOADING READS ===");
    let reads = load_fastq(&config.input_fastq)?;
    info!("Reads: {} ({} pairs)", reads.len(), reads.len() / 2);

    let assembly = assemble_reads(&reads, &config.params, diagnostics)?;

    info!("=== WRITING OUTPUT ===");
    let contig_set = &assembly.contig_set;
    let fasta_path = config.artifact_path("fasta");
    write_artifact(&fasta_path, |w| write_fasta(w, contig_set))?;
    info!("Contigs written to {}", fasta_path.display());

    let gfa_path = config.artifact_path("gfa");
    write_artifact(&gfa_path, |w| write_gfa(w, contig_set))?;
    info!("GFA written to {}", gfa_path.display());

    let dot_path = config.artifact_path("dot");
    write_artifact(&dot_path, |w| write_dot(w, contig_set))?;
    info!("DOT written to {}", dot_path.display());

    if let Some(paths_binary) = &config.paths_binary {
        write_read_paths(paths_binary, &assembly.read_paths)?;
        info!("Read paths written to {}", paths_binary.display());
    }
    info!("=== WRITING OUTPUT FINISHED ===");

    Ok(assembly)
}

/// Count kmers only and print the histogram with the detected threshold.
pub fn run_histogram<W: Write>(config: &HistogramConfig, out: &mut W) -> Result<KmerCounts, AssemblyError> {
    config.params.validate()?;
    let reads = load_fastq(&config.input_fastq)?;
    check_interleaved(&reads)?;
    let counts = count_kmers(&reads, &config.params);
    counts.write_histogram(out)?;
    Ok(counts)
}
