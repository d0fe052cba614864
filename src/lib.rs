pub mod cli;
pub mod compress_graph;
pub mod configs;
pub mod count_kmers;
pub mod create_adjacency_graph;
pub mod error;
pub mod export_graph;
pub mod fastq;
pub mod graph_analysis;
pub mod kmer;
pub mod path_reads;
pub mod pipeline;
pub mod utils;
