/// graph export module
/// writes the contigs and the links between them as FASTA, GFA and DOT

use crate::compress_graph::{ContigSet, Strand, StrandedContig};
use crate::error::AssemblyError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// An oriented adjacency between two contigs: leaving `from` continues into `to`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ContigLink {
    pub from: StrandedContig,
    pub to: StrandedContig,
}

impl ContigLink {
    /// The same link walked along the other strand.
    pub fn reverse_complement(&self) -> ContigLink {
        ContigLink {
            from: self.to.flip(),
            to: self.from.flip(),
        }
    }
}

/// Links grouped per contig, each logical link listed once.
/// Links leaving a contig's end are kept when the neighbour id is >= the contig id.
/// Links leaving its start (i.e. leaving its reverse strand) need a strictly larger
/// neighbour, except for a hairpin back onto the forward strand of the same contig,
/// which the end side never sees.
pub fn contig_links(contig_set: &ContigSet) -> Vec<Vec<ContigLink>> {
    contig_set
        .contigs
        .iter()
        .enumerate()
        .map(|(contig_id, contig)| {
            let mut links: Vec<ContigLink> = Vec::new();
            for target in contig_set.predecessor_contigs(contig) {
                let hairpin = target.contig_id == contig_id && target.strand == Strand::Forward;
                if target.contig_id > contig_id || hairpin {
                    links.push(ContigLink { from: StrandedContig::reverse(contig_id), to: target });
                }
            }
            for target in contig_set.successor_contigs(contig) {
                if target.contig_id >= contig_id {
                    links.push(ContigLink { from: StrandedContig::forward(contig_id), to: target });
                }
            }
            links
        })
        .collect()
}

pub fn write_fasta<W: Write>(w: &mut W, contig_set: &ContigSet) -> io::Result<()> {
    for (contig_id, contig) in contig_set.contigs.iter().enumerate() {
        writeln!(w, ">{}", contig_id)?;
        writeln!(w, "{}", contig.sequence)?;
    }
    Ok(())
}

/// GFA 1.0; adjacent contigs always overlap by node_size - 1 bases.
pub fn write_gfa<W: Write>(w: &mut W, contig_set: &ContigSet) -> io::Result<()> {
    // header
    writeln!(w, "H\tVN:Z:1.0")?;

    let overlap = contig_set.node_size.saturating_sub(1);
    let links = contig_links(contig_set);
    for (contig_id, contig) in contig_set.contigs.iter().enumerate() {
        writeln!(w, "S\ttig{}\t{}\tLN:i:{}", contig_id, contig.sequence, contig.len())?;
        for link in &links[contig_id] {
            writeln!(
                w,
                "L\ttig{}\t{}\ttig{}\t{}\t{}M",
                link.from.contig_id,
                link.from.strand.sign(),
                link.to.contig_id,
                link.to.strand.sign(),
                overlap
            )?;
        }
    }
    Ok(())
}

fn dot_node(contig: StrandedContig) -> String {
    match contig.strand {
        Strand::Forward => format!("tig{}", contig.contig_id),
        Strand::Reverse => format!("tig{}RC", contig.contig_id),
    }
}

/// Graphviz digraph with both strands of each contig as separate nodes, so every
/// link shows up as two opposing arcs.
pub fn write_dot<W: Write>(w: &mut W, contig_set: &ContigSet) -> io::Result<()> {
    writeln!(w, "digraph {{")?;
    for (contig_id, contig) in contig_set.contigs.iter().enumerate() {
        let width = contig.len() as f64 / 100.0;
        writeln!(w, "{} [width={}]", dot_node(StrandedContig::forward(contig_id)), width)?;
        writeln!(w, "{} [width={}]", dot_node(StrandedContig::reverse(contig_id)), width)?;
    }
    for link in contig_links(contig_set).iter().flatten() {
        writeln!(w, "{} -> {}", dot_node(link.from), dot_node(link.to))?;
        let mirror = link.reverse_complement();
        if mirror != *link {
            writeln!(w, "{} -> {}", dot_node(mirror.from), dot_node(mirror.to))?;
        }
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// Create `path` and fill it with `write`, attaching the path to any failure.
pub fn write_artifact<F>(path: &Path, write: F) -> Result<(), AssemblyError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let output_error = |source: io::Error| AssemblyError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(output_error)?;
    writer.flush().map_err(output_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress_graph::{Contig, build_contigs};
    use crate::create_adjacency_graph::{AdjacencyRecord, build_adjacency_graph};
    use crate::kmer::{Base, Kmer, kmers};

    fn contig_set(reads: &[&str], k: usize) -> ContigSet {
        let mut trusted: Vec<Kmer> = reads
            .iter()
            .flat_map(|r| kmers(r.as_bytes(), k).map(|w| w.canonical()).collect::<Vec<_>>())
            .collect();
        trusted.sort_unstable();
        trusted.dedup();
        build_contigs(&build_adjacency_graph(&trusted, k)).unwrap()
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(write: F) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_fasta_lists_contigs_in_order() {
        let set = contig_set(&["ACGGTCATTGCAGACTTAC", "ACGGTCATTGCATCGGAAT"], 7);
        let fasta = render(|w| write_fasta(w, &set));
        let lines: Vec<&str> = fasta.lines().collect();
        assert_eq!(lines.len(), 6);
        for (contig_id, contig) in set.contigs.iter().enumerate() {
            assert_eq!(lines[2 * contig_id], format!(">{}", contig_id));
            assert_eq!(lines[2 * contig_id + 1], contig.sequence);
        }
    }

    #[test]
    fn test_each_link_is_emitted_once() {
        let set = contig_set(&["ACGGTCATTGCAGACTTAC", "ACGGTCATTGCATCGGAAT"], 7);
        let links: Vec<ContigLink> = contig_links(&set).into_iter().flatten().collect();
        assert_eq!(links.len(), 2);
        for link in &links {
            assert!(!links.contains(&link.reverse_complement()));
        }

        let gfa = render(|w| write_gfa(w, &set));
        assert!(gfa.starts_with("H\tVN:Z:1.0\n"));
        assert_eq!(gfa.lines().filter(|l| l.starts_with("S\t")).count(), 3);
        let link_lines: Vec<&str> = gfa.lines().filter(|l| l.starts_with("L\t")).collect();
        assert_eq!(link_lines.len(), 2);
        assert!(link_lines.iter().all(|l| l.ends_with("\t4M")));
        assert!(gfa.contains(&format!("S\ttig0\t{}\tLN:i:{}", set.contigs[0].sequence, set.contigs[0].len())));
    }

    #[test]
    fn test_dot_has_two_nodes_per_contig_and_two_arcs_per_link() {
        let set = contig_set(&["ACGGTCATTGCAGACTTAC", "ACGGTCATTGCATCGGAAT"], 7);
        let dot = render(|w| write_dot(w, &set));
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert_eq!(dot.lines().filter(|l| l.contains("[width=")).count(), 6);
        assert_eq!(dot.lines().filter(|l| l.contains(" -> ")).count(), 4);
        assert!(dot.contains("tig0 [width=0.12]"));
    }

    #[test]
    fn test_circular_contig_links_to_itself() {
        let unit = "GATTCAGGCTACA";
        let read = format!("{}{}", unit, &unit[..6]);
        let set = contig_set(&[&read], 7);
        let links: Vec<ContigLink> = contig_links(&set).into_iter().flatten().collect();
        assert_eq!(links, vec![ContigLink { from: StrandedContig::forward(0), to: StrandedContig::forward(0) }]);
        let dot = render(|w| write_dot(w, &set));
        assert!(dot.contains("tig0 -> tig0\n"));
        assert!(dot.contains("tig0RC -> tig0RC\n"));
    }

    // ATG is preceded by CAT = rc(ATG), so leaving the start of the contig
    // turns straight back onto its forward strand.
    #[test]
    fn test_start_side_hairpin_is_emitted_once() {
        let first = Kmer::from_ascii(b"ATG").unwrap();
        let last = Kmer::from_ascii(b"GCC").unwrap();
        let contig = Contig {
            sequence: "ATGCC".to_string(),
            first: AdjacencyRecord::new(first, Some(Base::C), None),
            last: AdjacencyRecord::new(last, None, None),
        };
        let set = ContigSet::from_contigs(3, vec![contig]);

        let links: Vec<ContigLink> = contig_links(&set).into_iter().flatten().collect();
        assert_eq!(links, vec![ContigLink { from: StrandedContig::reverse(0), to: StrandedContig::forward(0) }]);
        assert_eq!(links[0].reverse_complement(), links[0]);

        let gfa = render(|w| write_gfa(w, &set));
        let link_lines: Vec<&str> = gfa.lines().filter(|l| l.starts_with("L\t")).collect();
        assert_eq!(link_lines, vec!["L\ttig0\t-\ttig0\t+\t2M"]);

        let dot = render(|w| write_dot(w, &set));
        let arcs: Vec<&str> = dot.lines().filter(|l| l.contains(" -> ")).collect();
        assert_eq!(arcs, vec!["tig0RC -> tig0"]);
    }

    #[test]
    fn test_end_side_hairpin_is_emitted_once() {
        let set = contig_set(&["GGCACATGCCTA"], 5);
        assert_eq!(set.contigs[1].sequence, "CAT");

        let links: Vec<ContigLink> = contig_links(&set).into_iter().flatten().collect();
        assert_eq!(links.len(), 4);
        let hairpin = ContigLink { from: StrandedContig::forward(1), to: StrandedContig::reverse(1) };
        assert_eq!(links.iter().filter(|&&l| l == hairpin).count(), 1);

        let gfa = render(|w| write_gfa(w, &set));
        let self_links: Vec<&str> = gfa.lines().filter(|l| l.starts_with("L\ttig1\t+\ttig1\t")).collect();
        assert_eq!(self_links, vec!["L\ttig1\t+\ttig1\t-\t2M"]);

        let dot = render(|w| write_dot(w, &set));
        assert_eq!(dot.lines().filter(|&l| l == "tig1 -> tig1RC").count(), 1);
        // three ordinary links drawn twice, the hairpin once
        assert_eq!(dot.lines().filter(|l| l.contains(" -> ")).count(), 7);
    }

    #[test]
    fn test_write_artifact_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.fasta");
        let err = write_artifact(&path, |w| w.write_all(b">0\n")).unwrap_err();
        assert!(matches!(err, AssemblyError::Output { path: ref p, .. } if *p == path));

        let ok_path = dir.path().join("out.fasta");
        write_artifact(&ok_path, |w| w.write_all(b">0\nACGT\n")).unwrap();
        assert_eq!(std::fs::read_to_string(&ok_path).unwrap(), ">0\nACGT\n");
    }
}
