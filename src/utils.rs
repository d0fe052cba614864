/// General functions used across the project

/// Reverse-complement a sequence of base calls.
/// ACGT (either case) are complemented; any other call becomes 'N'.
pub fn rev_comp(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&call| match call {
            b'A' | b'a' => b'T',
            b'C' | b'c' => b'G',
            b'G' | b'g' => b'C',
            b'T' | b't' => b'A',
            _ => b'N',
        })
        .collect()
}
