/// Bit-packed DNA windows (k-mers) and the iterators that cut them out of reads.
/// Each base takes 2 bits (A=0, C=1, G=2, T=3), most significant base first,
/// so for windows of equal length numeric order is lexicographic order.

use std::fmt;

/// Longest window that fits into the packed representation.
pub const MAX_KMER_SIZE: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Base {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    /// Decode the low two bits of `code`.
    pub fn from_code(code: u8) -> Base {
        match code & 3 {
            0 => Base::A,
            1 => Base::C,
            2 => Base::G,
            _ => Base::T,
        }
    }

    /// Parse a base call, `None` for anything outside ACGT (either case).
    pub fn from_ascii(call: u8) -> Option<Base> {
        match call {
            b'A' | b'a' => Some(Base::A),
            b'C' | b'c' => Some(Base::C),
            b'G' | b'g' => Some(Base::G),
            b'T' | b't' => Some(Base::T),
            _ => None,
        }
    }

    pub fn complement(self) -> Base {
        Base::from_code(3 - self as u8)
    }

    pub fn to_ascii(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
        }
    }

    pub fn to_char(self) -> char {
        self.to_ascii() as char
    }
}

/// A fixed-length window over {A,C,G,T}.
/// Equality and hashing look at the packed bases and the length only: a window
/// and its reverse complement are different keys unless explicitly canonicalized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Kmer {
    bits: u128,
    len: u8,
}

fn mask(len: usize) -> u128 {
    if len >= MAX_KMER_SIZE {
        u128::MAX
    } else {
        (1u128 << (2 * len)) - 1
    }
}

impl Kmer {
    /// The all-A window of the given length, used as the seed of a kmerizer.
    pub fn empty(len: usize) -> Kmer {
        debug_assert!(len <= MAX_KMER_SIZE);
        Kmer { bits: 0, len: len as u8 }
    }

    /// Pack a sequence of calls. Returns `None` if the sequence is too long or
    /// contains anything other than ACGT.
    pub fn from_ascii(seq: &[u8]) -> Option<Kmer> {
        if seq.len() > MAX_KMER_SIZE {
            return None;
        }
        let mut bits = 0u128;
        for &call in seq {
            bits = (bits << 2) | Base::from_ascii(call)? as u128;
        }
        Some(Kmer { bits, len: seq.len() as u8 })
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Base at position `idx`, counted from the left.
    pub fn base(&self, idx: usize) -> Base {
        let shift = 2 * (self.len() - 1 - idx);
        Base::from_code((self.bits >> shift) as u8)
    }

    pub fn first_base(&self) -> Base {
        self.base(0)
    }

    pub fn last_base(&self) -> Base {
        Base::from_code(self.bits as u8)
    }

    /// Append `base` on the right and drop the leftmost base.
    pub fn successor(&self, base: Base) -> Kmer {
        Kmer {
            bits: ((self.bits << 2) | base as u128) & mask(self.len()),
            len: self.len,
        }
    }

    /// Prepend `base` on the left and drop the rightmost base.
    pub fn predecessor(&self, base: Base) -> Kmer {
        Kmer {
            bits: (self.bits >> 2) | ((base as u128) << (2 * (self.len() - 1))),
            len: self.len,
        }
    }

    pub fn reverse_complement(&self) -> Kmer {
        let mut src = self.bits;
        let mut bits = 0u128;
        for _ in 0..self.len {
            bits = (bits << 2) | (3 - (src & 3));
            src >>= 2;
        }
        Kmer { bits, len: self.len }
    }

    /// The window or its reverse complement, whichever sorts first.
    pub fn canonical(&self) -> Kmer {
        let rc = self.reverse_complement();
        if rc.bits < self.bits { rc } else { *self }
    }

    pub fn is_canonical(&self) -> bool {
        self.bits <= self.reverse_complement().bits
    }

    /// Drop the first and the last base.
    pub fn interior(&self) -> Kmer {
        debug_assert!(self.len >= 2);
        let len = self.len() - 2;
        Kmer {
            bits: (self.bits >> 2) & mask(len),
            len: len as u8,
        }
    }
}

impl fmt::Display for Kmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seq: String = (0..self.len()).map(|idx| self.base(idx).to_char()).collect();
        f.write_str(&seq)
    }
}

/// How a kmerizer treats calls outside ACGT.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Ambiguity {
    /// Break the window run; no window spans the call.
    Skip,
    /// Read the call as T.
    ReadAsT,
}

/// Slides a window of length `k` along a sequence of calls.
pub struct Kmerizer<'a> {
    seq: &'a [u8],
    k: usize,
    idx: usize,
    valid: usize,
    current: Kmer,
    ambiguity: Ambiguity,
}

impl<'a> Kmerizer<'a> {
    pub fn new(seq: &'a [u8], k: usize, ambiguity: Ambiguity) -> Self {
        Self {
            seq,
            k,
            idx: 0,
            valid: 0,
            current: Kmer::empty(k),
            ambiguity,
        }
    }
}

impl Iterator for Kmerizer<'_> {
    type Item = Kmer;

    fn next(&mut self) -> Option<Kmer> {
        while self.idx < self.seq.len() {
            let call = self.seq[self.idx];
            self.idx += 1;
            let base = match (Base::from_ascii(call), self.ambiguity) {
                (Some(base), _) => base,
                (None, Ambiguity::ReadAsT) => Base::T,
                (None, Ambiguity::Skip) => {
                    self.valid = 0;
                    continue;
                }
            };
            self.current = self.current.successor(base);
            self.valid = (self.valid + 1).min(self.k);
            if self.valid == self.k {
                return Some(self.current);
            }
        }
        None
    }
}

/// Every ACGT-only window of `seq`.
pub fn kmers(seq: &[u8], k: usize) -> Kmerizer<'_> {
    Kmerizer::new(seq, k, Ambiguity::Skip)
}

/// Every window of `seq`, reading non-ACGT calls as T.
pub fn kmers_reading_ambiguous_as_t(seq: &[u8], k: usize) -> Kmerizer<'_> {
    Kmerizer::new(seq, k, Ambiguity::ReadAsT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kmer(seq: &str) -> Kmer {
        Kmer::from_ascii(seq.as_bytes()).unwrap()
    }

    #[test]
    fn test_round_trip_display() {
        assert_eq!(kmer("GATTACA").to_string(), "GATTACA");
        assert_eq!(kmer("gattaca").to_string(), "GATTACA");
        assert!(Kmer::from_ascii(b"GANTACA").is_none());
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(kmer("AACGT").reverse_complement(), kmer("ACGTT"));
        assert_eq!(kmer("G").reverse_complement(), kmer("C"));
        let long = "ACGTTGCAAGGCTTAACCGGTTAACGTACGATCGATCGGATCCAGTCAGTTTGACCAGTACGAT";
        assert_eq!(long.len(), 64);
        let w = kmer(long);
        assert_eq!(w.reverse_complement().reverse_complement(), w);
    }

    #[test]
    fn test_canonical_is_strand_independent() {
        let seq = b"TTGACCAGTAGGCATCGATCAGGGATTACACGTATTGCAGTCCGAT";
        for k in [1, 3, 7, 9, 21] {
            for w in kmers(seq, k) {
                assert_eq!(w.reverse_complement().canonical(), w.canonical());
                assert!(w.canonical().is_canonical());
                assert!(w.canonical() <= w);
            }
        }
        assert_eq!(kmer("TTT").canonical(), kmer("AAA"));
    }

    #[test]
    fn test_extension_and_interior() {
        let w = kmer("ACGTA");
        assert_eq!(w.successor(Base::G), kmer("CGTAG"));
        assert_eq!(w.predecessor(Base::T), kmer("TACGT"));
        assert_eq!(w.interior(), kmer("CGT"));
        assert_eq!(w.first_base(), Base::A);
        assert_eq!(w.last_base(), Base::A);
        assert_eq!(kmer("ACG").interior(), kmer("C"));
        assert_eq!(kmer("C").predecessor(Base::G), kmer("G"));
    }

    #[test]
    fn test_kmerizer_skips_windows_across_ambiguous_calls() {
        let windows: Vec<String> = kmers(b"ACGTNACGTA", 3).map(|w| w.to_string()).collect();
        assert_eq!(windows, vec!["ACG", "CGT", "ACG", "CGT", "GTA"]);
    }

    #[test]
    fn test_kmerizer_reads_ambiguous_as_t() {
        let windows: Vec<String> = kmers_reading_ambiguous_as_t(b"ACNa", 3)
            .map(|w| w.to_string())
            .collect();
        assert_eq!(windows, vec!["ACT", "CTA"]);
    }

    #[test]
    fn test_kmerizer_short_sequence() {
        assert_eq!(kmers(b"ACG", 5).count(), 0);
    }
}
