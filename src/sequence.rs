//! Sequence utilities: complements and alphabet guessing.

use crate::model::SeqType;

/// Complement of one nucleotide, IUPAC codes included. Case is kept;
/// anything unknown (gaps, stops) is returned as is.
fn complement_base(base: u8, seq_type: SeqType) -> u8 {
    let upper = base.to_ascii_uppercase();
    let comp = match upper {
        b'A' if seq_type == SeqType::Rna => b'U',
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'S' | b'W' | b'N' => upper,
        _ => return base,
    };
    if base.is_ascii_lowercase() {
        comp.to_ascii_lowercase()
    } else {
        comp
    }
}

/// Complement strand, position by position. Amino-acid sequences have none
/// and yield an empty string.
pub fn complement(seq: &str, seq_type: SeqType) -> String {
    if !seq_type.is_nucleotide() {
        return String::new();
    }
    seq.bytes()
        .map(|b| complement_base(b, seq_type) as char)
        .collect()
}

/// Reverse complement of a nucleotide sequence.
pub fn reverse_complement(seq: &str, seq_type: SeqType) -> String {
    seq.bytes()
        .rev()
        .map(|b| complement_base(b, seq_type) as char)
        .collect()
}

/// Guesses the alphabet from the residues present.
///
/// Only `ACGTN` (plus gaps) reads as DNA, only `ACGUN` as RNA; anything else
/// is taken for a protein.
pub fn guess_type(seq: &str) -> SeqType {
    let is_in = |set: &[u8]| {
        seq.bytes()
            .all(|b| b == b'-' || b == b'.' || set.contains(&b.to_ascii_uppercase()))
    };
    if is_in(b"ACGTN") {
        SeqType::Dna
    } else if is_in(b"ACGUN") {
        SeqType::Rna
    } else {
        SeqType::AminoAcid
    }
}
