//! Genetic codes and translation of translated regions.
//!
//! This module provides:
//! - A set of NCBI genetic code tables
//! - Codon to amino acid translation, tolerant of gaps and ambiguity codes
//! - Construction of translation elements with their residues

use crate::model::{ElementKind, PositionalElement, SeqType, Strand};
use crate::sequence::reverse_complement;

/// A genetic code table for translating codons to amino acids.
#[derive(Debug)]
pub struct GeneticCode {
    /// NCBI genetic code ID
    pub id: u8,
    pub name: &'static str,
    /// Amino acids in NCBI order: TTT, TTC, TTA, TTG, TCT, ...
    table: [u8; 64],
}

static CODES: [GeneticCode; 8] = [
    GeneticCode {
        id: 1,
        name: "Standard",
        table: *b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 2,
        name: "Vertebrate Mitochondrial",
        table: *b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 3,
        name: "Yeast Mitochondrial",
        table: *b"FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 4,
        name: "Mold/Protozoan/Coelenterate Mitochondrial",
        table: *b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 5,
        name: "Invertebrate Mitochondrial",
        table: *b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 6,
        name: "Ciliate/Dasycladacean/Hexamita Nuclear",
        table: *b"FFLLSSSSYYQQCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 9,
        name: "Echinoderm/Flatworm Mitochondrial",
        table: *b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG",
    },
    GeneticCode {
        id: 11,
        name: "Bacterial/Archaeal/Plant Plastid",
        table: *b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
    },
];

/// Position of a base in the TCAG ordering used by NCBI tables.
fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

fn is_gap(base: u8) -> bool {
    matches!(base, b'-' | b'!' | b'.')
}

impl GeneticCode {
    /// Looks up a code by NCBI id.
    pub fn by_id(id: u8) -> Option<&'static GeneticCode> {
        CODES.iter().find(|c| c.id == id)
    }

    /// The standard code (NCBI 1).
    pub fn standard() -> &'static GeneticCode {
        &CODES[0]
    }

    /// All bundled codes.
    pub fn all() -> &'static [GeneticCode] {
        &CODES
    }

    /// Translates a single codon.
    ///
    /// - All gaps (`---`) give `-`; gaps mixed with bases give `!`
    /// - Ambiguous bases give `X`
    /// - `U` is read as `T`
    pub fn translate_codon(&self, codon: &[u8]) -> char {
        let [a, b, c] = codon else {
            return 'X';
        };
        let gaps = [a, b, c].iter().filter(|&&&x| is_gap(x)).count();
        match gaps {
            3 => return '-',
            1 | 2 => return '!',
            _ => {}
        }
        match (base_index(*a), base_index(*b), base_index(*c)) {
            (Some(i), Some(j), Some(k)) => self.table[i * 16 + j * 4 + k] as char,
            _ => 'X',
        }
    }

    /// Translates a nucleotide sequence in frame 0; a trailing partial codon
    /// is dropped.
    pub fn translate(&self, seq: &str) -> String {
        seq.as_bytes()
            .chunks_exact(3)
            .map(|codon| self.translate_codon(codon))
            .collect()
    }
}

/// Extracts `[start, end)` from `seq`, reading through the origin when the
/// range wraps.
fn wrapped_slice(seq: &str, start: usize, end: usize) -> String {
    let len = seq.len();
    let start = start.min(len);
    let end = end.min(len);
    if end >= start {
        seq.get(start..end).unwrap_or("").to_string()
    } else {
        let mut s = seq.get(start..).unwrap_or("").to_string();
        s.push_str(seq.get(..end).unwrap_or(""));
        s
    }
}

/// Builds translation elements from ranges over `seq`.
///
/// Nucleotide ranges are trimmed to whole codons and translated with `code`;
/// reverse-strand ranges read the reverse complement and keep the trailing
/// codons, and their residues are reversed so they line up left to right
/// with the sequence. Amino-acid ranges keep their residues as is.
pub fn create_translations(
    ranges: &[PositionalElement],
    seq: &str,
    seq_type: SeqType,
    code: &GeneticCode,
) -> Vec<PositionalElement> {
    let len = seq.len();
    ranges
        .iter()
        .map(|range| {
            let mut element = range.clone();
            element.kind = ElementKind::Translation;

            if !seq_type.is_nucleotide() {
                element.residues = Some(wrapped_slice(seq, range.start, range.end));
                return element;
            }

            let span = range.span(len);
            let codon_span = span - span % 3;
            // shorter than a codon: nothing to translate, bounds untouched
            if codon_span == 0 {
                element.residues = Some(String::new());
                return element;
            }

            // an offset past the sequence end only happens on wrapping ranges
            let fold = |pos: usize| if pos > len { pos - len } else { pos };
            let reverse = range.strand == Strand::Reverse;
            if reverse {
                element.start = fold(range.start + span % 3);
                if element.start == len {
                    element.start = 0;
                }
            } else {
                element.end = fold(range.start + codon_span);
            }

            let region = wrapped_slice(seq, element.start, element.end);
            let residues: String = if reverse {
                code.translate(&reverse_complement(&region, seq_type))
                    .chars()
                    .rev()
                    .collect()
            } else {
                code.translate(&region)
            };
            element.residues = Some(residues);
            element
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_code_translation() {
        let standard = GeneticCode::standard();
        assert_eq!(standard.translate_codon(b"ATG"), 'M');
        assert_eq!(standard.translate_codon(b"TAA"), '*');
        assert_eq!(standard.translate_codon(b"TGA"), '*');
        assert_eq!(standard.translate_codon(b"GGG"), 'G');
        assert_eq!(standard.translate_codon(b"AUG"), 'M');
        assert_eq!(standard.translate_codon(b"atg"), 'M');
    }

    #[test]
    fn test_gaps_and_ambiguity() {
        let standard = GeneticCode::standard();
        assert_eq!(standard.translate_codon(b"---"), '-');
        assert_eq!(standard.translate_codon(b"A-G"), '!');
        assert_eq!(standard.translate_codon(b"ATN"), 'X');
        assert_eq!(standard.translate_codon(b"AT"), 'X');
    }

    #[test]
    fn test_alternative_code() {
        let mito = GeneticCode::by_id(2).unwrap();
        assert_eq!(mito.translate_codon(b"TGA"), 'W');
        assert!(GeneticCode::by_id(99).is_none());
    }

    #[test]
    fn test_translate_drops_partial_codon() {
        assert_eq!(GeneticCode::standard().translate("ATGTTTTAGC"), "MF*");
    }

    #[test]
    fn test_forward_translation_trims_to_codons() {
        let seq = "ATGTTTGGGCC";
        let range = PositionalElement::new("t1", 0, 11, ElementKind::Translation)
            .with_strand(Strand::Forward);
        let out = create_translations(&[range], seq, SeqType::Dna, GeneticCode::standard());
        assert_eq!(out[0].end, 9);
        assert_eq!(out[0].residues.as_deref(), Some("MFG"));
    }

    #[test]
    fn test_reverse_translation() {
        // reverse complement of CCCAAACAT is ATGTTTGGG
        let seq = "CCCAAACAT";
        let range = PositionalElement::new("t1", 0, 9, ElementKind::Translation)
            .with_strand(Strand::Reverse);
        let out = create_translations(&[range], seq, SeqType::Dna, GeneticCode::standard());
        assert_eq!(out[0].residues.as_deref(), Some("GFM"));
    }

    #[test]
    fn test_short_ranges_stay_in_place() {
        let seq = "ATGTTTGGGC";
        let reverse = PositionalElement::new("t1", 8, 10, ElementKind::Translation)
            .with_strand(Strand::Reverse);
        let forward = PositionalElement::new("t2", 3, 5, ElementKind::Translation)
            .with_strand(Strand::Forward);
        let out = create_translations(&[reverse, forward], seq, SeqType::Dna, GeneticCode::standard());
        assert_eq!((out[0].start, out[0].end), (8, 10));
        assert_eq!((out[1].start, out[1].end), (3, 5));
        for element in &out {
            assert_eq!(element.span(seq.len()), 2);
            assert_eq!(element.residues.as_deref(), Some(""));
        }
    }

    #[test]
    fn test_reverse_translation_ending_at_sequence_end() {
        // the leading partial codon is dropped, the range stays at the end
        let seq = "GGCCCAAACAT";
        let range = PositionalElement::new("t1", 1, 11, ElementKind::Translation)
            .with_strand(Strand::Reverse);
        let out = create_translations(&[range], seq, SeqType::Dna, GeneticCode::standard());
        assert_eq!((out[0].start, out[0].end), (2, 11));
        assert_eq!(out[0].residues.as_deref(), Some("GFM"));
    }

    #[test]
    fn test_translation_across_origin() {
        let seq = "TTTGGGAAAATG";
        let range = PositionalElement::new("t1", 9, 6, ElementKind::Translation)
            .with_strand(Strand::Forward);
        let out = create_translations(&[range], seq, SeqType::Dna, GeneticCode::standard());
        assert_eq!(out[0].residues.as_deref(), Some("MFG"));
        assert!(out[0].wraps());
    }

    #[test]
    fn test_protein_ranges_keep_residues() {
        let range = PositionalElement::new("t1", 1, 4, ElementKind::Translation);
        let out = create_translations(&[range], "MKVLA", SeqType::AminoAcid, GeneticCode::standard());
        assert_eq!(out[0].residues.as_deref(), Some("KVL"));
    }
}
