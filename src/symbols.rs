//! Alignment symbols between two gap-padded sequences.
//!
//! Every column of a pairwise alignment gets one character:
//!
//! | Symbol | Nucleotides        | Amino acids (detailed)         | Amino acids (compact) |
//! |--------|--------------------|--------------------------------|-----------------------|
//! | `\|`   | identical          | identical                      | identical             |
//! | `.`    | mismatch           | same conservation group        | anything else         |
//! | `*`    |                    | different groups               |                       |
//! | `-`    |                    | gap in either sequence         |                       |
//! | ` `    | gap in either      |                                | gap in either         |

use thiserror::Error;

use crate::model::{SeqType, Sequence, SymbolMode};

/// Gap character used to pad aligned sequences.
pub const GAP: u8 = b'-';

/// Amino acids considered interchangeable, uppercase.
const CONSERVATION_GROUPS: [&[u8]; 6] = [
    b"C",     // unique
    b"STAGP", // small polar
    b"DEQN",  // polar uncharged
    b"KRH",   // basic
    b"MILV",  // aliphatic
    b"FYW",   // aromatic
];

/// Errors raised while comparing two sequences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Aligned sequences have different lengths ({left} vs {right}); pad both with '-' to the alignment length")]
    InvalidLength { left: usize, right: usize },
}

/// Index of the conservation group of an amino acid, case-insensitive.
fn conservation_group(residue: u8) -> Option<usize> {
    let upper = residue.to_ascii_uppercase();
    CONSERVATION_GROUPS.iter().position(|group| group.contains(&upper))
}

/// Classifies one alignment column.
pub fn column_symbol(a: u8, b: u8, seq_type: SeqType, mode: SymbolMode) -> char {
    let gap = a == GAP || b == GAP;
    if seq_type.is_nucleotide() {
        return if gap {
            ' '
        } else if a == b {
            '|'
        } else {
            '.'
        };
    }

    let same_group = matches!(
        (conservation_group(a), conservation_group(b)),
        (Some(x), Some(y)) if x == y
    );
    match mode {
        SymbolMode::Detailed => {
            if same_group {
                if a == b {
                    '|'
                } else {
                    '.'
                }
            } else if gap {
                '-'
            } else {
                '*'
            }
        }
        SymbolMode::Compact => {
            if gap {
                ' '
            } else if same_group && a == b {
                '|'
            } else {
                '.'
            }
        }
    }
}

/// Computes the symbol string for two sequences of the same length.
///
/// # Errors
///
/// Returns [`AlignmentError::InvalidLength`] when the lengths differ; the
/// sequences are never truncated to fit.
///
/// # Examples
///
/// ```
/// use seqblock::model::{SeqType, SymbolMode};
/// use seqblock::symbols::compute_alignment_symbols;
///
/// let symbols = compute_alignment_symbols("ATGC-AG", "ATCC-AG", SeqType::Dna, SymbolMode::Compact).unwrap();
/// assert_eq!(symbols, "||.| ||");
/// ```
pub fn compute_alignment_symbols(
    seq_a: &str,
    seq_b: &str,
    seq_type: SeqType,
    mode: SymbolMode,
) -> Result<String, AlignmentError> {
    let (a, b) = (seq_a.as_bytes(), seq_b.as_bytes());
    if a.len() != b.len() {
        return Err(AlignmentError::InvalidLength {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| column_symbol(x, y, seq_type, mode))
        .collect())
}

/// Per-sequence figures of a pairwise alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStatistics {
    pub name: String,
    /// Residues excluding gaps
    pub length: usize,
    /// Identical columns over `length`
    pub fraction_identical: f64,
    /// Identical or similar columns over `length`
    pub coverage: f64,
}

/// Summary of a pairwise alignment, from its detailed symbol string.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentStatistics {
    pub sequences: [SequenceStatistics; 2],
    pub columns: usize,
    pub identical: usize,
    /// Columns that are not identical, gaps included
    pub mismatches: usize,
}

impl AlignmentStatistics {
    pub fn compute(a: &Sequence, b: &Sequence, seq_type: SeqType) -> Result<Self, AlignmentError> {
        let symbols = compute_alignment_symbols(&a.data, &b.data, seq_type, SymbolMode::Detailed)?;
        let identical = symbols.bytes().filter(|&c| c == b'|').count();
        let similar = symbols.bytes().filter(|&c| c == b'.').count();
        let columns = symbols.len();

        let per_sequence = |seq: &Sequence| {
            let length = seq.data.bytes().filter(|&c| c != GAP).count();
            let ratio = |count: usize| {
                if length == 0 {
                    0.0
                } else {
                    count as f64 / length as f64
                }
            };
            SequenceStatistics {
                name: seq.id.clone(),
                length,
                fraction_identical: ratio(identical),
                coverage: ratio(identical + similar),
            }
        };

        Ok(Self {
            sequences: [per_sequence(a), per_sequence(b)],
            columns,
            identical,
            mismatches: columns - identical,
        })
    }
}
