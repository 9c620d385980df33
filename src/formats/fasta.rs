//! FASTA file parser.
//!
//! Supports both single-line and multi-line sequences.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```

use thiserror::Error;

use crate::model::Sequence;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FastaError {
    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Empty sequence identifier at line {0}")]
    EmptyIdentifier(usize),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Non-ASCII residue at line {0}")]
    NonAscii(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses FASTA content held in memory.
///
/// Ids stop at the first whitespace of the header. Whitespace inside
/// sequence lines is dropped; case is preserved. Records with no residues
/// are skipped.
///
/// # Examples
///
/// ```
/// use seqblock::formats::fasta::parse_fasta_str;
///
/// let seqs = parse_fasta_str(">pUC19 cloning vector\nTCGCGCGTTT\nCGGTGATGAC\n").unwrap();
/// assert_eq!(seqs[0].id, "pUC19");
/// assert_eq!(seqs[0].len(), 20);
/// ```
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current_id: Option<&str> = None;
    let mut current_seq = String::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                if !current_seq.is_empty() {
                    sequences.push(Sequence::new(id, std::mem::take(&mut current_seq)));
                }
            }

            let id = header.split_whitespace().next().unwrap_or("");
            if id.is_empty() {
                return Err(FastaError::EmptyIdentifier(line_number));
            }
            current_id = Some(id);
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }
            if !line.is_ascii() {
                return Err(FastaError::NonAscii(line_number));
            }
            current_seq.extend(line.chars().filter(|c| !c.is_ascii_whitespace()));
        }
    }

    if let Some(id) = current_id {
        if !current_seq.is_empty() {
            sequences.push(Sequence::new(id, current_seq));
        }
    }

    if sequences.is_empty() {
        return Err(FastaError::EmptyFile);
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let seqs = parse_fasta_str(">seq1\nACGT\n>seq2\nTGCA\n").unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0], Sequence::new("seq1", "ACGT"));
        assert_eq!(seqs[1], Sequence::new("seq2", "TGCA"));
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let seqs = parse_fasta_str(">seq1\nACGT\nTGCA\nAA AA\n").unwrap();
        assert_eq!(seqs[0].data, "ACGTTGCAAAAA");
    }

    #[test]
    fn test_parse_with_empty_lines_and_description() {
        let seqs = parse_fasta_str(">seq1 a plasmid\nACGT\n\n>seq2\n\nTGCA\n").unwrap();
        assert_eq!(seqs[0].id, "seq1");
        assert_eq!(seqs[1].data, "TGCA");
    }

    #[test]
    fn test_case_preserved() {
        let seqs = parse_fasta_str(">seq1\nacgT\n").unwrap();
        assert_eq!(seqs[0].data, "acgT");
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_fasta_str(""), Err(FastaError::EmptyFile));
        assert_eq!(parse_fasta_str(">only\n"), Err(FastaError::EmptyFile));
        assert_eq!(
            parse_fasta_str("ACGT\n>seq1\nTGCA\n"),
            Err(FastaError::SequenceWithoutHeader(1))
        );
        assert_eq!(parse_fasta_str(">\nACGT\n"), Err(FastaError::EmptyIdentifier(1)));
        assert_eq!(parse_fasta_str(">s\nACGTé\n"), Err(FastaError::NonAscii(2)));
    }
}
