//! Sequence and feature file readers.
//!
//! Sequence files are read as:
//! - FASTA (.fasta, .fa, .fna, .faa, .fas)
//! - Raw residues (.seq, .txt), one sequence spread over any number of lines
//!
//! Format detection priority:
//! 1. Content-based detection
//! 2. File extension
//!
//! Feature tables are described in [`features`].

pub mod fasta;
pub mod features;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::model::{PositionalElement, Sequence};

/// Detected file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Raw,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Raw => write!(f, "raw"),
        }
    }
}

/// Errors that can occur while reading input files.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("Could not determine file format.\n\
             Hint: sequence files must be FASTA (starting with '>') or plain residues")]
    UnknownFormat,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("Feature table error: {0}")]
    FeatureError(#[from] features::FeatureError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Detects format from file extension.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "fa" | "fas" | "fasta" | "fna" | "faa" | "ffn" | "frn" => Some(FileFormat::Fasta),
        "seq" | "txt" | "raw" => Some(FileFormat::Raw),
        _ => None,
    }
}

/// Residues accepted in a raw sequence file.
fn is_residue(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'-' | b'*' | b'.')
}

/// Detects the file format by examining the first non-empty line.
pub fn detect_format_from_content(content: &str) -> Option<FileFormat> {
    let first = content.lines().map(str::trim).find(|l| !l.is_empty())?;
    if first.starts_with('>') {
        return Some(FileFormat::Fasta);
    }
    if first
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .all(is_residue)
    {
        return Some(FileFormat::Raw);
    }
    None
}

/// Reads raw residues; the id is supplied by the caller.
fn parse_raw(content: &str, id: &str) -> ParseResult<Vec<Sequence>> {
    let data: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if data.is_empty() {
        return Err(ParseError::EmptyFile);
    }
    if !data.bytes().all(is_residue) {
        return Err(ParseError::UnknownFormat);
    }
    Ok(vec![Sequence::new(id, data)])
}

/// Parses content with a specific format.
pub fn parse_content(content: &str, format: FileFormat, id: &str) -> ParseResult<Vec<Sequence>> {
    match format {
        FileFormat::Fasta => Ok(fasta::parse_fasta_str(content)?),
        FileFormat::Raw => parse_raw(content, id),
    }
}

/// Reads every sequence of a file, detecting its format.
///
/// Raw files yield one sequence named after the file stem.
pub fn read_sequences<P: AsRef<Path>>(path: P) -> ParseResult<Vec<Sequence>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }
    let id = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("sequence");

    // content wins over the extension: a .txt holding FASTA is still FASTA
    let format = detect_format_from_content(&content)
        .or_else(|| detect_format_from_extension(path))
        .ok_or(ParseError::UnknownFormat)?;
    log::info!("reading {} as {}", path.display(), format);
    parse_content(&content, format, id)
}

/// Reads a feature table.
pub fn read_features<P: AsRef<Path>>(path: P) -> ParseResult<Vec<PositionalElement>> {
    let content = fs::read_to_string(path)?;
    Ok(features::parse_features_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_detect_from_content() {
        assert_eq!(detect_format_from_content("\n\n>seq1\nACGT\n"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_content("ACGT ACGT\nTTGA\n"), Some(FileFormat::Raw));
        assert_eq!(detect_format_from_content("LOCUS 1234 bp\n"), None);
        assert_eq!(detect_format_from_content(""), None);
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("test.fa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.FASTA"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.seq"), Some(FileFormat::Raw));
        assert_eq!(detect_format_from_extension("test.gb"), None);
    }

    #[test]
    fn test_read_fasta_file() {
        let file = temp_file(".fa", ">a\nACGT\nAC\n>b\nTT\n");
        let seqs = read_sequences(file.path()).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].data, "ACGTAC");
    }

    #[test]
    fn test_read_raw_file_named_after_stem() {
        let file = temp_file(".seq", "acgt\nACGT\n");
        let seqs = read_sequences(file.path()).unwrap();
        let stem = file.path().file_stem().unwrap().to_str().unwrap();
        assert_eq!(seqs[0].id, stem);
        assert_eq!(seqs[0].data, "acgtACGT");
    }

    #[test]
    fn test_read_errors() {
        let file = temp_file(".fa", "  \n");
        assert!(matches!(read_sequences(file.path()), Err(ParseError::EmptyFile)));

        let file = temp_file(".txt", "1 ACGT 2\n");
        assert!(matches!(read_sequences(file.path()), Err(ParseError::UnknownFormat)));

        assert!(matches!(
            read_sequences("/nonexistent/path.fa"),
            Err(ParseError::IoError(_))
        ));
    }

    #[test]
    fn test_read_features_file() {
        let file = temp_file(".bed", "gene 2 8 +\n");
        let features = read_features(file.path()).unwrap();
        assert_eq!(features.len(), 1);

        let file = temp_file(".bed", "gene 2\n");
        assert!(matches!(read_features(file.path()), Err(ParseError::FeatureError(_))));
    }
}
