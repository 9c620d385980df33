//! Block layout.
//!
//! A layout pass cuts the sequence(s) into fixed-width blocks, packs every
//! element category into rows per block, and gives each block a height and
//! a vertical offset. The pass is pure: the same inputs produce an equal
//! [`Layout`], so presenters can compare and skip redrawing.
//!
//! ## Block geometry
//!
//! Block `i` covers `[i * bps_per_block, (i + 1) * bps_per_block)`, clipped
//! to the sequence length. There is always at least one block, even for an
//! empty sequence.

use std::ops::Range;

use thiserror::Error;

use crate::genetic_code::{create_translations, GeneticCode};
use crate::model::{DisplayOptions, ElementKind, PositionalElement, SeqType, SequenceData};
use crate::rows::{normalize_annotations, pack_rows, split_into_blocks, Row};
use crate::sequence::complement;
use crate::symbols::{compute_alignment_symbols, AlignmentError};

/// Errors that can reach the caller of a layout pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Which parallel sequence a block track shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Primary,
    Symbols,
    Comparison,
}

impl TrackKind {
    /// Suffix keeping track ids distinct within one pass.
    pub fn suffix(self) -> &'static str {
        match self {
            TrackKind::Primary => "seq1",
            TrackKind::Symbols => "symbol",
            TrackKind::Comparison => "seq2",
        }
    }
}

/// One sequence's slice within a block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTrack {
    pub kind: TrackKind,
    /// Slice content, block index and track suffix
    pub id: String,
    pub slice: String,
}

/// Rows of every element category within one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRows {
    pub annotations: Vec<Row>,
    pub highlights: Vec<Row>,
    pub search_hits: Vec<Row>,
    pub cut_sites: Vec<Row>,
    pub translations: Vec<Row>,
}

impl CategoryRows {
    pub fn get(&self, kind: ElementKind) -> &[Row] {
        match kind {
            ElementKind::Annotation => &self.annotations,
            ElementKind::Highlight => &self.highlights,
            ElementKind::SearchHit => &self.search_hits,
            ElementKind::CutSite => &self.cut_sites,
            ElementKind::Translation => &self.translations,
        }
    }

    fn get_mut(&mut self, kind: ElementKind) -> &mut Vec<Row> {
        match kind {
            ElementKind::Annotation => &mut self.annotations,
            ElementKind::Highlight => &mut self.highlights,
            ElementKind::SearchHit => &mut self.search_hits,
            ElementKind::CutSite => &mut self.cut_sites,
            ElementKind::Translation => &mut self.translations,
        }
    }
}

/// A fixed-width slice of the sequence(s).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub index: usize,
    pub first_base: usize,
    /// Exclusive, clipped to the sequence length
    pub last_base: usize,
    pub tracks: Vec<BlockTrack>,
    /// Complement of the primary slice (nucleotides only)
    pub complement: String,
    pub rows: CategoryRows,
    pub height: f64,
    /// Sum of the heights of all blocks before this one
    pub y: f64,
}

impl Block {
    pub fn range(&self) -> Range<usize> {
        self.first_base..self.last_base
    }

    pub fn len(&self) -> usize {
        self.last_base - self.first_base
    }

    pub fn is_empty(&self) -> bool {
        self.first_base == self.last_base
    }

    /// Id of the primary track.
    pub fn id(&self) -> &str {
        self.tracks.first().map_or("", |t| t.id.as_str())
    }

    pub fn track(&self, kind: TrackKind) -> Option<&BlockTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }
}

/// Parallel sequences to partition. All are cut at the same boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceTracks<'a> {
    pub primary: &'a str,
    pub symbols: Option<&'a str>,
    pub comparison: Option<&'a str>,
}

impl<'a> SequenceTracks<'a> {
    pub fn new(primary: &'a str) -> Self {
        Self {
            primary,
            ..Self::default()
        }
    }
}

/// Positions per block for a drawing width, or 0 when the width does not
/// give a usable number (zero, negative or infinite).
pub fn bps_per_block_for_width(width: f64, char_width: f64) -> usize {
    let bps = (width / char_width).floor();
    if bps.is_finite() && bps >= 1.0 {
        bps as usize
    } else {
        0
    }
}

/// Block width actually used: 0 means one block spanning the sequence.
pub fn effective_bps_per_block(bps_per_block: usize, seq_len: usize) -> usize {
    if bps_per_block == 0 {
        seq_len.max(1)
    } else {
        bps_per_block
    }
}

/// `ceil(seq_len / bps_per_block)`, at least 1.
pub fn block_count(seq_len: usize, bps_per_block: usize) -> usize {
    let bps = effective_bps_per_block(bps_per_block, seq_len);
    seq_len.div_ceil(bps).max(1)
}

fn clipped(s: &str, range: &Range<usize>) -> String {
    let end = range.end.min(s.len());
    let start = range.start.min(end);
    s.get(start..end).unwrap_or("").to_string()
}

/// Cuts the tracks into blocks. Rows and heights are left empty.
///
/// ```
/// use seqblock::layout::{partition_into_blocks, SequenceTracks};
///
/// let blocks = partition_into_blocks(&SequenceTracks::new("ATGCAG"), 2);
/// let slices: Vec<_> = blocks.iter().map(|b| b.tracks[0].slice.as_str()).collect();
/// assert_eq!(slices, ["AT", "GC", "AG"]);
/// ```
pub fn partition_into_blocks(sequences: &SequenceTracks<'_>, bps_per_block: usize) -> Vec<Block> {
    let seq_len = sequences.primary.len();
    let bps = effective_bps_per_block(bps_per_block, seq_len);
    let count = block_count(seq_len, bps);

    (0..count)
        .map(|index| {
            let first_base = index * bps;
            let last_base = ((index + 1) * bps).min(seq_len).max(first_base.min(seq_len));
            let range = first_base..last_base;

            let mut tracks = Vec::with_capacity(3);
            let mut push = |kind: TrackKind, seq: &str| {
                let slice = clipped(seq, &range);
                tracks.push(BlockTrack {
                    kind,
                    id: format!("{}{}_{}", slice, index, kind.suffix()),
                    slice,
                });
            };
            push(TrackKind::Primary, sequences.primary);
            if let Some(symbols) = sequences.symbols {
                push(TrackKind::Symbols, symbols);
            }
            if let Some(comparison) = sequences.comparison {
                push(TrackKind::Comparison, comparison);
            }

            Block {
                index,
                first_base,
                last_base,
                tracks,
                complement: String::new(),
                rows: CategoryRows::default(),
                height: 0.0,
                y: 0.0,
            }
        })
        .collect()
}

/// Height of a block from its rows.
///
/// Padding of 1.1 lines, plus the sequence line (not for amino acids), the
/// complement line when zoomed in, the index line, one element height per
/// translation and annotation row, and a line for cut-site names.
pub fn block_height(rows: &CategoryRows, seq_type: SeqType, options: &DisplayOptions) -> f64 {
    let line = options.line_height;
    let mut height = line * 1.1;
    if seq_type != SeqType::AminoAcid {
        height += line;
    }
    if options.is_zoomed() && options.show_complement {
        height += line;
    }
    if options.show_index {
        height += line;
    }
    height += rows.translations.len() as f64 * options.element_height;
    height += rows.annotations.len() as f64 * options.element_height;
    if !rows.cut_sites.is_empty() {
        height += line;
    }
    height
}

/// The output of a full layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Block width used, after resolving degenerate sizes
    pub bps_per_block: usize,
    pub sequence_length: usize,
    /// Symbol string when a comparison sequence is present
    pub symbols: Option<String>,
    /// Normalized annotations
    pub annotations: Vec<PositionalElement>,
    pub highlights: Vec<PositionalElement>,
    pub search_hits: Vec<PositionalElement>,
    pub cut_sites: Vec<PositionalElement>,
    /// Translations with their residues
    pub translations: Vec<PositionalElement>,
    pub blocks: Vec<Block>,
    pub total_height: f64,
}

impl Layout {
    /// Runs partition, packing and height resolution over `data`.
    ///
    /// # Errors
    ///
    /// Fails when a comparison sequence does not have the primary's length.
    pub fn compute(data: &SequenceData, options: &DisplayOptions) -> LayoutResult<Self> {
        let seq = data.primary.data.as_str();
        let seq_len = seq.len();
        let bps = effective_bps_per_block(options.bps_per_block, seq_len);

        let symbols = match &data.comparison {
            Some(other) => Some(compute_alignment_symbols(
                seq,
                &other.data,
                data.seq_type,
                options.symbol_mode,
            )?),
            None => None,
        };

        let code = GeneticCode::by_id(options.genetic_code).unwrap_or_else(|| {
            log::warn!(
                "unknown genetic code {}, using the standard code",
                options.genetic_code
            );
            GeneticCode::standard()
        });

        let mut layout = Layout {
            bps_per_block: bps,
            sequence_length: seq_len,
            annotations: normalize_annotations(&data.annotations, seq_len),
            highlights: data.highlights.clone(),
            search_hits: data.search_hits.clone(),
            cut_sites: data.cut_sites.clone(),
            translations: create_translations(&data.translations, seq, data.seq_type, code),
            symbols,
            blocks: Vec::new(),
            total_height: 0.0,
        };

        let tracks = SequenceTracks {
            primary: seq,
            symbols: layout.symbols.as_deref(),
            comparison: data.comparison.as_ref().map(|c| c.data.as_str()),
        };
        let mut blocks = partition_into_blocks(&tracks, bps);
        let count = blocks.len();
        let complement = if options.show_complement {
            complement(seq, data.seq_type)
        } else {
            String::new()
        };

        for kind in ElementKind::ALL {
            let per_block = split_into_blocks(layout.elements(kind), bps, count, seq_len);
            for (block, segments) in blocks.iter_mut().zip(per_block) {
                *block.rows.get_mut(kind) = pack_rows(&segments, block.range());
            }
        }

        let mut y = 0.0;
        for block in &mut blocks {
            block.complement = clipped(&complement, &block.range());
            block.height = block_height(&block.rows, data.seq_type, options);
            block.y = y;
            y += block.height;
            log::trace!(
                "block {} [{}, {}) height {:.2} annotation rows {}",
                block.index,
                block.first_base,
                block.last_base,
                block.height,
                block.rows.annotations.len()
            );
        }

        log::debug!(
            "layout: {} positions, {} blocks of {}, total height {:.2}",
            seq_len,
            count,
            bps,
            y
        );
        layout.blocks = blocks;
        layout.total_height = y;
        Ok(layout)
    }

    /// Elements of one category, as laid out (normalized or translated).
    pub fn elements(&self, kind: ElementKind) -> &[PositionalElement] {
        match kind {
            ElementKind::Annotation => &self.annotations,
            ElementKind::Highlight => &self.highlights,
            ElementKind::SearchHit => &self.search_hits,
            ElementKind::CutSite => &self.cut_sites,
            ElementKind::Translation => &self.translations,
        }
    }

    /// Index of the block showing `pos`; the end of the sequence belongs to
    /// the last block.
    pub fn block_index_for(&self, pos: usize) -> Option<usize> {
        if self.blocks.is_empty() || pos > self.sequence_length {
            return None;
        }
        Some((pos / self.bps_per_block.max(1)).min(self.blocks.len() - 1))
    }
}
