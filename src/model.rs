//! Data model for the block viewer.
//!
//! This module contains all data structures for representing:
//! - Sequences and their alphabet
//! - Positional elements (annotations, highlights, search hits, cut sites, translations)
//! - The selection cursor
//! - Configuration, split into sequence data and display options
//! - Application state of the terminal viewer

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::time::Instant;

use crate::layout::{Layout, LayoutError};
use crate::search::find_matches;
use crate::selection::{ClickCount, Interaction, SelectionController, SelectionIntent};
use crate::symbols::AlignmentStatistics;
use crate::ui::glyphs::Glyphs;
use crate::ui::{block_line_count, Hit};

/// Alphabet of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqType {
    #[default]
    Dna,
    Rna,
    AminoAcid,
}

impl SeqType {
    /// Returns true for DNA and RNA.
    pub fn is_nucleotide(self) -> bool {
        !matches!(self, SeqType::AminoAcid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeqType::Dna => "dna",
            SeqType::Rna => "rna",
            SeqType::AminoAcid => "aa",
        }
    }
}

impl fmt::Display for SeqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeqType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dna" => Ok(SeqType::Dna),
            "rna" => Ok(SeqType::Rna),
            "aa" | "protein" => Ok(SeqType::AminoAcid),
            other => Err(format!("unknown sequence type: {}", other)),
        }
    }
}

/// Represents a single sequence with its identifier and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    /// The residues; ASCII only
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a slice of the sequence data, clipped to the sequence bounds.
    pub fn slice(&self, range: Range<usize>) -> &str {
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        self.data.get(start..end).unwrap_or("")
    }
}

/// Category of a positional element. Each category gets its own rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Annotation,
    Highlight,
    SearchHit,
    CutSite,
    Translation,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Annotation,
        ElementKind::Highlight,
        ElementKind::SearchHit,
        ElementKind::CutSite,
        ElementKind::Translation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Annotation => "annotations",
            ElementKind::Highlight => "highlights",
            ElementKind::SearchHit => "search",
            ElementKind::CutSite => "cut sites",
            ElementKind::Translation => "translations",
        }
    }
}

/// Strand an element lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    #[default]
    None,
    Forward,
    Reverse,
}

/// Any feature with a range over the sequence.
///
/// Ranges are half-open. An `end` smaller than `start` means the element
/// crosses the origin of a circular sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalElement {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub start: usize,
    pub end: usize,
    pub kind: ElementKind,
    pub strand: Strand,
    /// Translated residues, in display order (translations only)
    pub residues: Option<String>,
}

impl PositionalElement {
    pub fn new(id: impl Into<String>, start: usize, end: usize, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            color: None,
            start,
            end,
            kind,
            strand: Strand::None,
            residues: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Returns true if the element crosses the origin.
    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    /// Number of positions covered on a sequence of the given length.
    pub fn span(&self, seq_len: usize) -> usize {
        if self.wraps() {
            seq_len.saturating_sub(self.start) + self.end
        } else {
            self.end - self.start
        }
    }

    /// Returns true if `pos` falls inside the element.
    pub fn contains(&self, pos: usize) -> bool {
        if self.wraps() {
            pos >= self.start || pos < self.end
        } else {
            pos >= self.start && pos < self.end
        }
    }

    /// Label shown for the element: its name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// What a selection refers to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionRef {
    /// A plain range of the sequence
    #[default]
    Sequence,
    /// The whole sequence
    All,
    /// A positional element, by id
    Element(String),
}

/// A cursor or range over the sequence.
///
/// `start` and `end` always lie in `[0, sequence_length]`. When the range is
/// not empty, `clockwise` says whether it runs from `start` forward to `end`
/// (possibly through the origin) or backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub clockwise: bool,
    pub reference: SelectionRef,
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(0)
    }
}

impl Selection {
    /// A zero-length selection at `pos`.
    pub fn cursor(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
            clockwise: true,
            reference: SelectionRef::Sequence,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end && self.reference != SelectionRef::All
    }

    /// The selected positions in ascending order.
    pub fn range(&self) -> Range<usize> {
        self.start.min(self.end)..self.start.max(self.end)
    }

    /// Returns true if `pos` is inside the selected range, following the
    /// selection direction through the origin when it wraps.
    pub fn covers(&self, pos: usize) -> bool {
        if self.reference == SelectionRef::All {
            return true;
        }
        let (from, to) = if self.clockwise {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        if from <= to {
            pos >= from && pos < to
        } else {
            pos >= from || pos < to
        }
    }
}

/// How alignment columns are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolMode {
    /// Gaps as '-', incompatible residues as '*'
    Detailed,
    /// Gaps as ' ', anything non-identical as '.'
    #[default]
    Compact,
}

impl FromStr for SymbolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "detailed" => Ok(SymbolMode::Detailed),
            "compact" => Ok(SymbolMode::Compact),
            other => Err(format!("unknown symbol mode: {}", other)),
        }
    }
}

/// The sequences to lay out and every element drawn over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceData {
    pub primary: Sequence,
    /// Second sequence of a pairwise alignment, gap-padded to the same length
    pub comparison: Option<Sequence>,
    pub seq_type: SeqType,
    pub circular: bool,
    pub annotations: Vec<PositionalElement>,
    pub highlights: Vec<PositionalElement>,
    pub search_hits: Vec<PositionalElement>,
    pub cut_sites: Vec<PositionalElement>,
    /// Ranges to translate; residues are filled in during layout
    pub translations: Vec<PositionalElement>,
}

impl SequenceData {
    pub fn new(primary: Sequence, seq_type: SeqType) -> Self {
        Self {
            primary,
            comparison: None,
            seq_type,
            circular: false,
            annotations: Vec::new(),
            highlights: Vec::new(),
            search_hits: Vec::new(),
            cut_sites: Vec::new(),
            translations: Vec::new(),
        }
    }

    pub fn with_comparison(mut self, comparison: Sequence) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    pub fn elements(&self, kind: ElementKind) -> &[PositionalElement] {
        match kind {
            ElementKind::Annotation => &self.annotations,
            ElementKind::Highlight => &self.highlights,
            ElementKind::SearchHit => &self.search_hits,
            ElementKind::CutSite => &self.cut_sites,
            ElementKind::Translation => &self.translations,
        }
    }
}

/// Display options. Units are whatever the presenter draws in
/// (pixels for a canvas, lines for a terminal).
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    /// Positions per block; 0 lays the whole sequence out as one block
    pub bps_per_block: usize,
    pub line_height: f64,
    pub element_height: f64,
    pub zoom: f64,
    pub show_index: bool,
    pub show_complement: bool,
    pub symbol_mode: SymbolMode,
    /// NCBI genetic code used for translations
    pub genetic_code: u8,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            bps_per_block: 0,
            line_height: 1.0,
            element_height: 1.0,
            zoom: 50.0,
            show_index: true,
            show_complement: false,
            symbol_mode: SymbolMode::Compact,
            genetic_code: 1,
        }
    }
}

impl DisplayOptions {
    /// Above this zoom the complement strand has room to be drawn.
    pub const ZOOMED_THRESHOLD: f64 = 10.0;

    pub fn is_zoomed(&self) -> bool {
        self.zoom > Self::ZOOMED_THRESHOLD
    }
}

/// The portion of the layout currently visible, in whole blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Index of the first visible block
    pub first_block: usize,
    /// Number of terminal lines available for blocks
    pub visible_lines: usize,
    /// Number of sequence columns available per line
    pub visible_cols: usize,
}

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
    /// Search input mode (after pressing '/')
    Search(String),
}

/// The complete application state.
pub struct AppState {
    pub data: SequenceData,
    pub options: DisplayOptions,
    pub layout: Layout,
    pub statistics: Option<AlignmentStatistics>,
    pub controller: SelectionController,
    pub viewport: Viewport,
    pub mode: AppMode,
    pub glyphs: Glyphs,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub show_help: bool,
    pub show_stats: bool,
    /// Block width was given explicitly and does not follow the terminal width
    pub fixed_bps: bool,
}

impl AppState {
    /// Creates the state and runs the first layout pass.
    pub fn new(
        data: SequenceData,
        options: DisplayOptions,
        interaction: Interaction,
        glyphs: Glyphs,
    ) -> Result<Self, LayoutError> {
        let layout = Layout::compute(&data, &options)?;
        let statistics = match &data.comparison {
            Some(other) => Some(AlignmentStatistics::compute(
                &data.primary,
                other,
                data.seq_type,
            )?),
            None => None,
        };
        let fixed_bps = options.bps_per_block > 0;
        Ok(Self {
            data,
            options,
            layout,
            statistics,
            controller: SelectionController::new(interaction),
            viewport: Viewport::default(),
            mode: AppMode::Normal,
            glyphs,
            should_quit: false,
            status_message: None,
            show_help: false,
            show_stats: false,
            fixed_bps,
        })
    }

    /// Updates the viewport size; the block width follows the terminal
    /// width unless it was fixed on the command line.
    pub fn update_viewport_size(&mut self, visible_lines: usize, visible_cols: usize) {
        self.viewport.visible_lines = visible_lines;
        self.viewport.visible_cols = visible_cols;
        if !self.fixed_bps && visible_cols > 0 && self.options.bps_per_block != visible_cols {
            self.options.bps_per_block = visible_cols;
            self.relayout();
        }
        self.ensure_cursor_visible();
    }

    /// Recomputes the layout after the inputs changed.
    pub fn relayout(&mut self) {
        match Layout::compute(&self.data, &self.options) {
            Ok(layout) => {
                if layout != self.layout {
                    self.layout = layout;
                }
            }
            Err(e) => {
                log::warn!("layout failed: {}", e);
                self.status_message = Some(e.to_string());
            }
        }
        let last = self.layout.blocks.len().saturating_sub(1);
        self.viewport.first_block = self.viewport.first_block.min(last);
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    /// Routes an intent through the selection controller.
    pub fn apply_intent(&mut self, intent: SelectionIntent) {
        let copied = matches!(intent, SelectionIntent::Copy);
        self.controller
            .handle(intent, &self.data.primary.data, self.layout.bps_per_block);
        if copied {
            let n = self.controller.copied_len();
            self.status_message = Some(match n {
                Some(n) => format!("Copied {} residues", n),
                None => "Nothing copied".to_string(),
            });
        }
        self.ensure_cursor_visible();
    }

    /// Handles a resolved mouse click.
    pub fn click(&mut self, hit: Hit, now: Instant) {
        let count = self.controller.click(
            hit.target,
            hit.position,
            hit.element,
            now,
            &self.data.primary.data,
            self.layout.bps_per_block,
        );
        if count == ClickCount::Triple {
            self.status_message = Some("Selected all".to_string());
        }
    }

    /// Opens the context menu at a screen position.
    pub fn open_menu(&mut self, x: u16, y: u16) {
        self.apply_intent(SelectionIntent::ContextMenu { x, y });
    }

    /// Lets the click window lapse.
    pub fn tick(&mut self, now: Instant) {
        self.controller.expire_clicks(now);
    }

    pub fn scroll_down(&mut self) {
        if self.viewport.first_block + 1 < self.layout.blocks.len() {
            self.viewport.first_block += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.viewport.first_block = self.viewport.first_block.saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        let step = self.visible_block_count().max(1);
        let last = self.layout.blocks.len().saturating_sub(1);
        self.viewport.first_block = (self.viewport.first_block + step).min(last);
    }

    pub fn page_up(&mut self) {
        let step = self.visible_block_count().max(1);
        self.viewport.first_block = self.viewport.first_block.saturating_sub(step);
    }

    /// Number of whole blocks that fit from the first visible one.
    pub fn visible_block_count(&self) -> usize {
        let mut used = 0;
        let mut count = 0;
        for block in self.layout.blocks.iter().skip(self.viewport.first_block) {
            used += block_line_count(self, block);
            if used > self.viewport.visible_lines {
                break;
            }
            count += 1;
        }
        count
    }

    /// Scrolls so the block holding the cursor end is on screen.
    fn ensure_cursor_visible(&mut self) {
        let Some(block) = self.layout.block_index_for(self.selection().end) else {
            return;
        };
        if block < self.viewport.first_block {
            self.viewport.first_block = block;
        } else {
            let visible = self.visible_block_count().max(1);
            if block >= self.viewport.first_block + visible {
                self.viewport.first_block = block + 1 - visible;
            }
        }
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Enters search mode.
    pub fn enter_search_mode(&mut self) {
        self.mode = AppMode::Search(String::new());
    }

    /// Handles a character typed in command or search mode.
    pub fn input_char(&mut self, c: char) {
        if let AppMode::Command(ref mut buf) | AppMode::Search(ref mut buf) = self.mode {
            buf.push(c);
        }
    }

    /// Handles backspace in command or search mode.
    pub fn input_backspace(&mut self) {
        if let AppMode::Command(ref mut buf) | AppMode::Search(ref mut buf) = self.mode {
            buf.pop();
            if buf.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Returns to normal mode, dropping the typed input.
    pub fn cancel_input(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Executes the typed command or search.
    pub fn execute_input(&mut self) {
        match std::mem::take(&mut self.mode) {
            AppMode::Command(cmd) => self.execute_command(cmd.trim()),
            AppMode::Search(query) => self.search(query.trim()),
            AppMode::Normal => {}
        }
    }

    fn execute_command(&mut self, cmd: &str) {
        let mut parts = cmd.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("q" | "quit"), _) => self.should_quit = true,
            (Some("h" | "help"), _) => self.show_help = true,
            (Some("stats"), _) => self.toggle_stats(),
            (Some("complement"), _) => {
                self.options.show_complement = !self.options.show_complement;
                self.relayout();
            }
            (Some("index"), _) => {
                self.options.show_index = !self.options.show_index;
                self.relayout();
            }
            (Some("bps"), Some(n)) => match n.parse::<usize>() {
                Ok(bps) => {
                    self.options.bps_per_block = bps;
                    self.fixed_bps = bps > 0;
                    self.relayout();
                    self.ensure_cursor_visible();
                }
                Err(_) => self.status_message = Some(format!("Invalid block width: {}", n)),
            },
            (Some(pos), None) => match pos.parse::<usize>() {
                Ok(p) if p >= 1 && p <= self.data.len() => {
                    self.controller.replace(Selection::cursor(p - 1));
                    self.ensure_cursor_visible();
                }
                Ok(p) => self.status_message = Some(format!("Invalid position: {}", p)),
                Err(_) => self.status_message = Some(format!("Unknown command: {}", cmd)),
            },
            _ => self.status_message = Some(format!("Unknown command: {}", cmd)),
        }
    }

    /// Replaces the search hits with matches of `query` and jumps to the first.
    pub fn search(&mut self, query: &str) {
        self.data.search_hits = find_matches(
            &self.data.primary.data,
            query,
            self.data.seq_type,
            self.data.circular,
        );
        self.relayout();
        let count = self.data.search_hits.len();
        self.status_message = Some(match count {
            0 if query.is_empty() => "Search cleared".to_string(),
            0 => format!("Pattern not found: {}", query),
            n => format!("{} matches for {}", n, query),
        });
        if count > 0 {
            self.find_next();
        }
    }

    /// Moves the cursor to the next search hit after it, wrapping around.
    pub fn find_next(&mut self) {
        let pos = self.selection().start;
        let hits = &self.data.search_hits;
        let next = hits
            .iter()
            .filter(|h| h.start > pos)
            .min_by_key(|h| h.start)
            .or_else(|| hits.iter().min_by_key(|h| h.start));
        if let Some(hit) = next {
            let (start, end) = (hit.start, hit.end);
            self.controller.replace(Selection {
                start,
                end,
                clockwise: true,
                reference: SelectionRef::Element(hit.id.clone()),
            });
            self.ensure_cursor_visible();
        }
    }

    /// Moves the cursor to the previous search hit before it, wrapping around.
    pub fn find_previous(&mut self) {
        let pos = self.selection().start;
        let hits = &self.data.search_hits;
        let prev = hits
            .iter()
            .filter(|h| h.start < pos)
            .max_by_key(|h| h.start)
            .or_else(|| hits.iter().max_by_key(|h| h.start));
        if let Some(hit) = prev {
            let (start, end) = (hit.start, hit.end);
            self.controller.replace(Selection {
                start,
                end,
                clockwise: true,
                reference: SelectionRef::Element(hit.id.clone()),
            });
            self.ensure_cursor_visible();
        }
    }

    pub fn toggle_stats(&mut self) {
        if self.statistics.is_some() {
            self.show_stats = !self.show_stats;
        } else {
            self.status_message = Some("Statistics need a comparison sequence".to_string());
        }
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Register;

    fn state(seq: &str) -> AppState {
        let data = SequenceData::new(Sequence::new("seq1", seq), SeqType::Dna);
        let options = DisplayOptions {
            bps_per_block: 4,
            ..DisplayOptions::default()
        };
        AppState::new(
            data,
            options,
            Interaction::new(Box::new(Register::default())),
            crate::ui::glyphs::select(false),
        )
        .unwrap()
    }

    #[test]
    fn test_sequence_slice_clips() {
        let seq = Sequence::new("seq1", "ACGT");
        assert_eq!(seq.slice(1..3), "CG");
        assert_eq!(seq.slice(2..10), "GT");
        assert_eq!(seq.slice(8..10), "");
    }

    #[test]
    fn test_seq_type_parse() {
        assert_eq!("dna".parse::<SeqType>().unwrap(), SeqType::Dna);
        assert_eq!("AA".parse::<SeqType>().unwrap(), SeqType::AminoAcid);
        assert!("xyz".parse::<SeqType>().is_err());
    }

    #[test]
    fn test_element_wraps_and_contains() {
        let el = PositionalElement::new("a", 8, 2, ElementKind::Annotation);
        assert!(el.wraps());
        assert_eq!(el.span(10), 4);
        assert!(el.contains(9));
        assert!(el.contains(1));
        assert!(!el.contains(5));
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let sel = Selection {
            start: 7,
            end: 3,
            clockwise: false,
            reference: SelectionRef::Sequence,
        };
        assert_eq!(sel.range(), 3..7);
        assert!(sel.covers(5));
        assert!(!sel.covers(7));
    }

    #[test]
    fn test_goto_command() {
        let mut state = state("ACGTACGTACGT");
        state.update_viewport_size(40, 4);
        state.enter_command_mode();
        for c in "6".chars() {
            state.input_char(c);
        }
        state.execute_input();
        assert_eq!(state.selection().start, 5);
        assert_eq!(state.mode, AppMode::Normal);
    }

    #[test]
    fn test_bps_command_relayouts() {
        let mut state = state("ACGTACGTACGT");
        assert_eq!(state.layout.blocks.len(), 3);
        state.mode = AppMode::Command("bps 6".to_string());
        state.execute_input();
        assert_eq!(state.layout.blocks.len(), 2);
        assert!(state.fixed_bps);
    }

    #[test]
    fn test_search_jumps_to_hits() {
        let mut state = state("ACGTTTACGT");
        state.search("TTT");
        assert_eq!(state.data.search_hits.len(), 1);
        assert_eq!(state.selection().start, 3);
    }

    #[test]
    fn test_quit_command() {
        let mut state = state("ACGT");
        state.mode = AppMode::Command("q".to_string());
        state.execute_input();
        assert!(state.should_quit);
    }
}
