//! TUI rendering module.
//!
//! Draws the block layout with ratatui. Each block becomes a stack of
//! terminal lines (the line plan, see [`block_lines`]):
//! - an index ruler
//! - one line per annotation row and per translation row
//! - cut-site markers with their names
//! - the sequence, colored per residue, with highlights, search hits and
//!   the selection on top
//! - the complement strand, alignment symbols and comparison sequence
//!
//! Pixel heights from the layout pass are not used here; a terminal line
//! is the unit. Overlays (statistics, context menu, help) are drawn last.

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout as Split, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{self, Borders, Clear, Paragraph},
    Frame,
};

use crate::layout::{Block, TrackKind};
use crate::model::{AppMode, AppState, ElementKind, PositionalElement, SelectionRef, SeqType, Strand};
use crate::selection::{copy_text, ClickTarget, ElementRange, MenuState};

/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Width of the frame border around the blocks.
const BORDER: u16 = 1;

/// Colors cycled through for elements without their own color.
const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::LightBlue,
    Color::LightRed,
    Color::LightYellow,
];

const HELP_TEXT: &[&str] = &[
    "Navigation",
    "  Arrows or h/j/k/l     move the cursor; up and down jump one block",
    "  Shift + arrows        extend the selection",
    "  PageUp/PageDown       scroll by page; Ctrl+E/Ctrl+Y or the wheel scroll by block",
    "",
    "Selection",
    "  Click                 place the cursor",
    "  Double click          select the annotation, translation or search hit under the pointer",
    "  Triple click, Ctrl+A  select the whole sequence",
    "  Ctrl+C, y             copy the selection",
    "  Right click           context menu (c: copy, a: select all)",
    "",
    "Commands",
    "  :<n>                  go to position n",
    "  :bps <n>              positions per block (0 follows the terminal width)",
    "  :complement :index    toggle the complement strand or the index ruler",
    "  :stats, s             toggle alignment statistics",
    "  /<query>, n, N        search both strands, next and previous hit",
    "  :q, Ctrl+Q            quit",
    "",
    "Press any key to close this help.",
];

/// Color scheme for residues.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' | 'U' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Amino acid color scheme, by physicochemical group.
pub struct AminoAcidColorScheme;

impl ColorScheme for AminoAcidColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            // Hydrophobic
            'A' | 'V' | 'I' | 'L' | 'M' | 'F' | 'W' | 'P' => Color::Yellow,
            // Polar
            'S' | 'T' | 'N' | 'Q' | 'C' | 'G' | 'Y' => Color::Green,
            // Charged positive
            'K' | 'R' | 'H' => Color::Blue,
            // Charged negative
            'D' | 'E' => Color::Red,
            // Gap or unknown
            '-' | 'X' | '*' => Color::DarkGray,
            _ => Color::Gray,
        }
    }
}

fn scheme_for(seq_type: SeqType) -> &'static dyn ColorScheme {
    if seq_type.is_nucleotide() {
        &DnaColorScheme
    } else {
        &AminoAcidColorScheme
    }
}

/// Color of an element: its own (`#rrggbb` or a color name) or one from the
/// palette.
fn element_color(element: &PositionalElement, index: usize) -> Color {
    element
        .color
        .as_deref()
        .and_then(|c| c.parse::<Color>().ok())
        .unwrap_or_else(|| match element.kind {
            ElementKind::CutSite => Color::Red,
            ElementKind::SearchHit => Color::Yellow,
            _ => PALETTE[index % PALETTE.len()],
        })
}

/// One terminal line of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Index,
    /// Row `n` of an element category
    Element(ElementKind, usize),
    CutSites,
    Sequence,
    Complement,
    Symbols,
    Comparison,
    Spacer,
}

/// Lines drawn for `block`, top to bottom.
pub fn block_lines(state: &AppState, block: &Block) -> Vec<LineKind> {
    let mut lines = Vec::new();
    if state.options.show_index {
        lines.push(LineKind::Index);
    }
    for kind in [ElementKind::Annotation, ElementKind::Translation] {
        lines.extend((0..block.rows.get(kind).len()).map(|row| LineKind::Element(kind, row)));
    }
    if !block.rows.cut_sites.is_empty() {
        lines.push(LineKind::CutSites);
    }
    lines.push(LineKind::Sequence);
    if state.options.show_complement && state.data.seq_type.is_nucleotide() {
        lines.push(LineKind::Complement);
    }
    if block.track(TrackKind::Symbols).is_some() {
        lines.push(LineKind::Symbols);
    }
    if block.track(TrackKind::Comparison).is_some() {
        lines.push(LineKind::Comparison);
    }
    lines.push(LineKind::Spacer);
    lines
}

/// Number of terminal lines `block` takes.
pub fn block_line_count(state: &AppState, block: &Block) -> usize {
    block_lines(state, block).len()
}

/// Width of the position column left of each block.
pub fn gutter_width(seq_len: usize) -> u16 {
    seq_len.max(1).to_string().len() as u16 + 1
}

/// Calculates the visible lines and sequence columns for a terminal size.
pub fn calculate_visible_dimensions(
    terminal_width: u16,
    terminal_height: u16,
    seq_len: usize,
) -> (usize, usize) {
    let visible_cols = terminal_width.saturating_sub(2 * BORDER + gutter_width(seq_len) + 1) as usize;
    let visible_lines = terminal_height.saturating_sub(STATUS_BAR_HEIGHT + 2 * BORDER) as usize;
    (visible_lines, visible_cols)
}

/// A click resolved against the line plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub position: usize,
    pub target: ClickTarget,
    /// Element under the pointer, selected by a double click
    pub element: Option<ElementRange>,
}

fn element_range(state: &AppState, kind: ElementKind, index: usize) -> Option<ElementRange> {
    state.layout.elements(kind).get(index).map(|el| ElementRange {
        id: el.id.clone(),
        start: el.start,
        end: el.end,
    })
}

/// Finds the block and line at a content row.
fn locate(state: &AppState, content_row: usize) -> Option<(&Block, LineKind)> {
    let mut remaining = content_row;
    for block in state.layout.blocks.iter().skip(state.viewport.first_block) {
        let lines = block_lines(state, block);
        if remaining < lines.len() {
            return Some((block, lines[remaining]));
        }
        remaining -= lines.len();
    }
    None
}

/// Resolves a screen cell to a sequence position and click target.
pub fn hit_test(state: &AppState, col: u16, row: u16) -> Option<Hit> {
    let content_row = row.checked_sub(BORDER)? as usize;
    if content_row >= state.viewport.visible_lines {
        return None;
    }
    let (block, line) = locate(state, content_row)?;
    let left = BORDER + gutter_width(state.data.len());
    let position = block.first_base + col.checked_sub(left)? as usize;
    if position > block.last_base {
        return None;
    }

    let found = match line {
        LineKind::Element(kind, row) => block
            .rows
            .get(kind)
            .get(row)
            .and_then(|r| r.segment_at(position))
            .map(|s| (kind, s.element)),
        LineKind::CutSites => block
            .rows
            .cut_sites
            .iter()
            .find_map(|r| r.segment_at(position))
            .map(|s| (ElementKind::CutSite, s.element)),
        LineKind::Sequence => [ElementKind::SearchHit, ElementKind::Highlight]
            .into_iter()
            .find_map(|kind| {
                state
                    .layout
                    .elements(kind)
                    .iter()
                    .position(|el| el.contains(position))
                    .map(|index| (kind, index))
            }),
        _ => None,
    };
    let element = found.and_then(|(kind, index)| element_range(state, kind, index));

    let target = match (line, &element) {
        (LineKind::Sequence, _) | (_, None) => ClickTarget::Block(block.index),
        (_, Some(el)) => ClickTarget::Element(el.id.clone()),
    };
    Some(Hit {
        position,
        target,
        element,
    })
}

type Cell = (char, Style);

fn blank_cells(n: usize) -> Vec<Cell> {
    vec![(' ', Style::default()); n]
}

fn write_label(cells: &mut [Cell], at: usize, label: &str, style: Style) {
    for (i, c) in label.chars().enumerate() {
        if let Some(cell) = cells.get_mut(at + i) {
            *cell = (c, style);
        }
    }
}

/// Merges runs of equally styled cells into spans.
fn cells_to_spans(cells: &[Cell]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut current = Style::default();
    for &(c, style) in cells {
        if style != current && !text.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut text), current));
        }
        current = style;
        text.push(c);
    }
    if !text.is_empty() {
        spans.push(Span::styled(text, current));
    }
    spans
}

fn index_cells(state: &AppState, block: &Block) -> Vec<Cell> {
    let mut cells = blank_cells(block.len());
    let style = Style::default().fg(Color::DarkGray);
    let mut free_from = 0;
    for p in block.range() {
        let n = p + 1;
        let col = p - block.first_base;
        if n % 10 == 5 && cells[col].0 == ' ' {
            cells[col] = (state.glyphs.tick, style);
        }
        if n % 10 != 0 {
            continue;
        }
        let label = n.to_string();
        // labels end on their position
        if col + 1 < label.len() || col + 1 - label.len() < free_from {
            continue;
        }
        write_label(&mut cells, col + 1 - label.len(), &label, style);
        free_from = col + 2;
    }
    cells
}

fn element_cells(state: &AppState, block: &Block, kind: ElementKind, row: usize) -> Vec<Cell> {
    let mut cells = blank_cells(block.len());
    let Some(row) = block.rows.get(kind).get(row) else {
        return cells;
    };
    let elements = state.layout.elements(kind);
    let glyphs = &state.glyphs;
    let seq_len = state.data.len().max(1);

    for segment in &row.segments {
        let Some(el) = elements.get(segment.element) else {
            continue;
        };
        let style = Style::default().fg(element_color(el, segment.element));
        let from = segment.start - block.first_base;
        let to = (segment.packed_end() - block.first_base).min(block.len());
        if from >= to {
            continue;
        }

        if kind == ElementKind::Translation {
            let residues = el.residues.as_deref().unwrap_or("").as_bytes();
            for (col, cell) in cells.iter_mut().enumerate().take(to).skip(from) {
                let offset = (block.first_base + col + seq_len - el.start % seq_len) % seq_len;
                let residue = if state.data.seq_type.is_nucleotide() {
                    if offset % 3 == 1 {
                        residues.get(offset / 3).copied()
                    } else {
                        None
                    }
                } else {
                    residues.get(offset).copied()
                };
                *cell = (residue.map_or(glyphs.codon_fill, char::from), style);
            }
            continue;
        }

        for cell in &mut cells[from..to] {
            *cell = (glyphs.annotation_fill, style);
        }
        match el.strand {
            Strand::Forward if segment.end == el.end => cells[to - 1] = (glyphs.arrow_right, style),
            Strand::Reverse if segment.start == el.start => cells[from] = (glyphs.arrow_left, style),
            _ => {}
        }
        let name = el.display_name();
        let width = name.chars().count();
        if width + 2 <= to - from {
            let at = from + (to - from - width) / 2;
            write_label(&mut cells, at, name, style.add_modifier(Modifier::BOLD));
        }
    }
    cells
}

fn cut_site_cells(state: &AppState, block: &Block) -> Vec<Cell> {
    let mut cells = blank_cells(block.len());
    let style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let segments: Vec<_> = block.rows.cut_sites.iter().flat_map(|r| &r.segments).collect();

    for segment in &segments {
        if let Some(cell) = cells.get_mut(segment.start - block.first_base) {
            *cell = (state.glyphs.cut_marker, style);
        }
    }
    for segment in &segments {
        let Some(el) = state.layout.cut_sites.get(segment.element) else {
            continue;
        };
        let at = segment.start - block.first_base + 1;
        let name = el.display_name();
        let fits = cells
            .get(at..at + name.chars().count())
            .is_some_and(|span| span.iter().all(|c| c.0 == ' '));
        if fits {
            write_label(&mut cells, at, name, Style::default().fg(Color::Red));
        }
    }
    cells
}

fn sequence_cells(state: &AppState, block: &Block) -> Vec<Cell> {
    let scheme = scheme_for(state.data.seq_type);
    let slice = block.track(TrackKind::Primary).map_or("", |t| t.slice.as_str());

    let mut marks: Vec<Option<Color>> = vec![None; block.len()];
    for kind in [ElementKind::Highlight, ElementKind::SearchHit] {
        let elements = state.layout.elements(kind);
        for segment in block.rows.get(kind).iter().flat_map(|r| &r.segments) {
            let color = elements
                .get(segment.element)
                .map_or(Color::Yellow, |el| element_color(el, segment.element));
            for p in segment.start..segment.end.min(block.last_base) {
                marks[p - block.first_base] = Some(color);
            }
        }
    }

    let selection = state.selection();
    let cursor = selection.is_empty().then_some(selection.end);
    let mut cells: Vec<Cell> = slice
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let p = block.first_base + i;
            let mut style = match marks[i] {
                Some(color) => Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
                None => Style::default().fg(Color::Black).bg(scheme.get_color(c)),
            };
            if !selection.is_empty() && selection.covers(p) {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD);
            }
            if cursor == Some(p) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::UNDERLINED);
            }
            (c, style)
        })
        .collect();

    // the cursor may sit after the last residue
    if cursor == Some(block.last_base) && block.last_base == state.data.len() {
        cells.push((' ', Style::default().add_modifier(Modifier::REVERSED)));
    }
    cells
}

fn colored_cells(text: &str, color: impl Fn(char) -> Color) -> Vec<Cell> {
    text.chars()
        .map(|c| (c, Style::default().fg(color(c))))
        .collect()
}

fn render_line(state: &AppState, block: &Block, kind: LineKind) -> Line<'static> {
    let width = gutter_width(state.data.len()) as usize;
    let gutter = match kind {
        LineKind::Sequence => format!("{:>w$} ", block.first_base + 1, w = width - 1),
        _ => " ".repeat(width),
    };

    let scheme = scheme_for(state.data.seq_type);
    let cells = match kind {
        LineKind::Index => index_cells(state, block),
        LineKind::Element(element_kind, row) => element_cells(state, block, element_kind, row),
        LineKind::CutSites => cut_site_cells(state, block),
        LineKind::Sequence => sequence_cells(state, block),
        LineKind::Complement => colored_cells(&block.complement, |c| scheme.get_color(c)),
        LineKind::Symbols => block
            .track(TrackKind::Symbols)
            .map_or_else(Vec::new, |t| colored_cells(&t.slice, |_| Color::White)),
        LineKind::Comparison => block
            .track(TrackKind::Comparison)
            .map_or_else(Vec::new, |t| colored_cells(&t.slice, |c| scheme.get_color(c))),
        LineKind::Spacer => Vec::new(),
    };

    let mut spans = vec![Span::styled(gutter, Style::default().fg(Color::DarkGray))];
    spans.extend(cells_to_spans(&cells));
    Line::from(spans)
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Main layout: blocks + status bar
    let main_layout = Split::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(area);

    render_blocks(frame, state, main_layout[0]);
    render_status_bar(frame, state, main_layout[1]);

    if state.show_stats {
        render_statistics(frame, state, main_layout[0]);
    }
    if let MenuState::Open { x, y } = state.controller.menu() {
        render_menu(frame, area, x, y);
    }
    if state.show_help {
        render_help(frame, area);
    }
}

/// Renders the visible blocks inside a bordered panel.
fn render_blocks(frame: &mut Frame, state: &AppState, area: Rect) {
    let visible = area.height.saturating_sub(2 * BORDER) as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(visible);
    let mut last_shown = state.viewport.first_block;

    'blocks: for block in state.layout.blocks.iter().skip(state.viewport.first_block) {
        for kind in block_lines(state, block) {
            if lines.len() >= visible {
                break 'blocks;
            }
            lines.push(render_line(state, block, kind));
        }
        last_shown = block.index;
    }

    let title = format!(
        " {} [{} | {} {}{} | Blocks {}-{}/{}] ",
        state.data.primary.id,
        state.data.seq_type,
        state.data.len(),
        if state.data.seq_type.is_nucleotide() { "bp" } else { "aa" },
        if state.data.circular { " circular" } else { "" },
        state.viewport.first_block + 1,
        last_shown + 1,
        state.layout.blocks.len()
    );

    let panel = widgets::Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(lines).block(panel), area);
}

/// Describes the selection for the status bar.
fn selection_summary(state: &AppState) -> String {
    let selection = state.selection();
    let len = state.data.len();
    if selection.reference == SelectionRef::All {
        return format!("All {} ", len);
    }
    if selection.is_empty() {
        return format!("Pos {}/{} ", selection.end.min(len.saturating_sub(1)) + 1, len);
    }
    // the same range a copy takes
    let range = selection.range();
    let count = copy_text(selection, &state.data.primary.data).len();
    let name = match &selection.reference {
        SelectionRef::Element(id) => format!("{} ", id),
        _ => String::new(),
    };
    format!("{}{}-{} ({}) ", name, range.start + 1, range.end, count)
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, input) = match &state.mode {
        AppMode::Normal => ("NORMAL", None),
        AppMode::Command(cmd) => ("COMMAND", Some(format!(":{}", cmd))),
        AppMode::Search(query) => ("SEARCH", Some(format!("/{}", query))),
    };

    let message = state.status_message.as_deref().unwrap_or("");
    let left_content = format!(" {} | {} ", mode_str, input.as_deref().unwrap_or(message));
    let position_info = selection_summary(state);

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + position_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

/// A rectangle of the given size anchored at `(x, y)`, kept inside `area`.
fn popup_rect(area: Rect, x: u16, y: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: x.min(area.x + area.width - width).max(area.x),
        y: y.min(area.y + area.height - height).max(area.y),
        width,
        height,
    }
}

fn render_statistics(frame: &mut Frame, state: &AppState, area: Rect) {
    let Some(stats) = &state.statistics else {
        return;
    };
    let mut lines = vec![Line::from(format!(
        "{} columns, {} identical, {} mismatches",
        stats.columns, stats.identical, stats.mismatches
    ))];
    for seq in &stats.sequences {
        lines.push(Line::from(format!(
            "{}: {} residues, {:.1}% identity, {:.1}% coverage",
            seq.name,
            seq.length,
            seq.fraction_identical * 100.0,
            seq.coverage * 100.0
        )));
    }

    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
    let rect = popup_rect(area, area.x + area.width.saturating_sub(width), area.y + 1, width, 5);
    let panel = widgets::Block::default().borders(Borders::ALL).title(" Statistics ");
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(panel), rect);
}

fn render_menu(frame: &mut Frame, area: Rect, x: u16, y: u16) {
    let lines = vec![Line::from(" c  Copy"), Line::from(" a  Select all")];
    let rect = popup_rect(area, x, y, 18, 4);
    let panel = widgets::Block::default().borders(Borders::ALL);
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(panel), rect);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = (area.width * 7 / 10).max(24).min(area.width);
    let text_width = width.saturating_sub(4).max(10) as usize;
    let lines: Vec<Line> = HELP_TEXT
        .iter()
        .flat_map(|entry| textwrap::wrap(entry, text_width))
        .map(|piece| Line::from(piece.into_owned()))
        .collect();

    let height = lines.len() as u16 + 2;
    let rect = popup_rect(
        area,
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    let panel = widgets::Block::default().borders(Borders::ALL).title(" Help ");
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(panel), rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circular::Direction;
    use crate::model::{DisplayOptions, Sequence, SequenceData};
    use crate::selection::{Interaction, Register, SelectionIntent};
    use ratatui::{backend::TestBackend, Terminal};

    fn state_with(data: SequenceData, bps: usize) -> AppState {
        let options = DisplayOptions {
            bps_per_block: bps,
            ..DisplayOptions::default()
        };
        let mut state = AppState::new(
            data,
            options,
            Interaction::new(Box::new(Register::default())),
            glyphs::select(false),
        )
        .unwrap();
        state.update_viewport_size(40, bps);
        state
    }

    fn annotated() -> AppState {
        let mut data = SequenceData::new(Sequence::new("pX", "ACGTACGTACGTACGTACGT"), SeqType::Dna);
        data.annotations = vec![
            PositionalElement::new("lac", 0, 8, ElementKind::Annotation)
                .with_name("lac")
                .with_strand(Strand::Forward),
            PositionalElement::new("ori", 4, 12, ElementKind::Annotation),
        ];
        data.cut_sites = vec![PositionalElement::new("EcoRI", 3, 3, ElementKind::CutSite)];
        state_with(data, 10)
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_dna_colors() {
        let scheme = DnaColorScheme;
        assert_eq!(scheme.get_color('A'), Color::Red);
        assert_eq!(scheme.get_color('a'), Color::Red);
        assert_eq!(scheme.get_color('U'), Color::Blue);
        assert_eq!(scheme.get_color('-'), Color::DarkGray);
    }

    #[test]
    fn test_element_color() {
        let el = PositionalElement::new("a", 0, 1, ElementKind::Annotation).with_color("#ff0000");
        assert_eq!(element_color(&el, 3), Color::Rgb(255, 0, 0));
        let plain = PositionalElement::new("b", 0, 1, ElementKind::Annotation);
        assert_eq!(element_color(&plain, 1), PALETTE[1]);
    }

    #[test]
    fn test_visible_dimensions() {
        // 100 - 2 (borders) - 4 (gutter for 3 digits) - 1 = 93 cols
        // 50 - 1 (status) - 2 (borders) = 47 lines
        assert_eq!(calculate_visible_dimensions(100, 50, 500), (47, 93));
    }

    #[test]
    fn test_line_plan() {
        let state = annotated();
        let first = &state.layout.blocks[0];
        assert_eq!(
            block_lines(&state, first),
            vec![
                LineKind::Index,
                LineKind::Element(ElementKind::Annotation, 0),
                LineKind::Element(ElementKind::Annotation, 1),
                LineKind::CutSites,
                LineKind::Sequence,
                LineKind::Spacer,
            ]
        );
        let second = &state.layout.blocks[1];
        assert_eq!(block_line_count(&state, second), 4);
    }

    #[test]
    fn test_hit_test_sequence_and_elements() {
        let state = annotated();
        let left = BORDER + gutter_width(20);

        // sequence line of the first block
        let hit = hit_test(&state, left + 2, BORDER + 4).unwrap();
        assert_eq!(hit.position, 2);
        assert_eq!(hit.target, ClickTarget::Block(0));
        assert_eq!(hit.element, None);

        // second annotation row holds "ori"
        let hit = hit_test(&state, left + 6, BORDER + 2).unwrap();
        assert_eq!(hit.target, ClickTarget::Element("ori".to_string()));
        assert_eq!(hit.element.map(|e| (e.start, e.end)), Some((4, 12)));

        // first line of the second block is its index
        let hit = hit_test(&state, left + 1, BORDER + 6).unwrap();
        assert_eq!(hit.position, 11);

        // gutter and border do not hit
        assert_eq!(hit_test(&state, 0, BORDER + 4), None);
        assert_eq!(hit_test(&state, left, 0), None);
    }

    #[test]
    fn test_translation_cells() {
        let mut data = SequenceData::new(Sequence::new("s", "ATGTTTGGG"), SeqType::Dna);
        data.translations = vec![PositionalElement::new("orf", 0, 9, ElementKind::Translation)
            .with_strand(Strand::Forward)];
        let state = state_with(data, 9);
        let cells = element_cells(&state, &state.layout.blocks[0], ElementKind::Translation, 0);
        let text: String = cells.iter().map(|c| c.0).collect();
        assert_eq!(text, ".M..F..G.");
    }

    #[test]
    fn test_selection_summary() {
        let mut state = annotated();
        assert_eq!(selection_summary(&state), "Pos 1/20 ");
        state.controller.replace(crate::model::Selection {
            start: 18,
            end: 2,
            clockwise: true,
            reference: SelectionRef::Sequence,
        });
        assert_eq!(selection_summary(&state), "3-18 (16) ");
    }

    #[test]
    fn test_selection_summary_counts_what_copy_takes() {
        let mut state = annotated();
        state.apply_intent(SelectionIntent::MoveCursor {
            direction: Direction::Left,
            extend: true,
        });
        assert_eq!((state.selection().start, state.selection().end), (0, 19));
        assert_eq!(selection_summary(&state), "1-19 (19) ");
        state.apply_intent(SelectionIntent::Copy);
        assert_eq!(state.status_message.as_deref(), Some("Copied 19 residues"));
    }

    #[test]
    fn test_render_draws_blocks() {
        let state = annotated();
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();
        let screen = screen_text(&terminal);
        assert!(screen.contains("ACGTACGTAC"));
        assert!(screen.contains("lac"));
        assert!(screen.contains("vEcoRI"));
        assert!(screen.contains("NORMAL"));
    }

    #[test]
    fn test_render_overlays() {
        let data = SequenceData::new(Sequence::new("a", "ATGC-AG"), SeqType::Dna)
            .with_comparison(Sequence::new("b", "ATCC-AG"));
        let mut state = state_with(data, 7);
        state.show_stats = true;
        state.open_menu(40, 12);
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();
        let screen = screen_text(&terminal);
        assert!(screen.contains("||.| ||"));
        assert!(screen.contains("Statistics"));
        assert!(screen.contains("Select all"));

        state.show_help = true;
        terminal.draw(|frame| render(frame, &state)).unwrap();
        assert!(screen_text(&terminal).contains("Help"));
    }
}
