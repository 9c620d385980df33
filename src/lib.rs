//! # seqblock - Sequence Block Layout
//!
//! Lays a sequence (or a gap-padded pairwise alignment) out as fixed-width
//! blocks, packs annotations and other positional elements into
//! non-overlapping rows, and drives a selection cursor over the result.
//! A terminal viewer built on ratatui renders the layout.
//!
//! ## Architecture
//!
//! The layout engine is pure: the same inputs give an equal [`layout::Layout`].
//! - `model`: Sequences, positional elements, selection, configuration and application state
//! - `circular`: Cursor arithmetic through the origin
//! - `symbols`: Alignment symbols and statistics
//! - `sequence`: Complements and alphabet guessing
//! - `genetic_code`: Codon tables and translations
//! - `search`: Exact pattern search on both strands
//! - `rows`: Per-block segments and greedy row packing
//! - `layout`: Block partitioning, height resolution and the full layout pass
//! - `selection`: Selection intents, click counting, clipboard and controller
//! - `formats`: FASTA, raw sequence and feature table readers
//! - `event`: Keyboard and mouse event handling
//! - `ui`: TUI rendering with ratatui
//! - `controller`: Terminal setup and the main loop

pub mod circular;
pub mod controller;
pub mod event;
pub mod formats;
pub mod genetic_code;
pub mod layout;
pub mod model;
pub mod rows;
pub mod search;
pub mod selection;
pub mod sequence;
pub mod symbols;
pub mod ui;
