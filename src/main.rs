//! seqblock - block layout viewer for sequences and pairwise alignments
//!
//! ## Usage
//!
//! ```bash
//! seqblock plasmid.fa --circular --features plasmid.bed
//! seqblock pair.fa --symbols detailed        # two sequences: an alignment
//! seqblock gene.fa --translate 1-300 --report
//! ```
//!
//! Positions on the command line are 1-based and inclusive. A range whose
//! start is after its end wraps through the origin of a circular sequence.
//!
//! ## Navigation
//!
//! - Arrows or `h/j/k/l`: Move the cursor, with Shift to extend
//! - Click, double-click, triple-click: Cursor, element, everything
//! - `y` or Ctrl+C: Copy the selection
//! - `:q`: Quit

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};

use seqblock::controller::run_app;
use seqblock::formats::{read_features, read_sequences};
use seqblock::genetic_code::GeneticCode;
use seqblock::layout::Layout;
use seqblock::model::{
    AppState, DisplayOptions, ElementKind, PositionalElement, SeqType, SequenceData, Strand,
    SymbolMode,
};
use seqblock::search::find_matches;
use seqblock::selection::{Interaction, Register};
use seqblock::sequence::guess_type;
use seqblock::symbols::AlignmentStatistics;
use seqblock::ui::glyphs;

/// Block width used by `--report` when none is given.
const REPORT_BPS_PER_BLOCK: usize = 60;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeqTypeArg {
    Dna,
    Rna,
    Aa,
    /// Guess from the residues
    Auto,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SymbolsArg {
    /// '|' identical, '.' same group, '*' different group, '-' gap
    Detailed,
    /// '|' identical, '.' different, ' ' gap
    Compact,
}

impl From<SymbolsArg> for SymbolMode {
    fn from(arg: SymbolsArg) -> Self {
        match arg {
            SymbolsArg::Detailed => SymbolMode::Detailed,
            SymbolsArg::Compact => SymbolMode::Compact,
        }
    }
}

/// A translated range given as START-END, optionally followed by :- for
/// the reverse strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TranslationArg {
    start: usize,
    end: usize,
    strand: Strand,
}

/// Parses a 1-based inclusive `START-END` into a half-open 0-based range.
fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{}'", s))?;
    let parse = |v: &str| -> Result<usize, String> {
        match v.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("invalid position '{}' (positions start at 1)", v)),
            Ok(n) => Ok(n),
        }
    };
    Ok((parse(start)? - 1, parse(end)?))
}

fn parse_translation(s: &str) -> Result<TranslationArg, String> {
    let (range, strand) = match s.rsplit_once(':') {
        Some((range, "-")) => (range, Strand::Reverse),
        Some((range, "+")) => (range, Strand::Forward),
        Some((_, other)) => return Err(format!("unknown strand '{}', use + or -", other)),
        None => (s, Strand::Forward),
    };
    let (start, end) = parse_range(range)?;
    Ok(TranslationArg { start, end, strand })
}

/// Parses `NAME@POS`: the enzyme cuts right after 1-based position POS.
fn parse_cut_site(s: &str) -> Result<(String, usize), String> {
    let (name, pos) = s
        .split_once('@')
        .ok_or_else(|| format!("expected NAME@POS, got '{}'", s))?;
    let pos = pos
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid position '{}'", pos))?;
    Ok((name.to_string(), pos))
}

/// seqblock - lays sequences out as blocks with packed annotation rows
///
/// A file holding two sequences is shown as a pairwise alignment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sequence file (FASTA or raw residues)
    file: PathBuf,

    /// Second sequence of the alignment, read from another file
    #[arg(short = 'c', long = "compare")]
    compare: Option<PathBuf>,

    /// Feature table: name start end [strand] [color], 0-based half-open
    #[arg(short = 'F', long = "features")]
    features: Option<PathBuf>,

    /// Highlighted range (repeatable)
    #[arg(long = "highlight", value_name = "START-END", value_parser = parse_range)]
    highlights: Vec<(usize, usize)>,

    /// Translated range, :- for the reverse strand (repeatable)
    #[arg(short = 't', long = "translate", value_name = "START-END[:-]", value_parser = parse_translation)]
    translations: Vec<TranslationArg>,

    /// Cut site of an enzyme (repeatable)
    #[arg(long = "cut", value_name = "NAME@POS", value_parser = parse_cut_site)]
    cut_sites: Vec<(String, usize)>,

    /// Search query, matched on both strands of nucleotide sequences
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Sequence alphabet
    #[arg(long = "seq-type", value_enum, default_value = "auto")]
    seq_type: SeqTypeArg,

    /// Treat the sequence as circular
    #[arg(long)]
    circular: bool,

    /// Positions per block (default: fit the terminal width)
    #[arg(short = 'b', long = "bps-per-block")]
    bps_per_block: Option<usize>,

    /// Alignment symbol style
    #[arg(long = "symbols", value_enum, default_value = "compact")]
    symbols: SymbolsArg,

    /// Genetic code for translations (NCBI id, default: 1 = Standard)
    #[arg(short = 'g', long = "genetic-code", default_value = "1")]
    genetic_code: u8,

    /// Show the complement strand under nucleotide sequences
    #[arg(long)]
    complement: bool,

    /// Draw elements with Unicode glyphs
    #[arg(long)]
    fancy: bool,

    /// Print the layout to stdout instead of opening the viewer
    #[arg(short = 'r', long = "report")]
    report: bool,

    /// Write a debug log to the temp directory (also enabled by RUST_LOG)
    #[arg(long)]
    log: bool,
}

/// Logs go to a file: the terminal belongs to the viewer.
fn init_logging(requested: bool) -> Result<Option<PathBuf>> {
    if !requested && std::env::var_os("RUST_LOG").is_none() {
        return Ok(None);
    }
    let path = std::env::temp_dir().join(format!("seqblock-{:08x}.log", rand::random::<u32>()));
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(Some(path))
}

fn check_range(what: &str, start: usize, end: usize, len: usize) -> Result<()> {
    if start >= len || end > len {
        bail!(
            "{} {}-{} is outside the sequence (length {})",
            what,
            start + 1,
            end,
            len
        );
    }
    Ok(())
}

fn load_data(args: &Args) -> Result<SequenceData> {
    let mut sequences = read_sequences(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?
        .into_iter();
    let primary = sequences
        .next()
        .ok_or_else(|| anyhow!("no sequence in {}", args.file.display()))?;

    let comparison = match &args.compare {
        Some(path) => Some(
            read_sequences(path)
                .with_context(|| format!("cannot read {}", path.display()))?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("no sequence in {}", path.display()))?,
        ),
        None => sequences.next(),
    };

    let seq_type = match args.seq_type {
        SeqTypeArg::Dna => SeqType::Dna,
        SeqTypeArg::Rna => SeqType::Rna,
        SeqTypeArg::Aa => SeqType::AminoAcid,
        SeqTypeArg::Auto => guess_type(&primary.data),
    };
    log::info!("{} ({} {})", primary.id, primary.len(), seq_type);

    let mut data = SequenceData::new(primary, seq_type);
    data.circular = args.circular;
    if let Some(comparison) = comparison {
        data = data.with_comparison(comparison);
    }
    let len = data.len();

    if let Some(path) = &args.features {
        data.annotations = read_features(path)
            .with_context(|| format!("cannot read features from {}", path.display()))?;
    }

    for (i, &(start, end)) in args.highlights.iter().enumerate() {
        check_range("highlight", start, end, len)?;
        data.highlights.push(PositionalElement::new(
            format!("highlight-{}", i),
            start,
            end,
            ElementKind::Highlight,
        ));
    }

    for (i, t) in args.translations.iter().enumerate() {
        check_range("translation", t.start, t.end, len)?;
        data.translations.push(
            PositionalElement::new(
                format!("translation-{}", i),
                t.start,
                t.end,
                ElementKind::Translation,
            )
            .with_strand(t.strand),
        );
    }

    for (i, (name, pos)) in args.cut_sites.iter().enumerate() {
        if *pos >= len {
            bail!("cut site {} at {} is outside the sequence (length {})", name, pos, len);
        }
        data.cut_sites.push(
            PositionalElement::new(format!("cut-{}", i), *pos, *pos, ElementKind::CutSite)
                .with_name(name.clone()),
        );
    }

    if let Some(query) = &args.search {
        data.search_hits = find_matches(&data.primary.data, query, seq_type, data.circular);
    }

    Ok(data)
}

fn print_report(data: &SequenceData, options: &DisplayOptions) -> Result<()> {
    let layout = Layout::compute(data, options)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "{}: {} positions, {}, {} blocks of {}, height {:.1}",
        data.primary.id,
        layout.sequence_length,
        data.seq_type,
        layout.blocks.len(),
        layout.bps_per_block,
        layout.total_height
    )?;

    for block in &layout.blocks {
        writeln!(
            out,
            "\nblock {} [{}-{}] y {:.1} height {:.1}",
            block.index,
            block.first_base + 1,
            block.last_base,
            block.y,
            block.height
        )?;
        for track in &block.tracks {
            writeln!(out, "  {:<7} {}", track.kind.suffix(), track.slice)?;
        }
        if !block.complement.is_empty() {
            writeln!(out, "  {:<7} {}", "compl", block.complement)?;
        }
        for kind in ElementKind::ALL {
            let elements = layout.elements(kind);
            for (r, row) in block.rows.get(kind).iter().enumerate() {
                let names: Vec<String> = row
                    .segments
                    .iter()
                    .map(|s| {
                        format!(
                            "{}[{}-{}]",
                            elements[s.element].display_name(),
                            s.start + 1,
                            s.end
                        )
                    })
                    .collect();
                writeln!(out, "  {} row {}: {}", kind.label(), r, names.join(" "))?;
            }
        }
    }

    if let Some(comparison) = &data.comparison {
        let stats = AlignmentStatistics::compute(&data.primary, comparison, data.seq_type)?;
        writeln!(
            out,
            "\n{} columns, {} identical, {} mismatches",
            stats.columns, stats.identical, stats.mismatches
        )?;
        for seq in &stats.sequences {
            writeln!(
                out,
                "  {}: {} residues, {:.1}% identical, {:.1}% coverage",
                seq.name,
                seq.length,
                seq.fraction_identical * 100.0,
                seq.coverage * 100.0
            )?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = init_logging(args.log)? {
        eprintln!("Logging to {}", path.display());
    }

    if GeneticCode::by_id(args.genetic_code).is_none() {
        let known: Vec<String> = GeneticCode::all().iter().map(|c| c.id.to_string()).collect();
        bail!(
            "Unknown genetic code: {} (known: {})",
            args.genetic_code,
            known.join(", ")
        );
    }

    let data = load_data(&args)?;
    let options = DisplayOptions {
        bps_per_block: args.bps_per_block.unwrap_or(0),
        show_complement: args.complement,
        symbol_mode: args.symbols.into(),
        genetic_code: args.genetic_code,
        ..DisplayOptions::default()
    };

    if args.report {
        let options = DisplayOptions {
            bps_per_block: args.bps_per_block.unwrap_or(REPORT_BPS_PER_BLOCK),
            ..options
        };
        return print_report(&data, &options);
    }

    let interaction = Interaction::new(Box::new(Register::default())).with_listener(|selection| {
        log::trace!(
            "selection {}..{} clockwise={}",
            selection.start,
            selection.end,
            selection.clockwise
        )
    });
    let state = AppState::new(data, options, interaction, glyphs::select(args.fancy))?;
    run_app(state)
}
