//! Glyph sets for drawing elements, plain ASCII or Unicode box drawing.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// Fills the body of an annotation
    pub annotation_fill: char,
    /// Drawn at the end of a forward-strand annotation
    pub arrow_right: char,
    /// Drawn at the start of a reverse-strand annotation
    pub arrow_left: char,
    /// Marks a cut site
    pub cut_marker: char,
    /// Fills codon positions around a translated residue
    pub codon_fill: char,
    /// Index tick
    pub tick: char,
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        annotation_fill: '=',
        arrow_right: '>',
        arrow_left: '<',
        cut_marker: 'v',
        codon_fill: '.',
        tick: '|',
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        annotation_fill: '━',
        arrow_right: '▶',
        arrow_left: '◀',
        cut_marker: '▼',
        codon_fill: '·',
        tick: '╵',
    }
}
