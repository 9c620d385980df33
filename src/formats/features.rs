//! Feature table parser.
//!
//! One feature per line, fields separated by tabs or spaces:
//!
//! ```text
//! # name   start  end   [strand]  [color]
//! lacZ     1000   1500  -         #3cb44b
//! ori      2600   300
//! ```
//!
//! Coordinates are 0-based and half-open. An `end` smaller than `start`
//! marks a feature crossing the origin of a circular sequence. Lines
//! starting with `#` and blank lines are skipped.

use thiserror::Error;

use crate::model::{ElementKind, PositionalElement, Strand};

/// Errors that can occur during feature parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Line {line}: expected at least 3 fields (name start end), found {found}")]
    MissingFields { line: usize, found: usize },

    #[error("Line {line}: invalid coordinate '{value}'")]
    InvalidCoordinate { line: usize, value: String },

    #[error("Line {line}: invalid strand '{value}' (expected +, - or .)")]
    InvalidStrand { line: usize, value: String },
}

/// Result type for feature parsing.
pub type FeatureResult<T> = Result<T, FeatureError>;

fn parse_coordinate(value: &str, line: usize) -> FeatureResult<usize> {
    value
        .parse::<usize>()
        .map_err(|_| FeatureError::InvalidCoordinate {
            line,
            value: value.to_string(),
        })
}

fn parse_strand(value: &str, line: usize) -> FeatureResult<Strand> {
    match value {
        "+" | "1" => Ok(Strand::Forward),
        "-" | "-1" => Ok(Strand::Reverse),
        "." | "0" => Ok(Strand::None),
        _ => Err(FeatureError::InvalidStrand {
            line,
            value: value.to_string(),
        }),
    }
}

/// Parses a feature table into annotation elements.
///
/// Ids are `feature-{n}` in file order; the first column becomes the name.
pub fn parse_features_str(content: &str) -> FeatureResult<Vec<PositionalElement>> {
    let mut features = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let [name, start, end, rest @ ..] = fields.as_slice() else {
            return Err(FeatureError::MissingFields {
                line,
                found: fields.len(),
            });
        };

        let mut feature = PositionalElement::new(
            format!("feature-{}", features.len()),
            parse_coordinate(start, line)?,
            parse_coordinate(end, line)?,
            ElementKind::Annotation,
        )
        .with_name(*name);
        if let Some(strand) = rest.first() {
            feature = feature.with_strand(parse_strand(strand, line)?);
        }
        if let Some(color) = rest.get(1) {
            feature = feature.with_color(*color);
        }
        features.push(feature);
    }

    log::debug!("parsed {} features", features.len());
    Ok(features)
}
