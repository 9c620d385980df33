//! Exact pattern search producing search-hit elements.

use crate::model::{ElementKind, PositionalElement, SeqType, Strand};
use crate::sequence::reverse_complement;

/// Finds every case-insensitive occurrence of `query` in `seq`.
///
/// Nucleotide sequences are also searched for the reverse complement of the
/// query (unless it is its own reverse complement). On circular sequences a
/// match may run through the origin, in which case the hit wraps
/// (`end < start`). Hits are ordered by start position.
pub fn find_matches(
    seq: &str,
    query: &str,
    seq_type: SeqType,
    circular: bool,
) -> Vec<PositionalElement> {
    let query = query.trim().to_ascii_uppercase();
    if query.is_empty() || query.len() > seq.len() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    scan(seq, &query, circular, Strand::Forward, &mut hits);
    if seq_type.is_nucleotide() {
        let rc = reverse_complement(&query, seq_type);
        if rc != query {
            scan(seq, &rc, circular, Strand::Reverse, &mut hits);
        }
    }
    hits.sort_by_key(|h| (h.start, h.strand == Strand::Reverse));
    for (i, hit) in hits.iter_mut().enumerate() {
        hit.id = format!("search-{}", i);
    }
    log::debug!("search for {} found {} hits", query, hits.len());
    hits
}

fn scan(seq: &str, pattern: &str, circular: bool, strand: Strand, hits: &mut Vec<PositionalElement>) {
    let len = seq.len();
    let pattern = pattern.as_bytes();
    let mut haystack: Vec<u8> = seq.bytes().map(|b| b.to_ascii_uppercase()).collect();
    if circular {
        let extra = haystack[..pattern.len() - 1].to_vec();
        haystack.extend(extra);
    }
    let last_start = if circular { len } else { len - pattern.len() + 1 };

    // a hit as long as the sequence covers all of it, whatever rotation matched
    if pattern.len() == len {
        if (0..last_start).any(|start| haystack[start..start + len] == *pattern) {
            hits.push(
                PositionalElement::new(String::new(), 0, len, ElementKind::SearchHit)
                    .with_strand(strand),
            );
        }
        return;
    }

    for start in 0..last_start {
        if haystack[start..start + pattern.len()] == *pattern {
            let end = (start + pattern.len()) % len;
            let end = if end == 0 { len } else { end };
            hits.push(
                PositionalElement::new(String::new(), start, end, ElementKind::SearchHit)
                    .with_strand(strand),
            );
        }
    }
}
