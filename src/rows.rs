//! Row packing of positional elements.
//!
//! Elements are first cut into per-block segments (splitting the ones that
//! cross the origin), then each block's segments are stacked into the fewest
//! rows such that no two segments in a row overlap.
//!
//! ## Algorithm
//!
//! Segments are sorted by start, longer first on ties, and each one goes in
//! the first row whose last segment ends at or before its start. Greedy by
//! start is optimal for interval graphs: the row count equals the largest
//! number of segments covering any single position.

use std::cmp::Reverse;
use std::ops::Range;

use crate::model::PositionalElement;

/// Part of one element that falls inside one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Index of the element in the list the segment was cut from
    pub element: usize,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(element: usize, start: usize, end: usize) -> Self {
        Self { element, start, end }
    }

    /// End used for packing: empty ranges (cut sites) take one position.
    pub fn packed_end(&self) -> usize {
        self.end.max(self.start + 1)
    }

    fn packed_len(&self) -> usize {
        self.packed_end() - self.start
    }
}

/// One track of non-overlapping segments, ordered by start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub segments: Vec<Segment>,
}

impl Row {
    fn last_end(&self) -> usize {
        self.segments.last().map_or(0, Segment::packed_end)
    }

    /// The segment covering `pos`, if any.
    pub fn segment_at(&self, pos: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| pos >= s.start && pos < s.packed_end())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Repairs annotations that touch the ends of the sequence.
///
/// - `end == 0` means the annotation runs to the end: `end` becomes `seq_len`
///   (this also turns `{0, 0}` into a full-length annotation)
/// - `start == seq_len` with `end < start` means it starts at the origin:
///   `start` becomes 0
///
/// The input is left untouched; repaired copies are returned.
pub fn normalize_annotations(
    annotations: &[PositionalElement],
    seq_len: usize,
) -> Vec<PositionalElement> {
    annotations
        .iter()
        .map(|ann| {
            let mut ann = ann.clone();
            if ann.end == 0 && ann.start >= ann.end {
                ann.end = seq_len;
            }
            if ann.start == seq_len && ann.end < ann.start {
                ann.start = 0;
            }
            ann
        })
        .collect()
}

/// Ranges an element covers on a sequence of `seq_len`, split at the origin.
///
/// An empty element yields a single empty range at its position. Anything
/// past the end of the sequence is dropped.
pub fn resolve_ranges(element: &PositionalElement, seq_len: usize) -> Vec<Range<usize>> {
    let (start, end) = (element.start, element.end);
    if start == end {
        return if start < seq_len {
            vec![start..start]
        } else {
            Vec::new()
        };
    }
    let mut ranges = Vec::with_capacity(2);
    if start < end {
        if start < seq_len {
            ranges.push(start..end.min(seq_len));
        }
    } else {
        if start < seq_len {
            ranges.push(start..seq_len);
        }
        if end > 0 {
            ranges.push(0..end.min(seq_len));
        }
    }
    ranges
}

/// Cuts elements into per-block segments.
///
/// Returns `block_count` lists; list `i` holds the segments inside
/// `[i * bps_per_block, (i + 1) * bps_per_block)`. A block width of 0 puts
/// the whole sequence in one block.
pub fn split_into_blocks(
    elements: &[PositionalElement],
    bps_per_block: usize,
    block_count: usize,
    seq_len: usize,
) -> Vec<Vec<Segment>> {
    let bps = if bps_per_block == 0 {
        seq_len.max(1)
    } else {
        bps_per_block
    };
    let mut blocks = vec![Vec::new(); block_count];
    if block_count == 0 {
        return blocks;
    }

    for (index, element) in elements.iter().enumerate() {
        for range in resolve_ranges(element, seq_len) {
            if range.is_empty() {
                let block = range.start / bps;
                if block < block_count {
                    blocks[block].push(Segment::new(index, range.start, range.start));
                }
                continue;
            }
            let first = range.start / bps;
            let last = ((range.end - 1) / bps).min(block_count - 1);
            for (block, segments) in blocks.iter_mut().enumerate().take(last + 1).skip(first) {
                let lo = range.start.max(block * bps);
                let hi = range.end.min((block + 1) * bps);
                if lo < hi {
                    segments.push(Segment::new(index, lo, hi));
                }
            }
        }
    }
    blocks
}

/// Packs one block's segments into the fewest non-overlapping rows.
///
/// Segments are clipped to `bounds` first; those entirely outside are
/// ignored.
///
/// ```
/// use seqblock::rows::{pack_rows, Segment};
///
/// let segments = [Segment::new(0, 0, 10), Segment::new(1, 5, 15), Segment::new(2, 12, 20)];
/// let rows = pack_rows(&segments, 0..20);
/// assert_eq!(rows.len(), 2);
/// ```
pub fn pack_rows(segments: &[Segment], bounds: Range<usize>) -> Vec<Row> {
    let mut sorted: Vec<Segment> = segments
        .iter()
        .filter(|s| s.start < bounds.end && s.packed_end() > bounds.start)
        .map(|s| {
            let start = s.start.max(bounds.start);
            let end = if s.end > s.start {
                s.end.min(bounds.end)
            } else {
                start
            };
            Segment::new(s.element, start, end)
        })
        .collect();
    sorted.sort_by_key(|s| (s.start, Reverse(s.packed_len()), s.element));

    let mut rows: Vec<Row> = Vec::new();
    for segment in sorted {
        match rows.iter_mut().find(|row| row.last_end() <= segment.start) {
            Some(row) => row.segments.push(segment),
            None => rows.push(Row {
                segments: vec![segment],
            }),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    /// Largest number of segments covering one position.
    fn max_overlap(segments: &[Segment]) -> usize {
        let mut events: Vec<(usize, i32)> = segments
            .iter()
            .flat_map(|s| [(s.start, 1), (s.packed_end(), -1)])
            .collect();
        // ends sort before starts at the same position
        events.sort();
        let mut depth = 0i32;
        let mut best = 0i32;
        for (_, delta) in events {
            depth += delta;
            best = best.max(depth);
        }
        best as usize
    }

    fn ann(start: usize, end: usize) -> PositionalElement {
        PositionalElement::new(format!("a{}-{}", start, end), start, end, ElementKind::Annotation)
    }

    fn assert_no_overlap(rows: &[Row]) {
        for row in rows {
            for pair in row.segments.windows(2) {
                assert!(pair[0].packed_end() <= pair[1].start, "overlap in {:?}", row);
            }
        }
    }

    #[test]
    fn test_three_annotations_two_rows() {
        let segments = [
            Segment::new(0, 0, 10),
            Segment::new(1, 5, 15),
            Segment::new(2, 12, 20),
        ];
        let rows = pack_rows(&segments, 0..20);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].segments.iter().map(|s| s.element).collect::<Vec<_>>(), [0, 2]);
        assert_eq!(rows[1].segments[0].element, 1);
        assert_no_overlap(&rows);
    }

    #[test]
    fn test_longer_first_on_ties() {
        let segments = [Segment::new(0, 0, 3), Segment::new(1, 0, 9)];
        let rows = pack_rows(&segments, 0..10);
        assert_eq!(rows[0].segments[0].element, 1);
        assert_eq!(rows[1].segments[0].element, 0);
    }

    #[test]
    fn test_touching_segments_share_a_row() {
        let segments = [Segment::new(0, 0, 5), Segment::new(1, 5, 9)];
        assert_eq!(pack_rows(&segments, 0..10).len(), 1);
    }

    #[test]
    fn test_point_segments_take_one_position() {
        let segments = [
            Segment::new(0, 4, 4),
            Segment::new(1, 4, 4),
            Segment::new(2, 5, 5),
        ];
        let rows = pack_rows(&segments, 0..10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].segments.len(), 2);
    }

    #[test]
    fn test_row_count_matches_max_overlap() {
        // deterministic pseudo-random intervals
        let mut seed = 17u64;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as usize
        };
        for _ in 0..50 {
            let segments: Vec<Segment> = (0..30)
                .map(|i| {
                    let start = next() % 100;
                    let len = next() % 25;
                    Segment::new(i, start, (start + len).min(100))
                })
                .collect();
            let rows = pack_rows(&segments, 0..100);
            assert_no_overlap(&rows);
            assert_eq!(rows.len(), max_overlap(&segments));
            assert_eq!(rows.iter().map(Row::len).sum::<usize>(), segments.len());
        }
    }

    #[test]
    fn test_pack_clips_to_bounds() {
        let segments = [Segment::new(0, 0, 30), Segment::new(1, 40, 50)];
        let rows = pack_rows(&segments, 10..20);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].segments, vec![Segment::new(0, 10, 20)]);
    }

    #[test]
    fn test_normalize_annotations() {
        let input = vec![ann(0, 0), ann(90, 0), ann(100, 20), ann(10, 20)];
        let out = normalize_annotations(&input, 100);
        assert_eq!((out[0].start, out[0].end), (0, 100));
        assert_eq!((out[1].start, out[1].end), (90, 100));
        assert_eq!((out[2].start, out[2].end), (0, 20));
        assert_eq!((out[3].start, out[3].end), (10, 20));
        // the input is not modified
        assert_eq!((input[0].start, input[0].end), (0, 0));
    }

    #[test]
    fn test_resolve_wraparound() {
        assert_eq!(resolve_ranges(&ann(8, 3), 10), vec![8..10, 0..3]);
        assert_eq!(resolve_ranges(&ann(2, 5), 10), vec![2..5]);
        assert_eq!(resolve_ranges(&ann(4, 4), 10), vec![4..4]);
        assert_eq!(resolve_ranges(&ann(12, 15), 10), Vec::<Range<usize>>::new());
    }

    #[test]
    fn test_split_reproduces_elements() {
        let elements = vec![ann(3, 17), ann(18, 4), ann(9, 9)];
        let blocks = split_into_blocks(&elements, 5, 4, 20);
        assert_eq!(blocks.len(), 4);

        for (index, element) in elements.iter().enumerate() {
            let mut covered: Vec<usize> = blocks
                .iter()
                .enumerate()
                .flat_map(|(b, segs)| {
                    segs.iter()
                        .filter(move |s| s.element == index)
                        .inspect(move |s| {
                            assert!(s.start >= b * 5 && s.end <= (b + 1) * 5);
                        })
                        .flat_map(|s| s.start..s.end)
                })
                .collect();
            covered.sort();
            let expected: Vec<usize> = (0..20).filter(|&p| element.contains(p)).collect();
            assert_eq!(covered, expected, "element {}", index);
        }

        // the cut-like point lands in one block only
        let points: Vec<_> = blocks
            .iter()
            .flatten()
            .filter(|s| s.element == 2)
            .collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].start, 9);
    }

    #[test]
    fn test_split_degenerate_block_width() {
        let blocks = split_into_blocks(&[ann(2, 8)], 0, 1, 10);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], vec![Segment::new(0, 2, 8)]);
    }
}
