//! Cursor arithmetic over a sequence whose end joins its start.
//!
//! Navigation always wraps through the origin, for linear sequences too.

/// Direction of a cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Right and down move towards higher positions.
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

/// Moves `position` by `delta` on a sequence of `length`, folding the result
/// back through the origin once.
///
/// Results of `-1` or less map to `length + result`; results of
/// `length + 1` or more map to `result - length`. Both `0` and `length` are
/// valid cursor positions, so neither is folded. The result is clamped to
/// `[0, length]` in case `delta` exceeds one full turn.
///
/// ```
/// use seqblock::circular::advance_cursor;
///
/// assert_eq!(advance_cursor(0, -1, 10), 9);
/// assert_eq!(advance_cursor(10, 1, 10), 1);
/// assert_eq!(advance_cursor(4, 3, 10), 7);
/// ```
pub fn advance_cursor(position: usize, delta: isize, length: usize) -> usize {
    let length = length as i64;
    let mut result = position as i64 + delta as i64;
    if result <= -1 {
        result += length;
    }
    if result >= length + 1 {
        result -= length;
    }
    result.clamp(0, length) as usize
}

/// Signed cursor step for a direction.
///
/// Left and right move one position. Up and down move a whole block when
/// the sequence spans more than one block, so the cursor stays in the same
/// column; otherwise they also move one position.
pub fn step_for(direction: Direction, length: usize, bps_per_block: usize) -> isize {
    let bps = bps_per_block.max(1);
    let row_step = if length > bps { bps as isize } else { 1 };
    match direction {
        Direction::Left => -1,
        Direction::Right => 1,
        Direction::Up => -row_step,
        Direction::Down => row_step,
    }
}
