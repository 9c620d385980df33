//! Selection intents and the controller that applies them.
//!
//! Input handlers translate key presses and mouse events into
//! [`SelectionIntent`]s. [`apply_selection_intent`] turns the current
//! selection and an intent into the next selection; it never fails and
//! always yields a selection inside `[0, sequence_length]`.
//!
//! The [`SelectionController`] owns the only writable [`Selection`]. It
//! counts clicks with a [`ClickTracker`], opens and closes the context
//! menu, and copies text through a [`Clipboard`].

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::circular::{advance_cursor, step_for, Direction};
use crate::model::{Selection, SelectionRef};

/// Range of the element under a double click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRange {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

/// Discrete user intents that act on the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent {
    SelectAll,
    Copy,
    MoveCursor { direction: Direction, extend: bool },
    Click { position: usize },
    /// Selects the element under the pointer, if any
    DoubleClick {
        position: usize,
        element: Option<ElementRange>,
    },
    /// Same as `SelectAll`
    TripleClick,
    ContextMenu { x: u16, y: u16 },
    CloseMenu,
}

/// Computes the selection that follows `intent`.
///
/// ```
/// use seqblock::model::{Selection, SelectionRef};
/// use seqblock::selection::{apply_selection_intent, SelectionIntent};
///
/// let current = Selection { start: 3, end: 9, clockwise: true, reference: SelectionRef::Sequence };
/// let next = apply_selection_intent(&current, &SelectionIntent::SelectAll, 20, 10);
/// assert_eq!((next.start, next.end, next.reference), (3, 3, SelectionRef::All));
/// ```
pub fn apply_selection_intent(
    current: &Selection,
    intent: &SelectionIntent,
    sequence_length: usize,
    bps_per_block: usize,
) -> Selection {
    let len = sequence_length;
    match intent {
        SelectionIntent::SelectAll | SelectionIntent::TripleClick => Selection {
            start: current.start.min(len),
            end: current.start.min(len),
            clockwise: true,
            reference: SelectionRef::All,
        },
        SelectionIntent::MoveCursor { direction, extend } => {
            let delta = step_for(*direction, len, bps_per_block);
            let end = advance_cursor(current.end.min(len), delta, len);
            if !*extend {
                return Selection::cursor(end);
            }
            let clockwise = if current.start == current.end {
                direction.is_forward()
            } else {
                current.clockwise
            };
            Selection {
                start: current.start.min(len),
                end,
                clockwise,
                reference: SelectionRef::Sequence,
            }
        }
        SelectionIntent::Click { position } => Selection::cursor((*position).min(len)),
        SelectionIntent::DoubleClick { position, element } => match element {
            Some(el) => Selection {
                start: el.start.min(len),
                end: el.end.min(len),
                clockwise: true,
                reference: SelectionRef::Element(el.id.clone()),
            },
            None => Selection::cursor((*position).min(len)),
        },
        SelectionIntent::Copy
        | SelectionIntent::ContextMenu { .. }
        | SelectionIntent::CloseMenu => current.clone(),
    }
}

/// Text a copy of `selection` puts on the clipboard.
pub fn copy_text<'a>(selection: &Selection, seq: &'a str) -> &'a str {
    if selection.reference == SelectionRef::All {
        return seq;
    }
    let range = selection.range();
    let end = range.end.min(seq.len());
    let start = range.start.min(end);
    seq.get(start..end).unwrap_or("")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("No clipboard available")]
    Unavailable,
    #[error("Clipboard write failed: {0}")]
    Write(String),
}

/// A writable clipboard surface.
pub trait Clipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Used when the host has no clipboard; every write fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// In-process clipboard holding the last copied text.
#[derive(Debug, Default, Clone)]
pub struct Register {
    contents: Option<String>,
}

impl Register {
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for Register {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Callbacks the controller talks to.
pub struct Interaction {
    pub clipboard: Box<dyn Clipboard>,
    /// Called with every new selection
    pub on_selection: Option<Box<dyn FnMut(&Selection)>>,
}

impl Interaction {
    pub fn new(clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            clipboard,
            on_selection: None,
        }
    }

    pub fn with_listener(mut self, listener: impl FnMut(&Selection) + 'static) -> Self {
        self.on_selection = Some(Box::new(listener));
        self
    }
}

/// Context menu state. Only the anchor coordinates are tracked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open { x: u16, y: u16 },
}

/// Time allowed between two clicks of a double or triple click, measured
/// from the previous click.
pub const CLICK_WINDOW: Duration = Duration::from_millis(250);

/// Outcome of registering a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickCount {
    Single,
    Double,
    Triple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClickState<T> {
    Idle,
    FirstClick { target: T, at: Instant },
    SecondClick { target: T, at: Instant },
}

/// Counts consecutive clicks on the same target.
///
/// The clock is whatever the caller passes in, so tests can step time
/// without sleeping.
#[derive(Debug, Clone)]
pub struct ClickTracker<T> {
    state: ClickState<T>,
}

impl<T: PartialEq> Default for ClickTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> ClickTracker<T> {
    pub fn new() -> Self {
        Self {
            state: ClickState::Idle,
        }
    }

    fn within(at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(at) <= CLICK_WINDOW
    }

    /// Records a click on `target` at `now`.
    pub fn register(&mut self, target: T, now: Instant) -> ClickCount {
        let (count, next) = match std::mem::replace(&mut self.state, ClickState::Idle) {
            ClickState::FirstClick { target: prev, at }
                if prev == target && Self::within(at, now) =>
            {
                (ClickCount::Double, ClickState::SecondClick { target, at: now })
            }
            ClickState::SecondClick { target: prev, at }
                if prev == target && Self::within(at, now) =>
            {
                (ClickCount::Triple, ClickState::Idle)
            }
            _ => (ClickCount::Single, ClickState::FirstClick { target, at: now }),
        };
        self.state = next;
        count
    }

    /// Drops back to idle once the window since the last click has passed.
    pub fn expire(&mut self, now: Instant) {
        let lapsed = match &self.state {
            ClickState::Idle => false,
            ClickState::FirstClick { at, .. } | ClickState::SecondClick { at, .. } => {
                !Self::within(*at, now)
            }
        };
        if lapsed {
            self.state = ClickState::Idle;
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ClickState::Idle)
    }
}

/// What a click landed on, for click counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Sequence lines of a block
    Block(usize),
    /// An element, by id
    Element(String),
}

/// Sole writer of the selection.
pub struct SelectionController {
    selection: Selection,
    menu: MenuState,
    clicks: ClickTracker<ClickTarget>,
    interaction: Interaction,
    last_copy: Option<usize>,
}

impl SelectionController {
    pub fn new(interaction: Interaction) -> Self {
        Self {
            selection: Selection::default(),
            menu: MenuState::Closed,
            clicks: ClickTracker::new(),
            interaction,
            last_copy: None,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn menu(&self) -> MenuState {
        self.menu
    }

    /// Length of the text put on the clipboard by the last copy, or `None`
    /// if the clipboard refused it.
    pub fn copied_len(&self) -> Option<usize> {
        self.last_copy
    }

    /// Applies one intent over `seq`.
    pub fn handle(&mut self, intent: SelectionIntent, seq: &str, bps_per_block: usize) {
        match &intent {
            SelectionIntent::Copy => self.copy(seq),
            SelectionIntent::ContextMenu { x, y } => {
                self.menu = MenuState::Open { x: *x, y: *y };
            }
            SelectionIntent::CloseMenu
            | SelectionIntent::Click { .. }
            | SelectionIntent::DoubleClick { .. }
            | SelectionIntent::TripleClick => self.menu = MenuState::Closed,
            SelectionIntent::SelectAll | SelectionIntent::MoveCursor { .. } => {}
        }
        let next = apply_selection_intent(&self.selection, &intent, seq.len(), bps_per_block);
        if next != self.selection {
            self.replace(next);
        }
    }

    /// Counts a click on `target` and applies the matching intent.
    pub fn click(
        &mut self,
        target: ClickTarget,
        position: usize,
        element: Option<ElementRange>,
        now: Instant,
        seq: &str,
        bps_per_block: usize,
    ) -> ClickCount {
        let count = self.clicks.register(target, now);
        let intent = match count {
            ClickCount::Single => SelectionIntent::Click { position },
            ClickCount::Double => SelectionIntent::DoubleClick { position, element },
            ClickCount::Triple => SelectionIntent::TripleClick,
        };
        log::trace!("{:?} click at {}", count, position);
        self.handle(intent, seq, bps_per_block);
        count
    }

    /// Timeout callback for the click window.
    pub fn expire_clicks(&mut self, now: Instant) {
        self.clicks.expire(now);
    }

    /// Replaces the selection wholesale and notifies the listener.
    pub fn replace(&mut self, selection: Selection) {
        self.selection = selection;
        if let Some(listener) = self.interaction.on_selection.as_mut() {
            listener(&self.selection);
        }
    }

    fn copy(&mut self, seq: &str) {
        let text = copy_text(&self.selection, seq);
        match self.interaction.clipboard.write(text) {
            Ok(()) => self.last_copy = Some(text.len()),
            Err(e) => {
                log::debug!("copy skipped: {}", e);
                self.last_copy = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sel(start: usize, end: usize, clockwise: bool) -> Selection {
        Selection {
            start,
            end,
            clockwise,
            reference: SelectionRef::Sequence,
        }
    }

    fn move_cursor(current: &Selection, direction: Direction, extend: bool) -> Selection {
        apply_selection_intent(
            current,
            &SelectionIntent::MoveCursor { direction, extend },
            100,
            10,
        )
    }

    /// Clipboard shared with the test through an `Rc`.
    #[derive(Default, Clone)]
    struct Shared(Rc<RefCell<Vec<String>>>);

    impl Clipboard for Shared {
        fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_select_all_keeps_previous_start() {
        for current in [sel(0, 0, true), sel(12, 40, true), sel(40, 12, false)] {
            for intent in [SelectionIntent::SelectAll, SelectionIntent::TripleClick] {
                let next = apply_selection_intent(&current, &intent, 100, 10);
                assert_eq!(next.reference, SelectionRef::All);
                assert_eq!(next.start, current.start);
                assert_eq!(next.end, current.start);
                assert!(next.clockwise);
            }
        }
    }

    #[test]
    fn test_move_collapses() {
        let next = move_cursor(&sel(10, 20, false), Direction::Right, false);
        assert_eq!(next, sel(21, 21, true));
        let next = move_cursor(&sel(10, 20, false), Direction::Up, false);
        assert_eq!(next, sel(10, 10, true));
    }

    #[test]
    fn test_move_wraps_through_origin() {
        let next = move_cursor(&sel(0, 0, true), Direction::Left, false);
        assert_eq!(next.start, 99);
        let next = move_cursor(&sel(100, 100, true), Direction::Right, false);
        assert_eq!(next.start, 1);
    }

    #[test]
    fn test_extend_sets_orientation_once() {
        let first = move_cursor(&sel(5, 5, true), Direction::Left, true);
        assert_eq!((first.start, first.end, first.clockwise), (5, 4, false));

        // a non-empty range keeps its orientation
        let second = move_cursor(&sel(5, 3, false), Direction::Right, true);
        assert_eq!((second.start, second.end, second.clockwise), (5, 4, false));
        // back at zero length the next move decides again
        let third = move_cursor(&sel(5, 5, false), Direction::Right, true);
        assert_eq!((third.start, third.end, third.clockwise), (5, 6, true));

        let down = move_cursor(&sel(5, 5, false), Direction::Down, true);
        assert_eq!((down.end, down.clockwise), (15, true));
    }

    #[test]
    fn test_selection_stays_in_range() {
        let mut current = sel(0, 0, true);
        let directions = [Direction::Left, Direction::Up, Direction::Down, Direction::Right];
        for i in 0..200 {
            let direction = directions[i % 4 * (i % 7) % 4];
            current = apply_selection_intent(
                &current,
                &SelectionIntent::MoveCursor {
                    direction,
                    extend: i % 3 == 0,
                },
                23,
                5,
            );
            assert!(current.start <= 23 && current.end <= 23);
        }
    }

    #[test]
    fn test_click_and_double_click() {
        let next =
            apply_selection_intent(&sel(1, 8, true), &SelectionIntent::Click { position: 30 }, 20, 5);
        assert_eq!(next, sel(20, 20, true));

        let element = ElementRange {
            id: "gene".to_string(),
            start: 4,
            end: 9,
        };
        let next = apply_selection_intent(
            &sel(0, 0, true),
            &SelectionIntent::DoubleClick {
                position: 5,
                element: Some(element),
            },
            20,
            5,
        );
        assert_eq!((next.start, next.end), (4, 9));
        assert_eq!(next.reference, SelectionRef::Element("gene".to_string()));
    }

    #[test]
    fn test_copy_text() {
        let seq = "ACGTACGTAC";
        assert_eq!(copy_text(&sel(2, 5, true), seq), "GTA");
        assert_eq!(copy_text(&sel(5, 2, false), seq), "GTA");
        assert_eq!(copy_text(&sel(8, 30, true), seq), "AC");
        let all = Selection {
            reference: SelectionRef::All,
            ..sel(3, 3, true)
        };
        assert_eq!(copy_text(&all, seq), seq);
    }

    #[test]
    fn test_click_tracker_counts() {
        let t0 = Instant::now();
        let ms = |n| t0 + Duration::from_millis(n);
        let mut tracker = ClickTracker::new();
        assert_eq!(tracker.register(1, t0), ClickCount::Single);
        assert_eq!(tracker.register(1, ms(200)), ClickCount::Double);
        assert_eq!(tracker.register(1, ms(400)), ClickCount::Triple);
        assert!(tracker.is_idle());
        assert_eq!(tracker.register(1, ms(450)), ClickCount::Single);
    }

    #[test]
    fn test_click_tracker_window_and_target() {
        let t0 = Instant::now();
        let ms = |n| t0 + Duration::from_millis(n);
        let mut tracker = ClickTracker::new();
        tracker.register("a", t0);
        assert_eq!(tracker.register("a", ms(300)), ClickCount::Single);
        assert_eq!(tracker.register("b", ms(350)), ClickCount::Single);
        assert_eq!(tracker.register("b", ms(400)), ClickCount::Double);
        // a different target resets immediately
        assert_eq!(tracker.register("a", ms(420)), ClickCount::Single);
    }

    #[test]
    fn test_click_tracker_expire() {
        let t0 = Instant::now();
        let mut tracker = ClickTracker::new();
        tracker.register(7, t0);
        tracker.expire(t0 + Duration::from_millis(100));
        assert!(!tracker.is_idle());
        tracker.expire(t0 + Duration::from_millis(251));
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_controller_copy_and_listener() {
        let clipboard = Shared::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let interaction = Interaction::new(Box::new(clipboard.clone()))
            .with_listener(move |s: &Selection| sink.borrow_mut().push(s.clone()));
        let mut controller = SelectionController::new(interaction);

        let seq = "ACGTACGTAC";
        controller.handle(
            SelectionIntent::MoveCursor {
                direction: Direction::Right,
                extend: true,
            },
            seq,
            4,
        );
        controller.handle(SelectionIntent::Copy, seq, 4);
        assert_eq!(clipboard.0.borrow().as_slice(), ["A"]);
        assert_eq!(controller.copied_len(), Some(1));

        controller.handle(SelectionIntent::SelectAll, seq, 4);
        controller.handle(SelectionIntent::Copy, seq, 4);
        assert_eq!(clipboard.0.borrow()[1], seq);
        // copy does not change the selection, so two notifications only
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_copy_without_clipboard_is_silent() {
        let mut controller = SelectionController::new(Interaction::new(Box::new(NoClipboard)));
        controller.handle(SelectionIntent::SelectAll, "ACGT", 4);
        controller.handle(SelectionIntent::Copy, "ACGT", 4);
        assert_eq!(controller.copied_len(), None);
        assert_eq!(controller.selection().reference, SelectionRef::All);
    }

    #[test]
    fn test_controller_triple_click_selects_all() {
        let mut controller = SelectionController::new(Interaction::new(Box::new(Register::default())));
        let t0 = Instant::now();
        let seq = "ACGTACGTAC";
        let element = ElementRange {
            id: "hit".to_string(),
            start: 2,
            end: 6,
        };
        let target = ClickTarget::Element("hit".to_string());
        let click = |c: &mut SelectionController, ms: u64| {
            c.click(
                target.clone(),
                3,
                Some(element.clone()),
                t0 + Duration::from_millis(ms),
                seq,
                4,
            )
        };

        assert_eq!(click(&mut controller, 0), ClickCount::Single);
        assert_eq!(controller.selection(), &Selection::cursor(3));
        assert_eq!(click(&mut controller, 100), ClickCount::Double);
        assert_eq!(controller.selection().range(), 2..6);
        assert_eq!(click(&mut controller, 200), ClickCount::Triple);
        assert_eq!(controller.selection().reference, SelectionRef::All);
        assert_eq!(controller.selection().start, 2);
    }

    #[test]
    fn test_menu_open_and_close() {
        let mut controller = SelectionController::new(Interaction::new(Box::new(NoClipboard)));
        controller.handle(SelectionIntent::ContextMenu { x: 4, y: 9 }, "ACGT", 4);
        assert_eq!(controller.menu(), MenuState::Open { x: 4, y: 9 });
        controller.handle(SelectionIntent::Click { position: 1 }, "ACGT", 4);
        assert_eq!(controller.menu(), MenuState::Closed);

        controller.handle(SelectionIntent::ContextMenu { x: 1, y: 1 }, "ACGT", 4);
        controller.handle(SelectionIntent::CloseMenu, "ACGT", 4);
        assert_eq!(controller.menu(), MenuState::Closed);
    }
}
