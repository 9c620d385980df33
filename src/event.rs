//! Keyboard and mouse event handling.
//!
//! Key bindings:
//! - Arrow keys or `h`/`j`/`k`/`l`: move the cursor (up and down jump a block)
//! - `Shift` + arrow keys: extend the selection
//! - `Ctrl+A`: select all
//! - `Ctrl+C` or `y`: copy the selection
//! - `PageUp`/`PageDown`, `Ctrl+E`/`Ctrl+Y`: scroll by page or by block
//! - `:`: enter command mode
//!   - `:q` or `:quit`: quit the application
//!   - `:h` or `:help`: show help
//!   - `:<number>`: go to position
//!   - `:bps <number>`: fix the block width (0 follows the terminal)
//!   - `:complement`, `:index`, `:stats`: toggle display parts
//! - `/`: search, `n`/`N`: next or previous hit
//! - `s`: toggle alignment statistics
//! - `?`: show help
//! - `Ctrl+Q`: quit
//!
//! Mouse: left click places the cursor (double click selects the element
//! under the pointer, triple click selects all), right click opens the
//! context menu, the wheel scrolls.

use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::circular::Direction;
use crate::model::{AppMode, AppState};
use crate::selection::{MenuState, SelectionIntent};
use crate::ui::hit_test;

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (input not recognized)
    None,
    /// Quit the application
    Quit,
    /// Move the cursor, optionally extending the selection
    Move { direction: Direction, extend: bool },
    SelectAll,
    Copy,
    /// Left click at a screen cell
    Click { col: u16, row: u16 },
    /// Right click at a screen cell
    OpenMenu { col: u16, row: u16 },
    CloseMenu,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Enter command mode
    EnterCommandMode,
    /// Enter search mode
    EnterSearchMode,
    /// Add character to the command or search buffer
    InputChar(char),
    /// Backspace in command or search mode
    InputBackspace,
    /// Execute the command or search
    ExecuteInput,
    /// Leave command or search mode
    CancelInput,
    /// Find next match (n)
    FindNext,
    /// Find previous match (N)
    FindPrevious,
    ToggleStats,
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for terminal events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app state.
pub fn handle_event(event: Event, mode: &AppMode, show_help: bool, menu: MenuState) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode, show_help, menu),
        Event::Mouse(mouse_event) => handle_mouse_event(mouse_event, show_help),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current application mode.
fn handle_key_event(key: KeyEvent, mode: &AppMode, show_help: bool, menu: MenuState) -> Action {
    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        AppMode::Normal if menu != MenuState::Closed => handle_menu_keys(key),
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Command(_) | AppMode::Search(_) => handle_input_mode(key),
    }
}

/// Handles key events while the context menu is open.
fn handle_menu_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('y') => Action::Copy,
        KeyCode::Char('a') => Action::SelectAll,
        _ => Action::CloseMenu,
    }
}

/// Handles key events in normal mode.
fn handle_normal_mode(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl {
        return match key.code {
            KeyCode::Char('a') => Action::SelectAll,
            KeyCode::Char('c') => Action::Copy,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('e') => Action::ScrollDown,
            KeyCode::Char('y') => Action::ScrollUp,
            _ => Action::None,
        };
    }

    let arrow = |direction| Action::Move {
        direction,
        extend: shift,
    };
    let step = |direction| Action::Move {
        direction,
        extend: false,
    };

    match key.code {
        KeyCode::Left => arrow(Direction::Left),
        KeyCode::Right => arrow(Direction::Right),
        KeyCode::Up => arrow(Direction::Up),
        KeyCode::Down => arrow(Direction::Down),

        KeyCode::Char('h') => step(Direction::Left),
        KeyCode::Char('l') => step(Direction::Right),
        KeyCode::Char('k') => step(Direction::Up),
        KeyCode::Char('j') => step(Direction::Down),

        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,

        KeyCode::Char('y') => Action::Copy,
        KeyCode::Char(':') => Action::EnterCommandMode,
        KeyCode::Char('/') => Action::EnterSearchMode,
        KeyCode::Char('n') => Action::FindNext,
        KeyCode::Char('N') => Action::FindPrevious,
        KeyCode::Char('s') => Action::ToggleStats,
        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Esc => Action::CloseMenu,

        _ => Action::None,
    }
}

/// Handles key events in command and search mode.
fn handle_input_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteInput,
        KeyCode::Esc => Action::CancelInput,
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Char(c) => Action::InputChar(c),
        _ => Action::None,
    }
}

/// Handles mouse events.
fn handle_mouse_event(mouse: MouseEvent, show_help: bool) -> Action {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(_) if show_help => Action::DismissHelp,
        MouseEventKind::Down(MouseButton::Left) => Action::Click { col, row },
        MouseEventKind::Down(MouseButton::Right) => Action::OpenMenu { col, row },
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// `now` drives click counting. Returns `true` if the application should
/// continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action, now: Instant) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::Move { direction, extend } => {
            state.apply_intent(SelectionIntent::MoveCursor { direction, extend });
        }
        Action::SelectAll => {
            state.apply_intent(SelectionIntent::SelectAll);
            state.apply_intent(SelectionIntent::CloseMenu);
        }
        Action::Copy => {
            state.apply_intent(SelectionIntent::Copy);
            state.apply_intent(SelectionIntent::CloseMenu);
        }
        Action::Click { col, row } => match hit_test(state, col, row) {
            Some(hit) => state.click(hit, now),
            None => state.apply_intent(SelectionIntent::CloseMenu),
        },
        Action::OpenMenu { col, row } => {
            state.open_menu(col, row);
        }
        Action::CloseMenu => {
            state.apply_intent(SelectionIntent::CloseMenu);
        }
        Action::ScrollUp => {
            state.scroll_up();
        }
        Action::ScrollDown => {
            state.scroll_down();
        }
        Action::PageUp => {
            state.page_up();
        }
        Action::PageDown => {
            state.page_down();
        }
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::EnterSearchMode => {
            state.enter_search_mode();
        }
        Action::InputChar(c) => {
            state.input_char(c);
        }
        Action::InputBackspace => {
            state.input_backspace();
        }
        Action::ExecuteInput => {
            state.execute_input();
        }
        Action::CancelInput => {
            state.cancel_input();
        }
        Action::FindNext => {
            state.find_next();
        }
        Action::FindPrevious => {
            state.find_previous();
        }
        Action::ToggleStats => {
            state.toggle_stats();
        }
        Action::ShowHelp => {
            state.show_help = true;
        }
        Action::DismissHelp => {
            state.dismiss_help();
        }
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
    }

    !state.should_quit
}
