//! Input handling: maps key/mouse events to state mutations.
//!
//! Physical input becomes either a slide gesture (routed through the
//! listener registry to the mounted container) or a host action.  In free
//! scroll mode there is no container, so wheel and arrows scroll rows.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::gesture::{GestureEvent, KeyDirection};
use crate::core::listeners::ListenerKind;

use super::state::{ActiveView, AppState};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    // Auto-repeat counts as key-down, releases don't.
    if key.kind == KeyEventKind::Release {
        return;
    }

    match state.active_view {
        ActiveView::Deck => handle_deck_key(state, key),
        ActiveView::Help => handle_help_key(state, key),
    }
}

fn handle_deck_key(state: &mut AppState, key: KeyEvent) {
    let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

    // The vertical arrows are slide gestures, never rebindable actions.
    if plain {
        let arrow = match key.code {
            KeyCode::Up => Some(KeyDirection::Up),
            KeyCode::Down => Some(KeyDirection::Down),
            _ => None,
        };
        if let Some(direction) = arrow {
            if state.is_paged() {
                state.dispatch_gesture(ListenerKind::KeyDown, GestureEvent::Key(direction));
            } else {
                state.scroll_free(if direction == KeyDirection::Down { 1 } else { -1 });
            }
            return;
        }

        if let KeyCode::Char(c @ '1'..='9') = key.code {
            let n = c as usize - '1' as usize;
            state.set_controlled_index(n);
            return;
        }
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::ToggleHelp => state.active_view = ActiveView::Help,
        Action::FirstSlide => state.set_controlled_index(0),
        Action::LastSlide => {
            let last = state.slides.len().saturating_sub(1);
            state.set_controlled_index(last);
        }
        Action::ToggleAutoScroll => {
            let enabled = !state.is_paged();
            state.set_auto_scroll(enabled);
            state.status_message = Some(
                if enabled { "paged mode" } else { "free scroll" }.to_string(),
            );
        }
    }
}

fn handle_help_key(state: &mut AppState, key: KeyEvent) {
    let closes = matches!(key.code, KeyCode::Esc | KeyCode::Enter)
        || matches!(
            state.config.match_key(key),
            Some(Action::ToggleHelp | Action::Quit)
        );
    if closes {
        state.active_view = ActiveView::Deck;
    }
}

/// Process a mouse event.  Wheel and left-button drags are global: they
/// act wherever the pointer is.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Deck {
        return;
    }

    let y = f64::from(mouse.row) * state.config.cell_height_px;

    match mouse.kind {
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            state.on_scroll(mouse.kind == MouseEventKind::ScrollDown, Instant::now());
        }
        MouseEventKind::Down(MouseButton::Left) => {
            state.dispatch_gesture(ListenerKind::TouchStart, GestureEvent::TouchStart { y });
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            state.dispatch_gesture(ListenerKind::TouchMove, GestureEvent::TouchMove { y });
        }
        _ => {}
    }
}
