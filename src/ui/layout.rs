//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows taken by the status bar.
pub const STATUS_ROWS: u16 = 1;

/// Primary screen layout: the slide viewport and a bottom status bar.
pub struct AppLayout {
    pub deck_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),              // slide viewport
                Constraint::Length(STATUS_ROWS), // status bar
            ])
            .split(area);

        Self {
            deck_area: chunks[0],
            status_area: chunks[1],
        }
    }

    /// Viewport height for a terminal `rows` tall.
    pub fn deck_height(rows: u16) -> u16 {
        rows.saturating_sub(STATUS_ROWS).max(1)
    }
}
