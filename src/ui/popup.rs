//! Help popup overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};

use super::theme::Theme;

/// Gestures that are not rebindable, shown above the configurable actions.
const GESTURES: &[(&str, &str)] = &[
    ("Next / previous slide", "↓ / ↑"),
    ("Wheel", "scroll (fast runs act as trackpad)"),
    ("Drag", "left button"),
    ("Jump to slide", "1-9"),
];

// ───────────────────────────────────────── help popup ────────

/// Key bindings and gestures overlay.
pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // rows + 1 separator + 2 blanks + 1 hint + 2 border
        let height = (GESTURES.len() + Action::ALL.len()) as u16 + 6;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Help ")
            .title_style(Theme::popup_title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style());

        let inner = block.inner(popup);
        block.render(popup, buf);

        let rows = GESTURES
            .iter()
            .map(|&(label, keys)| (label.to_string(), keys.to_string()))
            .chain(std::iter::once((String::new(), String::new())))
            .chain(
                Action::ALL
                    .iter()
                    .map(|&action| (action.label().to_string(), self.config.display_bindings(action))),
            );

        let mut lines = vec![Line::raw("")];
        for (label, keys) in rows {
            if label.is_empty() {
                lines.push(Line::raw(""));
                continue;
            }
            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("   {label:<24}");
            let keys_width = usize::from(inner.width)
                .saturating_sub(label_col.chars().count() + 1)
                .max(1);
            lines.push(Line::from(vec![
                Span::styled(label_col, Style::default().fg(Color::White)),
                Span::styled(format!("{keys:>keys_width$}"), Theme::key_style()),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "  Esc: close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
