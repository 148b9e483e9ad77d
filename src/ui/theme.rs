//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::deck::SlideStyle;
use crate::core::gate::GateState;

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── slides ─────────────────────────────────────────────────
    /// Body text of a slide, with the slide's own colours on top.
    pub fn slide_style(style: &SlideStyle) -> Style {
        let mut s = Style::default().fg(Color::White);
        if let Some(fg) = style.fg {
            s = s.fg(fg);
        }
        if let Some(bg) = style.bg {
            s = s.bg(bg);
        }
        s
    }

    pub fn heading_style(style: &SlideStyle) -> Style {
        Self::slide_style(style).add_modifier(Modifier::BOLD)
    }

    pub fn backdrop_style(style: &SlideStyle) -> Style {
        let s = Self::slide_style(style).fg(Color::DarkGray);
        s.add_modifier(Modifier::DIM)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn gate_style(gate: Option<GateState>) -> Style {
        let fg = match gate {
            Some(GateState::Open) => Color::Green,
            Some(GateState::Closed) => Color::Yellow,
            None => Color::Gray,
        };
        Self::status_bar_style().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn popup_title_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn key_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
