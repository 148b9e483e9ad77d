//! Slide stack widget.
//!
//! Every slide is laid out at `index * height` inside one tall stack and
//! the whole stack is shifted by the (animated) translation.  Backdrops
//! move against the stack for the parallax effect.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Line,
    widgets::Widget,
};

use crate::core::container::SlideFrame;
use crate::core::deck::{Align, ParallaxKind, SlideConfig};

use super::theme::Theme;

/// The backdrop pattern appears on every n-th row.
const BACKDROP_EVERY: i64 = 3;
const HEADING_MARKER: &str = "# ";

/// Resting backdrop shift (rows) for a slide in its current relation.
///
/// `Cover` backdrops lag behind the stack, `Scroll` backdrops run ahead
/// of it; the current slide's backdrop is always centred.
pub fn backdrop_target(frame: &SlideFrame) -> f64 {
    let amount = frame.parallax.offset / 100.0 * f64::from(frame.height);
    let sign = match frame.parallax.kind {
        ParallaxKind::Cover => 1.0,
        ParallaxKind::Scroll => -1.0,
    };
    if frame.is_current() {
        0.0
    } else if frame.is_top() {
        sign * amount
    } else {
        -sign * amount
    }
}

/// Renders the stack from per-slide frames.  Each frame carries its slide,
/// its position in the stack and the geometry it was measured with.
pub struct SlidesWidget<'a> {
    frames: &'a [SlideFrame<'a>],
    translate_y: f64,
    backdrop_shifts: &'a [f64],
}

impl<'a> SlidesWidget<'a> {
    pub fn new(frames: &'a [SlideFrame<'a>]) -> Self {
        Self {
            frames,
            translate_y: 0.0,
            backdrop_shifts: &[],
        }
    }

    /// Vertical translation of the whole stack, in rows.
    pub fn translate_y(mut self, translate_y: f64) -> Self {
        self.translate_y = translate_y;
        self
    }

    /// Animated backdrop shifts by slide index.  Slides without one rest at
    /// their frame's target.
    pub fn backdrop_shifts(mut self, shifts: &'a [f64]) -> Self {
        self.backdrop_shifts = shifts;
        self
    }

    fn render_slide(&self, frame: &SlideFrame, top: i64, area: Rect, buf: &mut Buffer) {
        let slide = frame.slide;
        let height = i64::from(frame.height);
        let shift = self
            .backdrop_shifts
            .get(frame.index)
            .copied()
            .unwrap_or_else(|| backdrop_target(frame))
            .round() as i64;
        let body_style = Theme::slide_style(&slide.style);

        let lines = slide.content.len() as i64;
        let first_line = (height - lines).max(0) / 2;

        for row in 0..height {
            let y = i64::from(area.y) + top + row;
            if y < i64::from(area.y) || y >= i64::from(area.bottom()) {
                continue;
            }
            let Ok(y) = u16::try_from(y) else {
                continue;
            };
            let row_area = Rect::new(area.x, y, area.width, 1);
            buf.set_style(row_area, body_style);

            if let Some(pattern) = slide.style.backdrop.as_deref().filter(|p| !p.is_empty()) {
                if (row - shift).rem_euclid(BACKDROP_EVERY) == 0 {
                    let tiled: String = pattern.chars().cycle().take(usize::from(area.width)).collect();
                    buf.set_stringn(area.x, y, tiled, usize::from(area.width), Theme::backdrop_style(&slide.style));
                }
            }

            let line_index = row - first_line;
            if line_index < 0 || line_index >= lines {
                continue;
            }
            let text = &slide.content[line_index as usize];
            let line = match text.strip_prefix(HEADING_MARKER) {
                Some(heading) => Line::styled(heading, Theme::heading_style(&slide.style)),
                None => Line::styled(text.as_str(), body_style),
            };
            line.alignment(alignment(slide.style.align)).render(row_area, buf);
        }
    }
}

impl Widget for SlidesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let translate = self.translate_y.round() as i64;
        let visible = i64::from(area.height);

        for frame in self.frames {
            let height = i64::from(frame.height);
            if height == 0 {
                continue;
            }
            let top = frame.index as i64 * height + translate;
            if top + height <= 0 || top >= visible {
                continue;
            }
            self.render_slide(frame, top, area, buf);
        }
    }
}

fn alignment(align: Align) -> Alignment {
    match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
        Align::Right => Alignment::Right,
    }
}
