//! Slide deck model and the plain-text deck format.
//!
//! A deck file is a list of slides separated by lines containing exactly
//! `---`.  The first lines of a slide may carry style directives:
//!
//! ```text
//! :: bg = blue
//! :: fg = #ffd866
//! :: backdrop = ·  ·
//! :: align = left
//! # Title
//! Body text
//! ---
//! Next slide
//! ```
//!
//! Slide content is opaque to the engine; only the renderer looks at it.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ratatui::style::Color;
use thiserror::Error;

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("cannot read deck {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deck contains no slides")]
    Empty,

    #[error("slide {slide}, line {line}: malformed directive (expected `:: key = value`)")]
    MalformedDirective { slide: usize, line: usize },

    #[error("slide {slide}, line {line}: unknown directive `{key}`")]
    UnknownDirective { slide: usize, line: usize, key: String },

    #[error("slide {slide}, line {line}: invalid colour `{value}`")]
    BadColor { slide: usize, line: usize, value: String },

    #[error("slide {slide}, line {line}: invalid alignment `{value}` (left, center, right)")]
    BadAlign { slide: usize, line: usize, value: String },
}

// ───────────────────────────────────────── parallax ──────────

/// How a slide's backdrop moves relative to its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParallaxKind {
    /// Backdrop lags behind the content, as if the next slide covers it.
    #[default]
    Cover,
    /// Backdrop runs ahead of the content.
    Scroll,
}

impl FromStr for ParallaxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cover" => Ok(ParallaxKind::Cover),
            "scroll" => Ok(ParallaxKind::Scroll),
            other => Err(format!("unknown parallax type `{other}` (cover, scroll)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxConfig {
    pub kind: ParallaxKind,
    /// Backdrop displacement as a percentage of the viewport height.
    pub offset: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            kind: ParallaxKind::Cover,
            offset: 40.0,
        }
    }
}

// ───────────────────────────────────────── slides ────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for Align {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" | "centre" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            _ => Err(()),
        }
    }
}

/// Per-slide presentation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlideStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    /// Pattern tiled across the slide background; moves with parallax.
    pub backdrop: Option<String>,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlideConfig {
    pub content: Vec<String>,
    pub style: SlideStyle,
}

// ───────────────────────────────────────── deck ──────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub slides: Vec<SlideConfig>,
}

const SEPARATOR: &str = "---";
const DIRECTIVE_PREFIX: &str = "::";

impl Deck {
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let text = std::fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, DeckError> {
        let mut slides = Vec::new();
        let mut chunk: Vec<(usize, &str)> = Vec::new();

        for (i, line) in text.lines().enumerate() {
            if line.trim_end() == SEPARATOR {
                if let Some(slide) = parse_slide(slides.len() + 1, &chunk)? {
                    slides.push(slide);
                }
                chunk.clear();
            } else {
                chunk.push((i + 1, line));
            }
        }
        if let Some(slide) = parse_slide(slides.len() + 1, &chunk)? {
            slides.push(slide);
        }

        if slides.is_empty() {
            return Err(DeckError::Empty);
        }
        Ok(Self { slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }
}

/// Parse one separator-delimited chunk.  Blank chunks yield `None` so that
/// leading or trailing separators don't create empty slides.
fn parse_slide(number: usize, lines: &[(usize, &str)]) -> Result<Option<SlideConfig>, DeckError> {
    let mut style = SlideStyle::default();
    let mut rest = lines
        .iter()
        .skip_while(|(_, l)| l.trim().is_empty())
        .peekable();
    let mut has_directive = false;

    while let Some((line_no, line)) = rest.peek() {
        let Some(body) = line.trim_start().strip_prefix(DIRECTIVE_PREFIX) else {
            break;
        };
        apply_directive(&mut style, number, *line_no, body)?;
        has_directive = true;
        rest.next();
    }

    let mut content: Vec<String> = rest
        .skip_while(|(_, l)| l.trim().is_empty())
        .map(|(_, l)| l.trim_end().to_string())
        .collect();
    while content.last().is_some_and(|l| l.is_empty()) {
        content.pop();
    }

    if content.is_empty() && !has_directive {
        return Ok(None);
    }
    Ok(Some(SlideConfig { content, style }))
}

fn apply_directive(
    style: &mut SlideStyle,
    slide: usize,
    line: usize,
    body: &str,
) -> Result<(), DeckError> {
    let (key, value) = body
        .split_once('=')
        .ok_or(DeckError::MalformedDirective { slide, line })?;
    let key = key.trim();
    let value = value.trim();

    let color = |value: &str| {
        Color::from_str(value).map_err(|_| DeckError::BadColor {
            slide,
            line,
            value: value.to_string(),
        })
    };

    match key {
        "fg" => style.fg = Some(color(value)?),
        "bg" => style.bg = Some(color(value)?),
        "backdrop" => style.backdrop = Some(value.to_string()).filter(|v| !v.is_empty()),
        "align" => {
            style.align = value.parse().map_err(|_| DeckError::BadAlign {
                slide,
                line,
                value: value.to_string(),
            })?;
        }
        _ => {
            return Err(DeckError::UnknownDirective {
                slide,
                line,
                key: key.to_string(),
            })
        }
    }
    Ok(())
}
