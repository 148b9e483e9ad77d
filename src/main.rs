//! A terminal slide deck that pages one full screen at a time.
//!
//! Wheel, arrow keys and left-button drags move between slides; a gate
//! debounces input so one physical gesture moves exactly one slide.
//! Run with `--write-config` to dump the effective configuration.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{self as app_event, AppEvent},
    handler,
    state::{ActiveView, AppState, DeckOptions},
};
use crate::config::AppConfig;
use crate::core::deck::{Deck, ParallaxConfig, ParallaxKind};
use crate::core::gate::GateState;
use crate::ui::{
    layout::AppLayout,
    popup::HelpPopup,
    slides::SlidesWidget,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Full-screen paginated slide deck")]
struct Cli {
    /// Deck file: slides separated by `---` lines.
    #[arg(required_unless_present = "write_config")]
    deck: Option<PathBuf>,

    /// Slide to open on (1-based).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    start: Option<u64>,

    /// Transition duration in milliseconds (overrides the config file).
    #[arg(long)]
    speed: Option<u64>,

    /// Backdrop parallax: `cover` or `scroll`.
    #[arg(long, default_value = "cover")]
    parallax: ParallaxKind,

    /// Backdrop parallax offset, in percent of the viewport height.
    #[arg(long, default_value_t = 40.0)]
    parallax_offset: f64,

    /// Start in free scroll mode instead of paging.
    #[arg(long)]
    no_auto_scroll: bool,

    /// Write logs here instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the effective configuration file and exit.
    #[arg(long)]
    write_config: bool,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());

    let frames = state.slide_frames();
    let shifts = state.backdrop_shifts();
    let widget = SlidesWidget::new(&frames)
        .translate_y(state.stack_offset())
        .backdrop_shifts(&shifts);
    frame.render_widget(widget, layout.deck_area);

    let gate = state.gate_state();
    let gate_label = match gate {
        Some(GateState::Open) => " open ",
        Some(GateState::Closed) if state.cooling_down() => " cool ",
        Some(GateState::Closed) => " busy ",
        None => " free ",
    };
    let hint = state.config.status_bar_hint();
    let message = match state.active_view {
        ActiveView::Deck => state.status_message.as_deref().unwrap_or(&hint),
        ActiveView::Help => "",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(format!(" {}/{} ", state.current_slide() + 1, state.slides.len())),
        Span::styled(gate_label, Theme::gate_style(gate)),
        Span::raw(format!(" {message}")),
    ]))
    .style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    if state.active_view == ActiveView::Help {
        frame.render_widget(HelpPopup { config: &state.config }, frame.area());
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut config = AppConfig::load();
    if let Some(ms) = cli.speed {
        config.transition_speed_ms = ms;
    }
    if cli.no_auto_scroll {
        config.enable_auto_scroll = false;
    }

    if cli.write_config {
        let path = config.save().context("cannot write config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let Some(deck_path) = cli.deck.as_deref() else {
        anyhow::bail!("no deck given");
    };
    let deck = Deck::load(deck_path)?;
    tracing::info!(path = %deck_path.display(), slides = deck.len(), "deck loaded");

    let start = cli
        .start
        .map(|n| usize::try_from(n - 1).unwrap_or(usize::MAX).min(deck.len().saturating_sub(1)));
    let options = DeckOptions {
        parallax: ParallaxConfig {
            kind: cli.parallax,
            offset: cli.parallax_offset,
        },
        transition_speed: config.transition_speed(),
        start,
    };

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, deck, config, options).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    deck: Deck,
    config: AppConfig,
    options: DeckOptions,
) -> Result<()> {
    let rows = terminal.size()?.height;
    let (tx, mut events) = app_event::channel();
    app_event::spawn_event_reader(config.frame_interval(), tx.clone());
    let mut state = AppState::new(deck, config, options, tx, AppLayout::deck_height(rows));

    let mut dirty = true;
    loop {
        let now = Instant::now();
        state.sync_render(now);
        // Sample before ticking so the frame that finishes a transition
        // still gets drawn.
        let animating = state.is_animating();
        state.tick(now);
        if dirty || animating {
            terminal.draw(|frame| draw(frame, &state))?;
            dirty = false;
        }

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(k) => handler::handle_key(&mut state, k),
            AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
            AppEvent::Resize(rows) => state.set_height(AppLayout::deck_height(rows)),
            AppEvent::Tick => continue,
            AppEvent::CooldownElapsed { mount, ticket } => state.on_cooldown_elapsed(mount, ticket),
            AppEvent::SlideChanged { mount, index } => state.on_slide_changed(mount, index),
        }
        dirty = true;

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_deck_options() {
        let cli = Cli::try_parse_from([
            "page-slides",
            "talk.txt",
            "--start",
            "3",
            "--parallax",
            "scroll",
            "--parallax-offset",
            "25",
        ])
        .expect("valid args");
        assert_eq!(cli.deck.as_deref(), Some(std::path::Path::new("talk.txt")));
        assert_eq!(cli.start, Some(3));
        assert_eq!(cli.parallax, ParallaxKind::Scroll);
        assert_eq!(cli.parallax_offset, 25.0);
        assert!(!cli.no_auto_scroll);
    }

    #[test]
    fn deck_is_optional_only_for_write_config() {
        assert!(Cli::try_parse_from(["page-slides"]).is_err());
        assert!(Cli::try_parse_from(["page-slides", "--write-config"]).is_ok());
        assert!(Cli::try_parse_from(["page-slides", "d.txt", "--start", "0"]).is_err());
    }
}
