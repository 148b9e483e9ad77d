//! User configuration: gesture tuning and keybindings, persisted to disk.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/page-slides/config.toml` (default
//! `~/.config/page-slides/config.toml`).  The arrow keys are not listed
//! here: they belong to the deck itself and always step one slide.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::gesture::GestureTuning;

// ───────────────────────────────────────── actions ───────────

/// Host-level actions (everything that is not a slide gesture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FirstSlide,
    LastSlide,
    ToggleAutoScroll,
    ToggleHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help popup).
    pub const ALL: &[Action] = &[
        Action::FirstSlide,
        Action::LastSlide,
        Action::ToggleAutoScroll,
        Action::ToggleHelp,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::FirstSlide => "First Slide",
            Action::LastSlide => "Last Slide",
            Action::ToggleAutoScroll => "Paged / Free Scroll",
            Action::ToggleHelp => "Help",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::FirstSlide => "first_slide",
            Action::LastSlide => "last_slide",
            Action::ToggleAutoScroll => "toggle_auto_scroll",
            Action::ToggleHelp => "toggle_help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT are compared;
    /// SHIFT is already folded into the character for `Char` keys.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Home"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        s.push_str(&key_name(self.code));
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Home"`, `"q"`, `"Space"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            // Single characters keep their case: `G` and `g` differ.
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Slide transition duration.
    pub transition_speed_ms: u64,
    /// Start in paged mode (`false` shows a freely scrollable stack).
    pub enable_auto_scroll: bool,
    /// Raw wheel delta reported for one terminal scroll event.
    pub wheel_notch_delta: f64,
    /// Terminals report trackpad scrolling as a rapid run of ordinary
    /// scroll events.  Events closer together than this are treated as
    /// trackpad input; 0 disables the detection.
    pub scroll_burst_ms: u64,
    /// Wheel deltas below this count as trackpad input.
    pub trackpad_threshold: f64,
    pub trackpad_cooldown_ms: u64,
    /// Drag distance (in touch units) before a drag turns the page.
    pub touch_dead_zone: f64,
    /// Touch units per terminal row.
    pub cell_height_px: f64,
    /// Frame interval while animating.
    pub frame_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            transition_speed_ms: 1000,
            enable_auto_scroll: true,
            wheel_notch_delta: 120.0,
            scroll_burst_ms: 25,
            trackpad_threshold: 100.0,
            trackpad_cooldown_ms: 1500,
            touch_dead_zone: 30.0,
            cell_height_px: 16.0,
            frame_ms: 16,
        }
    }
}

impl AppConfig {
    /// Built-in bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(FirstSlide, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(LastSlide, vec![KeyBind::new(End, n), KeyBind::new(Char('G'), n)]);
        m.insert(ToggleAutoScroll, vec![KeyBind::new(Char('a'), n)]);
        m.insert(ToggleHelp, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    pub fn gesture_tuning(&self) -> GestureTuning {
        GestureTuning {
            trackpad_threshold: self.trackpad_threshold,
            trackpad_cooldown: Duration::from_millis(self.trackpad_cooldown_ms),
            touch_dead_zone: self.touch_dead_zone,
        }
    }

    pub fn transition_speed(&self) -> Duration {
        Duration::from_millis(self.transition_speed_ms)
    }

    /// Raw wheel delta for one terminal scroll event.  Part of a burst, it
    /// falls below the trackpad threshold so the gate takes the cool-down.
    pub fn scroll_delta(&self, down: bool, since_previous: Option<Duration>) -> f64 {
        let burst = self.scroll_burst_ms > 0
            && since_previous.is_some_and(|gap| gap < Duration::from_millis(self.scroll_burst_ms));
        let magnitude = if burst {
            self.trackpad_threshold / 2.0
        } else {
            self.wheel_notch_delta
        };
        if down {
            magnitude
        } else {
            -magnitude
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Format the binding list for a given action (e.g. `"Home/g"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "↑/↓ wheel drag: slides | 1-9: jump | {}: mode | {}: help | {}: quit",
            self.short_binding(Action::ToggleAutoScroll),
            self.short_binding(Action::ToggleHelp),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("cannot read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Persist current config to disk.  Returns the path written.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(path)
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for (line_no, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("config line {}: expected `key = value`", line_no + 1);
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Numeric settings are clamped to keep the deck usable.
            let number = |lo: f64, hi: f64| value.parse::<f64>().ok().map(|v| v.clamp(lo, hi));
            let millis = |lo: u64, hi: u64| value.parse::<u64>().ok().map(|v| v.clamp(lo, hi));

            let applied = match key {
                "transition_speed_ms" => millis(0, 10_000).map(|v| config.transition_speed_ms = v),
                "enable_auto_scroll" => {
                    config.enable_auto_scroll = value == "true";
                    Some(())
                }
                "wheel_notch_delta" => number(1.0, 1000.0).map(|v| config.wheel_notch_delta = v),
                "trackpad_threshold" => number(0.0, 1000.0).map(|v| config.trackpad_threshold = v),
                "trackpad_cooldown_ms" => millis(0, 10_000).map(|v| config.trackpad_cooldown_ms = v),
                "touch_dead_zone" => number(1.0, 1000.0).map(|v| config.touch_dead_zone = v),
                "cell_height_px" => number(1.0, 200.0).map(|v| config.cell_height_px = v),
                "scroll_burst_ms" => millis(0, 500).map(|v| config.scroll_burst_ms = v),
                "frame_ms" => millis(5, 200).map(|v| config.frame_ms = v),
                _ => match Action::from_config_key(key) {
                    Some(action) => {
                        let parsed: Vec<KeyBind> = value
                            .split(',')
                            .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                            .collect();
                        if !parsed.is_empty() {
                            config.bindings.insert(action, parsed);
                        }
                        Some(())
                    }
                    None => {
                        tracing::warn!("config line {}: unknown key `{key}`", line_no + 1);
                        Some(())
                    }
                },
            };
            if applied.is_none() {
                tracing::warn!("config line {}: bad value for `{key}`: {value}", line_no + 1);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# page-slides configuration".to_string(),
            String::new(),
            "# Presentation".to_string(),
            format!("transition_speed_ms = {}", self.transition_speed_ms),
            format!("enable_auto_scroll = {}", self.enable_auto_scroll),
            format!("frame_ms = {}", self.frame_ms),
            String::new(),
            "# Gestures".to_string(),
            format!("wheel_notch_delta = {}", self.wheel_notch_delta),
            format!("scroll_burst_ms = {}", self.scroll_burst_ms),
            format!("trackpad_threshold = {}", self.trackpad_threshold),
            format!("trackpad_cooldown_ms = {}", self.trackpad_cooldown_ms),
            format!("touch_dead_zone = {}", self.touch_dead_zone),
            format!("cell_height_px = {}", self.cell_height_px),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+ (prefix)".to_string(),
            "# Special keys: Enter, Esc, Tab, Backspace, Home, End, PageUp,".to_string(),
            "#   PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::display).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/page-slides/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventKind;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn defaults_match_gesture_constants() {
        let tuning = AppConfig::default().gesture_tuning();
        assert_eq!(tuning, GestureTuning::default());
    }

    #[test]
    fn rapid_scroll_events_read_as_trackpad() {
        let cfg = AppConfig::default();
        let tuning = cfg.gesture_tuning();

        let lone = cfg.scroll_delta(true, None);
        assert_eq!(lone, 120.0);
        assert!(lone.abs() >= tuning.trackpad_threshold);
        assert_eq!(cfg.scroll_delta(false, Some(Duration::from_millis(200))), -120.0);

        let burst = cfg.scroll_delta(false, Some(Duration::from_millis(5)));
        assert!(burst < 0.0);
        assert!(burst.abs() < tuning.trackpad_threshold);

        let off = AppConfig {
            scroll_burst_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(off.scroll_delta(true, Some(Duration::ZERO)), 120.0);
    }

    #[test]
    fn parses_settings_and_bindings() {
        let cfg = AppConfig::parse(
            "# comment\n\
             transition_speed_ms = 700\n\
             enable_auto_scroll = false\n\
             trackpad_cooldown_ms = 99999\n\
             touch_dead_zone = abc\n\
             quit = Ctrl+x, Q\n\
             nonsense = 1\n",
        );
        assert_eq!(cfg.transition_speed_ms, 700);
        assert!(!cfg.enable_auto_scroll);
        assert_eq!(cfg.trackpad_cooldown_ms, 10_000);
        assert_eq!(cfg.touch_dead_zone, 30.0);
        assert_eq!(
            cfg.match_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(cfg.match_key(key(KeyCode::Char('Q'), KeyModifiers::SHIFT)), Some(Action::Quit));
        assert_eq!(cfg.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.transition_speed_ms = 450;
        cfg.wheel_notch_delta = 60.0;
        cfg.bindings
            .insert(Action::ToggleHelp, vec![KeyBind::new(KeyCode::F(1), KeyModifiers::ALT)]);
        assert_eq!(AppConfig::parse(&cfg.serialise()), cfg);
    }

    #[test]
    fn default_bindings_resolve() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.match_key(key(KeyCode::Home, KeyModifiers::NONE)), Some(Action::FirstSlide));
        assert_eq!(cfg.match_key(key(KeyCode::Char('G'), KeyModifiers::SHIFT)), Some(Action::LastSlide));
        assert_eq!(cfg.match_key(key(KeyCode::Up, KeyModifiers::NONE)), None);
        assert_eq!(cfg.display_bindings(Action::Quit), "q/Esc");
    }
}
