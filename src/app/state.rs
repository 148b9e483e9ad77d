//! Central application state: the outer wrapper around the slide deck.
//!
//! `AppState` measures the viewport and owns the host side of the controlled
//! slide index.  It also decides whether the paginated container is mounted
//! (paged mode) or the slides are shown as one freely scrollable stack.
//! Rendering is a pure function over `&AppState`; event handling mutates it.

use std::time::{Duration, Instant};

use crate::app::event::{self, EventSender};
use crate::config::AppConfig;
use crate::core::container::{SlideFrame, SlideRelation, SlidesContainer, SlidesProps};
use crate::core::deck::{Deck, ParallaxConfig, SlideConfig};
use crate::core::gate::{CooldownTicket, GateState};
use crate::core::gesture::GestureEvent;
use crate::core::listeners::{ListenerKind, ListenerRegistry};
use crate::ui::slides::backdrop_target;
use crate::ui::transition::Timeline;

/// Rows a single wheel event scrolls in free mode.
const FREE_WHEEL_ROWS: isize = 3;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Deck,
    Help,
}

/// Startup options that come from the command line rather than the config
/// file.
#[derive(Debug, Clone)]
pub struct DeckOptions {
    pub parallax: ParallaxConfig,
    pub transition_speed: Duration,
    pub start: Option<usize>,
}

/// The mounted paginated container plus the animation state of its stack
/// and backdrops.
pub struct PagedDeck {
    pub container: SlidesContainer,
    pub mount_id: u64,
    /// Animated stack translation (rows).
    pub stack: Timeline,
    /// Animated backdrop shift per slide (rows).
    pub backdrops: Vec<Timeline>,
}

pub enum Presentation {
    Paged(PagedDeck),
    /// All slides stacked, scrolled by `offset` rows.
    Free { offset: usize },
}

/// Top-level application state.
pub struct AppState {
    pub slides: Vec<SlideConfig>,
    pub config: AppConfig,
    pub parallax: ParallaxConfig,
    pub transition_speed: Duration,
    /// Viewport height in rows, fed down to the container.
    pub height: u16,
    /// The host's controlled index.  Kept equal to the displayed slide once
    /// a change is committed, so a jump key always works.
    pub controlled: Option<usize>,
    pub presentation: Presentation,
    pub listeners: ListenerRegistry,
    pub events: EventSender,
    next_mount_id: u64,
    /// Time of the previous terminal scroll event, for burst detection.
    last_scroll: Option<Instant>,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(deck: Deck, config: AppConfig, options: DeckOptions, events: EventSender, height: u16) -> Self {
        let start = options.start.unwrap_or(0);
        let mut state = Self {
            slides: deck.slides,
            parallax: options.parallax,
            transition_speed: options.transition_speed,
            height,
            controlled: options.start,
            presentation: Presentation::Free { offset: 0 },
            listeners: ListenerRegistry::new(),
            events,
            next_mount_id: 0,
            last_scroll: None,
            active_view: ActiveView::default(),
            should_quit: false,
            status_message: None,
            config,
        };
        if state.config.enable_auto_scroll {
            state.mount_paged();
        } else {
            let offset = state.clamp_free_offset(start.saturating_mul(usize::from(height)));
            state.presentation = Presentation::Free { offset };
        }
        state
    }

    // ── queries ───────────────────────────────────────────────

    pub fn is_paged(&self) -> bool {
        matches!(self.presentation, Presentation::Paged(_))
    }

    /// Slide shown at the top of the viewport.
    pub fn current_slide(&self) -> usize {
        match &self.presentation {
            Presentation::Paged(paged) => paged.container.current_index(),
            Presentation::Free { .. } => self.free_top_slide(),
        }
    }

    pub fn gate_state(&self) -> Option<GateState> {
        match &self.presentation {
            Presentation::Paged(paged) => Some(paged.container.gate_state()),
            Presentation::Free { .. } => None,
        }
    }

    /// A trackpad burst is holding the gate shut until its cool-down ends.
    pub fn cooling_down(&self) -> bool {
        match &self.presentation {
            Presentation::Paged(paged) => paged.container.trackpad_hold(),
            Presentation::Free { .. } => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        match &self.presentation {
            Presentation::Paged(paged) => {
                paged.stack.is_animating() || paged.backdrops.iter().any(Timeline::is_animating)
            }
            Presentation::Free { .. } => false,
        }
    }

    fn free_top_slide(&self) -> usize {
        match self.presentation {
            Presentation::Free { offset } if self.height > 0 => offset / usize::from(self.height),
            _ => 0,
        }
    }

    fn clamp_free_offset(&self, offset: usize) -> usize {
        let total = self.slides.len() * usize::from(self.height);
        offset.min(total.saturating_sub(usize::from(self.height)))
    }

    // ── mounting ──────────────────────────────────────────────

    fn mount_paged(&mut self) {
        self.next_mount_id += 1;
        let mount_id = self.next_mount_id;
        let tx = self.events.clone();
        let props = SlidesProps {
            slides: self.slides.clone(),
            transition_speed: self.transition_speed,
            parallax: self.parallax,
            height: self.height,
            controlled_index: self.controlled,
            on_change: Box::new(move |index| {
                let _ = tx.send(event::AppEvent::SlideChanged { mount: mount_id, index });
            }),
            tuning: self.config.gesture_tuning(),
        };
        let container = SlidesContainer::mount(props, &self.listeners);
        tracing::debug!(mount_id, listeners = self.listeners.len(), "paged deck mounted");

        let stack = Timeline::new(container.container_style().translate_y);
        let backdrops = container
            .slide_frames()
            .iter()
            .map(|frame| Timeline::new(backdrop_target(frame)))
            .collect();
        self.presentation = Presentation::Paged(PagedDeck {
            container,
            mount_id,
            stack,
            backdrops,
        });
    }

    /// Switch between paged and free scrolling, keeping the visible slide.
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        if enabled == self.is_paged() {
            return;
        }
        let visible = self.current_slide();
        if enabled {
            self.controlled = Some(visible);
            self.mount_paged();
        } else {
            let previous = std::mem::replace(
                &mut self.presentation,
                Presentation::Free {
                    offset: visible * usize::from(self.height),
                },
            );
            if let Presentation::Paged(paged) = previous {
                paged.container.unmount();
            }
            debug_assert!(self.listeners.is_empty(), "listeners left after unmount");
        }
        tracing::debug!(paged = enabled, slide = visible, "presentation mode switched");
    }

    // ── host inputs ───────────────────────────────────────────

    /// New viewport height.  Animations snap to the new geometry.
    pub fn set_height(&mut self, height: u16) {
        if height == self.height {
            return;
        }
        let top = self.current_slide();
        self.height = height;
        match &mut self.presentation {
            Presentation::Paged(paged) => {
                paged.container.set_height(height);
                paged.stack.jump(paged.container.container_style().translate_y);
                for (timeline, frame) in paged.backdrops.iter_mut().zip(paged.container.slide_frames()) {
                    timeline.jump(backdrop_target(&frame));
                }
            }
            Presentation::Free { offset } => {
                *offset = top * usize::from(height);
            }
        }
    }

    /// Host-driven jump to `index`.
    pub fn set_controlled_index(&mut self, index: usize) {
        if index >= self.slides.len() {
            self.status_message = Some(format!("no slide {}", index + 1));
            return;
        }
        self.status_message = None;
        self.controlled = Some(index);
        if let Presentation::Paged(paged) = &mut self.presentation {
            paged.container.set_controlled_index(index);
        } else {
            let offset = self.clamp_free_offset(index * usize::from(self.height));
            self.presentation = Presentation::Free { offset };
        }
    }

    /// Change notification from a mounted container.  The controlled index
    /// was already brought in line when the change was committed, so a
    /// notification that arrives late must not move the deck again.
    pub fn on_slide_changed(&mut self, mount: u64, index: usize) {
        if !matches!(&self.presentation, Presentation::Paged(p) if p.mount_id == mount) {
            tracing::trace!(mount, index, "change from unmounted container ignored");
            return;
        }
        tracing::debug!(index, current = self.current_slide(), "slide changed");
    }

    /// Feed a committed gesture change back as the controlled index, the
    /// way a controlled host answers `on_change`.  The container absorbs the
    /// echo without a second change.
    fn echo_committed(&mut self, index: usize) {
        self.controlled = Some(index);
        if let Presentation::Paged(paged) = &mut self.presentation {
            paged.container.set_controlled_index(index);
        }
    }

    pub fn on_cooldown_elapsed(&mut self, mount: u64, ticket: CooldownTicket) {
        match &mut self.presentation {
            Presentation::Paged(paged) if paged.mount_id == mount => {
                paged.container.on_cooldown_elapsed(ticket);
            }
            _ => tracing::trace!(mount, "cool-down for unmounted container ignored"),
        }
    }

    /// Forward a gesture to whoever listens for `kind`.
    pub fn dispatch_gesture(&mut self, kind: ListenerKind, gesture: GestureEvent) {
        if !self.listeners.is_listening(kind) {
            return;
        }
        let Presentation::Paged(paged) = &mut self.presentation else {
            return;
        };
        let before = paged.container.current_index();
        if let Some(ticket) = paged.container.handle(gesture) {
            event::schedule_cooldown(&self.events, paged.mount_id, ticket);
        }
        let after = paged.container.current_index();
        if after != before {
            self.echo_committed(after);
        }
    }

    /// One terminal scroll event.  Rapid runs of them come from a trackpad.
    pub fn on_scroll(&mut self, down: bool, now: Instant) {
        let since_previous = self.last_scroll.map(|t| now.saturating_duration_since(t));
        self.last_scroll = Some(now);
        if self.is_paged() {
            let delta_y = self.config.scroll_delta(down, since_previous);
            self.dispatch_gesture(ListenerKind::Wheel, GestureEvent::Wheel { delta_y });
        } else {
            self.scroll_free_wheel(down);
        }
    }

    /// Scroll the free stack by `rows` (negative scrolls up).
    pub fn scroll_free(&mut self, rows: isize) {
        if let Presentation::Free { offset } = self.presentation {
            let next = offset.saturating_add_signed(rows);
            self.presentation = Presentation::Free {
                offset: self.clamp_free_offset(next),
            };
        }
    }

    fn scroll_free_wheel(&mut self, down: bool) {
        self.scroll_free(if down { FREE_WHEEL_ROWS } else { -FREE_WHEEL_ROWS });
    }

    // ── render model ──────────────────────────────────────────

    /// Per-slide frames.  In free mode they are laid out around the slide at
    /// the top of the viewport.
    pub fn slide_frames(&self) -> Vec<SlideFrame<'_>> {
        match &self.presentation {
            Presentation::Paged(paged) => paged.container.slide_frames(),
            Presentation::Free { .. } => {
                let top = self.free_top_slide();
                self.slides
                    .iter()
                    .enumerate()
                    .map(|(index, slide)| SlideFrame {
                        index,
                        slide,
                        relation: match index.cmp(&top) {
                            std::cmp::Ordering::Less => SlideRelation::Top,
                            std::cmp::Ordering::Equal => SlideRelation::Current,
                            std::cmp::Ordering::Greater => SlideRelation::Bottom,
                        },
                        parallax: self.parallax,
                        height: self.height,
                        transition_speed: Duration::ZERO,
                    })
                    .collect()
            }
        }
    }

    /// Stack translation (rows) as currently animated.
    pub fn stack_offset(&self) -> f64 {
        match &self.presentation {
            Presentation::Paged(paged) => paged.stack.value(),
            Presentation::Free { offset } => -(*offset as f64),
        }
    }

    /// Animated backdrop shifts; empty when nothing animates them.
    pub fn backdrop_shifts(&self) -> Vec<f64> {
        match &self.presentation {
            Presentation::Paged(paged) => paged.backdrops.iter().map(Timeline::value).collect(),
            Presentation::Free { .. } => Vec::new(),
        }
    }

    // ── animation ─────────────────────────────────────────────

    /// Point the stack and backdrop animations at the container's current
    /// render model.  Unchanged targets don't restart anything.
    pub fn sync_render(&mut self, now: Instant) {
        let Presentation::Paged(paged) = &mut self.presentation else {
            return;
        };
        let style = paged.container.container_style();
        if !paged.stack.is_animating() && style.translate_y != paged.stack.value() {
            tracing::trace!(
                height = style.height(),
                transform = %style.transform(),
                transition = %style.transition_timing(),
                "stack style"
            );
        }
        paged.stack.set_target(style.translate_y, style.transition, now);
        for (timeline, frame) in paged.backdrops.iter_mut().zip(paged.container.slide_frames()) {
            timeline.set_target(backdrop_target(&frame), frame.transition_speed, now);
        }
    }

    /// Advance animations.  The end of the stack transition is the
    /// transition-completion signal for the container's gate.
    pub fn tick(&mut self, now: Instant) {
        let Presentation::Paged(paged) = &mut self.presentation else {
            return;
        };
        if paged.stack.tick(now) {
            paged.container.on_transition_end();
        }
        for timeline in &mut paged.backdrops {
            timeline.tick(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::event::{channel, AppEvent, EventReceiver};
    use crate::core::gesture::KeyDirection;

    fn deck(n: usize) -> Deck {
        Deck {
            slides: vec![SlideConfig::default(); n],
        }
    }

    fn options(start: Option<usize>) -> DeckOptions {
        DeckOptions {
            parallax: ParallaxConfig::default(),
            transition_speed: Duration::from_millis(100),
            start,
        }
    }

    fn state(n: usize, start: Option<usize>) -> (AppState, EventReceiver) {
        let (tx, rx) = channel();
        (AppState::new(deck(n), AppConfig::default(), options(start), tx, 20), rx)
    }

    fn drain(state: &mut AppState, rx: &mut EventReceiver) -> Vec<usize> {
        let mut seen = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if let AppEvent::SlideChanged { mount, index } = ev {
                seen.push(index);
                state.on_slide_changed(mount, index);
            }
        }
        seen
    }

    fn finish_transition(state: &mut AppState) {
        let now = Instant::now();
        state.sync_render(now);
        state.tick(now + Duration::from_millis(100));
    }

    #[tokio::test]
    async fn key_gesture_animates_then_reopens_gate() {
        let (mut s, mut rx) = state(4, None);
        let t0 = Instant::now();
        s.dispatch_gesture(ListenerKind::KeyDown, GestureEvent::Key(KeyDirection::Down));
        s.sync_render(t0);
        assert_eq!(drain(&mut s, &mut rx), vec![1]);
        assert_eq!(s.gate_state(), Some(GateState::Closed));
        assert!(s.is_animating());

        s.tick(t0 + Duration::from_millis(50));
        assert_eq!(s.gate_state(), Some(GateState::Closed));
        s.tick(t0 + Duration::from_millis(100));
        assert_eq!(s.gate_state(), Some(GateState::Open));
    }

    #[tokio::test]
    async fn gesture_changes_become_the_controlled_index() {
        let (mut s, mut rx) = state(5, Some(0));
        s.dispatch_gesture(ListenerKind::KeyDown, GestureEvent::Key(KeyDirection::Down));
        assert_eq!(s.controlled, Some(1));
        // The echo produced no further notification.
        assert_eq!(drain(&mut s, &mut rx), vec![1]);
        assert_eq!(s.current_slide(), 1);
    }

    #[tokio::test]
    async fn jump_back_after_a_gesture_moved_away() {
        let (mut s, mut rx) = state(5, None);
        s.set_controlled_index(2);
        finish_transition(&mut s);
        s.dispatch_gesture(ListenerKind::KeyDown, GestureEvent::Key(KeyDirection::Down));
        assert_eq!(s.current_slide(), 3);

        // Same jump as before, with the change notification not yet handled.
        s.set_controlled_index(2);
        assert_eq!(s.current_slide(), 2);
        assert_eq!(drain(&mut s, &mut rx), vec![2, 3, 2]);
        assert_eq!(s.current_slide(), 2);
    }

    #[tokio::test]
    async fn late_notification_does_not_move_the_deck() {
        let (mut s, mut rx) = state(5, None);
        s.dispatch_gesture(ListenerKind::KeyDown, GestureEvent::Key(KeyDirection::Down));
        finish_transition(&mut s);
        s.dispatch_gesture(ListenerKind::KeyDown, GestureEvent::Key(KeyDirection::Down));
        assert_eq!(drain(&mut s, &mut rx), vec![1, 2]);
        assert_eq!(s.current_slide(), 2);
    }

    #[tokio::test]
    async fn scroll_burst_takes_the_cooldown_path() {
        let (mut s, _rx) = state(5, None);
        let t0 = Instant::now();
        s.on_scroll(true, t0);
        assert_eq!(s.current_slide(), 1);
        assert!(!s.cooling_down());
        // Dropped while the gate is closed.
        s.on_scroll(true, t0 + Duration::from_millis(10));
        finish_transition(&mut s);
        assert_eq!(s.gate_state(), Some(GateState::Open));

        // Still inside the burst: trackpad input, held until the cool-down.
        s.on_scroll(true, t0 + Duration::from_millis(20));
        assert_eq!(s.current_slide(), 2);
        assert!(s.cooling_down());
        finish_transition(&mut s);
        assert_eq!(s.gate_state(), Some(GateState::Closed));
    }

    #[tokio::test]
    async fn toggling_mode_releases_listeners() {
        let (mut s, _rx) = state(3, Some(2));
        assert_eq!(s.current_slide(), 2);
        assert!(!s.listeners.is_empty());

        s.set_auto_scroll(false);
        assert!(s.listeners.is_empty());
        assert_eq!(s.current_slide(), 2);

        // Gestures go nowhere without a mounted container.
        s.dispatch_gesture(ListenerKind::Wheel, GestureEvent::Wheel { delta_y: 120.0 });
        assert_eq!(s.current_slide(), 2);

        s.set_auto_scroll(true);
        assert_eq!(s.listeners.len(), ListenerKind::ALL.len());
        assert_eq!(s.current_slide(), 2);
    }

    #[tokio::test]
    async fn late_events_from_old_mount_are_ignored() {
        let (mut s, mut rx) = state(3, None);
        let ticket = {
            let Presentation::Paged(paged) = &mut s.presentation else {
                panic!("paged by default");
            };
            paged.container.on_wheel(20.0).expect("trackpad")
        };
        drain(&mut s, &mut rx);
        s.set_auto_scroll(false);
        s.set_auto_scroll(true);
        s.on_cooldown_elapsed(1, ticket);
        s.on_slide_changed(1, 2);
        assert_eq!(s.current_slide(), 1);
        assert_eq!(s.gate_state(), Some(GateState::Open));
    }

    #[tokio::test]
    async fn free_mode_scrolls_and_jumps() {
        let (tx, _rx) = channel();
        let mut config = AppConfig::default();
        config.enable_auto_scroll = false;
        let mut s = AppState::new(deck(3), config, options(Some(1)), tx, 10);
        assert!(!s.is_paged());
        assert_eq!(s.current_slide(), 1);
        assert_eq!(s.stack_offset(), -10.0);
        assert!(s.slide_frames()[1].is_current());

        s.on_scroll(true, Instant::now());
        s.scroll_free(100);
        assert!(matches!(s.presentation, Presentation::Free { offset: 20 }));
        s.set_controlled_index(0);
        assert!(matches!(s.presentation, Presentation::Free { offset: 0 }));
        s.set_controlled_index(7);
        assert!(s.status_message.is_some());
    }

    #[tokio::test]
    async fn resize_snaps_stack_to_new_height() {
        let (mut s, _rx) = state(3, Some(1));
        s.set_height(30);
        assert_eq!(s.stack_offset(), -30.0);
        assert!(s.slide_frames().iter().all(|f| f.height == 30));
    }
}
