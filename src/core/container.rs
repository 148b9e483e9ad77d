//! The paginated slide container.
//!
//! Wires the gesture normaliser, the transition gate and the index
//! controller together, and derives the render model (stack translation and
//! per-slide frames) from the current index.  Mounting registers the
//! container's input listeners; dropping or unmounting it releases them.

use std::time::Duration;

use super::controller::{OnChange, SlideIndexController};
use super::deck::{ParallaxConfig, SlideConfig};
use super::gate::{CloseReason, CooldownTicket, GateState, TransitionGate};
use super::gesture::{Direction, GestureEvent, GestureNormalizer, GestureTuning, KeyDirection};
use super::listeners::{ListenerGuard, ListenerKind, ListenerRegistry};

/// Transition duration when the host doesn't pick one.
pub const DEFAULT_TRANSITION_SPEED: Duration = Duration::from_millis(2000);

// ───────────────────────────────────────── props ─────────────

/// Everything the host hands the container at mount time.
pub struct SlidesProps {
    pub slides: Vec<SlideConfig>,
    pub transition_speed: Duration,
    pub parallax: ParallaxConfig,
    /// Viewport height in rows, measured by the host.
    pub height: u16,
    /// Host-driven index, if the host controls the deck.
    pub controlled_index: Option<usize>,
    pub on_change: OnChange,
    pub tuning: GestureTuning,
}

impl Default for SlidesProps {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            transition_speed: DEFAULT_TRANSITION_SPEED,
            parallax: ParallaxConfig::default(),
            height: 0,
            controlled_index: None,
            on_change: Box::new(|_| {}),
            tuning: GestureTuning::default(),
        }
    }
}

// ───────────────────────────────────────── render model ──────

/// Style of the sliding stack, mirroring what a browser container gets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerStyle {
    /// Vertical translation of the whole stack, in rows.
    pub translate_y: f64,
    pub transition: Duration,
}

impl ContainerStyle {
    pub fn height(&self) -> &'static str {
        "100%"
    }

    pub fn transform(&self) -> String {
        format!("translate3d(0px, {}px, 0px)", self.translate_y)
    }

    pub fn transition_timing(&self) -> String {
        format!("all {}ms ease", self.transition.as_millis())
    }
}

/// Where a slide sits relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideRelation {
    /// Already scrolled past (above the viewport).
    Top,
    Current,
    /// Still to come (below the viewport).
    Bottom,
}

/// What the background layer of one slide gets to render itself.
#[derive(Debug, Clone, Copy)]
pub struct SlideFrame<'a> {
    pub index: usize,
    pub slide: &'a SlideConfig,
    pub relation: SlideRelation,
    pub parallax: ParallaxConfig,
    pub height: u16,
    pub transition_speed: Duration,
}

impl SlideFrame<'_> {
    pub fn is_top(&self) -> bool {
        self.relation == SlideRelation::Top
    }

    pub fn is_current(&self) -> bool {
        self.relation == SlideRelation::Current
    }
}

// ───────────────────────────────────────── container ─────────

pub struct SlidesContainer {
    slides: Vec<SlideConfig>,
    transition_speed: Duration,
    parallax: ParallaxConfig,
    height: u16,
    controller: SlideIndexController,
    gate: TransitionGate,
    normalizer: GestureNormalizer,
    listeners: ListenerGuard,
}

impl SlidesContainer {
    /// Build the container and register its global input listeners.
    pub fn mount(props: SlidesProps, registry: &ListenerRegistry) -> Self {
        let SlidesProps {
            slides,
            transition_speed,
            parallax,
            height,
            controlled_index,
            on_change,
            tuning,
        } = props;

        let controller = SlideIndexController::new(slides.len(), controlled_index, on_change);
        tracing::debug!(
            slides = controller.slide_count(),
            start = controller.current(),
            "slides container mounted"
        );

        Self {
            slides,
            transition_speed,
            parallax,
            height,
            controller,
            gate: TransitionGate::new(tuning.trackpad_cooldown),
            normalizer: GestureNormalizer::new(tuning),
            listeners: registry.register(ListenerKind::ALL),
        }
    }

    /// Release the input listeners and drop the container.  Any timer or
    /// animation callback still in flight has nothing left to act on.
    pub fn unmount(mut self) {
        self.listeners.release();
        tracing::debug!(index = self.controller.current(), "slides container unmounted");
    }

    // ── queries ───────────────────────────────────────────────

    pub fn current_index(&self) -> usize {
        self.controller.current()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// A trackpad cool-down is keeping the gate shut.
    pub fn trackpad_hold(&self) -> bool {
        self.gate.trackpad_hold()
    }

    /// New viewport height from the host's size measurement.
    pub fn set_height(&mut self, height: u16) {
        self.height = height;
    }

    // ── input ─────────────────────────────────────────────────

    /// Route a normalised event to its handler.  Returns a cool-down the
    /// caller has to schedule, if the event started one.
    pub fn handle(&mut self, event: GestureEvent) -> Option<CooldownTicket> {
        match event {
            GestureEvent::Wheel { delta_y } => return self.on_wheel(delta_y),
            GestureEvent::Key(key) => self.on_key_down(key),
            GestureEvent::TouchStart { y } => self.on_touch_start(y),
            GestureEvent::TouchMove { y } => self.on_touch_move(y),
        }
        None
    }

    pub fn on_wheel(&mut self, raw_delta_y: f64) -> Option<CooldownTicket> {
        if !self.gate.is_open() {
            tracing::trace!(raw_delta_y, "wheel dropped, gate closed");
            return None;
        }
        let gesture = self.normalizer.classify_wheel(raw_delta_y);
        let reason = if gesture.trackpad {
            CloseReason::Trackpad
        } else {
            CloseReason::Transition
        };
        self.request(gesture.direction, reason)
    }

    pub fn on_key_down(&mut self, key: KeyDirection) {
        if !self.gate.is_open() {
            tracing::trace!(?key, "key dropped, gate closed");
            return;
        }
        let direction = self.normalizer.classify_key(key);
        self.request(direction, CloseReason::Transition);
    }

    pub fn on_touch_start(&mut self, y: f64) {
        self.normalizer.touch_start(y);
    }

    pub fn on_touch_move(&mut self, y: f64) {
        if !self.gate.is_open() {
            return;
        }
        if let Some(direction) = self.normalizer.touch_move(y) {
            self.request(direction, CloseReason::Transition);
        }
    }

    /// Transition-completion signal from the renderer.
    pub fn on_transition_end(&mut self) {
        if self.gate.release_on_animation_end() {
            tracing::trace!("gate reopened after transition");
        }
    }

    /// Cool-down timer fired.
    pub fn on_cooldown_elapsed(&mut self, ticket: CooldownTicket) {
        if self.gate.release_on_timer(ticket) {
            tracing::trace!(generation = ticket.generation, "gate reopened after cool-down");
        }
    }

    /// Host-driven index update.  Bypasses the gate.
    pub fn set_controlled_index(&mut self, index: usize) {
        if self.controller.set_controlled_index(index).is_none() {
            tracing::trace!(
                index,
                last = ?self.controller.last_controlled(),
                current = self.controller.current(),
                "controlled index unchanged"
            );
        }
    }

    /// Ask for one step.  The gate only closes if the step was committed;
    /// pushing against either end leaves everything as it was.
    fn request(&mut self, direction: Direction, reason: CloseReason) -> Option<CooldownTicket> {
        self.controller.request_index_change(direction)?;
        self.gate.close(reason)
    }

    // ── render model ──────────────────────────────────────────

    pub fn container_style(&self) -> ContainerStyle {
        let offset = self.controller.current() as f64 * f64::from(self.height);
        ContainerStyle {
            translate_y: 0.0 - offset,
            transition: self.transition_speed,
        }
    }

    pub fn slide_frames(&self) -> Vec<SlideFrame<'_>> {
        let current = self.controller.current();
        self.slides
            .iter()
            .enumerate()
            .map(|(index, slide)| SlideFrame {
                index,
                slide,
                relation: match index.cmp(&current) {
                    std::cmp::Ordering::Less => SlideRelation::Top,
                    std::cmp::Ordering::Equal => SlideRelation::Current,
                    std::cmp::Ordering::Greater => SlideRelation::Bottom,
                },
                parallax: self.parallax,
                height: self.height,
                transition_speed: self.transition_speed,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Fixture {
        registry: ListenerRegistry,
        container: SlidesContainer,
        changes: Rc<RefCell<Vec<usize>>>,
    }

    fn mount(count: usize, controlled: Option<usize>) -> Fixture {
        let registry = ListenerRegistry::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let container = SlidesContainer::mount(
            SlidesProps {
                slides: vec![SlideConfig::default(); count],
                height: 24,
                controlled_index: controlled,
                on_change: Box::new(move |i| sink.borrow_mut().push(i)),
                ..SlidesProps::default()
            },
            &registry,
        );
        Fixture {
            registry,
            container,
            changes,
        }
    }

    #[test]
    fn walkthrough_wheel_then_key() {
        let mut f = mount(5, None);
        let c = &mut f.container;

        assert_eq!(c.on_wheel(-150.0), None);
        // Negative raw delta retreats; at index 0 that's an edge no-op.
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.gate_state(), GateState::Open);

        assert_eq!(c.on_wheel(150.0), None);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.gate_state(), GateState::Closed);

        // Anything while closed is dropped.
        c.on_wheel(40.0);
        c.on_key_down(KeyDirection::Down);
        assert_eq!(c.current_index(), 1);

        c.on_transition_end();
        assert_eq!(c.gate_state(), GateState::Open);
        c.on_key_down(KeyDirection::Up);
        assert_eq!(c.current_index(), 0);
        assert_eq!(*f.changes.borrow(), vec![1, 0]);
    }

    #[test]
    fn notch_wheel_reopens_only_on_transition_end() {
        let mut f = mount(5, None);
        let c = &mut f.container;
        assert_eq!(c.on_wheel(120.0), None);
        assert_eq!(c.gate_state(), GateState::Closed);
        c.on_wheel(120.0);
        assert_eq!(c.current_index(), 1);
        c.on_transition_end();
        assert_eq!(c.gate_state(), GateState::Open);
    }

    #[test]
    fn trackpad_wheel_reopens_only_after_cooldown() {
        let mut f = mount(5, None);
        let c = &mut f.container;
        let ticket = c.on_wheel(12.0).expect("trackpad starts a cool-down");
        assert_eq!(ticket.delay, Duration::from_millis(1500));
        assert_eq!(c.current_index(), 1);
        assert!(c.trackpad_hold());

        c.on_transition_end();
        assert_eq!(c.gate_state(), GateState::Closed);
        c.on_wheel(12.0);
        assert_eq!(c.current_index(), 1);

        c.on_cooldown_elapsed(ticket);
        assert_eq!(c.gate_state(), GateState::Open);
        assert!(!c.trackpad_hold());
        assert_eq!(*f.changes.borrow(), vec![1]);
    }

    #[test]
    fn wheel_at_edge_is_a_no_op() {
        let mut f = mount(3, None);
        let c = &mut f.container;
        assert_eq!(c.on_wheel(-10.0), None);
        assert_eq!(c.on_wheel(-150.0), None);
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.gate_state(), GateState::Open);
        assert!(f.changes.borrow().is_empty());
    }

    #[test]
    fn key_at_edges_leaves_gate_open() {
        let mut f = mount(2, Some(1));
        let c = &mut f.container;
        c.on_key_down(KeyDirection::Down);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.gate_state(), GateState::Open);
        assert!(f.changes.borrow().is_empty());
    }

    #[test]
    fn long_drag_triggers_twice() {
        let mut f = mount(5, None);
        let c = &mut f.container;
        c.on_touch_start(400.0);
        c.on_touch_move(365.0);
        assert_eq!(c.current_index(), 1);
        c.on_transition_end();
        c.on_touch_move(350.0);
        assert_eq!(c.current_index(), 1);
        c.on_touch_move(330.0);
        assert_eq!(c.current_index(), 2);
        assert_eq!(*f.changes.borrow(), vec![1, 2]);
    }

    #[test]
    fn touch_start_is_recorded_while_closed() {
        let mut f = mount(5, None);
        let c = &mut f.container;
        c.on_key_down(KeyDirection::Down);
        assert_eq!(c.gate_state(), GateState::Closed);
        c.on_touch_start(100.0);
        c.on_touch_move(20.0);
        assert_eq!(c.current_index(), 1);
        c.on_transition_end();
        // Anchor is still 100 from the start recorded while closed.
        c.on_touch_move(140.0);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn controlled_index_bypasses_closed_gate() {
        let mut f = mount(5, None);
        let c = &mut f.container;
        c.on_key_down(KeyDirection::Down);
        assert_eq!(c.gate_state(), GateState::Closed);

        c.set_controlled_index(4);
        assert_eq!(c.current_index(), 4);
        // Echoing the reported value back is absorbed.
        c.set_controlled_index(4);
        c.set_controlled_index(9);
        assert_eq!(*f.changes.borrow(), vec![1, 4]);
        assert_eq!(c.gate_state(), GateState::Closed);
    }

    #[test]
    fn render_model_tracks_index() {
        let mut f = mount(3, Some(1));
        let c = &mut f.container;
        let style = c.container_style();
        assert_eq!(style.translate_y, -24.0);
        assert_eq!(style.transform(), "translate3d(0px, -24px, 0px)");
        assert_eq!(style.transition_timing(), "all 2000ms ease");
        assert_eq!(style.height(), "100%");

        let frames = c.slide_frames();
        assert!(frames[0].is_top());
        assert!(frames[1].is_current());
        assert_eq!(frames[2].relation, SlideRelation::Bottom);

        c.set_controlled_index(0);
        assert_eq!(c.container_style().transform(), "translate3d(0px, 0px, 0px)");
    }

    #[test]
    fn mount_and_unmount_leave_no_listeners() {
        let f = mount(2, None);
        assert_eq!(f.registry.len(), ListenerKind::ALL.len());
        f.container.unmount();
        assert!(f.registry.is_empty());

        let f = mount(2, None);
        drop(f.container);
        assert!(f.registry.is_empty());
    }

    #[test]
    fn handle_routes_events() {
        let mut f = mount(4, None);
        let c = &mut f.container;
        assert!(c.handle(GestureEvent::Wheel { delta_y: 30.0 }).is_some());
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.handle(GestureEvent::Key(KeyDirection::Down)), None);
        assert_eq!(c.current_index(), 1);
    }
}
