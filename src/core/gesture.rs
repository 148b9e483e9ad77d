//! Gesture normalisation: turns raw wheel, drag and key input into a
//! single advance/retreat signal.
//!
//! The normaliser is stateless apart from the touch anchor.  It never looks
//! at the transition gate itself; the container asks it to classify only
//! while the gate is open, so a closed gate drops events before they get
//! here.

use std::time::Duration;

// ───────────────────────────────────────── events ────────────

/// Which way a gesture pushes the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the next slide (index + 1).
    Advance,
    /// Towards the previous slide (index − 1).
    Retreat,
}

impl Direction {
    /// Signed index step.
    pub fn step(self) -> isize {
        match self {
            Direction::Advance => 1,
            Direction::Retreat => -1,
        }
    }
}

/// The two vertical arrow keys, the only keys the deck itself reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Up,
    Down,
}

/// A raw physical input event, already stripped of terminal specifics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Vertical wheel delta; positive means "scroll down".
    Wheel { delta_y: f64 },
    /// Finger (or drag button) goes down at vertical coordinate `y`.
    TouchStart { y: f64 },
    /// Finger (or drag button) moved to vertical coordinate `y`.
    TouchMove { y: f64 },
    Key(KeyDirection),
}

// ───────────────────────────────────────── tuning ────────────

/// Thresholds that separate real gestures from hardware noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTuning {
    /// Wheel deltas with a smaller magnitude come from a continuous surface
    /// (trackpad) rather than a notched wheel.
    pub trackpad_threshold: f64,
    /// How long a trackpad burst keeps the gate shut.
    pub trackpad_cooldown: Duration,
    /// Minimum drag distance before a touch move counts.
    pub touch_dead_zone: f64,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            trackpad_threshold: 100.0,
            trackpad_cooldown: Duration::from_millis(1500),
            touch_dead_zone: 30.0,
        }
    }
}

/// Result of classifying a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelGesture {
    pub direction: Direction,
    /// Small-delta burst: release the gate on a timer, not on animation end.
    pub trackpad: bool,
}

// ───────────────────────────────────────── normaliser ────────

#[derive(Debug, Clone)]
pub struct GestureNormalizer {
    tuning: GestureTuning,
    touch_start: Option<f64>,
}

impl GestureNormalizer {
    pub fn new(tuning: GestureTuning) -> Self {
        Self {
            tuning,
            touch_start: None,
        }
    }

    /// Classify a wheel delta.  The logical delta is the negated raw delta,
    /// so scrolling down (positive raw delta) advances.
    pub fn classify_wheel(&self, raw_delta_y: f64) -> WheelGesture {
        let logical = -raw_delta_y;
        WheelGesture {
            direction: if logical < 0.0 {
                Direction::Advance
            } else {
                Direction::Retreat
            },
            trackpad: raw_delta_y.abs() < self.tuning.trackpad_threshold,
        }
    }

    pub fn classify_key(&self, key: KeyDirection) -> Direction {
        match key {
            KeyDirection::Down => Direction::Advance,
            KeyDirection::Up => Direction::Retreat,
        }
    }

    /// Remember where a drag began.  Recorded whatever the gate state is.
    pub fn touch_start(&mut self, y: f64) {
        self.touch_start = Some(y);
    }

    /// Classify a drag sample.  Returns a direction once the drag has left
    /// the dead zone, and re-anchors at `y` so the same drag can fire again
    /// after travelling another dead-zone's worth.
    pub fn touch_move(&mut self, y: f64) -> Option<Direction> {
        // A move without a preceding start anchors at the first sample.
        let start = *self.touch_start.get_or_insert(y);
        let delta = y - start;
        if delta.abs() < self.tuning.touch_dead_zone {
            return None;
        }
        self.touch_start = Some(y);
        Some(if delta < 0.0 {
            Direction::Advance
        } else {
            Direction::Retreat
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> GestureNormalizer {
        GestureNormalizer::new(GestureTuning::default())
    }

    #[test]
    fn wheel_down_advances_and_up_retreats() {
        let n = normalizer();
        assert_eq!(n.classify_wheel(150.0).direction, Direction::Advance);
        assert_eq!(n.classify_wheel(-150.0).direction, Direction::Retreat);
    }

    #[test]
    fn small_wheel_deltas_are_trackpad() {
        let n = normalizer();
        assert!(n.classify_wheel(40.0).trackpad);
        assert!(n.classify_wheel(-99.9).trackpad);
        assert!(!n.classify_wheel(100.0).trackpad);
        assert!(!n.classify_wheel(-150.0).trackpad);
    }

    #[test]
    fn arrow_keys_map_to_directions() {
        let n = normalizer();
        assert_eq!(n.classify_key(KeyDirection::Down), Direction::Advance);
        assert_eq!(n.classify_key(KeyDirection::Up), Direction::Retreat);
    }

    #[test]
    fn touch_jitter_inside_dead_zone_is_ignored() {
        let mut n = normalizer();
        n.touch_start(200.0);
        assert_eq!(n.touch_move(190.0), None);
        assert_eq!(n.touch_move(229.0), None);
    }

    #[test]
    fn continuous_drag_fires_once_per_dead_zone() {
        let mut n = normalizer();
        n.touch_start(300.0);
        assert_eq!(n.touch_move(280.0), None);
        assert_eq!(n.touch_move(270.0), Some(Direction::Advance));
        // Re-anchored at 270: another 30 units upward is needed.
        assert_eq!(n.touch_move(250.0), None);
        assert_eq!(n.touch_move(240.0), Some(Direction::Advance));
        // Dragging back down retreats.
        assert_eq!(n.touch_move(275.0), Some(Direction::Retreat));
    }

    #[test]
    fn custom_tuning_is_honoured() {
        let mut n = GestureNormalizer::new(GestureTuning {
            touch_dead_zone: 5.0,
            trackpad_threshold: 10.0,
            ..GestureTuning::default()
        });
        n.touch_start(0.0);
        assert_eq!(n.touch_move(6.0), Some(Direction::Retreat));
        assert!(!n.classify_wheel(40.0).trackpad);
    }
}
