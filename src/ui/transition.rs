//! Time-based transition of a single value with CSS `ease` timing.
//!
//! The slide stack and every backdrop own one of these.  Retargeting starts
//! a new transition from wherever the value currently is; finishing one
//! produces exactly one completion report from [`Timeline::tick`], which is
//! the transition-end signal the slide container waits for.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Active {
    start: Instant,
    from: f64,
    duration: Duration,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    value: f64,
    target: f64,
    active: Option<Active>,
    /// Completion not yet reported by `tick`.
    pending_end: bool,
}

impl Timeline {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            target: value,
            active: None,
            pending_end: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some() || self.pending_end
    }

    /// Move towards `target` over `duration`.  Setting the same target again
    /// is not a transition and never reports completion.
    pub fn set_target(&mut self, target: f64, duration: Duration, now: Instant) {
        if target == self.target {
            return;
        }
        self.target = target;
        if duration.is_zero() {
            self.value = target;
            self.active = None;
            self.pending_end = true;
            return;
        }
        self.active = Some(Active {
            start: now,
            from: self.value,
            duration,
        });
    }

    /// Snap to `target` without animating (used on resize).  A transition
    /// cut short this way still reports its completion.
    pub fn jump(&mut self, target: f64) {
        if self.active.take().is_some() {
            self.pending_end = true;
        }
        self.value = target;
        self.target = target;
    }

    /// Advance to `now`.  Returns `true` once per finished transition.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(active) = self.active else {
            return std::mem::take(&mut self.pending_end);
        };
        let elapsed = now.saturating_duration_since(active.start);
        if elapsed >= active.duration {
            self.value = self.target;
            self.active = None;
            self.pending_end = false;
            return true;
        }
        let t = elapsed.as_secs_f64() / active.duration.as_secs_f64();
        self.value = active.from + (self.target - active.from) * css_ease(t);
        false
    }
}

// ───────────────────────────────────────── easing ────────────

/// CSS `ease`, i.e. `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
pub fn css_ease(t: f64) -> f64 {
    cubic_bezier(0.25, 0.1, 0.25, 1.0, t)
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let bez = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    };
    let bez_dx = |s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * x1 + 6.0 * inv * s * (x2 - x1) + 3.0 * s * s * (1.0 - x2)
    };

    // Newton first, bisection if the slope flattens out.
    let mut s = t;
    for _ in 0..8 {
        let err = bez(x1, x2, s) - t;
        if err.abs() < 1e-7 {
            return bez(y1, y2, s);
        }
        let d = bez_dx(s);
        if d.abs() < 1e-6 {
            break;
        }
        s = (s - err / d).clamp(0.0, 1.0);
    }
    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..40 {
        let x = bez(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bez(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_is_monotonic_with_fixed_ends() {
        assert_eq!(css_ease(0.0), 0.0);
        assert_eq!(css_ease(1.0), 1.0);
        let mut prev = 0.0;
        for i in 1..=20u32 {
            let v = css_ease(f64::from(i) / 20.0);
            assert!(v >= prev, "not monotonic at step {i}");
            prev = v;
        }
        // `ease` front-loads motion: well past half-way at t = 0.5.
        assert!(css_ease(0.5) > 0.7);
    }

    #[test]
    fn completes_once() {
        let start = Instant::now();
        let mut tl = Timeline::new(0.0);
        tl.set_target(-24.0, Duration::from_millis(100), start);
        assert!(tl.is_animating());

        assert!(!tl.tick(start + Duration::from_millis(50)));
        assert!(tl.value() < 0.0 && tl.value() > -24.0);

        assert!(tl.tick(start + Duration::from_millis(100)));
        assert_eq!(tl.value(), -24.0);
        assert!(!tl.tick(start + Duration::from_millis(150)));
        assert!(!tl.is_animating());
    }

    #[test]
    fn same_target_is_not_a_transition() {
        let now = Instant::now();
        let mut tl = Timeline::new(5.0);
        tl.set_target(5.0, Duration::from_millis(100), now);
        assert!(!tl.is_animating());
        assert!(!tl.tick(now + Duration::from_secs(1)));
    }

    #[test]
    fn retarget_mid_flight_reports_single_end() {
        let start = Instant::now();
        let mut tl = Timeline::new(0.0);
        tl.set_target(10.0, Duration::from_millis(100), start);
        tl.tick(start + Duration::from_millis(50));
        let mid = tl.value();
        tl.set_target(20.0, Duration::from_millis(100), start + Duration::from_millis(50));
        assert!(!tl.tick(start + Duration::from_millis(51)));
        assert!(tl.value() >= mid);
        assert!(tl.tick(start + Duration::from_millis(150)));
        assert_eq!(tl.value(), 20.0);
    }

    #[test]
    fn zero_duration_still_reports_end() {
        let now = Instant::now();
        let mut tl = Timeline::new(0.0);
        tl.set_target(3.0, Duration::ZERO, now);
        assert_eq!(tl.value(), 3.0);
        assert!(tl.tick(now));
        assert!(!tl.tick(now));
    }

    #[test]
    fn jump_cuts_transition_short_but_reports_it() {
        let now = Instant::now();
        let mut tl = Timeline::new(0.0);
        tl.set_target(10.0, Duration::from_millis(100), now);
        tl.jump(30.0);
        assert_eq!(tl.value(), 30.0);
        assert!(tl.tick(now));

        let mut idle = Timeline::new(0.0);
        idle.jump(12.0);
        assert!(!idle.tick(now));
    }
}
