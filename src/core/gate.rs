//! Transition gate: at most one slide change per gesture burst.
//!
//! The gate closes whenever an index change is accepted and has two
//! independent release paths: the end of the slide transition animation,
//! and a cool-down timer started by trackpad bursts.  While a trackpad
//! hold is active the animation-end release is ignored.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Open,
    Closed,
}

/// Why the gate is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// An index change was committed; reopen when its animation ends.
    Transition,
    /// A trackpad burst; reopen only when the cool-down elapses.
    Trackpad,
}

/// Handle for one scheduled cool-down.  Only the most recently issued
/// ticket can reopen the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownTicket {
    pub generation: u64,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct TransitionGate {
    state: GateState,
    /// Set by a trackpad close; suppresses the animation-end release.
    trackpad_hold: bool,
    /// Bumped on every trackpad close so stale timers are ignored.
    generation: u64,
    cooldown: Duration,
}

impl TransitionGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: GateState::Open,
            trackpad_hold: false,
            generation: 0,
            cooldown,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }

    pub fn trackpad_hold(&self) -> bool {
        self.trackpad_hold
    }

    /// Close the gate.  A trackpad close (re)starts the cool-down and hands
    /// back the ticket the caller must schedule.
    pub fn close(&mut self, reason: CloseReason) -> Option<CooldownTicket> {
        self.state = GateState::Closed;
        match reason {
            CloseReason::Transition => {
                tracing::trace!(hold = self.trackpad_hold, "gate closed for transition");
                None
            }
            CloseReason::Trackpad => {
                self.trackpad_hold = true;
                self.generation = self.generation.wrapping_add(1);
                tracing::trace!(generation = self.generation, "gate closed for trackpad cool-down");
                Some(CooldownTicket {
                    generation: self.generation,
                    delay: self.cooldown,
                })
            }
        }
    }

    /// Release path for the transition-completion signal.  Returns `true`
    /// if the gate is open afterwards.
    pub fn release_on_animation_end(&mut self) -> bool {
        if self.trackpad_hold {
            tracing::trace!("animation end ignored during trackpad cool-down");
            return false;
        }
        self.state = GateState::Open;
        true
    }

    /// Release path for the cool-down timer.  Stale tickets are no-ops.
    pub fn release_on_timer(&mut self, ticket: CooldownTicket) -> bool {
        if ticket.generation != self.generation || !self.trackpad_hold {
            tracing::trace!(
                ticket = ticket.generation,
                latest = self.generation,
                "stale cool-down ignored"
            );
            return false;
        }
        self.trackpad_hold = false;
        self.state = GateState::Open;
        true
    }
}
