//! Slide index controller: the single owner of the current slide index.
//!
//! Two sources move the index: gestures (one step at a time) and the host
//! (jumps to a "controlled" index).  The controller keeps the last index the
//! host asked for next to the current one, so a host that echoes our own
//! change notifications back does not cause a second change.

use super::gesture::Direction;

/// Change notification callback, called with the new index.
pub type OnChange = Box<dyn FnMut(usize)>;

pub struct SlideIndexController {
    current: usize,
    slide_count: usize,
    /// Last index the host itself requested (never set by gestures).
    last_controlled: Option<usize>,
    on_change: OnChange,
}

impl std::fmt::Debug for SlideIndexController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideIndexController")
            .field("current", &self.current)
            .field("slide_count", &self.slide_count)
            .field("last_controlled", &self.last_controlled)
            .finish_non_exhaustive()
    }
}

impl SlideIndexController {
    /// Start at `controlled` if it is a valid index, otherwise at 0.  No
    /// notification fires for the initial index.
    pub fn new(slide_count: usize, controlled: Option<usize>, on_change: OnChange) -> Self {
        let mut controller = Self {
            current: 0,
            slide_count,
            last_controlled: None,
            on_change,
        };
        if let Some(index) = controlled.filter(|&i| controller.is_valid(i)) {
            controller.current = index;
            controller.last_controlled = Some(index);
        }
        controller
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn last_controlled(&self) -> Option<usize> {
        self.last_controlled
    }

    pub fn is_valid(&self, index: usize) -> bool {
        index < self.slide_count
    }

    /// Step one slide in `direction`.  Returns the new index if the step was
    /// committed; stepping past either end is a no-op.
    pub fn request_index_change(&mut self, direction: Direction) -> Option<usize> {
        let candidate = self.current.checked_add_signed(direction.step())?;
        if !self.is_valid(candidate) {
            tracing::trace!(current = self.current, ?direction, "at deck edge, request ignored");
            return None;
        }
        self.commit(candidate);
        Some(candidate)
    }

    /// Apply a host-driven index.  Ignored when it repeats the host's last
    /// request or falls outside the deck.  Returns the new index if the
    /// current slide actually changed.
    pub fn set_controlled_index(&mut self, index: usize) -> Option<usize> {
        if self.last_controlled == Some(index) || !self.is_valid(index) {
            return None;
        }
        self.last_controlled = Some(index);
        if index == self.current {
            return None;
        }
        self.commit(index);
        Some(index)
    }

    fn commit(&mut self, index: usize) {
        tracing::debug!(from = self.current, to = index, "slide index changed");
        self.current = index;
        (self.on_change)(index);
    }
}
