//! Global input-listener registry.
//!
//! The terminal delivers every input event to the whole application, so
//! whoever wants wheel, key or drag input registers a listener here and the
//! dispatcher only forwards event kinds that somebody listens for.
//! Registration hands back a [`ListenerGuard`]; dropping (or releasing) the
//! guard removes exactly the listeners it added.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Input channels a component can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Wheel,
    KeyDown,
    TouchStart,
    TouchMove,
}

impl ListenerKind {
    pub const ALL: &[ListenerKind] = &[
        ListenerKind::Wheel,
        ListenerKind::KeyDown,
        ListenerKind::TouchStart,
        ListenerKind::TouchMove,
    ];
}

type ListenerId = u64;

#[derive(Debug, Default)]
struct Registry {
    next_id: ListenerId,
    listeners: BTreeMap<ListenerId, ListenerKind>,
}

/// Shared, single-threaded listener table.  Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one listener per kind and return the guard that owns them.
    pub fn register(&self, kinds: &[ListenerKind]) -> ListenerGuard {
        let mut reg = self.inner.borrow_mut();
        let ids = kinds
            .iter()
            .map(|&kind| {
                let id = reg.next_id;
                reg.next_id += 1;
                reg.listeners.insert(id, kind);
                id
            })
            .collect();
        ListenerGuard {
            registry: Rc::clone(&self.inner),
            ids,
        }
    }

    /// Is anyone listening for `kind`?
    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.inner.borrow().listeners.values().any(|&k| k == kind)
    }

    /// Number of live listeners across all kinds.
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owns a set of registered listeners for as long as it lives.
#[derive(Debug)]
pub struct ListenerGuard {
    registry: Rc<RefCell<Registry>>,
    ids: Vec<ListenerId>,
}

impl ListenerGuard {
    /// Unregister everything this guard added.  Safe to call twice.
    pub fn release(&mut self) {
        if !self.is_active() {
            return;
        }
        let mut reg = self.registry.borrow_mut();
        for id in self.ids.drain(..) {
            reg.listeners.remove(&id);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.ids.is_empty()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}
