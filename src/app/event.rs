//! Terminal and timer event plumbing.
//!
//! Everything the main loop reacts to arrives on one unbounded channel.
//! Terminal input comes from a background reader; timers and the container
//! post their own events.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::core::gate::CooldownTicket;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal height in rows.  Slides always span the full width.
    Resize(u16),
    Tick,
    /// A trackpad cool-down scheduled by container `mount` has elapsed.
    CooldownElapsed { mount: u64, ticket: CooldownTicket },
    /// Container `mount` committed a new slide index.
    SlideChanged { mount: u64, index: usize },
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Spawns a blocking task that polls the terminal for events and forwards
/// them through `tx`.  A `Tick` is sent whenever nothing arrives within
/// `tick_rate`, which drives animation frames.
pub fn spawn_event_reader(tick_rate: Duration, tx: EventSender) {
    tokio::task::spawn_blocking(move || loop {
        let has_event = event::poll(tick_rate).unwrap_or(false);
        let app_event = if has_event {
            match event::read() {
                Ok(CtEvent::Key(k)) => AppEvent::Key(k),
                Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                Ok(CtEvent::Resize(_, rows)) => AppEvent::Resize(rows),
                _ => continue,
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });
}

/// Fire-and-forget timer for a trackpad cool-down.  If the application has
/// shut down by the time it fires, the send fails and nothing happens.
pub fn schedule_cooldown(tx: &EventSender, mount: u64, ticket: CooldownTicket) {
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(ticket.delay).await;
        let _ = tx.send(AppEvent::CooldownElapsed { mount, ticket });
    });
}
