//! Hover popup state for highlighted blocks.
//!
//! The review UI shows an approve/reject popup while the pointer is over a
//! highlighted block and keeps it up for a short grace period after the
//! pointer leaves, so it can travel from the block into the popup. Time is
//! passed in by the caller; nothing here spawns timers.

use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverState {
    Idle,
    Hovering { target: String },
    PendingHide { target: String, deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct HoverTracker {
    state: HoverState,
    hide_delay: Duration,
}

impl HoverTracker {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            state: HoverState::Idle,
            hide_delay,
        }
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    /// Pointer entered the block (or its popup) identified by `target`
    pub fn enter(&mut self, target: impl Into<String>) {
        let target = target.into();
        trace!(%target, "hover enter");
        self.state = HoverState::Hovering { target };
    }

    /// Pointer left; the popup stays until `now + hide_delay`
    pub fn leave(&mut self, now: Instant) {
        if let HoverState::Hovering { target } = &self.state {
            self.state = HoverState::PendingHide {
                target: target.clone(),
                deadline: now + self.hide_delay,
            };
        }
    }

    /// Advance the clock. Returns true when the popup was hidden by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.state {
            HoverState::PendingHide { deadline, .. } if now >= *deadline => {
                trace!("hover popup hidden");
                self.state = HoverState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drop any popup at once, e.g. after approve or reject
    pub fn reset(&mut self) {
        self.state = HoverState::Idle;
    }

    /// Block whose popup should currently be shown
    pub fn visible_target(&self) -> Option<&str> {
        match &self.state {
            HoverState::Idle => None,
            HoverState::Hovering { target } | HoverState::PendingHide { target, .. } => {
                Some(target)
            }
        }
    }
}
