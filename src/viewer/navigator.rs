//! Page navigation in paged mode.
//!
//! A page change is two-phase: `go_to_page` starts an animated turn and
//! schedules a settle timer, the timer commits the new index. While a turn is
//! in flight every other request is dropped, never queued.

use std::time::Instant;

use log::debug;

use super::state::{Direction, Interaction, PageTurn, ViewerState};
use super::timer::{TimerId, TimerKind};

impl ViewerState {
    pub fn go_to_page(&mut self, target: usize, now: Instant) -> Option<PageTurn> {
        if target >= self.page_count {
            debug!(
                "go_to_page({target}) ignored: outside 0..{}",
                self.page_count
            );
            return None;
        }
        if self.is_transitioning() {
            debug!("go_to_page({target}) dropped: transition in flight");
            return None;
        }
        if target == self.current_page {
            return None;
        }

        let from = self.current_page;
        let direction = if target > from {
            Direction::Next
        } else {
            Direction::Prev
        };
        let timer = self.schedule(TimerKind::Settle, now, self.config.settle_delay);

        self.direction = direction;
        self.interaction = Interaction::Transitioning {
            from,
            target,
            direction,
            started: now,
            timer,
        };
        debug!("Page turn {from} -> {target} ({direction:?})");

        Some(PageTurn {
            from,
            to: target,
            direction,
        })
    }

    pub fn next(&mut self, now: Instant) -> Option<PageTurn> {
        self.go_to_page(self.current_page + 1, now)
    }

    pub fn prev(&mut self, now: Instant) -> Option<PageTurn> {
        let target = self.current_page.checked_sub(1)?;
        self.go_to_page(target, now)
    }

    /// Applies a fired settle timer. Timers that no longer belong to the
    /// in-flight turn are ignored.
    pub(crate) fn settle(&mut self, fired: TimerId) -> Option<usize> {
        match self.interaction {
            Interaction::Transitioning { target, timer, .. } if timer == fired => {
                self.current_page = target;
                self.interaction = Interaction::Idle;
                self.zoom.clear_pan();
                debug!("Settled on page {target}");
                Some(target)
            }
            _ => None,
        }
    }

    /// Finishes an in-flight turn right away, as if its timer had fired.
    pub fn commit_transition(&mut self) -> Option<usize> {
        let Interaction::Transitioning { timer, .. } = self.interaction else {
            return None;
        };
        self.cancel_timer(timer);
        self.settle(timer)
    }

    /// Fraction of the settle delay elapsed for the in-flight turn.
    pub fn transition_progress(&self, now: Instant) -> Option<f32> {
        let Interaction::Transitioning { started, .. } = self.interaction else {
            return None;
        };
        let total = self.config.settle_delay.as_secs_f32();
        if total <= f32::EPSILON {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(started).as_secs_f32();
        Some((elapsed / total).clamp(0.0, 1.0))
    }

    /// Target of the in-flight turn, or the current page when idle.
    pub fn displayed_target(&self) -> usize {
        match self.interaction {
            Interaction::Transitioning { target, .. } => target,
            _ => self.current_page,
        }
    }
}
