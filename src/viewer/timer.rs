//! Owned, cancellable one-shot timers.
//!
//! The engine never sleeps: callers pass the current [`Instant`] in and the
//! queue hands back whatever came due. Every scheduled timer gets a
//! [`TimerId`] carrying a slot generation, so an id that was cancelled or
//! already fired can never match a newer timer reusing the same slot.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Page flip animation finished; commit the target page.
    Settle,
    /// Swipe hint shown long enough.
    HintDismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    slot: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u64,
    pending: Option<(TimerKind, Instant)>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    slots: Vec<Slot>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: TimerKind, now: Instant, delay: Duration) -> TimerId {
        let deadline = now + delay;

        if let Some(slot) = self.slots.iter().position(|s| s.pending.is_none()) {
            let entry = &mut self.slots[slot];
            entry.generation += 1;
            entry.pending = Some((kind, deadline));
            return TimerId {
                slot,
                generation: entry.generation,
            };
        }

        self.slots.push(Slot {
            generation: 1,
            pending: Some((kind, deadline)),
        });
        TimerId {
            slot: self.slots.len() - 1,
            generation: 1,
        }
    }

    /// Returns true when the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.slots.get_mut(id.slot) {
            Some(slot) if slot.generation == id.generation && slot.pending.is_some() => {
                slot.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for slot in &mut self.slots {
            if slot.pending.take().is_some() {
                cancelled += 1;
            }
        }
        cancelled
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots
            .get(id.slot)
            .is_some_and(|slot| slot.generation == id.generation && slot.pending.is_some())
    }

    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.pending.is_some()).count()
    }

    /// Removes and returns every timer whose deadline is at or before `now`,
    /// earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<(TimerId, TimerKind)> {
        let mut due: Vec<(Instant, TimerId, TimerKind)> = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some((kind, deadline)) = slot.pending {
                if deadline <= now {
                    slot.pending = None;
                    due.push((
                        deadline,
                        TimerId {
                            slot: index,
                            generation: slot.generation,
                        },
                        kind,
                    ));
                }
            }
        }

        due.sort_by_key(|(deadline, _, _)| *deadline);
        due.into_iter().map(|(_, id, kind)| (id, kind)).collect()
    }

    /// Earliest pending deadline, used to bound event poll timeouts.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .iter()
            .filter_map(|s| s.pending.map(|(_, deadline)| deadline))
            .min()
    }
}
