use std::time::{Duration, Instant};

use thiserror::Error;

use super::gesture::{Point, PointerSource};
use super::reading_mode::{ContinuousScroll, ReadingMode};
use super::timer::{TimerId, TimerKind, TimerQueue};
use super::zoom::{ZoomController, ZoomPolicy};

pub const DEFAULT_MIN_SWIPE_DISTANCE: f32 = 50.0;
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_HINT_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("cannot view a document without pages")]
    EmptyDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Prev,
}

/// A page change that was started by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurn {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

/// What the viewer is doing right now. Exactly one of these holds at a time,
/// so a flip can never be in flight while a pinch or drag is tracked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Transitioning {
        from: usize,
        target: usize,
        direction: Direction,
        started: Instant,
        timer: TimerId,
    },
    Dragging {
        anchor: Point,
        last: Point,
        source: PointerSource,
    },
    Pinching {
        initial_distance: f32,
        base_zoom: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    pub zoom: ZoomPolicy,
    pub min_swipe_distance: f32,
    pub settle_delay: Duration,
    pub hint_duration: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomPolicy::default(),
            min_swipe_distance: DEFAULT_MIN_SWIPE_DISTANCE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            hint_duration: DEFAULT_HINT_DURATION,
        }
    }
}

/// Everything the viewer owns about the current view. Navigation, gesture
/// and reading-mode behavior live in `navigator.rs`, `gesture.rs` and
/// `reading_mode.rs` as further `impl ViewerState` blocks.
#[derive(Debug)]
pub struct ViewerState {
    pub(super) page_count: usize,
    pub(super) current_page: usize,
    pub(super) direction: Direction,
    pub(super) interaction: Interaction,
    pub(super) zoom: ZoomController,
    pub(super) mode: ReadingMode,
    pub(super) scroll: ContinuousScroll,
    pub(super) viewport: (f32, f32),
    pub(super) timers: TimerQueue,
    pub(super) config: ViewerConfig,
}

impl ViewerState {
    pub fn new(page_count: usize, config: ViewerConfig) -> Result<Self, ViewerError> {
        if page_count == 0 {
            return Err(ViewerError::EmptyDocument);
        }

        Ok(Self {
            page_count,
            current_page: 0,
            direction: Direction::Next,
            interaction: Interaction::Idle,
            zoom: ZoomController::new(config.zoom),
            mode: ReadingMode::Paged,
            scroll: ContinuousScroll::default(),
            viewport: (0.0, 0.0),
            timers: TimerQueue::new(),
            config,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.interaction, Interaction::Transitioning { .. })
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomController {
        &mut self.zoom
    }

    pub fn zoom_level(&self) -> u16 {
        self.zoom.level()
    }

    pub fn reading_mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Size of the page viewport in px, used to bound panning.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub(crate) fn schedule(&mut self, kind: TimerKind, now: Instant, delay: Duration) -> TimerId {
        self.timers.schedule(kind, now, delay)
    }

    pub(crate) fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub(crate) fn pop_due_timers(&mut self, now: Instant) -> Vec<(TimerId, TimerKind)> {
        self.timers.pop_due(now)
    }

    pub(crate) fn cancel_all_timers(&mut self) -> usize {
        self.timers.cancel_all()
    }
}
