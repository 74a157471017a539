//! Paged vs. continuous reading.
//!
//! Call sites never branch on the mode to move to a page. They ask the state
//! for its [`PageTransport`] (or call [`ViewerState::navigate_to`]) and the
//! transport either animates a page turn or scrolls the page into view.
//!
//! Continuous mode derives the current page from the scroll offset assuming
//! every page has the same height (`scroll_height / page_count`). With pages
//! of varying rendered height the derived index is an approximation.

use std::time::Instant;

use log::debug;

use super::gesture::SwipeIntent;
use super::state::{Interaction, PageTurn, ViewerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingMode {
    Paged,
    Continuous,
}

impl ReadingMode {
    pub fn toggled(self) -> Self {
        match self {
            ReadingMode::Paged => ReadingMode::Continuous,
            ReadingMode::Continuous => ReadingMode::Paged,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadingMode::Paged => "Paged",
            ReadingMode::Continuous => "Continuous",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Navigation {
    Animated(PageTurn),
    Scrolled { from: usize, to: usize },
}

impl Navigation {
    pub fn target(&self) -> usize {
        match self {
            Navigation::Animated(turn) => turn.to,
            Navigation::Scrolled { to, .. } => *to,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContinuousScroll {
    scroll_height: f32,
    viewport_height: f32,
    scroll_top: f32,
}

impl ContinuousScroll {
    pub fn new(scroll_height: f32, viewport_height: f32) -> Self {
        Self {
            scroll_height: scroll_height.max(0.0),
            viewport_height: viewport_height.max(0.0),
            scroll_top: 0.0,
        }
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn scroll_height(&self) -> f32 {
        self.scroll_height
    }

    pub fn max_scroll_top(&self) -> f32 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    pub fn per_page_height(&self, page_count: usize) -> Option<f32> {
        if page_count == 0 || self.scroll_height <= 0.0 {
            return None;
        }
        Some(self.scroll_height / page_count as f32)
    }

    pub fn page_at(&self, scroll_top: f32, page_count: usize) -> Option<usize> {
        let per_page = self.per_page_height(page_count)?;
        let raw = (scroll_top / per_page).round();
        if !raw.is_finite() || raw <= 0.0 {
            return Some(0);
        }
        Some((raw as usize).min(page_count - 1))
    }

    pub fn offset_for_page(&self, index: usize, page_count: usize) -> Option<f32> {
        let per_page = self.per_page_height(page_count)?;
        Some((per_page * index as f32).min(self.max_scroll_top()))
    }

    fn clamp_top(&self, scroll_top: f32) -> f32 {
        if scroll_top.is_finite() {
            scroll_top.clamp(0.0, self.max_scroll_top())
        } else {
            self.scroll_top
        }
    }
}

/// How a "go to page N" request reaches the screen in a given mode.
pub trait PageTransport {
    fn mode(&self) -> ReadingMode;

    fn navigate_to(
        &self,
        state: &mut ViewerState,
        index: usize,
        now: Instant,
    ) -> Option<Navigation>;
}

/// One page at a time with an animated, lock-guarded turn.
pub struct PagedTransport;

impl PageTransport for PagedTransport {
    fn mode(&self) -> ReadingMode {
        ReadingMode::Paged
    }

    fn navigate_to(
        &self,
        state: &mut ViewerState,
        index: usize,
        now: Instant,
    ) -> Option<Navigation> {
        state.go_to_page(index, now).map(Navigation::Animated)
    }
}

/// Scrolls the stacked page list; no animation lock.
pub struct ContinuousTransport;

impl PageTransport for ContinuousTransport {
    fn mode(&self) -> ReadingMode {
        ReadingMode::Continuous
    }

    fn navigate_to(
        &self,
        state: &mut ViewerState,
        index: usize,
        _now: Instant,
    ) -> Option<Navigation> {
        state.scroll_to_page(index)
    }
}

impl ViewerState {
    pub fn transport(&self) -> &'static dyn PageTransport {
        match self.mode {
            ReadingMode::Paged => &PagedTransport,
            ReadingMode::Continuous => &ContinuousTransport,
        }
    }

    pub fn navigate_to(&mut self, index: usize, now: Instant) -> Option<Navigation> {
        let transport = self.transport();
        transport.navigate_to(self, index, now)
    }

    /// One page forward or back through the active transport.
    pub fn step(&mut self, intent: SwipeIntent, now: Instant) -> Option<Navigation> {
        let target = match intent {
            SwipeIntent::Next => self.current_page.checked_add(1)?,
            SwipeIntent::Prev => self.current_page.checked_sub(1)?,
        };
        self.navigate_to(target, now)
    }

    /// Switches mode keeping the current page. A turn still in flight is
    /// committed first so the page the reader was heading to is kept.
    pub fn set_reading_mode(&mut self, mode: ReadingMode) -> bool {
        if mode == self.mode {
            return false;
        }

        self.commit_transition();
        if !matches!(self.interaction, Interaction::Idle) {
            self.interaction = Interaction::Idle;
        }

        self.mode = mode;
        if mode == ReadingMode::Continuous {
            self.align_scroll_to_current();
        }
        debug!(
            "Reading mode -> {} at page {}",
            mode.label(),
            self.current_page
        );
        true
    }

    pub fn toggle_reading_mode(&mut self) -> ReadingMode {
        self.set_reading_mode(self.mode.toggled());
        self.mode
    }

    /// Reports the stacked list geometry. A changed geometry keeps the
    /// current page in view.
    pub fn set_continuous_layout(&mut self, scroll_height: f32, viewport_height: f32) {
        let next = ContinuousScroll {
            scroll_top: self.scroll.scroll_top,
            ..ContinuousScroll::new(scroll_height, viewport_height)
        };
        if next.scroll_height == self.scroll.scroll_height
            && next.viewport_height == self.scroll.viewport_height
        {
            return;
        }
        self.scroll = next;
        if self.mode == ReadingMode::Continuous {
            self.align_scroll_to_current();
        } else {
            self.scroll.scroll_top = self.scroll.clamp_top(self.scroll.scroll_top);
        }
    }

    pub fn continuous_scroll(&self) -> &ContinuousScroll {
        &self.scroll
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll.scroll_top
    }

    /// Scroll position changed in continuous mode; returns true when the
    /// derived current page changed.
    pub fn on_scroll(&mut self, scroll_top: f32) -> bool {
        if self.mode != ReadingMode::Continuous {
            return false;
        }
        self.scroll.scroll_top = self.scroll.clamp_top(scroll_top);

        match self
            .scroll
            .page_at(self.scroll.scroll_top, self.page_count)
        {
            Some(page) if page != self.current_page => {
                self.current_page = page;
                true
            }
            _ => false,
        }
    }

    pub fn scroll_by(&mut self, delta: f32) -> bool {
        let top = self.scroll.scroll_top + delta;
        self.on_scroll(top)
    }

    pub fn scroll_to_page(&mut self, index: usize) -> Option<Navigation> {
        if index >= self.page_count {
            return None;
        }
        if let Some(offset) = self.scroll.offset_for_page(index, self.page_count) {
            self.scroll.scroll_top = offset;
        }

        let from = self.current_page;
        self.current_page = index;
        (from != index).then_some(Navigation::Scrolled { from, to: index })
    }

    fn align_scroll_to_current(&mut self) {
        if let Some(offset) = self
            .scroll
            .offset_for_page(self.current_page, self.page_count)
        {
            self.scroll.scroll_top = offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::state::ViewerConfig;
    use crate::viewer::timer::TimerKind;
    use std::time::Duration;

    fn settled(state: &mut ViewerState, now: Instant) {
        for (id, kind) in state.pop_due_timers(now) {
            if kind == TimerKind::Settle {
                state.settle(id);
            }
        }
    }

    #[test]
    fn switching_modes_keeps_page() {
        let start = Instant::now();
        let mut state = ViewerState::new(15, ViewerConfig::default()).unwrap();
        state.go_to_page(5, start);
        settled(&mut state, start + Duration::from_secs(1));

        assert_eq!(state.toggle_reading_mode(), ReadingMode::Continuous);
        assert_eq!(state.current_page(), 5);
        assert_eq!(state.toggle_reading_mode(), ReadingMode::Paged);
        assert_eq!(state.current_page(), 5);
    }

    #[test]
    fn switch_mid_turn_lands_on_target() {
        let start = Instant::now();
        let mut state = ViewerState::new(4, ViewerConfig::default()).unwrap();
        state.go_to_page(3, start);
        state.toggle_reading_mode();

        assert_eq!(state.current_page(), 3);
        assert!(!state.is_transitioning());
        assert_eq!(state.pending_timers(), 0);
    }

    #[test]
    fn scroll_derives_rounded_page() {
        let mut state = ViewerState::new(10, ViewerConfig::default()).unwrap();
        state.set_reading_mode(ReadingMode::Continuous);
        state.set_continuous_layout(10_000.0, 800.0);

        assert!(state.on_scroll(1_490.0));
        assert_eq!(state.current_page(), 1);
        assert!(state.on_scroll(1_510.0));
        assert_eq!(state.current_page(), 2);
        assert!(!state.is_transitioning());

        // Clamped to the scrollable range.
        state.on_scroll(1e9);
        assert_eq!(state.scroll_top(), 9_200.0);
        assert_eq!(state.current_page(), 9);
        state.on_scroll(-50.0);
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn scroll_is_ignored_in_paged_mode() {
        let mut state = ViewerState::new(10, ViewerConfig::default()).unwrap();
        state.set_continuous_layout(10_000.0, 800.0);
        assert!(!state.on_scroll(5_000.0));
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn transport_follows_mode() {
        let now = Instant::now();
        let mut state = ViewerState::new(6, ViewerConfig::default()).unwrap();
        assert_eq!(state.transport().mode(), ReadingMode::Paged);
        assert!(matches!(
            state.navigate_to(4, now),
            Some(Navigation::Animated(_))
        ));
        state.commit_transition();

        state.set_reading_mode(ReadingMode::Continuous);
        state.set_continuous_layout(600.0, 100.0);
        assert_eq!(state.transport().mode(), ReadingMode::Continuous);
        assert_eq!(
            state.navigate_to(1, now),
            Some(Navigation::Scrolled { from: 4, to: 1 })
        );
        assert_eq!(state.scroll_top(), 100.0);
        assert!(!state.is_transitioning());
        assert_eq!(state.navigate_to(6, now), None);
    }

    #[test]
    fn layout_change_keeps_current_page_in_view() {
        let mut state = ViewerState::new(4, ViewerConfig::default()).unwrap();
        state.set_reading_mode(ReadingMode::Continuous);
        state.scroll_to_page(2);
        state.set_continuous_layout(400.0, 100.0);
        assert_eq!(state.scroll_top(), 200.0);

        state.set_continuous_layout(800.0, 100.0);
        assert_eq!(state.scroll_top(), 400.0);
        assert_eq!(state.current_page(), 2);
    }

    #[test]
    fn unknown_layout_still_tracks_index() {
        let scroll = ContinuousScroll::default();
        assert_eq!(scroll.page_at(500.0, 3), None);
        assert_eq!(scroll.offset_for_page(2, 3), None);
    }
}
