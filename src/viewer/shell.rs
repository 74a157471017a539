use std::time::Instant;

use log::{debug, info, warn};

use super::export::{ExportButton, ExportError};
use super::gesture::{GestureEvent, GestureOutcome};
use super::host::{ListenerId, ListenerKind, SWIPE_HINT_KEY, ViewerHost};
use super::reading_mode::{Navigation, ReadingMode};
use super::state::{ViewerConfig, ViewerError, ViewerState};
use super::timer::{TimerId, TimerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Left,
    Right,
    Home,
    End,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    TableOfContents,
    Thumbnails,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panels {
    pub table_of_contents: bool,
    pub thumbnails: bool,
}

impl Panels {
    pub fn is_open(&self, panel: Panel) -> bool {
        match panel {
            Panel::TableOfContents => self.table_of_contents,
            Panel::Thumbnails => self.thumbnails,
        }
    }

    pub fn any_open(&self) -> bool {
        self.table_of_contents || self.thumbnails
    }

    fn set(&mut self, panel: Panel, open: bool) {
        match panel {
            Panel::TableOfContents => self.table_of_contents = open,
            Panel::Thumbnails => self.thumbnails = open,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    Redraw,
    Navigated(Navigation),
    /// Non-fatal message for the reader.
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputResponse {
    pub action: Option<ViewerAction>,
    pub handled: bool,
}

impl InputResponse {
    fn handled(action: Option<ViewerAction>) -> Self {
        Self {
            action,
            handled: true,
        }
    }

    fn redraw() -> Self {
        Self::handled(Some(ViewerAction::Redraw))
    }

    fn unhandled() -> Self {
        Self {
            action: None,
            handled: false,
        }
    }

    fn navigation(navigation: Option<Navigation>) -> Self {
        Self::handled(navigation.map(ViewerAction::Navigated))
    }
}

#[derive(Debug, Default)]
struct SwipeHint {
    visible: bool,
    timer: Option<TimerId>,
}

/// A mounted magazine viewer. Owns the view state, its timers and the
/// listeners it registered with the host; all of them are released on
/// [`Viewer::unmount`] or drop.
pub struct Viewer<H: ViewerHost> {
    state: ViewerState,
    host: H,
    panels: Panels,
    fullscreen: bool,
    hint: SwipeHint,
    export: ExportButton,
    listeners: Vec<ListenerId>,
    mounted: bool,
}

impl<H: ViewerHost> Viewer<H> {
    pub fn mount(
        page_count: usize,
        config: ViewerConfig,
        mut host: H,
        now: Instant,
    ) -> Result<Self, ViewerError> {
        let state = ViewerState::new(page_count, config)?;
        let listeners = vec![
            host.add_listener(ListenerKind::Keyboard),
            host.add_listener(ListenerKind::FullscreenChange),
        ];

        let mut viewer = Self {
            state,
            host,
            panels: Panels::default(),
            fullscreen: false,
            hint: SwipeHint::default(),
            export: ExportButton::default(),
            listeners,
            mounted: true,
        };
        viewer.show_hint_once(now);
        info!("Viewer mounted with {page_count} pages");
        Ok(viewer)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    pub fn panels(&self) -> Panels {
        self.panels
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_hint_visible(&self) -> bool {
        self.hint.visible
    }

    pub fn export_button(&self) -> &ExportButton {
        &self.export
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn handle_key(&mut self, key: ViewerKey, now: Instant) -> InputResponse {
        if !self.mounted {
            return InputResponse::unhandled();
        }

        match key {
            ViewerKey::Left | ViewerKey::Right | ViewerKey::Home | ViewerKey::End
                if !self.state.zoom().is_default() =>
            {
                debug!("Key navigation suppressed at zoom {}%", self.state.zoom_level());
                InputResponse::handled(None)
            }
            ViewerKey::Left => {
                let target = self.state.current_page().checked_sub(1);
                InputResponse::navigation(target.and_then(|t| self.state.navigate_to(t, now)))
            }
            ViewerKey::Right => {
                let target = self.state.current_page() + 1;
                InputResponse::navigation(self.state.navigate_to(target, now))
            }
            ViewerKey::Home => InputResponse::navigation(self.state.navigate_to(0, now)),
            ViewerKey::End => {
                let last = self.state.page_count() - 1;
                InputResponse::navigation(self.state.navigate_to(last, now))
            }
            ViewerKey::Escape => self.escape(),
            ViewerKey::Char('f' | 'F') => self.toggle_fullscreen(),
            ViewerKey::Char('t' | 'T') => self.toggle_panel(Panel::Thumbnails),
            ViewerKey::Char('i' | 'I') => self.toggle_panel(Panel::TableOfContents),
            ViewerKey::Char('c' | 'C') => {
                self.state.toggle_reading_mode();
                InputResponse::redraw()
            }
            ViewerKey::Char('+' | '=') => self.zoom_response(|s| s.zoom_mut().zoom_in()),
            ViewerKey::Char('-') => self.zoom_response(|s| s.zoom_mut().zoom_out()),
            ViewerKey::Char('0') => self.zoom_response(|s| s.zoom_mut().reset()),
            ViewerKey::Char(_) => InputResponse::unhandled(),
        }
    }

    /// Cancels the most specific thing first: zoom, then fullscreen, then panels.
    pub fn escape(&mut self) -> InputResponse {
        if !self.state.zoom().is_default() {
            self.state.zoom_mut().reset();
            return InputResponse::redraw();
        }

        if self.fullscreen {
            return match self.host.exit_fullscreen() {
                Ok(()) => {
                    self.fullscreen = false;
                    InputResponse::redraw()
                }
                Err(e) => {
                    warn!("Exit fullscreen failed: {e}");
                    InputResponse::handled(Some(ViewerAction::Notice(e.to_string())))
                }
            };
        }

        if self.panels.any_open() {
            self.panels = Panels::default();
            return InputResponse::redraw();
        }

        InputResponse::unhandled()
    }

    pub fn handle_gesture(&mut self, event: GestureEvent, now: Instant) -> InputResponse {
        if !self.mounted {
            return InputResponse::unhandled();
        }

        match self.state.handle_gesture(event, now) {
            GestureOutcome::Navigated(navigation) => {
                self.dismiss_hint();
                InputResponse::handled(Some(ViewerAction::Navigated(navigation)))
            }
            GestureOutcome::Zoomed(_) | GestureOutcome::Panned => InputResponse::redraw(),
            GestureOutcome::Suppressed(_) | GestureOutcome::Tap => InputResponse::handled(None),
            GestureOutcome::None => InputResponse::unhandled(),
        }
    }

    pub fn toggle_fullscreen(&mut self) -> InputResponse {
        let result = if self.fullscreen {
            self.host.exit_fullscreen()
        } else {
            self.host.request_fullscreen()
        };

        match result {
            Ok(()) => {
                self.fullscreen = !self.fullscreen;
                debug!("Fullscreen -> {}", self.fullscreen);
                InputResponse::redraw()
            }
            Err(e) => {
                warn!("Fullscreen toggle failed: {e}");
                InputResponse::handled(Some(ViewerAction::Notice(e.to_string())))
            }
        }
    }

    /// The host left (or entered) fullscreen on its own. The viewer follows.
    pub fn on_fullscreen_change(&mut self, is_fullscreen: bool) -> InputResponse {
        if !self.mounted || self.fullscreen == is_fullscreen {
            return InputResponse::unhandled();
        }
        self.fullscreen = is_fullscreen;
        InputResponse::redraw()
    }

    pub fn toggle_panel(&mut self, panel: Panel) -> InputResponse {
        let open = !self.panels.is_open(panel);
        self.panels.set(panel, open);
        InputResponse::redraw()
    }

    /// Jumps to the chosen entry through the active transport and closes the
    /// panel it came from.
    pub fn select_panel_entry(&mut self, panel: Panel, index: usize, now: Instant) -> InputResponse {
        if !self.mounted {
            return InputResponse::unhandled();
        }
        let navigation = self.state.navigate_to(index, now);
        self.panels.set(panel, false);
        InputResponse::handled(Some(
            navigation.map_or(ViewerAction::Redraw, ViewerAction::Navigated),
        ))
    }

    /// Footer dots and other direct jumps.
    pub fn navigate_to(&mut self, index: usize, now: Instant) -> InputResponse {
        if !self.mounted {
            return InputResponse::unhandled();
        }
        InputResponse::navigation(self.state.navigate_to(index, now))
    }

    pub fn on_scroll(&mut self, scroll_top: f32) -> InputResponse {
        if !self.mounted || self.state.reading_mode() != ReadingMode::Continuous {
            return InputResponse::unhandled();
        }
        self.state.on_scroll(scroll_top);
        InputResponse::redraw()
    }

    pub fn scroll_by(&mut self, delta: f32) -> InputResponse {
        let top = self.state.scroll_top() + delta;
        self.on_scroll(top)
    }

    /// Fires due timers. Returns a redraw when anything visible changed.
    pub fn tick(&mut self, now: Instant) -> InputResponse {
        if !self.mounted {
            return InputResponse::unhandled();
        }

        let mut changed = false;
        for (id, kind) in self.state.pop_due_timers(now) {
            match kind {
                TimerKind::Settle => changed |= self.state.settle(id).is_some(),
                TimerKind::HintDismiss if self.hint.timer == Some(id) => {
                    self.hint = SwipeHint::default();
                    changed = true;
                }
                TimerKind::HintDismiss => {}
            }
        }

        if changed {
            InputResponse::redraw()
        } else {
            InputResponse::unhandled()
        }
    }

    pub fn begin_export(&mut self, document_id: &str) -> bool {
        self.mounted && self.export.begin(document_id)
    }

    pub fn finish_export<T>(&mut self, result: &Result<T, ExportError>) -> InputResponse {
        let message = self.export.finish(result);
        InputResponse::handled(Some(ViewerAction::Notice(message)))
    }

    /// Removes every listener and cancels every pending timer. Safe to call
    /// more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        for id in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }
        let cancelled = self.state.cancel_all_timers();
        self.hint = SwipeHint::default();
        info!("Viewer unmounted, cancelled {cancelled} pending timers");
    }

    fn show_hint_once(&mut self, now: Instant) {
        if self.host.read_flag(SWIPE_HINT_KEY) {
            return;
        }
        let delay = self.state.config().hint_duration;
        self.hint = SwipeHint {
            visible: true,
            timer: Some(self.state.schedule(TimerKind::HintDismiss, now, delay)),
        };
        if let Err(e) = self.host.write_flag(SWIPE_HINT_KEY) {
            warn!("Swipe hint will show again next time: {e}");
        }
    }

    fn dismiss_hint(&mut self) {
        if let Some(timer) = self.hint.timer.take() {
            self.state.cancel_timer(timer);
        }
        self.hint.visible = false;
    }

    fn zoom_response(&mut self, f: impl FnOnce(&mut ViewerState) -> bool) -> InputResponse {
        if f(&mut self.state) {
            InputResponse::redraw()
        } else {
            InputResponse::handled(None)
        }
    }
}

impl<H: ViewerHost> Drop for Viewer<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeHost;
    use std::time::Duration;

    fn mount(pages: usize, now: Instant) -> Viewer<FakeHost> {
        Viewer::mount(pages, ViewerConfig::default(), FakeHost::default(), now).unwrap()
    }

    #[test]
    fn escape_resets_zoom_before_closing_panels() {
        let now = Instant::now();
        let mut viewer = mount(3, now);
        viewer.handle_key(ViewerKey::Char('t'), now);
        viewer.state_mut().zoom_mut().set_from_pinch(1.5, 100);

        viewer.handle_key(ViewerKey::Escape, now);
        assert_eq!(viewer.state().zoom_level(), 100);
        assert!(viewer.panels().thumbnails);

        viewer.handle_key(ViewerKey::Escape, now);
        assert!(!viewer.panels().thumbnails);
        assert!(!viewer.handle_key(ViewerKey::Escape, now).handled);
    }

    #[test]
    fn escape_leaves_fullscreen_before_panels() {
        let now = Instant::now();
        let mut viewer = mount(3, now);
        viewer.handle_key(ViewerKey::Char('i'), now);
        viewer.handle_key(ViewerKey::Char('F'), now);
        assert!(viewer.is_fullscreen());

        viewer.handle_key(ViewerKey::Escape, now);
        assert!(!viewer.is_fullscreen());
        assert!(viewer.panels().table_of_contents);
    }

    #[test]
    fn home_and_end_are_suppressed_while_zoomed() {
        let now = Instant::now();
        let mut viewer = mount(5, now);
        viewer.state_mut().zoom_mut().set_from_pinch(1.5, 100);
        viewer
            .state_mut()
            .zoom_mut()
            .pan_by(100.0, 50.0, (800.0, 600.0));

        let response = viewer.handle_key(ViewerKey::End, now);
        assert!(response.handled);
        assert!(response.action.is_none());
        assert!(viewer.handle_key(ViewerKey::Home, now).action.is_none());
        assert!(!viewer.state().is_transitioning());
        assert_eq!(viewer.state().zoom().pan(), (100.0, 50.0));
    }

    #[test]
    fn rejected_fullscreen_is_a_notice() {
        let now = Instant::now();
        let host = FakeHost {
            reject_fullscreen: true,
            ..FakeHost::default()
        };
        let mut viewer = Viewer::mount(3, ViewerConfig::default(), host, now).unwrap();

        let response = viewer.handle_key(ViewerKey::Char('f'), now);
        assert!(matches!(response.action, Some(ViewerAction::Notice(_))));
        assert!(!viewer.is_fullscreen());
    }

    #[test]
    fn external_fullscreen_exit_is_followed() {
        let now = Instant::now();
        let mut viewer = mount(3, now);
        viewer.toggle_fullscreen();
        assert!(viewer.on_fullscreen_change(false).handled);
        assert!(!viewer.is_fullscreen());
    }

    #[test]
    fn arrows_do_nothing_while_zoomed() {
        let now = Instant::now();
        let mut viewer = mount(3, now);
        viewer.handle_key(ViewerKey::Char('+'), now);
        viewer.handle_key(ViewerKey::Right, now);
        assert!(!viewer.state().is_transitioning());

        viewer.handle_key(ViewerKey::Char('0'), now);
        let response = viewer.handle_key(ViewerKey::Right, now);
        assert!(matches!(
            response.action,
            Some(ViewerAction::Navigated(Navigation::Animated(_)))
        ));
    }

    #[test]
    fn hint_shows_once_and_times_out() {
        let now = Instant::now();
        let mut viewer = mount(3, now);
        assert!(viewer.is_hint_visible());
        assert!(viewer.host().flags.contains(SWIPE_HINT_KEY));

        viewer.tick(now + Duration::from_millis(3_999));
        assert!(viewer.is_hint_visible());
        viewer.tick(now + Duration::from_secs(4));
        assert!(!viewer.is_hint_visible());

        let host = FakeHost {
            flags: viewer.host().flags.clone(),
            ..FakeHost::default()
        };
        let second = Viewer::mount(3, ViewerConfig::default(), host, now).unwrap();
        assert!(!second.is_hint_visible());
    }

    #[test]
    fn unmount_releases_listeners_and_timers() {
        let now = Instant::now();
        let mut viewer = mount(3, now);
        assert_eq!(viewer.host().listeners.len(), 2);
        viewer.handle_key(ViewerKey::Right, now);
        assert_eq!(viewer.state().pending_timers(), 2);

        viewer.unmount();
        assert!(viewer.host().listeners.is_empty());
        assert_eq!(viewer.state().pending_timers(), 0);

        // A late tick must not commit the abandoned turn.
        assert!(!viewer.tick(now + Duration::from_secs(10)).handled);
        assert_eq!(viewer.current_page(), 0);
        assert!(!viewer.on_fullscreen_change(true).handled);
    }
}
