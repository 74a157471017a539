use crate::document::Document;
use crate::event_source::EventSource;
use crate::export_worker::{ExportJob, SnapshotExporter};
use crate::inputs::{CELL_HEIGHT_PX, CELL_WIDTH_PX, map_key, map_mouse};
use crate::notification::{NotificationLevel, NotificationManager};
use crate::settings;
use crate::theme::{current_theme, cycle_theme};
use crate::viewer::{
    Direction as TurnDirection, HostError, InputResponse, ListenerId, ListenerKind, ListenerSet,
    Panel, Panels, ReadingMode, Viewer, ViewerAction, ViewerConfig, ViewerHost, ViewerKey,
    ViewerState,
};
use crate::widget::help_popup::{HelpPopup, HelpPopupAction};
use crate::widget::page_panels::PagePanel;
use crate::widget::page_view::render_page;
use anyhow::{Context, Result};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Narrowest terminal that can switch to the chrome-less layout.
pub const MIN_FULLSCREEN_WIDTH: u16 = 40;

const SCROLL_ROWS: f32 = 3.0;
const EXPORT_BUTTON: &str = "e: Export";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// [`ViewerHost`] for a terminal. Fullscreen is the chrome-less layout and
/// needs a wide enough terminal; flags go to the settings file unless the
/// host was created in memory.
pub struct TerminalHost {
    width: u16,
    fullscreen: bool,
    flags: BTreeSet<String>,
    persist: bool,
    listeners: ListenerSet,
}

impl TerminalHost {
    pub fn from_settings(width: u16) -> Self {
        Self {
            width,
            fullscreen: false,
            flags: BTreeSet::new(),
            persist: true,
            listeners: ListenerSet::new(),
        }
    }

    pub fn in_memory(width: u16) -> Self {
        Self {
            persist: false,
            ..Self::from_settings(width)
        }
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.is_listening(kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Records a new terminal width. Returns true when the terminal became
    /// too narrow and fullscreen was left.
    pub fn set_width(&mut self, width: u16) -> bool {
        self.width = width;
        if self.fullscreen && width < MIN_FULLSCREEN_WIDTH {
            self.fullscreen = false;
            return true;
        }
        false
    }
}

impl ViewerHost for TerminalHost {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        if self.width < MIN_FULLSCREEN_WIDTH {
            return Err(HostError::FullscreenRejected(format!(
                "terminal is {} columns wide, need {}",
                self.width, MIN_FULLSCREEN_WIDTH
            )));
        }
        self.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        self.fullscreen = false;
        Ok(())
    }

    fn read_flag(&self, key: &str) -> bool {
        self.flags.contains(key) || (self.persist && settings::has_flag(key))
    }

    fn write_flag(&mut self, key: &str) -> Result<(), HostError> {
        self.flags.insert(key.to_string());
        if self.persist {
            settings::set_flag(key).map_err(|e| HostError::Storage {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.add(kind)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

pub struct App {
    document: Arc<Document>,
    viewer: Viewer<TerminalHost>,
    notifications: NotificationManager,
    toc_panel: PagePanel,
    thumbnail_panel: PagePanel,
    help_popup: Option<HelpPopup>,
    export_job: Option<ExportJob>,
    export_dir: PathBuf,
    footer_area: Rect,
    dot_columns: Vec<(u16, usize)>,
    export_button_area: Rect,
}

impl App {
    pub fn new(
        document: Document,
        config: ViewerConfig,
        host: TerminalHost,
        export_dir: PathBuf,
        now: Instant,
    ) -> Result<Self> {
        let viewer = Viewer::mount(document.len(), config, host, now)
            .context("Failed to mount viewer")?;
        let toc_panel = PagePanel::table_of_contents(&document);
        let thumbnail_panel = PagePanel::thumbnails(&document);
        info!(
            "Opened '{}' ({} pages, {} contents entries)",
            document.title(),
            document.len(),
            toc_panel.len()
        );

        Ok(Self {
            document: Arc::new(document),
            viewer,
            notifications: NotificationManager::new(),
            toc_panel,
            thumbnail_panel,
            help_popup: None,
            export_job: None,
            export_dir,
            footer_area: Rect::default(),
            dot_columns: Vec::new(),
            export_button_area: Rect::default(),
        })
    }

    pub fn viewer(&self) -> &Viewer<TerminalHost> {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer<TerminalHost> {
        &mut self.viewer
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn current_page(&self) -> usize {
        self.viewer.current_page()
    }

    pub fn is_help_open(&self) -> bool {
        self.help_popup.is_some()
    }

    pub fn is_export_running(&self) -> bool {
        self.export_job.is_some()
    }

    /// Releases the viewer's listeners and timers before the app goes away.
    /// Unmounts the viewer and lets a running export finish writing.
    pub fn close(&mut self) {
        self.viewer.unmount();
        if let Some(job) = self.export_job.take() {
            match job.wait() {
                Ok(path) => info!("Export finished on close: {}", path.display()),
                Err(e) => warn!("Export failed on close: {e}"),
            }
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if let Some(help) = self.help_popup.as_mut() {
            if let Some(HelpPopupAction::Close) = help.handle_key(key) {
                self.help_popup = None;
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(AppAction::Quit);
        }

        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('?') => {
                self.help_popup = Some(HelpPopup::new());
                return None;
            }
            KeyCode::Char('e') => {
                self.start_export();
                return None;
            }
            KeyCode::Char('p') => {
                let name = cycle_theme();
                self.notifications.info(format!("Theme: {name}"));
                return None;
            }
            _ => {}
        }

        if let Some(panel) = self.active_panel() {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.panel_mut(panel).next();
                    return None;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.panel_mut(panel).previous();
                    return None;
                }
                KeyCode::Enter => {
                    if let Some(page) = self.panel_mut(panel).selected_page() {
                        let response = self.viewer.select_panel_entry(panel, page, now);
                        self.apply_response(response);
                    }
                    return None;
                }
                _ => {}
            }
        }

        if self.viewer.state().reading_mode() == ReadingMode::Continuous {
            let rows = match key.code {
                KeyCode::Down | KeyCode::Char('j') => Some(SCROLL_ROWS),
                KeyCode::Up | KeyCode::Char('k') => Some(-SCROLL_ROWS),
                KeyCode::PageDown => Some(self.page_rows()),
                KeyCode::PageUp => Some(-self.page_rows()),
                _ => None,
            };
            if let Some(rows) = rows {
                let response = self.viewer.scroll_by(rows * CELL_HEIGHT_PX);
                self.apply_response(response);
                return None;
            }
        }

        if !self.viewer.host().is_listening(ListenerKind::Keyboard) {
            return None;
        }
        if let Some(viewer_key) = map_key(&key) {
            let response = self.viewer.handle_key(viewer_key, now);
            self.apply_response(response);
        }
        None
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent, now: Instant) {
        if let Some(help) = &self.help_popup {
            if matches!(mouse.kind, MouseEventKind::Down(_))
                && help.is_outside_popup_area(mouse.column, mouse.row)
            {
                self.help_popup = None;
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let down = mouse.kind == MouseEventKind::ScrollDown;
                self.handle_wheel(down, mouse.modifiers, now);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.handle_click(mouse.column, mouse.row, now) {
                    return;
                }
                self.forward_gesture(&mouse, now);
            }
            _ => self.forward_gesture(&mouse, now),
        }
    }

    fn forward_gesture(&mut self, mouse: &MouseEvent, now: Instant) {
        if let Some(gesture) = map_mouse(mouse) {
            let response = self.viewer.handle_gesture(gesture, now);
            self.apply_response(response);
        }
    }

    fn handle_wheel(&mut self, down: bool, modifiers: KeyModifiers, now: Instant) {
        let response = if modifiers.contains(KeyModifiers::CONTROL) {
            let key = if down { '-' } else { '+' };
            self.viewer.handle_key(ViewerKey::Char(key), now)
        } else if self.viewer.state().reading_mode() == ReadingMode::Continuous {
            let rows = if down { SCROLL_ROWS } else { -SCROLL_ROWS };
            self.viewer.scroll_by(rows * CELL_HEIGHT_PX)
        } else if !self.viewer.state().zoom().is_default() {
            let step = CELL_HEIGHT_PX * SCROLL_ROWS;
            let dy = if down { -step } else { step };
            let state = self.viewer.state_mut();
            let viewport = state.viewport();
            if !state.zoom_mut().pan_by(0.0, dy, viewport) {
                return;
            }
            InputResponse {
                action: Some(ViewerAction::Redraw),
                handled: true,
            }
        } else {
            return;
        };
        self.apply_response(response);
    }

    /// Footer dots, the export button and panel rows. Returns true when the
    /// click landed on one of them.
    fn handle_click(&mut self, x: u16, y: u16, now: Instant) -> bool {
        if y == self.footer_area.y + 1 && self.footer_area.height > 0 {
            if let Some(&(_, page)) = self.dot_columns.iter().find(|(col, _)| *col == x) {
                let response = self.viewer.navigate_to(page, now);
                self.apply_response(response);
                return true;
            }
            if x >= self.export_button_area.x
                && x < self.export_button_area.x + self.export_button_area.width
            {
                self.start_export();
                return true;
            }
        }

        let panels = self.viewer.panels();
        for panel in [Panel::TableOfContents, Panel::Thumbnails] {
            if !panels.is_open(panel) || !self.panel_mut(panel).contains(x, y) {
                continue;
            }
            if let Some(page) = self.panel_mut(panel).handle_mouse_click(x, y) {
                let response = self.viewer.select_panel_entry(panel, page, now);
                self.apply_response(response);
            }
            return true;
        }
        false
    }

    pub fn handle_resize(&mut self, width: u16) {
        let left_fullscreen = self.viewer.host_mut().set_width(width);
        if left_fullscreen && self.viewer.host().is_listening(ListenerKind::FullscreenChange) {
            debug!("Terminal narrowed to {width} columns, leaving fullscreen");
            let response = self.viewer.on_fullscreen_change(false);
            self.apply_response(response);
        }
    }

    /// Fires due timers and collects background results. Returns true when
    /// the screen needs a redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut needs_redraw = self.viewer.state().is_transitioning();

        let response = self.viewer.tick(now);
        needs_redraw |= response.handled;
        self.apply_response(response);

        needs_redraw |= self.notifications.update_at(now);

        let finished = self.export_job.as_ref().and_then(ExportJob::poll);
        if let Some(result) = finished {
            self.export_job = None;
            let level = if result.is_ok() {
                NotificationLevel::Info
            } else {
                NotificationLevel::Error
            };
            if let Some(ViewerAction::Notice(message)) = self.viewer.finish_export(&result).action
            {
                self.notifications.show_at(message, level, now);
            }
            needs_redraw = true;
        }

        needs_redraw
    }

    fn start_export(&mut self) {
        let document_id = self.document.id().to_string();
        if !self.viewer.begin_export(&document_id) {
            self.notifications.info("Export already running");
            return;
        }
        info!("Exporting {document_id} to {}", self.export_dir.display());
        self.export_job = Some(ExportJob::spawn(
            Box::new(SnapshotExporter::new(Arc::clone(&self.document))),
            document_id,
            self.export_dir.clone(),
        ));
    }

    fn apply_response(&mut self, response: InputResponse) {
        match response.action {
            Some(ViewerAction::Navigated(navigation)) => {
                debug!("Navigated: {navigation:?}");
                self.sync_panels(navigation.target());
            }
            Some(ViewerAction::Notice(message)) => {
                warn!("{message}");
                self.notifications.warning(message);
            }
            Some(ViewerAction::Redraw) | None => {}
        }

        // Closed panels follow the reader so they open on the shown page.
        let panels = self.viewer.panels();
        let shown = self.viewer.state().displayed_target();
        for panel in [Panel::TableOfContents, Panel::Thumbnails] {
            if !panels.is_open(panel) {
                self.panel_mut(panel).sync_to_page(shown);
            }
        }
    }

    fn sync_panels(&mut self, page: usize) {
        self.toc_panel.sync_to_page(page);
        self.thumbnail_panel.sync_to_page(page);
    }

    /// Panel that receives list keys: the table of contents wins when both
    /// are open.
    fn active_panel(&self) -> Option<Panel> {
        let panels = self.viewer.panels();
        [Panel::TableOfContents, Panel::Thumbnails]
            .into_iter()
            .find(|panel| panels.is_open(*panel))
    }

    fn panel_mut(&mut self, panel: Panel) -> &mut PagePanel {
        match panel {
            Panel::TableOfContents => &mut self.toc_panel,
            Panel::Thumbnails => &mut self.thumbnail_panel,
        }
    }

    fn page_rows(&self) -> f32 {
        let (_, height) = self.viewer.state().viewport();
        (height / CELL_HEIGHT_PX).max(1.0)
    }

    pub fn draw(&mut self, f: &mut Frame, now: Instant) {
        let palette = current_theme();

        let background_block = Block::default().style(Style::default().bg(palette.base_00));
        f.render_widget(background_block, f.area());

        let body = if self.viewer.is_fullscreen() {
            self.footer_area = Rect::default();
            self.dot_columns.clear();
            f.area()
        } else {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(3),
                ])
                .split(f.area());
            self.render_header(f, chunks[0]);
            self.render_footer(f, chunks[2]);
            self.footer_area = chunks[2];
            chunks[1]
        };

        let panels = self.viewer.panels();
        let page_area = self.split_for_panels(body, panels);
        self.render_page_area(f, page_area.page, now);

        let shown = self.viewer.state().displayed_target();
        if let Some(area) = page_area.toc {
            self.toc_panel.render(f, area, shown);
        }
        if let Some(area) = page_area.thumbnails {
            self.thumbnail_panel.render(f, area, shown);
        }

        if self.viewer.is_hint_visible() {
            render_swipe_hint(f, page_area.page);
        }

        if let Some(help) = self.help_popup.as_mut() {
            let dim_block = Block::default().style(
                Style::default()
                    .bg(Color::Rgb(10, 10, 10))
                    .add_modifier(Modifier::DIM),
            );
            f.render_widget(dim_block, f.area());
            help.render(f, f.area());
        }
    }

    fn split_for_panels(&self, body: Rect, panels: Panels) -> PageLayout {
        let mut layout = PageLayout {
            page: body,
            toc: None,
            thumbnails: None,
        };
        if panels.table_of_contents {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Min(0)])
                .split(layout.page);
            layout.toc = Some(chunks[0]);
            layout.page = chunks[1];
        }
        if panels.thumbnails {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Percentage(30)])
                .split(layout.page);
            layout.page = chunks[0];
            layout.thumbnails = Some(chunks[1]);
        }
        layout
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let palette = current_theme();
        let state = self.viewer.state();
        let shown = state.displayed_target();
        let kind = self
            .document
            .page(shown)
            .map(|page| page.kind.label())
            .unwrap_or_default();

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.document.title()),
                Style::default()
                    .fg(palette.base_0a)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("· {kind} · {}/{} ", shown + 1, self.document.len()),
                Style::default().fg(palette.base_04),
            ),
            Span::styled(
                format!("· {} · {}% ", state.reading_mode().label(), state.zoom_level()),
                Style::default().fg(palette.base_03),
            ),
        ];
        if state.is_transitioning() {
            let arrow = match state.direction() {
                TurnDirection::Next => "→",
                TurnDirection::Prev => "←",
            };
            spans.push(Span::styled(arrow, Style::default().fg(palette.base_0b)));
        }

        f.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.base_01)),
            area,
        );
    }

    fn render_footer(&mut self, f: &mut Frame, area: Rect) {
        let palette = current_theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_03))
            .style(Style::default().bg(palette.base_00));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let export_label = if self.viewer.export_button().is_in_flight() {
            format!("[{}]", self.viewer.export_button().label())
        } else {
            format!("[{EXPORT_BUTTON}]")
        };
        let right = format!("{export_label} [?: Help]");
        let export_width = export_label.chars().count() as u16;
        let right_width = right.chars().count() as u16;
        self.export_button_area = Rect {
            x: (inner.x + inner.width).saturating_sub(right_width),
            y: inner.y,
            width: export_width.min(inner.width),
            height: inner.height.min(1),
        };

        self.dot_columns.clear();
        let left = if let Some(notification) = self.notifications.current() {
            let (label, color) = match notification.level {
                NotificationLevel::Info => ("INFO", palette.base_0b),
                NotificationLevel::Warning => ("WARNING", palette.base_0a),
                NotificationLevel::Error => ("ERROR", palette.base_08),
            };
            Line::from(vec![
                Span::styled(format!("[{label}] "), Style::default().fg(color)),
                Span::styled(
                    notification.message.clone(),
                    Style::default().fg(palette.base_05),
                ),
            ])
        } else {
            self.page_dots(inner, right_width)
        };

        f.render_widget(Paragraph::new(left), inner);
        f.render_widget(
            Paragraph::new(Span::styled(right, Style::default().fg(palette.base_03)))
                .alignment(Alignment::Right),
            inner,
        );
    }

    /// One dot per page when they fit, otherwise a page counter.
    fn page_dots(&mut self, inner: Rect, reserved: u16) -> Line<'static> {
        let palette = current_theme();
        let count = self.document.len();
        let shown = self.viewer.state().displayed_target();
        let available = inner.width.saturating_sub(reserved + 1) as usize;

        if count * 2 > available {
            return Line::from(Span::styled(
                format!("‹ {} / {} ›", shown + 1, count),
                Style::default().fg(palette.base_04),
            ));
        }

        let mut spans = Vec::with_capacity(count);
        for page in 0..count {
            let column = inner.x + (page * 2) as u16;
            self.dot_columns.push((column, page));
            let (symbol, color) = if page == shown {
                ("● ", palette.base_0d)
            } else {
                ("○ ", palette.base_03)
            };
            spans.push(Span::styled(symbol, Style::default().fg(color)));
        }
        Line::from(spans)
    }

    fn render_page_area(&mut self, f: &mut Frame, area: Rect, now: Instant) {
        let palette = current_theme();
        let fullscreen = self.viewer.is_fullscreen();
        let block = if fullscreen {
            Block::default()
        } else {
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.base_02))
        };
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rows = inner.height.max(1);
        let page_px = f32::from(rows) * CELL_HEIGHT_PX;
        let page_count = self.document.len();
        let state = self.viewer.state_mut();
        state.set_viewport(f32::from(inner.width) * CELL_WIDTH_PX, page_px);
        state.set_continuous_layout(page_count as f32 * page_px, page_px);

        match self.viewer.state().reading_mode() {
            ReadingMode::Paged => self.render_paged(f, inner, now),
            ReadingMode::Continuous => self.render_continuous(f, inner, rows),
        }
    }

    fn render_paged(&self, f: &mut Frame, area: Rect, now: Instant) {
        let state = self.viewer.state();
        let Some(page) = self.document.page(state.displayed_target()) else {
            return;
        };

        // Slide the incoming page in from the side it comes from.
        let mut area = area;
        if let Some(progress) = state.transition_progress(now) {
            let shift = ((1.0 - progress) * f32::from(area.width) * 0.25) as u16;
            match state.direction() {
                TurnDirection::Next => {
                    area.x += shift;
                    area.width -= shift;
                }
                TurnDirection::Prev => area.width -= shift,
            }
        }

        let mut paragraph = Paragraph::new(render_page(page));
        match zoom_offsets(state) {
            None => paragraph = paragraph.wrap(Wrap { trim: false }),
            Some(offsets) => paragraph = paragraph.scroll(offsets),
        }
        f.render_widget(paragraph, area);
    }

    /// Pages stacked at one viewport each; the scroll position picks the
    /// rows shown.
    fn render_continuous(&self, f: &mut Frame, area: Rect, rows: u16) {
        let palette = current_theme();
        let body_rows = usize::from(rows.saturating_sub(1));
        let mut lines: Vec<Line> = Vec::with_capacity(self.document.len() * usize::from(rows));

        for (index, page) in self.document.pages().iter().enumerate() {
            let mut page_lines = render_page(page).lines;
            page_lines.truncate(body_rows);
            let padding = body_rows - page_lines.len();
            lines.extend(page_lines);
            lines.extend(std::iter::repeat_n(Line::default(), padding));
            lines.push(Line::from(Span::styled(
                format!("── {} / {} ──", index + 1, self.document.len()),
                Style::default().fg(palette.base_03),
            )));
        }

        // Rows follow the scroll position; zoom only crops columns here.
        let state = self.viewer.state();
        let offset = (state.scroll_top() / CELL_HEIGHT_PX).round() as u16;
        let offset_x = zoom_offsets(state).map_or(0, |(_, x)| x);
        f.render_widget(Paragraph::new(lines).scroll((offset, offset_x)), area);
    }
}

/// `(rows, columns)` to skip so a zoomed page shows its panned centre.
/// `None` at the default zoom.
fn zoom_offsets(state: &ViewerState) -> Option<(u16, u16)> {
    let zoom = state.zoom();
    if zoom.is_default() {
        return None;
    }
    let (width, height) = state.viewport();
    let (pan_x, pan_y) = zoom.pan();
    let spare = zoom.factor() - 1.0;
    let offset_x = ((width * spare / 2.0 - pan_x) / CELL_WIDTH_PX).max(0.0) as u16;
    let offset_y = ((height * spare / 2.0 - pan_y) / CELL_HEIGHT_PX).max(0.0) as u16;
    Some((offset_y, offset_x))
}

struct PageLayout {
    page: Rect,
    toc: Option<Rect>,
    thumbnails: Option<Rect>,
}

fn render_swipe_hint(f: &mut Frame, area: Rect) {
    let palette = current_theme();
    let text = "← Drag left or right to turn the page →";
    let width = (text.chars().count() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let hint_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: (area.y + area.height).saturating_sub(height + 1).max(area.y),
        width,
        height,
    };

    f.render_widget(Clear, hint_area);
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.base_07).bg(palette.base_02))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_0c)),
            ),
        hint_area,
    );
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()> {
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let mut first_render = true;
    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;
            let now = Instant::now();

            match event {
                Event::Mouse(mouse_event) => match mouse_event.kind {
                    MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => {}
                    _ => app.handle_mouse_event(mouse_event, now),
                },
                Event::Key(key) => {
                    if app.handle_key_event(key, now) == Some(AppAction::Quit) {
                        should_quit = true;
                    }
                }
                Event::Resize(cols, _rows) => app.handle_resize(cols),
                _ => {}
            }

            if should_quit {
                break;
            }
        }

        let mut needs_redraw = events_processed > 0;

        if first_render {
            needs_redraw = true;
            first_render = false;
        }

        if last_tick.elapsed() >= tick_rate {
            needs_redraw |= app.tick(Instant::now());
            last_tick = Instant::now();
        }

        if needs_redraw {
            let draw_start = Instant::now();
            terminal.draw(|f| app.draw(f, Instant::now()))?;
            let draw_duration = draw_start.elapsed();
            if draw_duration.as_millis() > 10 {
                debug!("Terminal draw/flush took {}ms", draw_duration.as_millis());
            }
        }

        if should_quit {
            app.close();
            return Ok(());
        }

        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app(pages: usize, width: u16, now: Instant) -> App {
        create_test_app(pages, width, &std::env::temp_dir(), now)
    }

    #[test]
    fn narrow_terminal_rejects_fullscreen() {
        let now = Instant::now();
        let mut app = app(3, 30, now);
        app.handle_key_event(key(KeyCode::Char('f')), now);
        assert!(!app.viewer().is_fullscreen());
        let notice = app.notifications().current().unwrap();
        assert_eq!(notice.level, NotificationLevel::Warning);
        assert!(notice.message.contains("30 columns"));
    }

    #[test]
    fn narrowing_leaves_fullscreen() {
        let now = Instant::now();
        let mut app = app(3, 80, now);
        app.handle_key_event(key(KeyCode::Char('f')), now);
        assert!(app.viewer().is_fullscreen());

        app.handle_resize(20);
        assert!(!app.viewer().is_fullscreen());
    }

    #[test]
    fn enter_in_panel_jumps_and_closes_it() {
        let now = Instant::now();
        let mut app = app(5, 80, now);
        app.handle_key_event(key(KeyCode::Char('t')), now);
        assert!(app.viewer().panels().thumbnails);

        app.handle_key_event(key(KeyCode::Down), now);
        app.handle_key_event(key(KeyCode::Down), now);
        app.handle_key_event(key(KeyCode::Enter), now);
        assert!(!app.viewer().panels().thumbnails);
        assert_eq!(app.viewer().state().displayed_target(), 2);
    }

    #[test]
    fn keys_stop_after_close() {
        let now = Instant::now();
        let mut app = app(3, 80, now);
        app.close();
        assert_eq!(app.viewer().host().listener_count(), 0);

        app.handle_key_event(key(KeyCode::Right), now);
        assert!(!app.viewer().state().is_transitioning());
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('q')), now),
            Some(AppAction::Quit)
        );
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let now = Instant::now();
        let mut app = app(3, 80, now);
        app.handle_key_event(key(KeyCode::Char('?')), now);
        assert!(app.is_help_open());

        assert_eq!(app.handle_key_event(key(KeyCode::Char('q')), now), None);
        assert!(!app.is_help_open());
    }
}
