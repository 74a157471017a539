use crate::theme::current_theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};

pub enum HelpPopupAction {
    Close,
}

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Pages",
        &[
            ("← / →", "Previous / next page"),
            ("Home / End", "First / last page"),
            ("drag", "Swipe to turn the page"),
            ("c", "Paged / continuous reading"),
            ("j / k, wheel", "Scroll in continuous mode"),
        ],
    ),
    (
        "Zoom",
        &[
            ("+ / =", "Zoom in"),
            ("-", "Zoom out"),
            ("0", "Reset zoom"),
            ("Ctrl + wheel", "Zoom in / out"),
            ("drag", "Pan while zoomed"),
        ],
    ),
    (
        "Panels",
        &[
            ("i", "Table of contents"),
            ("t", "Page thumbnails"),
            ("↑ / ↓, Enter", "Move and jump in an open panel"),
            ("f", "Fullscreen"),
            ("Esc", "Reset zoom, leave fullscreen, close panels"),
        ],
    ),
    (
        "Other",
        &[
            ("e", "Export document"),
            ("p", "Next color theme"),
            ("?", "This help"),
            ("q", "Quit"),
        ],
    ),
];

pub struct HelpPopup {
    content: Text<'static>,
    total_lines: usize,
    scroll_offset: usize,
    last_popup_area: Option<Rect>,
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPopup {
    pub fn new() -> Self {
        let palette = current_theme();
        let mut lines: Vec<Line> = Vec::new();

        for (section, bindings) in BINDINGS {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                section.to_string(),
                Style::default()
                    .fg(palette.base_0a)
                    .add_modifier(Modifier::BOLD),
            )));
            for (keys, description) in *bindings {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {keys:<14}"),
                        Style::default().fg(palette.base_0d),
                    ),
                    Span::styled(description.to_string(), Style::default().fg(palette.base_05)),
                ]));
            }
        }

        let total_lines = lines.len();
        HelpPopup {
            content: Text::from(lines),
            total_lines,
            scroll_offset: 0,
            last_popup_area: None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = content_sized_rect(64, 80, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = self
            .content
            .lines
            .iter()
            .skip(self.scroll_offset)
            .cloned()
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help - Press ? or ESC to close ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(current_theme().base_0c))
                    .style(Style::default().bg(current_theme().base_00)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, popup_area);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .style(Style::default().fg(current_theme().base_04))
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        let mut scrollbar_state =
            ScrollbarState::new(self.total_lines).position(self.scroll_offset);

        f.render_stateful_widget(
            scrollbar,
            popup_area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < self.total_lines.saturating_sub(1) {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Option<HelpPopupAction> {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up();
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll_offset = 0;
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.scroll_offset = self.total_lines.saturating_sub(1);
                None
            }
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(HelpPopupAction::Close),
            _ => None,
        }
    }

    pub fn is_outside_popup_area(&self, x: u16, y: u16) -> bool {
        if let Some(popup_area) = self.last_popup_area {
            x < popup_area.x
                || x >= popup_area.x + popup_area.width
                || y < popup_area.y
                || y >= popup_area.y + popup_area.height
        } else {
            true
        }
    }
}

fn content_sized_rect(width: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let width = width.min(r.width);
    let margin = r.width.saturating_sub(width) / 2;

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(width),
            Constraint::Length(margin),
        ])
        .split(popup_layout[1])[1]
}
