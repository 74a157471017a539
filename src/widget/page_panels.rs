use crate::document::Document;
use crate::theme::current_theme;
use crate::viewer::Panel;
use log::debug;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

#[derive(Clone)]
struct PanelEntry {
    page_index: usize,
    label: String,
    detail: String,
}

/// Side list of pages. Backs both the table of contents and the thumbnail
/// strip; they differ only in which pages they list and how rows read.
pub struct PagePanel {
    panel: Panel,
    entries: Vec<PanelEntry>,
    state: ListState,
    last_area: Option<Rect>,
}

impl PagePanel {
    pub fn table_of_contents(document: &Document) -> Self {
        let entries = document
            .toc_entries()
            .into_iter()
            .map(|entry| PanelEntry {
                page_index: entry.page_index,
                label: entry.title,
                detail: format!("p. {}", entry.page_index + 1),
            })
            .collect();
        Self::with_entries(Panel::TableOfContents, entries)
    }

    pub fn thumbnails(document: &Document) -> Self {
        let entries = document
            .pages()
            .iter()
            .enumerate()
            .map(|(page_index, page)| PanelEntry {
                page_index,
                label: format!("{:>3}", page_index + 1),
                detail: format!("{} · {}", page.kind.label(), page.display_title()),
            })
            .collect();
        Self::with_entries(Panel::Thumbnails, entries)
    }

    fn with_entries(panel: Panel, entries: Vec<PanelEntry>) -> Self {
        let mut state = ListState::default();
        if !entries.is_empty() {
            state.select(Some(0));
        }
        Self {
            panel,
            entries,
            state,
            last_area: None,
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves the selection to the entry for `page`, or the closest entry
    /// before it.
    pub fn sync_to_page(&mut self, page: usize) {
        let position = self
            .entries
            .iter()
            .rposition(|entry| entry.page_index <= page)
            .or_else(|| (!self.entries.is_empty()).then_some(0));
        self.state.select(position);
    }

    pub fn selected_page(&self) -> Option<usize> {
        self.state
            .selected()
            .and_then(|i| self.entries.get(i))
            .map(|entry| entry.page_index)
    }

    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, current_page: usize) {
        self.last_area = Some(area);
        f.render_widget(Clear, area);

        let palette = current_theme();
        let (border, title_color, background) = palette.get_panel_colors(true);
        let (selection_bg, selection_fg) = palette.get_selection_colors(true);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let marker = if entry.page_index == current_page {
                    Span::styled("● ", Style::default().fg(palette.base_0b))
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(entry.label.clone(), Style::default().fg(palette.base_05)),
                    Span::raw(" "),
                    Span::styled(entry.detail.clone(), Style::default().fg(palette.base_03)),
                ]))
            })
            .collect();

        let title = match self.panel {
            Panel::TableOfContents => " Contents ",
            Panel::Thumbnails => " Pages ",
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(title, Style::default().fg(title_color)))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .style(Style::default().bg(background)),
            )
            .highlight_style(
                Style::default()
                    .bg(selection_bg)
                    .fg(selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("» ");

        f.render_stateful_widget(list, area, &mut self.state);
    }

    /// Selects the row under the cursor. Returns the page it points at.
    pub fn handle_mouse_click(&mut self, x: u16, y: u16) -> Option<usize> {
        let area = self.last_area?;
        if x < area.x || x >= area.x + area.width || y <= area.y || y + 1 >= area.y + area.height
        {
            debug!("PagePanel: click at ({x}, {y}) outside list");
            return None;
        }

        let index = self.state.offset() + (y - area.y - 1) as usize;
        if index < self.entries.len() {
            self.state.select(Some(index));
            return self.selected_page();
        }
        None
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.last_area.is_some_and(|area| {
            x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_document;

    #[test]
    fn navigation_wraps() {
        let mut panel = PagePanel::thumbnails(&sample_document(3));
        assert_eq!(panel.selected_page(), Some(0));
        panel.previous();
        assert_eq!(panel.selected_page(), Some(2));
        panel.next();
        assert_eq!(panel.selected_page(), Some(0));
    }

    #[test]
    fn sync_picks_closest_preceding_entry() {
        let document = Document::from_json_str(
            r#"{"id": "d", "pages": [
                {"id": "a", "type": "cover", "content": {}},
                {"id": "b", "type": "article", "content": {"title": "One"}},
                {"id": "c", "type": "gallery", "content": {}},
                {"id": "d", "type": "article", "content": {"title": "Two"}}
            ]}"#,
        )
        .unwrap();
        let mut toc = PagePanel::table_of_contents(&document);
        assert_eq!(toc.len(), 3);

        toc.sync_to_page(2);
        assert_eq!(toc.selected_page(), Some(1));
        toc.sync_to_page(3);
        assert_eq!(toc.selected_page(), Some(3));
    }

    #[test]
    fn click_before_render_is_ignored() {
        let mut panel = PagePanel::thumbnails(&sample_document(3));
        assert_eq!(panel.handle_mouse_click(1, 1), None);
    }
}
