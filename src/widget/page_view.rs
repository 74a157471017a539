use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span, Text},
};
use serde_json::Value;

use crate::document::{Page, PageKind};
use crate::theme::current_theme;

/// Lays a page out for the terminal. Depends only on the page and the
/// active palette.
pub fn render_page(page: &Page) -> Text<'static> {
    match page.kind {
        PageKind::Cover | PageKind::BackCover => render_cover(page),
        PageKind::Editorial | PageKind::Article => render_article(page, None),
        PageKind::Notice => render_article(page, Some("NOTICE")),
        PageKind::Gallery => render_list(page, "▣ "),
        PageKind::Events => render_list(page, "◆ "),
        PageKind::Classifieds => render_list(page, "▸ "),
        PageKind::Unknown => render_article(page, Some(page.kind.label())),
    }
}

fn render_cover(page: &Page) -> Text<'static> {
    let palette = current_theme();
    let mut lines = vec![Line::default(); 2];

    lines.push(
        Line::from(Span::styled(
            page.display_title().to_uppercase(),
            Style::default()
                .fg(palette.base_0a)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
    );
    if let Some(subtitle) = page.text_field("subtitle") {
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(
                subtitle.to_string(),
                Style::default()
                    .fg(palette.base_0c)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center),
        );
    }
    if let Some(body) = page.text_field("body") {
        lines.push(Line::default());
        for paragraph in body.lines() {
            lines.push(
                Line::from(Span::styled(
                    paragraph.to_string(),
                    Style::default().fg(palette.base_05),
                ))
                .alignment(Alignment::Center),
            );
        }
    }

    Text::from(lines)
}

fn render_article(page: &Page, badge: Option<&str>) -> Text<'static> {
    let palette = current_theme();
    let mut lines = Vec::new();

    if let Some(badge) = badge {
        lines.push(Line::from(Span::styled(
            format!(" {badge} "),
            Style::default()
                .fg(palette.base_00)
                .bg(palette.base_08)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        page.display_title(),
        Style::default()
            .fg(palette.base_0d)
            .add_modifier(Modifier::BOLD),
    )));
    if let Some(subtitle) = page.text_field("subtitle") {
        lines.push(Line::from(Span::styled(
            subtitle.to_string(),
            Style::default()
                .fg(palette.base_03)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    push_body(&mut lines, page);

    Text::from(lines)
}

fn render_list(page: &Page, bullet: &'static str) -> Text<'static> {
    let palette = current_theme();
    let mut lines = vec![Line::from(Span::styled(
        page.display_title(),
        Style::default()
            .fg(palette.base_0e)
            .add_modifier(Modifier::BOLD),
    ))];
    push_body(&mut lines, page);

    let items: Vec<String> = page
        .content
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(item_text).collect())
        .unwrap_or_default();

    if !items.is_empty() {
        lines.push(Line::default());
    }
    for item in items {
        lines.push(Line::from(vec![
            Span::styled(bullet, Style::default().fg(palette.base_0b)),
            Span::styled(item, Style::default().fg(palette.base_05)),
        ]));
    }

    Text::from(lines)
}

fn push_body(lines: &mut Vec<Line<'static>>, page: &Page) {
    let Some(body) = page.text_field("body") else {
        return;
    };
    let style = Style::default().fg(current_theme().base_05);
    for paragraph in body.split("\n\n") {
        lines.push(Line::default());
        for line in paragraph.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), style)));
        }
    }
}

/// Items are either plain strings or objects whose known string fields are
/// joined in reading order.
fn item_text(item: &Value) -> Option<String> {
    if let Some(text) = item.as_str() {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = ["date", "title", "text", "price"]
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn cover_is_centered_and_uppercased() {
        let page = Page::new(
            "c",
            PageKind::Cover,
            json!({"title": "Aurora News", "subtitle": "March"}),
        );
        let text = render_page(&page);
        let lines = plain(&text);
        assert!(lines.contains(&"AURORA NEWS".to_string()));
        assert!(lines.contains(&"March".to_string()));
        assert!(
            text.lines
                .iter()
                .filter(|l| !l.spans.is_empty())
                .all(|l| l.alignment == Some(Alignment::Center))
        );
    }

    #[test]
    fn notice_carries_a_badge() {
        let page = Page::new(
            "n",
            PageKind::Notice,
            json!({"title": "Water cut", "body": "Tuesday 9-12.\n\nSorry."}),
        );
        let lines = plain(&render_page(&page));
        assert_eq!(lines[0], " NOTICE ");
        assert_eq!(lines[1], "Water cut");
        assert!(lines.contains(&"Tuesday 9-12.".to_string()));
        assert!(lines.contains(&"Sorry.".to_string()));
    }

    #[test]
    fn events_join_item_fields() {
        let page = Page::new(
            "e",
            PageKind::Events,
            json!({"title": "Agenda", "items": [
                {"date": "03/12", "title": "Assembly"},
                "Pool party",
                42
            ]}),
        );
        let lines = plain(&render_page(&page));
        assert!(lines.contains(&"◆ 03/12 · Assembly".to_string()));
        assert!(lines.contains(&"◆ Pool party".to_string()));
        assert_eq!(lines.iter().filter(|l| l.starts_with('◆')).count(), 2);
    }

    #[test]
    fn untitled_unknown_page_falls_back_to_label() {
        let page = Page::new("u", PageKind::Unknown, Value::Null);
        let lines = plain(&render_page(&page));
        assert_eq!(lines, vec![" Page ".to_string(), "Page".to_string()]);
    }
}
