use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use super::components;
use super::text::{display_width, truncate};
use crate::app::{App, Focus, SidebarRow};
use crate::chat::{ChatPreview, UserProfile};

pub fn render_brand(f: &mut Frame, app: &App, area: Rect) {
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                "palaver",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate(&app.viewer.display_name, usize::from(area.width.saturating_sub(14))),
                Style::default().fg(Color::Cyan),
            ),
        ]))
        .block(components::bordered())
        .alignment(Alignment::Left),
        area,
    );
}

pub fn render_search(f: &mut Frame, app: &App, area: Rect) {
    let config = components::TextInputConfig::new(&app.search, " Find user ")
        .with_placeholder("^F display name")
        .with_focus(app.focus == Focus::Search);
    components::render_text_input(f, area, config);
}

pub fn render_chat_list(f: &mut Frame, app: &App, area: Rect) {
    let rows = app.sidebar_rows();
    let inner_width = usize::from(area.width.saturating_sub(2));
    let focused = app.focus == Focus::Sidebar;

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = components::bordered()
        .title(Span::styled(" Chats ", Style::default().fg(Color::White)))
        .border_style(Style::default().fg(border_color));

    if rows.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("  No chats yet", Style::default().fg(Color::DarkGray))),
            Line::from(vec![
                Span::styled("  Press ", Style::default().fg(Color::DarkGray)),
                Span::styled("^F", Style::default().fg(Color::Yellow)),
                Span::styled(" to find someone", Style::default().fg(Color::DarkGray)),
            ]),
        ];
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let highlighted = focused && index == app.sidebar_index;
            match row {
                SidebarRow::Found(profile) => ListItem::new(found_lines(profile, highlighted, inner_width)),
                SidebarRow::Chat(preview) => ListItem::new(chat_lines(preview, highlighted, inner_width)),
            }
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(app.sidebar_index.min(rows.len().saturating_sub(1))));

    f.render_stateful_widget(List::new(items).block(block), area, &mut list_state);
}

fn prefix(highlighted: bool) -> Span<'static> {
    if highlighted {
        Span::styled(
            " > ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("   ")
    }
}

fn found_lines(profile: &UserProfile, highlighted: bool, width: usize) -> Vec<Line<'static>> {
    let name_width = width.saturating_sub(3);
    vec![
        Line::from(vec![
            prefix(highlighted),
            Span::styled(
                truncate(&profile.display_name, name_width),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("   "),
            Span::styled("+ start chat (Enter)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ]
}

/// Name and time on top, last message with receipts and unread badge below
fn chat_lines(preview: &ChatPreview, highlighted: bool, width: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let time = preview.last_time.clone().unwrap_or_default();
    let name_width = width.saturating_sub(4 + display_width(&time));

    let name_style = if highlighted {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if preview.selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let name = truncate(&preview.peer_name, name_width);
    let gap = width.saturating_sub(3 + display_width(&name) + display_width(&time));
    let first = Line::from(vec![
        prefix(highlighted),
        Span::styled(name, name_style),
        Span::raw(" ".repeat(gap)),
        Span::styled(time, dim),
    ]);

    let mut second = vec![Span::raw("   ")];
    let mut used = 3;
    if preview.own_last {
        let ticks = if preview.last_read { "✓✓ " } else { "✓ " };
        let color = if preview.last_read { Color::Green } else { Color::DarkGray };
        used += display_width(ticks);
        second.push(Span::styled(ticks, Style::default().fg(color)));
    }
    let badge = (preview.unread > 0).then(|| format!(" {} ", preview.unread));
    let badge_width = badge.as_deref().map_or(0, |badge| display_width(badge) + 1);
    let body = if preview.last_body.is_empty() {
        "No messages yet".to_string()
    } else {
        preview.last_body.clone()
    };
    let body = truncate(&body, width.saturating_sub(used + badge_width));
    let body_width = display_width(&body);
    let body_style = if preview.unread > 0 {
        Style::default().fg(Color::White)
    } else {
        dim
    };
    second.push(Span::styled(body, body_style));
    if let Some(badge) = badge {
        second.push(Span::raw(" ".repeat(
            width.saturating_sub(used + body_width + display_width(&badge)),
        )));
        second.push(Span::styled(
            badge,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    vec![first, Line::from(second), Line::from("")]
}
