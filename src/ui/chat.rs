use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::components;
use super::text::{display_width, wrap_text};
use crate::app::{App, Focus};
use crate::chat::{Conversation, MessageStore};

const BODY_INDENT: &str = "   ";

/// Builds the rendered rows of a thread. The row count is the scroll height.
pub fn thread_lines(
    conversation: &Conversation,
    viewer: &str,
    width: u16,
    time_format: &str,
) -> Vec<Line<'static>> {
    let body_width = usize::from(width).saturating_sub(BODY_INDENT.len()).max(1);
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    for (index, message) in conversation.messages.iter().enumerate() {
        if index > 0 {
            lines.push(Line::from(""));
        }

        let own = message.is_from(viewer);
        let (indicator, name, name_color) = if own {
            (">", "You".to_string(), Color::Cyan)
        } else {
            ("<", conversation.peer.display_name.clone(), Color::Magenta)
        };

        let mut header = vec![
            Span::styled(format!(" {} ", indicator), dim),
            Span::styled(
                name,
                Style::default().fg(name_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", message.local_time(time_format)), dim),
        ];
        if own {
            header.push(if message.read {
                Span::styled("  ✓✓", Style::default().fg(Color::Green))
            } else {
                Span::styled("  ✓", dim)
            });
        } else if !message.read {
            header.push(Span::styled("  new", Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(header));

        for body_line in wrap_text(&message.body, body_width, 1) {
            lines.push(Line::from(vec![
                Span::raw(BODY_INDENT),
                Span::styled(body_line, Style::default().fg(Color::White)),
            ]));
        }
    }
    lines
}

pub fn thread_line_count(
    conversation: &Conversation,
    viewer: &str,
    width: u16,
    time_format: &str,
) -> u32 {
    let count = thread_lines(conversation, viewer, width, time_format).len();
    u32::try_from(count).unwrap_or(u32::MAX)
}

pub fn render_chat_header(f: &mut Frame, app: &App, area: Rect) {
    let block = components::bordered();
    let inner = block.inner(area);
    f.render_widget(block, area);

    let title = match app.store.active_conversation() {
        Some(conversation) => vec![
            Span::raw(" "),
            Span::styled(
                conversation.peer.display_name.clone(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  @{}", conversation.peer.uid),
                Style::default().fg(Color::DarkGray),
            ),
        ],
        None => vec![
            Span::raw(" "),
            Span::styled("No chat selected", Style::default().fg(Color::DarkGray)),
        ],
    };
    f.render_widget(Paragraph::new(Line::from(title)), inner);

    let viewer = format!("{} ", app.viewer.display_name);
    let viewer_width = u16::try_from(display_width(&viewer)).unwrap_or(inner.width);
    let right = Rect {
        x: inner.x + inner.width.saturating_sub(viewer_width),
        y: inner.y,
        width: viewer_width.min(inner.width),
        height: inner.height,
    };
    f.render_widget(
        Paragraph::new(Span::styled(viewer, Style::default().fg(Color::Cyan)))
            .alignment(Alignment::Right),
        right,
    );
}

pub fn render_thread(f: &mut Frame, app: &App, area: Rect) {
    let Some(conversation) = app.store.active_conversation() else {
        render_welcome(f, area);
        return;
    };

    let mut lines = thread_lines(
        conversation,
        &app.viewer.uid,
        area.width.saturating_sub(2),
        &app.ui.time_format,
    );
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No messages yet. Say hi!",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let mut title = vec![Span::styled(" Conversation ", Style::default().fg(Color::White))];
    if app.show_jump_to_bottom() {
        let unread = conversation.unread_count(&app.viewer.uid);
        let label = if unread > 0 {
            format!("[↓ {} unread · End] ", unread)
        } else {
            "[↓ newer · End] ".to_string()
        };
        title.push(Span::styled(label, Style::default().fg(Color::Yellow)));
    }

    let scroll_top = u16::try_from(app.viewport.scroll_top()).unwrap_or(u16::MAX);
    f.render_widget(
        Paragraph::new(lines)
            .block(components::bordered().title(Line::from(title)))
            .scroll((scroll_top, 0)),
        area,
    );
}

fn render_welcome(f: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Welcome to ", dim),
            Span::styled(
                "palaver",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Pick a conversation on the left,", dim)),
        Line::from(vec![
            Span::styled("  or press ", dim),
            Span::styled("^F", Style::default().fg(Color::Yellow)),
            Span::styled(" to find someone new.", dim),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(components::bordered()), area);
}

pub fn render_composer(f: &mut Frame, app: &App, area: Rect) {
    let placeholder = if app.store.active_id().is_some() {
        "Type a message..."
    } else {
        "Open a chat to start typing"
    };
    let config = components::TextInputConfig::new(&app.composer, " Message ")
        .with_placeholder(placeholder)
        .with_focus(app.focus == Focus::Composer);
    components::render_text_input(f, area, config);
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let (mode, keybindings): (&str, &[(&str, &str)]) = match app.focus {
        Focus::Sidebar => ("CHATS", &[("Enter", "open"), ("Tab", "compose"), ("^F", "find"), ("F1", "help")]),
        Focus::Composer => ("COMPOSE", &[("Enter", "send"), ("PgUp", "history"), ("End", "newest"), ("Tab", "chats")]),
        Focus::Search => ("FIND", &[("Enter", "search"), ("Esc", "cancel")]),
    };

    let block = components::bordered();
    let inner = block.inner(area);
    f.render_widget(block, area);

    let toast_message = app.status_toast_message();
    let toast_width = toast_message
        .map(|message| u16::try_from(message.chars().count() + 4).unwrap_or(inner.width))
        .unwrap_or(0);

    let left_area = Rect {
        width: inner.width.saturating_sub(toast_width.saturating_add(1)),
        ..inner
    };
    f.render_widget(
        Paragraph::new(Line::from(components::footer_spans(mode, keybindings))),
        left_area,
    );

    if let Some(message) = toast_message {
        let toast_area = Rect {
            x: inner.x + inner.width.saturating_sub(toast_width),
            width: toast_width.min(inner.width),
            ..inner
        };
        components::render_status_toast(f, toast_area, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::model::fixtures::{conversation, message};

    #[test]
    fn test_thread_lines_count_headers_bodies_and_gaps() {
        let chat = conversation(
            "c",
            "ana",
            vec![
                message("ana", "hello there", 1, true),
                message("me", "a reply that is long enough to wrap", 2, false),
            ],
        );
        // 1 header + 1 body, gap, 1 header + 2 wrapped body rows
        assert_eq!(thread_line_count(&chat, "me", 23, "%H:%M"), 6);
        assert_eq!(thread_line_count(&conversation("e", "ana", Vec::new()), "me", 23, "%H:%M"), 0);
    }

    #[test]
    fn test_own_messages_show_receipts() {
        let chat = conversation(
            "c",
            "ana",
            vec![message("me", "sent", 1, false), message("me", "seen", 2, true)],
        );
        let lines = thread_lines(&chat, "me", 40, "%H:%M");
        assert!(lines[0].to_string().ends_with("✓"));
        assert!(!lines[0].to_string().ends_with("✓✓"));
        assert!(lines[3].to_string().ends_with("✓✓"));
        assert!(lines[0].to_string().contains("You"));
    }
}
