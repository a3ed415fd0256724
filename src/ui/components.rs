use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::TextInput;

const SEPARATOR: &str = "  ";

/// Configuration for text input rendering
pub struct TextInputConfig<'a> {
    pub input: &'a TextInput,
    pub title: &'a str,
    pub placeholder: Option<&'a str>,
    pub focused: bool,
}

impl<'a> TextInputConfig<'a> {
    pub fn new(input: &'a TextInput, title: &'a str) -> Self {
        Self {
            input,
            title,
            placeholder: None,
            focused: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// Renders a bordered single-line input, scrolled so the cursor stays visible
pub fn render_text_input(frame: &mut Frame, area: Rect, config: TextInputConfig) {
    let cursor_indicator = if config.focused { "█" } else { "" };
    let content = config.input.content();
    let cursor_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::SLOW_BLINK);

    let line = if content.is_empty() {
        let mut spans = vec![
            Span::styled("> ", Style::default().fg(Color::DarkGray)),
            Span::styled(cursor_indicator, cursor_style),
        ];
        if let Some(placeholder) = config.placeholder {
            spans.push(Span::styled(placeholder, Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    } else {
        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor_width = usize::from(config.focused);
        let available_width = inner_width.saturating_sub(2 + cursor_width).max(1);
        let cursor_index = config.input.cursor_position();
        let (start, end) = visible_window(content, cursor_index, available_width);
        let visible = slice_by_chars(content, start, end);
        let relative_cursor = cursor_index.saturating_sub(start).min(visible.chars().count());

        let text_style = Style::default().fg(Color::White);
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(slice_by_chars(&visible, 0, relative_cursor), text_style),
            Span::styled(cursor_indicator, cursor_style),
            Span::styled(
                slice_by_chars(&visible, relative_cursor, visible.chars().count()),
                text_style,
            ),
        ])
    };

    let border_color = if config.focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(config.title, Style::default().fg(Color::White)))
                .border_style(Style::default().fg(border_color)),
        ),
        area,
    );
}

fn visible_window(content: &str, cursor: usize, width: usize) -> (usize, usize) {
    let length = content.chars().count();
    let cursor = cursor.min(length);
    if length <= width {
        return (0, length);
    }
    let mut start = cursor.saturating_sub(width.saturating_sub(1));
    if start + width > length {
        start = length.saturating_sub(width);
    }
    (start, start + width)
}

fn slice_by_chars(value: &str, start: usize, end: usize) -> String {
    value
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Mode badge followed by key hints
pub fn footer_spans(mode: &str, keybindings: &[(&str, &str)]) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", mode),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    for &(key, desc) in keybindings {
        spans.push(Span::raw(SEPARATOR));
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::White),
        ));
    }
    spans
}

pub fn render_status_toast(frame: &mut Frame, area: Rect, message: &str) {
    let toast = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {} ", message),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(ratatui::layout::Alignment::Right);

    frame.render_widget(toast, area);
}

pub fn bordered() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_window_follows_cursor() {
        assert_eq!(visible_window("hello", 5, 10), (0, 5));
        assert_eq!(visible_window("abcdefghij", 10, 4), (6, 10));
        assert_eq!(visible_window("abcdefghij", 0, 4), (0, 4));
    }
}
