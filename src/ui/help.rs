use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::ui::components;

const SHORTCUTS: &[(&str, &str)] = &[
    ("Tab", "Switch between chats and composer"),
    ("Ctrl+F", "Find a user by display name"),
    ("Enter", "Open chat / send message"),
    ("Up/Down", "Move selection or scroll"),
    ("PgUp/PgDn", "Scroll a page"),
    ("Home", "Oldest message"),
    ("End", "Newest message"),
    ("Esc", "Back/close"),
    ("Ctrl+C", "Quit"),
];

pub fn render_help_overlay(f: &mut Frame) {
    let height = u16::try_from(SHORTCUTS.len() + 6).unwrap_or(u16::MAX);
    let area = centered(52, height, f.area());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Shortcuts", Style::default().fg(Color::Cyan))),
        Line::from(""),
    ];
    for &(key, description) in SHORTCUTS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<11}", key), Style::default().fg(Color::Yellow)),
            Span::styled(description, Style::default().fg(Color::White)),
        ]));
    }
    lines.push(Line::from(""));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            components::bordered()
                .title(Span::styled(
                    " Help ",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ))
                .title_bottom(Line::from(" F1 / Esc to close ").right_aligned()),
        ),
        area,
    );
}

/// Fixed-size popup centered in `area`, shrunk to fit small terminals
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_fits_small_terminals() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(52, 15, area), Rect::new(24, 12, 52, 15));
        assert_eq!(centered(52, 15, Rect::new(0, 0, 40, 10)), Rect::new(0, 0, 40, 10));
    }
}
