use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Word-wraps `text` to `max_width` display columns, keeping at most
/// `max_empty_lines` consecutive blank lines
pub fn wrap_text(text: &str, max_width: usize, max_empty_lines: usize) -> Vec<String> {
    let mut lines = wrap_text_impl(text, max_width);
    trim_empty_edges(&mut lines);
    collapse_empty_lines(&mut lines, max_empty_lines);
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_text_impl(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let characters: Vec<char> = raw_line.chars().collect();
        if characters.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut width = 0usize;
        let mut last_space: Option<usize> = None;

        for character in characters {
            let char_width = UnicodeWidthChar::width(character).unwrap_or(0).max(1);
            if width + char_width > max_width && width > 0 {
                match last_space {
                    Some(space) if space > 0 => {
                        let rest = current.split_off(space);
                        lines.push(current.trim_end().to_string());
                        current = rest.trim_start().to_string();
                    }
                    _ => lines.push(std::mem::take(&mut current)),
                }
                width = display_width(&current);
                last_space = None;
            }
            if character.is_whitespace() {
                last_space = Some(current.len());
            }
            current.push(character);
            width += char_width;
        }

        if !current.is_empty() {
            lines.push(current.trim_end().to_string());
        }
    }
    lines
}

fn trim_empty_edges(lines: &mut Vec<String>) {
    while lines.first().is_some_and(String::is_empty) {
        lines.remove(0);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
}

fn collapse_empty_lines(lines: &mut Vec<String>, max_empty_lines: usize) {
    let mut empty_run = 0usize;
    lines.retain(|line| {
        if line.is_empty() {
            empty_run += 1;
            empty_run <= max_empty_lines
        } else {
            empty_run = 0;
            true
        }
    });
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Cuts `text` to `max_width` columns, ending with an ellipsis when shortened
pub fn truncate(text: &str, max_width: usize) -> String {
    let single_line = text.lines().next().unwrap_or("");
    if display_width(single_line) <= max_width && !text.contains('\n') {
        return single_line.to_string();
    }
    let mut result = String::new();
    let mut width = 0usize;
    for character in single_line.chars() {
        let char_width = UnicodeWidthChar::width(character).unwrap_or(0);
        if width + char_width + 1 > max_width {
            break;
        }
        result.push(character);
        width += char_width;
    }
    if max_width > 0 {
        result.push('…');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_on_spaces() {
        assert_eq!(
            wrap_text("the quick brown fox", 10, 1),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4, 1), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_collapses_blank_runs() {
        assert_eq!(wrap_text("\n\na\n\n\n\nb\n", 10, 1), vec!["a", "", "b"]);
        assert_eq!(wrap_text("", 10, 1), vec![""]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer line", 8), "a much …");
        assert_eq!(truncate("first\nsecond", 20), "first…");
    }
}
