/// Single-line editable text with a character cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    content: String,
    cursor_index: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character at the cursor
    pub fn add_char(&mut self, character: char) {
        let insert_index = char_to_byte_index(&self.content, self.cursor_index);
        self.content.insert(insert_index, character);
        self.cursor_index = self.cursor_index.saturating_add(1);
    }

    /// Inserts pasted text at the cursor, dropping line breaks
    pub fn insert_str(&mut self, text: &str) {
        for character in text.chars().filter(|character| !matches!(character, '\n' | '\r')) {
            self.add_char(character);
        }
    }

    /// Removes the character before the cursor (backspace)
    pub fn remove_char(&mut self) {
        if self.cursor_index == 0 {
            return;
        }
        self.cursor_index -= 1;
        self.delete_char();
    }

    /// Removes the character under the cursor (delete)
    pub fn delete_char(&mut self) {
        if self.cursor_index >= self.content.chars().count() {
            return;
        }
        let start_index = char_to_byte_index(&self.content, self.cursor_index);
        let end_index = char_to_byte_index(&self.content, self.cursor_index + 1);
        self.content.replace_range(start_index..end_index, "");
    }

    pub fn move_left(&mut self) {
        self.cursor_index = self.cursor_index.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_index < self.content.chars().count() {
            self.cursor_index += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor_index = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor_index = self.content.chars().count();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters
    pub fn cursor_position(&self) -> usize {
        self.cursor_index
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_index = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn char_to_byte_index(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or_else(|| value.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_in_the_middle_of_multibyte_text() {
        let mut input = TextInput::new();
        input.insert_str("olá\nmundo");
        assert_eq!(input.content(), "olámundo");

        input.move_to_start();
        input.move_right();
        input.move_right();
        input.move_right();
        input.add_char(' ');
        assert_eq!(input.content(), "olá mundo");

        input.remove_char();
        input.remove_char();
        assert_eq!(input.content(), "olmundo");
        assert_eq!(input.cursor_position(), 2);

        input.move_to_end();
        input.delete_char();
        input.remove_char();
        assert_eq!(input.content(), "olmund");
    }
}
