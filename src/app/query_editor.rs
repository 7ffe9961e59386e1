/// Minimal single-line input for the search box.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryEditor {
    text: String,
    cursor: usize,
}

impl QueryEditor {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        let byte_index = self.byte_index(self.cursor);
        self.text.insert(byte_index, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_index = self.byte_index(self.cursor);
        self.text.remove(byte_index);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_the_cursor_across_multibyte_chars() {
        let mut editor = QueryEditor::default();
        editor.insert_char('é');
        editor.insert_char('b');
        editor.move_left();
        editor.insert_char('a');
        assert_eq!(editor.text(), "éab");

        editor.backspace();
        assert_eq!(editor.text(), "éb");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn ignores_newlines() {
        let mut editor = QueryEditor::default();
        editor.insert_char('a');
        editor.insert_char('\n');
        assert_eq!(editor.text(), "a");
    }
}
