//! Input mode and draft text state.

use unicode_segmentation::UnicodeSegmentation;

/// Which surface currently receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigating the category editor.
    #[default]
    Normal,
    /// Editing the active category's custom text.
    Insert,
    /// Typing a `:` command.
    Command,
    /// Naming a template in the save modal.
    SaveTemplate,
    /// Browsing saved templates in the overlay.
    Templates,
}

/// Single-line text editing with grapheme-cluster cursor movement.
#[derive(Debug, Default, Clone)]
pub struct DraftInput {
    text: String,
    cursor: usize,
}

impl DraftInput {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.move_cursor_end();
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.text.insert(index, new_char);
        self.move_cursor_right();
    }

    pub fn enter_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let index = self.byte_index();
        self.text.insert_str(index, text);
        let inserted = text.graphemes(true).count();
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(inserted));
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index_at(self.cursor - 1);
        let end = self.byte_index_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.move_cursor_left();
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }
        let start = self.byte_index_at(self.cursor);
        let end = self.byte_index_at(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn delete_word_backwards(&mut self) {
        while self.cursor > 0 && self.char_before_cursor().is_some_and(char::is_whitespace) {
            self.delete_char();
        }
        while self.cursor > 0 && !self.char_before_cursor().is_some_and(char::is_whitespace) {
            self.delete_char();
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn char_before_cursor(&self) -> Option<char> {
        if self.cursor == 0 {
            return None;
        }
        let start = self.byte_index_at(self.cursor - 1);
        self.text[start..].chars().next()
    }

    fn byte_index(&self) -> usize {
        self.byte_index_at(self.cursor)
    }

    fn byte_index_at(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map_or(self.text.len(), |(index, _)| index)
    }

    fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    fn clamp_cursor(&self, new_cursor: usize) -> usize {
        new_cursor.min(self.grapheme_count())
    }
}

#[cfg(test)]
mod tests {
    use super::DraftInput;

    #[test]
    fn typing_moves_cursor() {
        let mut draft = DraftInput::default();
        for ch in "moody".chars() {
            draft.enter_char(ch);
        }
        assert_eq!(draft.text(), "moody");
        assert_eq!(draft.cursor(), 5);
    }

    #[test]
    fn insert_in_middle() {
        let mut draft = DraftInput::default();
        draft.set_text("prtrait");
        draft.reset_cursor();
        draft.move_cursor_right();
        draft.enter_char('o');
        assert_eq!(draft.text(), "portrait");
    }

    #[test]
    fn delete_handles_multibyte_graphemes() {
        let mut draft = DraftInput::default();
        draft.set_text("café");
        draft.delete_char();
        assert_eq!(draft.text(), "caf");
        assert_eq!(draft.cursor(), 3);
    }

    #[test]
    fn delete_word_backwards_stops_at_word_boundary() {
        let mut draft = DraftInput::default();
        draft.set_text("golden hour glow");
        draft.delete_word_backwards();
        assert_eq!(draft.text(), "golden hour ");
        draft.delete_word_backwards();
        assert_eq!(draft.text(), "golden ");
    }

    #[test]
    fn take_text_resets_state() {
        let mut draft = DraftInput::default();
        draft.set_text("noir");
        let taken = draft.take_text();
        assert_eq!(taken, "noir");
        assert_eq!(draft.text(), "");
        assert_eq!(draft.cursor(), 0);
    }

    #[test]
    fn cursor_clamps_at_ends() {
        let mut draft = DraftInput::default();
        draft.set_text("ab");
        draft.move_cursor_right();
        assert_eq!(draft.cursor(), 2);
        draft.reset_cursor();
        draft.move_cursor_left();
        assert_eq!(draft.cursor(), 0);
    }
}
