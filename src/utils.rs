use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub mod markdown;

/// Truncate to at most `max_width` terminal columns, ending with `...` when cut.
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push_str("...");
    out
}

/// Single-line text field with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInput {
    pub value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index();
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// (line, column) of the cursor once the value is wrapped at `max_width`.
    pub fn wrapped_cursor(&self, max_width: usize) -> (usize, usize) {
        calculate_wrapped_cursor_position(&self.value, self.cursor, max_width)
    }
}

/// Visual lines of `text` when hard-wrapped at `max_width` columns, as
/// (start, end) char offsets. Explicit newlines always break.
fn wrapped_line_spans(text: &str, max_width: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut width = 0;
    let mut count = 0;

    for (idx, ch) in text.chars().enumerate() {
        count = idx + 1;
        if ch == '\n' {
            spans.push((start, idx));
            start = idx + 1;
            width = 0;
            continue;
        }
        let w = ch.width().unwrap_or(1);
        if width + w > max_width && width > 0 {
            spans.push((start, idx));
            start = idx;
            width = 0;
        }
        width += w;
    }
    if start < count || text.ends_with('\n') || text.is_empty() {
        spans.push((start, count));
    }
    spans
}

/// Line and column of the char offset `cursor_index` within wrapped text.
pub fn calculate_wrapped_cursor_position(text: &str, cursor_index: usize, max_width: usize) -> (usize, usize) {
    if text.is_empty() || cursor_index == 0 || max_width == 0 {
        return (0, 0);
    }
    let spans = wrapped_line_spans(text, max_width);
    for (line, (start, end)) in spans.iter().enumerate() {
        if cursor_index >= *start && cursor_index <= *end {
            // a cursor sitting exactly on a soft break belongs to the next line
            let is_soft_break = cursor_index == *end
                && cursor_index - start >= max_width
                && spans.get(line + 1).is_some_and(|(next, _)| next == end);
            if !is_soft_break {
                return (line, cursor_index - start);
            }
        }
    }
    let last = spans.len().saturating_sub(1);
    let (start, end) = spans.last().copied().unwrap_or((0, 0));
    (last, end - start)
}
