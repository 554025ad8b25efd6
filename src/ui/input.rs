//! Single-line text input
//!
//! Byte-indexed cursor kept on char boundaries, with horizontal scrolling
//! so the cursor always stays visible. Used by every form field.

use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// Byte offset into `value`
    cursor: usize,
    /// Render as bullets (passwords)
    masked: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the contents, cursor at the end
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Insert pasted text, dropping line breaks
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.value.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    /// Handle an editing key. Returns true if the key changed or moved
    /// anything (i.e. it was consumed).
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.value.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.value.drain(prev..self.cursor);
                    self.cursor = prev;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.len() {
                    let next = self.next_boundary();
                    self.value.drain(self.cursor..next);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.prev_boundary();
                true
            }
            KeyCode::Right => {
                self.cursor = self.next_boundary();
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            _ => false,
        }
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.cursor
            + self.value[self.cursor..]
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(0)
    }

    /// Render `label` followed by the input on a single row
    pub fn render(&self, frame: &mut Frame, area: Rect, label: &str, focused: bool, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let label_width = label.chars().count() as u16;
        let input_width = area.width.saturating_sub(label_width) as usize;

        let shown = if self.masked {
            "\u{2022}".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        let cursor_chars = self.value[..self.cursor].chars().count();
        let visible = visible_slice(&shown, cursor_chars, input_width);

        let style = if focused {
            theme.input_focused
        } else {
            theme.input
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(label.to_string(), theme.label),
                Span::styled(visible.text, style),
            ])),
            area,
        );

        if focused && input_width > 0 {
            let x = area.x + label_width + visible.cursor_offset as u16;
            frame.set_cursor_position((x.min(area.x + area.width - 1), area.y));
        }
    }
}

/// Helper for showing a visible slice of a string with cursor position
struct VisibleSlice {
    text: String,
    cursor_offset: usize,
}

/// Get the visible portion of a string that fits within `width` chars,
/// keeping the cursor (a char index) visible.
fn visible_slice(input: &str, cursor: usize, width: usize) -> VisibleSlice {
    let len = input.chars().count();
    if len < width {
        return VisibleSlice {
            text: input.to_string(),
            cursor_offset: cursor,
        };
    }

    // Scroll to keep cursor visible
    let start = if cursor >= width {
        cursor + 1 - width
    } else {
        0
    };
    VisibleSlice {
        text: input.chars().skip(start).take(width).collect(),
        cursor_offset: cursor - start,
    }
}
