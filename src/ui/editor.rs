//! Query editor widget
//!
//! Multi-line SQL text area with a line-number gutter. The buffer is kept
//! as a list of lines; the cursor is (line, byte column) and always sits on
//! a char boundary.

use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEditor {
    lines: Vec<String>,
    /// (line, byte column)
    cursor: (usize, usize),
}

impl QueryEditor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: (0, 0),
        }
    }

    /// Editor pre-filled with `text`, cursor at the end
    pub fn with_content(text: &str) -> Self {
        let mut editor = Self::new();
        editor.set_content(text);
        editor
    }

    /// The buffer joined with `\n`
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Replace the buffer, cursor at the end
    pub fn set_content(&mut self, text: &str) {
        self.lines = text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        let row = self.lines.len() - 1;
        self.cursor = (row, self.lines[row].len());
    }

    /// Insert text at the cursor (paste). Line breaks split lines.
    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' => self.newline(),
                c => self.insert_char(c),
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        self.lines[row].insert(col, c);
        self.cursor.1 += c.len_utf8();
    }

    fn newline(&mut self) {
        let (row, col) = self.cursor;
        let rest = self.lines[row].split_off(col);
        self.lines.insert(row + 1, rest);
        self.cursor = (row + 1, 0);
    }

    fn backspace(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            let prev = prev_boundary(&self.lines[row], col);
            self.lines[row].drain(prev..col);
            self.cursor.1 = prev;
        } else if row > 0 {
            let line = self.lines.remove(row);
            let prev_len = self.lines[row - 1].len();
            self.lines[row - 1].push_str(&line);
            self.cursor = (row - 1, prev_len);
        }
    }

    fn delete(&mut self) {
        let (row, col) = self.cursor;
        if col < self.lines[row].len() {
            let next = next_boundary(&self.lines[row], col);
            self.lines[row].drain(col..next);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        }
    }

    fn move_left(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            self.cursor.1 = prev_boundary(&self.lines[row], col);
        } else if row > 0 {
            self.cursor = (row - 1, self.lines[row - 1].len());
        }
    }

    fn move_right(&mut self) {
        let (row, col) = self.cursor;
        if col < self.lines[row].len() {
            self.cursor.1 = next_boundary(&self.lines[row], col);
        } else if row + 1 < self.lines.len() {
            self.cursor = (row + 1, 0);
        }
    }

    /// Move to `row`, keeping the char column where possible
    fn move_vertical(&mut self, row: usize) {
        let (cur_row, col) = self.cursor;
        let char_col = self.lines[cur_row][..col].chars().count();
        let target = &self.lines[row];
        let byte_col = target
            .char_indices()
            .nth(char_col)
            .map(|(i, _)| i)
            .unwrap_or(target.len());
        self.cursor = (row, byte_col);
    }

    /// Handle an editing key. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c);
            }
            KeyCode::Enter if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
                self.newline();
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => {
                if self.cursor.0 > 0 {
                    self.move_vertical(self.cursor.0 - 1);
                }
            }
            KeyCode::Down => {
                if self.cursor.0 + 1 < self.lines.len() {
                    self.move_vertical(self.cursor.0 + 1);
                }
            }
            KeyCode::Home => self.cursor.1 = 0,
            KeyCode::End => self.cursor.1 = self.lines[self.cursor.0].len(),
            _ => return false,
        }
        true
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let height = area.height as usize;
        let first = self.cursor.0.saturating_sub(height - 1);
        let gutter = self.lines.len().to_string().len().max(2);

        let lines: Vec<Line> = self
            .lines
            .iter()
            .enumerate()
            .skip(first)
            .take(height)
            .map(|(i, text)| {
                Line::from(vec![
                    Span::styled(format!("{:>gutter$} ", i + 1), theme.editor_gutter),
                    Span::styled(text.clone(), theme.editor_text),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);

        if focused {
            let (row, col) = self.cursor;
            let x = area.x + (gutter + 1) as u16 + self.lines[row][..col].chars().count() as u16;
            let y = area.y + (row - first) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), y));
        }
    }
}

impl Default for QueryEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn prev_boundary(line: &str, col: usize) -> usize {
    line[..col]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_boundary(line: &str, col: usize) -> usize {
    col + line[col..].chars().next().map(|c| c.len_utf8()).unwrap_or(0)
}
