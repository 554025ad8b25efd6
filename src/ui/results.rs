//! Query results viewer widget
//!
//! Displays the console's current result in a scrollable table with
//! cell-level selection. The viewer owns only navigation state; the result
//! itself lives in the console and is passed in at render time.

use crate::api::{QueryResult, display_value};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// What the results area should show
pub enum ResultsView<'a> {
    /// Nothing has run yet
    Empty,
    /// A query is in flight
    Running,
    /// Last run failed
    Error(&'a str),
    /// Last run succeeded
    Result(&'a QueryResult),
}

/// Results table navigation state
#[derive(Debug, Default)]
pub struct ResultsViewer {
    selected_row: usize,
    selected_col: usize,
    scroll_offset: usize,
    h_scroll_offset: usize,
    /// Computed column widths
    col_widths: Vec<u16>,
    rows: usize,
    cols: usize,
}

impl ResultsViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset navigation for a new result
    pub fn load(&mut self, result: &QueryResult) {
        self.col_widths = compute_column_widths(result);
        self.rows = result.rows.len();
        self.cols = result.columns.len();
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_offset = 0;
        self.h_scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selected_row, self.selected_col)
    }

    /// Display text of the selected cell
    pub fn selected_cell_text(&self, result: &QueryResult) -> Option<String> {
        result
            .cell(self.selected_row, self.selected_col)
            .map(display_value)
    }

    pub fn move_up(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.rows > 0 && self.selected_row < self.rows - 1 {
            self.selected_row += 1;
        }
    }

    pub fn move_left(&mut self) {
        if self.selected_col > 0 {
            self.selected_col -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.selected_col < self.cols.saturating_sub(1) {
            self.selected_col += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(20);
    }

    pub fn page_down(&mut self) {
        self.selected_row = (self.selected_row + 20).min(self.rows.saturating_sub(1));
    }

    pub fn go_to_top(&mut self) {
        self.selected_row = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.selected_row = self.rows.saturating_sub(1);
    }

    pub fn go_to_home(&mut self) {
        self.selected_col = 0;
        self.h_scroll_offset = 0;
    }

    pub fn go_to_end(&mut self) {
        self.selected_col = self.cols.saturating_sub(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, view: ResultsView, focused: bool, theme: &Theme) {
        let result = match view {
            ResultsView::Empty => {
                let p = Paragraph::new("No results yet. Write a query and press Ctrl+Enter or F5.")
                    .style(theme.results_empty);
                frame.render_widget(p, area);
                return;
            }
            ResultsView::Running => {
                frame.render_widget(Paragraph::new("Running...").style(theme.status_info), area);
                return;
            }
            ResultsView::Error(error) => {
                let lines = vec![
                    Line::from(Span::styled("Query Error", theme.results_error_title)),
                    Line::from(""),
                    Line::from(Span::styled(error, theme.results_error_text)),
                ];
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
                return;
            }
            ResultsView::Result(result) => result,
        };

        if result.columns.is_empty() {
            let msg = result
                .message
                .as_deref()
                .unwrap_or("Statement executed successfully, no result set.");
            frame.render_widget(Paragraph::new(msg).style(theme.results_empty), area);
            return;
        }

        if area.height < 2 || area.width < 5 {
            return;
        }

        let visible_height = (area.height as usize).saturating_sub(2); // header + footer

        // Ensure selected row is visible
        let scroll_offset = if self.selected_row < self.scroll_offset {
            self.selected_row
        } else if self.selected_row >= self.scroll_offset + visible_height {
            self.selected_row + 1 - visible_height
        } else {
            self.scroll_offset
        };
        let h_scroll = self.horizontal_offset(area.width);

        // Header row
        let mut x = area.x;
        for (col_idx, name) in result.columns.iter().enumerate().skip(h_scroll) {
            if x >= area.right() {
                break;
            }
            let w = self.width_of(col_idx).min(area.right() - x);
            let style = if focused && col_idx == self.selected_col {
                theme.results_header_selected
            } else {
                theme.results_header
            };
            frame.render_widget(
                Paragraph::new(pad(name, w as usize)).style(style),
                Rect::new(x, area.y, w, 1),
            );
            x += w + 1;
        }

        if result.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("No rows returned.").style(theme.results_empty),
                Rect::new(area.x, area.y + 1, area.width, 1),
            );
        }

        for vis_row in 0..visible_height {
            let row_idx = scroll_offset + vis_row;
            let Some(row) = result.rows.get(row_idx) else {
                break;
            };
            let y = area.y + 1 + vis_row as u16;
            let row_base_style = if vis_row % 2 == 0 {
                theme.results_row_even
            } else {
                theme.results_row_odd
            };

            let mut x = area.x;
            for (col_idx, name) in result.columns.iter().enumerate().skip(h_scroll) {
                if x >= area.right() {
                    break;
                }
                let w = self.width_of(col_idx).min(area.right() - x);
                let value = row.get(name).unwrap_or(&Value::Null);
                let style = if focused && row_idx == self.selected_row && col_idx == self.selected_col {
                    theme.results_selected
                } else if value.is_null() {
                    theme.results_null
                } else {
                    row_base_style
                };
                frame.render_widget(
                    Paragraph::new(pad(&display_value(value), w as usize)).style(style),
                    Rect::new(x, y, w, 1),
                );
                x += w + 1;
            }
        }

        let footer = format!(
            "Row {}/{} | Col {}/{}",
            (self.selected_row + 1).min(self.rows.max(1)),
            self.rows,
            self.selected_col + 1,
            self.cols,
        );
        frame.render_widget(
            Paragraph::new(footer).style(theme.results_footer),
            Rect::new(area.x, area.bottom() - 1, area.width, 1),
        );
    }

    fn width_of(&self, col: usize) -> u16 {
        self.col_widths.get(col).copied().unwrap_or(10)
    }

    /// First visible column such that the selected column fits
    fn horizontal_offset(&self, width: u16) -> usize {
        let mut hs = self.h_scroll_offset;
        if self.selected_col < hs {
            return self.selected_col;
        }
        let mut x: u16 = 0;
        for ci in hs..=self.selected_col {
            x = x.saturating_add(self.width_of(ci));
            if ci < self.selected_col {
                x = x.saturating_add(1);
            }
        }
        if x <= width {
            return hs;
        }
        // Scroll right: smallest offset that still shows the selected column
        hs = self.selected_col;
        let mut total = self.width_of(hs);
        while hs > 0 {
            let prev = self.width_of(hs - 1);
            if total + prev + 1 > width {
                break;
            }
            total += prev + 1;
            hs -= 1;
        }
        hs
    }
}

/// Compute column widths based on header names and data
fn compute_column_widths(result: &QueryResult) -> Vec<u16> {
    let mut widths: Vec<u16> = result
        .columns
        .iter()
        .map(|c| c.width() as u16 + 1)
        .collect();

    // Sample first 100 rows
    for row in result.rows.iter().take(100) {
        for (i, name) in result.columns.iter().enumerate() {
            if let Some(value) = row.get(name) {
                let w = display_value(value).width().min(50) as u16 + 1;
                widths[i] = widths[i].max(w);
            }
        }
    }

    for w in &mut widths {
        *w = (*w).clamp(4, 40);
    }
    widths
}

/// Truncate to `width` chars (with an ellipsis) and left-pad to `width`
fn pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    let text = if count <= width {
        s.to_string()
    } else if width > 3 {
        let mut t: String = s.chars().take(width - 3).collect();
        t.push_str("...");
        t
    } else {
        s.chars().take(width).collect()
    };
    format!("{text:<width$}")
}
