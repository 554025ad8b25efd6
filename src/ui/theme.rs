//! UI theme and styling
//!
//! Defines colors, styles, and visual appearance for all UI components.

use ratatui::style::{Color, Modifier, Style};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_focused: Style,
    pub border_unfocused: Style,

    // Page tabs
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub user_badge: Style,

    // Query editor
    pub editor_text: Style,
    pub editor_gutter: Style,

    // Results table
    pub results_header: Style,
    pub results_header_selected: Style,
    pub results_row_even: Style,
    pub results_row_odd: Style,
    pub results_selected: Style,
    pub results_null: Style,
    pub results_empty: Style,
    pub results_footer: Style,
    pub results_error_title: Style,
    pub results_error_text: Style,

    // Text inputs and forms
    pub input: Style,
    pub input_focused: Style,
    pub label: Style,
    pub muted: Style,
    pub title: Style,

    // Menus and dialogs
    pub menu_item: Style,
    pub menu_selected: Style,
    pub menu_active: Style,
    pub dialog_border: Style,
    pub dialog_danger: Style,

    // Status messages
    pub status_success: Style,
    pub status_error: Style,
    pub status_info: Style,
    pub status_warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // Borders
            border_focused: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            border_unfocused: Style::default().fg(Color::DarkGray),

            // Tabs
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            user_badge: Style::default().fg(Color::Magenta),

            // Query editor
            editor_text: Style::default().fg(Color::White),
            editor_gutter: Style::default().fg(Color::DarkGray),

            // Results table
            results_header: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            results_header_selected: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            results_row_even: Style::default().fg(Color::White),
            results_row_odd: Style::default().fg(Color::Gray),
            results_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow),
            results_null: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            results_empty: Style::default().fg(Color::DarkGray),
            results_footer: Style::default().fg(Color::DarkGray),
            results_error_title: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            results_error_text: Style::default().fg(Color::Red),

            // Inputs
            input: Style::default().fg(Color::Gray),
            input_focused: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Cyan),
            muted: Style::default().fg(Color::DarkGray),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            // Menus and dialogs
            menu_item: Style::default().fg(Color::White),
            menu_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            menu_active: Style::default().fg(Color::Green),
            dialog_border: Style::default().fg(Color::Cyan),
            dialog_danger: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),

            // Status messages
            status_success: Style::default().fg(Color::Green),
            status_error: Style::default().fg(Color::Red),
            status_info: Style::default().fg(Color::Blue),
            status_warning: Style::default().fg(Color::Yellow),
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get border style based on focus
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}
