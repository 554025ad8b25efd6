//! Panel layout management
//!
//! Pure functions from the terminal area to panel rectangles. The app uses
//! the same functions for mouse hit-testing, so what is drawn and what is
//! clickable always agree.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen split shared by every page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub tabs: Rect,
    pub body: Rect,
    pub status_bar: Rect,
}

/// Console page panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLayout {
    /// "Connection" row holding the picker trigger
    pub picker: Rect,
    pub editor: Rect,
    pub results: Rect,
}

/// Settings page panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsLayout {
    pub create: Rect,
    pub edit: Option<Rect>,
    pub list: Rect,
}

/// Height of a connection form panel: two fields, a message line, borders
const FORM_HEIGHT: u16 = 6;

/// Widest the picker menu gets
const PICKER_MAX_WIDTH: u16 = 72;

pub fn calculate_layout(area: Rect) -> AppLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    AppLayout {
        tabs: chunks[0],
        body: chunks[1],
        status_bar: chunks[2],
    }
}

pub fn console_layout(body: Rect) -> ConsoleLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(35),
            Constraint::Min(4),
        ])
        .split(body);
    ConsoleLayout {
        picker: chunks[0],
        editor: chunks[1],
        results: chunks[2],
    }
}

pub fn settings_layout(body: Rect, editing: bool) -> SettingsLayout {
    if editing {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FORM_HEIGHT),
                Constraint::Length(FORM_HEIGHT),
                Constraint::Min(3),
            ])
            .split(body);
        SettingsLayout {
            create: chunks[0],
            edit: Some(chunks[1]),
            list: chunks[2],
        }
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FORM_HEIGHT), Constraint::Min(3)])
            .split(body);
        SettingsLayout {
            create: chunks[0],
            edit: None,
            list: chunks[1],
        }
    }
}

/// Rectangle of the open connection picker for a terminal of size
/// `viewport`, listing `items` profiles. Anchored under the picker row.
pub fn picker_menu(viewport: Rect, items: usize) -> Rect {
    let console = console_layout(calculate_layout(viewport).body);
    let x = console.picker.x + 1;
    let y = console.picker.bottom().saturating_sub(1);
    let width = console.picker.width.saturating_sub(2).min(PICKER_MAX_WIDTH);
    let available = viewport.bottom().saturating_sub(y + 1);
    let height = (items as u16).saturating_add(2).min(available);
    Rect::new(x, y, width, height)
}

/// First item shown in a menu with `visible` rows so that `cursor` stays
/// on screen
pub fn menu_offset(cursor: usize, visible: usize) -> usize {
    cursor.saturating_sub(visible.saturating_sub(1))
}

/// Index of the item of a bordered menu at terminal cell (`column`, `row`),
/// given the menu scrolled to `offset`. `None` on the border or outside.
pub fn menu_item_at(
    menu: Rect,
    items: usize,
    offset: usize,
    column: u16,
    row: u16,
) -> Option<usize> {
    let inner = Rect::new(
        menu.x + 1,
        menu.y + 1,
        menu.width.saturating_sub(2),
        menu.height.saturating_sub(2),
    );
    if !contains(inner, column, row) {
        return None;
    }
    let idx = offset + (row - inner.y) as usize;
    (idx < items).then_some(idx)
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

/// A `width` x `height` rectangle centered in `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_layout() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = calculate_layout(area);
        assert_eq!(layout.tabs.height, 1);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.body.height, 48);
    }

    #[test]
    fn test_console_layout_fills_body() {
        let body = Rect::new(0, 1, 100, 48);
        let console = console_layout(body);
        assert_eq!(console.picker.height, 3);
        assert_eq!(
            console.picker.height + console.editor.height + console.results.height,
            48
        );
    }

    #[test]
    fn test_settings_layout_edit_panel() {
        let body = Rect::new(0, 1, 100, 48);
        assert!(settings_layout(body, false).edit.is_none());
        let layout = settings_layout(body, true);
        assert_eq!(layout.edit.map(|r| r.height), Some(FORM_HEIGHT));
    }

    #[test]
    fn test_picker_menu_under_trigger() {
        let viewport = Rect::new(0, 0, 100, 40);
        let menu = picker_menu(viewport, 3);
        // tabs row 0, picker rows 1..4
        assert_eq!(menu.y, 3);
        assert_eq!(menu.height, 5);
        assert_eq!(menu.width, PICKER_MAX_WIDTH);
    }

    #[test]
    fn test_picker_menu_clamped_to_screen() {
        let viewport = Rect::new(0, 0, 40, 10);
        let menu = picker_menu(viewport, 50);
        assert!(menu.bottom() <= viewport.bottom());
    }

    #[test]
    fn test_menu_item_hit_testing() {
        let menu = Rect::new(1, 3, 30, 5);
        assert_eq!(menu_item_at(menu, 3, 0, 5, 4), Some(0));
        assert_eq!(menu_item_at(menu, 3, 0, 5, 6), Some(2));
        // border row
        assert_eq!(menu_item_at(menu, 3, 0, 5, 3), None);
        // outside
        assert_eq!(menu_item_at(menu, 3, 0, 50, 4), None);
    }

    #[test]
    fn test_menu_item_hit_testing_scrolled() {
        let menu = Rect::new(0, 0, 20, 4);
        // two visible rows, cursor on the last of five items
        let offset = menu_offset(4, 2);
        assert_eq!(offset, 3);
        assert_eq!(menu_item_at(menu, 5, offset, 2, 1), Some(3));
        assert_eq!(menu_item_at(menu, 5, offset, 2, 2), Some(4));
    }

    #[test]
    fn test_centered() {
        let r = centered(Rect::new(0, 0, 100, 50), 40, 10);
        assert_eq!(r, Rect::new(30, 20, 40, 10));
        let r = centered(Rect::new(0, 0, 20, 5), 40, 10);
        assert_eq!(r, Rect::new(0, 0, 20, 5));
    }
}
