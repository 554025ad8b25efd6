//! Top-level render function
//!
//! Orchestrates rendering of all panels using the layout module.

use crate::app::{App, Page, PanelFocus, StatusLevel};
use crate::ui::layout::{calculate_layout, console_layout};
use crate::ui::results::ResultsView;
use crate::ui::theme::Theme;
use crate::ui::{forms, login, overlay};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Render the entire application
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;

    if !app.session.is_authenticated() {
        login::render(frame, frame.area(), &app.auth, theme);
        return;
    }

    let layout = calculate_layout(frame.area());
    render_tabs(frame, layout.tabs, app, theme);
    match app.page {
        Page::Console => render_console(frame, layout.body, app, theme),
        Page::Settings => forms::render_settings(frame, layout.body, app, theme),
    }
    render_status_bar(frame, layout.status_bar, app, theme);
    overlay::render(frame, app, theme);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let tab = |label: &'static str, page: Page| {
        let style = if app.page == page {
            theme.tab_active
        } else {
            theme.tab_inactive
        };
        Span::styled(label, style)
    };
    let tabs = Line::from(vec![
        tab(" F1 Console ", Page::Console),
        Span::raw(" "),
        tab(" F2 Settings ", Page::Settings),
    ]);
    frame.render_widget(Paragraph::new(tabs), area);

    if let Some(session) = app.session.session() {
        let badge = format!("{} | F10 sign out ", session.user.full_name);
        frame.render_widget(
            Paragraph::new(Span::styled(badge, theme.user_badge)).alignment(Alignment::Right),
            area,
        );
    }
}

fn render_console(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let layout = console_layout(area);
    let context = app.context();

    // Connection picker trigger
    let picker_block = Block::default()
        .borders(Borders::ALL)
        .title(" Connection ")
        .border_style(theme.border_style(context == PanelFocus::Picker));
    let picker_inner = picker_block.inner(layout.picker);
    frame.render_widget(picker_block, layout.picker);
    frame.render_widget(Paragraph::new(picker_line(app, theme)), picker_inner);

    // Editor
    let mut editor_title = String::from(" Query ");
    if app.console.is_running() {
        editor_title.push_str("[running] ");
    }
    let editor_focused = context == PanelFocus::QueryEditor;
    let editor_block = Block::default()
        .borders(Borders::ALL)
        .title(editor_title)
        .title_bottom(Line::from(" Ctrl+Enter / F5 run ").style(theme.muted))
        .border_style(theme.border_style(editor_focused));
    let editor_inner = editor_block.inner(layout.editor);
    frame.render_widget(editor_block, layout.editor);
    app.console
        .editor
        .render(frame, editor_inner, editor_focused, theme);

    // Results
    let results_focused = context == PanelFocus::ResultsViewer;
    let mut results_block = Block::default()
        .borders(Borders::ALL)
        .title(results_title(app))
        .border_style(theme.border_style(results_focused));
    if app.console.can_export() {
        results_block = results_block
            .title_bottom(Line::from(" e export CSV | x more formats ").style(theme.muted));
    }
    let mut results_inner = results_block.inner(layout.results);
    frame.render_widget(results_block, layout.results);

    let view = match (app.console.result(), app.console.error()) {
        _ if app.console.is_running() => ResultsView::Running,
        (Some(result), Some(error)) => {
            // A rejected run keeps the previous result below its message
            frame.render_widget(
                Paragraph::new(Span::styled(error, theme.results_error_text)),
                Rect::new(results_inner.x, results_inner.y, results_inner.width, 1),
            );
            results_inner.y += 1;
            results_inner.height = results_inner.height.saturating_sub(1);
            ResultsView::Result(result)
        }
        (Some(result), None) => ResultsView::Result(result),
        (None, Some(error)) => ResultsView::Error(error),
        (None, None) => ResultsView::Empty,
    };
    app.results_viewer
        .render(frame, results_inner, view, results_focused, theme);
}

/// Contents of the picker trigger row
fn picker_line<'a>(app: &'a App, theme: &Theme) -> Line<'a> {
    if app.store.is_loading() {
        return Line::from(Span::styled("Loading connections...", theme.muted));
    }
    if let Some(error) = app.store.error() {
        return Line::from(Span::styled(error, theme.status_error));
    }
    match app.store.active() {
        Some(profile) => Line::from(vec![
            Span::styled(profile.name.as_str(), theme.title),
            Span::raw("  "),
            Span::styled(profile.connection_string.as_str(), theme.muted),
            Span::styled("  (Ctrl+O to change)", theme.muted),
        ]),
        None => Line::from(Span::styled(
            "No connections yet. Add one on the Settings page (F2).",
            theme.muted,
        )),
    }
}

fn results_title(app: &App) -> String {
    match app.console.result() {
        Some(result) if !app.console.is_running() => format!(
            " Results | {} | {} rows ",
            app.result_connection_label(),
            result.row_count
        ),
        _ => " Results ".to_string(),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    if let Some(ref status) = app.status_message {
        let style = match status.level {
            StatusLevel::Info => theme.status_info,
            StatusLevel::Success => theme.status_success,
            StatusLevel::Warning => theme.status_warning,
            StatusLevel::Error => theme.status_error,
        };
        frame.render_widget(Paragraph::new(status.message.as_str()).style(style), area);
        return;
    }

    let hint = match app.context() {
        PanelFocus::QueryEditor => "Ctrl+Enter run | Ctrl+O connection | Tab results | Ctrl+Q quit",
        PanelFocus::ResultsViewer => "hjkl move | e CSV | x JSON/YAML | Tab editor | Ctrl+Q quit",
        PanelFocus::CreateForm | PanelFocus::EditForm => {
            "Enter save | Ctrl+T test | Up/Down field | Tab next panel"
        }
        PanelFocus::ConnectionList => "Enter edit | d delete | s use | Ctrl+R reload",
        PanelFocus::Picker | PanelFocus::ExportMenu => "Enter choose | Esc close",
        PanelFocus::Confirm => "y confirm | n cancel",
        PanelFocus::Alert => "Enter dismiss",
        PanelFocus::Auth => "",
    };
    frame.render_widget(Paragraph::new(hint).style(theme.muted), area);
}
