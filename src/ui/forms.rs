//! Settings page: connection forms and the saved-connection list

use crate::app::{App, PanelFocus};
use crate::connections::{ConnectionForm, FormField};
use crate::ui::layout::settings_layout;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const NAME_LABEL: &str = "Name:              ";
const CONNECTION_STRING_LABEL: &str = "Connection string: ";

pub fn render_settings(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let edit = app.connection_editor.edit_session();
    let layout = settings_layout(area, edit.is_some());
    let context = app.context();

    render_form(
        frame,
        layout.create,
        " New connection ",
        app.connection_editor.create_form(),
        context == PanelFocus::CreateForm,
        theme,
    );

    if let (Some(session), Some(edit_area)) = (edit, layout.edit) {
        let title = match app.store.get(session.target()) {
            Some(profile) => format!(" Edit {} (Esc to cancel) ", profile.name),
            None => " Edit connection ".to_string(),
        };
        render_form(
            frame,
            edit_area,
            &title,
            session.form(),
            context == PanelFocus::EditForm,
            theme,
        );
    }

    render_list(
        frame,
        layout.list,
        app,
        context == PanelFocus::ConnectionList,
        theme,
    );
}

fn render_form(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    form: &ConnectionForm,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let row = |offset: u16| Rect::new(inner.x, inner.y + offset, inner.width, 1);

    form.name().render(
        frame,
        row(0),
        NAME_LABEL,
        focused && form.focus() == FormField::Name,
        theme,
    );
    if inner.height > 1 {
        form.connection_string().render(
            frame,
            row(1),
            CONNECTION_STRING_LABEL,
            focused && form.focus() == FormField::ConnectionString,
            theme,
        );
    }
    if inner.height > 3 {
        frame.render_widget(Paragraph::new(form_message(form, theme)), row(3));
    }
}

/// Error, test outcome or progress line under the fields
fn form_message<'a>(form: &'a ConnectionForm, theme: &Theme) -> Line<'a> {
    if form.is_submitting() {
        return Line::from(Span::styled("Saving...", theme.status_info));
    }
    if let Some(error) = form.error() {
        return Line::from(Span::styled(error, theme.status_error));
    }
    if form.is_testing() {
        return Line::from(Span::styled("Testing connection...", theme.status_info));
    }
    match form.test_outcome() {
        Some(outcome) if outcome.ok => {
            Line::from(Span::styled(outcome.message.as_str(), theme.status_success))
        }
        Some(outcome) => Line::from(Span::styled(outcome.message.as_str(), theme.status_error)),
        None => Line::from(Span::styled("Enter save | Ctrl+T test", theme.muted)),
    }
}

fn render_list(frame: &mut Frame, area: Rect, app: &App, focused: bool, theme: &Theme) {
    let store = &app.store;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Saved connections ({}) ", store.len()))
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    if let Some(error) = store.error() {
        lines.push(Line::from(Span::styled(error, theme.status_error)));
    }
    if store.is_loading() {
        lines.push(Line::from(Span::styled("Loading connections...", theme.muted)));
    } else if store.is_empty() && store.error().is_none() {
        lines.push(Line::from(Span::styled(
            "No saved connections yet. Create one above.",
            theme.muted,
        )));
    }

    let visible = (inner.height as usize).saturating_sub(lines.len());
    let offset = app.list_cursor.saturating_sub(visible.saturating_sub(1));
    let active = store.selection();
    for (idx, profile) in store.profiles().iter().enumerate().skip(offset).take(visible) {
        let marker = if Some(profile.id) == active { "* " } else { "  " };
        let name_style = if focused && idx == app.list_cursor {
            theme.menu_selected
        } else if Some(profile.id) == active {
            theme.menu_active
        } else {
            theme.menu_item
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme.menu_active),
            Span::styled(profile.name.as_str(), name_style),
            Span::raw("  "),
            Span::styled(profile.connection_string.as_str(), theme.muted),
            Span::styled(
                format!("  added {}", profile.created_at.format("%Y-%m-%d %H:%M")),
                theme.muted,
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
