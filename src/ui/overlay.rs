//! Popups drawn over the current page: connection picker, export menu,
//! delete confirmation and alerts.

use crate::app::{App, Overlay};
use crate::connections::DELETE_PROMPT;
use crate::export::ExportFormat;
use crate::ui::layout::{self, centered};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let Some(overlay) = &app.overlay else {
        return;
    };
    match overlay {
        Overlay::Picker { cursor } => render_picker(frame, app, *cursor, theme),
        Overlay::ExportMenu { cursor } => render_export_menu(frame, *cursor, theme),
        Overlay::ConfirmDelete(id) => {
            let name = app
                .store
                .get(*id)
                .map(|p| p.name.as_str())
                .unwrap_or_default();
            let lines = vec![
                Line::from(Span::styled(DELETE_PROMPT, theme.dialog_danger)),
                Line::from(""),
                Line::from(Span::styled(name, theme.title)),
                Line::from(""),
                Line::from(Span::styled("[y] Delete   [n] Cancel", theme.muted)),
            ];
            render_dialog(frame, " Delete connection ", lines, theme);
        }
        Overlay::Alert(message) => {
            let lines = vec![
                Line::from(Span::styled(message.as_str(), theme.status_error)),
                Line::from(""),
                Line::from(Span::styled("Press Enter to dismiss", theme.muted)),
            ];
            render_dialog(frame, " Error ", lines, theme);
        }
    }
}

fn render_picker(frame: &mut Frame, app: &App, cursor: usize, theme: &Theme) {
    let profiles = app.store.profiles();
    let menu = layout::picker_menu(frame.area(), profiles.len());
    if menu.height < 3 {
        return;
    }
    let visible = menu.height.saturating_sub(2) as usize;
    let offset = layout::menu_offset(cursor, visible);
    let active = app.store.selection();

    let lines: Vec<Line> = profiles
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, profile)| {
            let marker = if Some(profile.id) == active { "* " } else { "  " };
            let style = if idx == cursor {
                theme.menu_selected
            } else {
                theme.menu_item
            };
            Line::from(vec![
                Span::styled(marker, theme.menu_active),
                Span::styled(profile.name.as_str(), style),
                Span::raw("  "),
                Span::styled(profile.connection_string.as_str(), theme.muted),
            ])
        })
        .collect();

    frame.render_widget(Clear, menu);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Select connection ")
        .border_style(theme.dialog_border);
    frame.render_widget(Paragraph::new(lines).block(block), menu);
}

fn render_export_menu(frame: &mut Frame, cursor: usize, theme: &Theme) {
    let lines: Vec<Line> = ExportFormat::SECONDARY
        .iter()
        .enumerate()
        .map(|(idx, format)| {
            let style = if idx == cursor {
                theme.menu_selected
            } else {
                theme.menu_item
            };
            Line::from(Span::styled(
                format!(" {} (.{}) ", format.label(), format.extension()),
                style,
            ))
        })
        .collect();
    let area = centered(frame.area(), 30, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Export as ")
        .border_style(theme.dialog_border);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_dialog(frame: &mut Frame, title: &str, lines: Vec<Line>, theme: &Theme) {
    let area = centered(frame.area(), 60, lines.len() as u16 + 4);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(theme.dialog_border);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        area,
    );
}
