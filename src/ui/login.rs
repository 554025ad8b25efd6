//! Sign-in / sign-up screen shown while no session is active

use crate::auth::{AuthForm, AuthMode};
use crate::ui::layout::centered;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const FORM_WIDTH: u16 = 64;
const LABEL_WIDTH: usize = 16;

pub fn render(frame: &mut Frame, area: Rect, form: &AuthForm, theme: &Theme) {
    let mode = form.mode();
    let fields = mode.fields();
    // title, blank, fields, blank, message, hint + borders
    let height = fields.len() as u16 + 7;
    let dialog = centered(area, FORM_WIDTH, height);

    frame.render_widget(Clear, dialog);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" querydeck ")
        .border_style(theme.dialog_border);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);
    if inner.height < 2 {
        return;
    }

    let row = |offset: u16| Rect::new(inner.x + 1, inner.y + offset, inner.width.saturating_sub(2), 1);

    frame.render_widget(
        Paragraph::new(Span::styled(mode.title(), theme.title)),
        row(0),
    );

    for (i, field) in fields.iter().enumerate() {
        let y = 2 + i as u16;
        if y >= inner.height {
            break;
        }
        let label = format!("{:<LABEL_WIDTH$}", format!("{}:", field.label()));
        form.input(*field)
            .render(frame, row(y), &label, form.focus() == *field, theme);
    }

    let message_row = fields.len() as u16 + 3;
    if message_row < inner.height {
        let message = if form.is_submitting() {
            Span::styled(
                match mode {
                    AuthMode::Login => "Signing in...",
                    AuthMode::Signup => "Creating account...",
                },
                theme.status_info,
            )
        } else if let Some(error) = form.error() {
            Span::styled(error, theme.status_error)
        } else {
            Span::raw("")
        };
        frame.render_widget(Paragraph::new(message), row(message_row));
    }

    let hint_row = message_row + 1;
    if hint_row < inner.height {
        let switch = match mode {
            AuthMode::Login => "Ctrl+N create an account",
            AuthMode::Signup => "Ctrl+N sign in instead",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Enter submit | Tab next field | {switch} | Ctrl+Q quit"),
                theme.muted,
            )),
            row(hint_row),
        );
    }
}
