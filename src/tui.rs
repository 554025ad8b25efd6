//! Terminal lifecycle and the main event loop
//!
//! Terminal input (crossterm `EventStream`) and gateway completions (an
//! unbounded channel fed by the `Dispatcher`) are merged with
//! `tokio::select!` into a single stream of `AppEvent`s. Mouse reporting is
//! switched on only while the app asks for it.

use crate::app::{Action, App, AppEvent};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ui::render::render;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
    EventStream, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io::{self, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Raw-mode alternate-screen terminal
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    mouse_captured: bool,
    /// Modified keys (Ctrl+Enter) are reported unambiguously
    keyboard_enhanced: bool,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
        install_panic_hook(keyboard_enhanced);
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        if keyboard_enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }
        debug!(keyboard_enhanced, "terminal entered");
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            mouse_captured: false,
            keyboard_enhanced,
        })
    }

    pub fn restore(&mut self) -> Result<()> {
        if self.keyboard_enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Turn mouse reporting on or off to match `wanted`
    fn sync_mouse(&mut self, wanted: bool) -> Result<()> {
        if wanted == self.mouse_captured {
            return Ok(());
        }
        if wanted {
            execute!(self.terminal.backend_mut(), EnableMouseCapture)?;
        } else {
            execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        }
        self.mouse_captured = wanted;
        Ok(())
    }
}

/// Restore the terminal before the default hook prints the panic
fn install_panic_hook(keyboard_enhanced: bool) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if keyboard_enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        previous(panic_info);
    }));
}

/// Run the application until it quits. `initial` is dispatched before the
/// first event (the connection refresh of a restored session).
pub async fn run(app: &mut App, dispatcher: &Dispatcher, initial: Action) -> Result<()> {
    let mut tui = Tui::enter()?;
    let result = event_loop(&mut tui, app, dispatcher, initial).await;
    let restored = tui.restore();
    result?;
    restored
}

async fn event_loop(
    tui: &mut Tui,
    app: &mut App,
    dispatcher: &Dispatcher,
    initial: Action,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let size = tui.terminal.size()?;
    app.viewport = Rect::new(0, 0, size.width, size.height);
    dispatcher.spawn(initial, tx.clone());

    let mut events = EventStream::new();
    info!("event loop started");

    while app.running {
        tui.sync_mouse(app.wants_mouse())?;
        tui.terminal.draw(|frame| render(frame, app))?;

        let event = tokio::select! {
            maybe = events.next() => match maybe {
                Some(Ok(event)) => match translate(event) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = rx.recv() => event,
        };

        match app.handle_event(event)? {
            Action::Quit => app.running = false,
            action => dispatcher.spawn(action, tx.clone()),
        }
    }

    debug!("event loop finished");
    Ok(())
}

/// Map a terminal event to an app event. Focus changes are ignored.
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(width, height) => Some(AppEvent::Resize(width, height)),
        Event::Paste(data) => Some(AppEvent::Paste(data)),
        Event::FocusGained | Event::FocusLost => None,
    }
}
