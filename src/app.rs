//! Application state machine
//!
//! `App` owns every component's state. Terminal input and gateway
//! completions arrive as `AppEvent`s; handlers update state synchronously
//! and return an `Action` describing the side effect to perform next (a
//! gateway call or an export). Nothing in here does I/O.

use crate::api::{
    ConnectionDraft, ConnectionId, ConnectionProfile, QueryResult, Session, SqlRequest, TestOutcome,
};
use crate::auth::{AuthForm, AuthMode, AuthRequest};
use crate::config::Settings;
use crate::connections::{ConnectionEditor, ConnectionForm, ConnectionStore, FormField, FormKind};
use crate::console::{QueryConsole, RunRejected};
use crate::error::Result;
use crate::export::ExportFormat;
use crate::keymap::{KeyAction, KeyMap};
use crate::session::SessionController;
use crate::ticket::{Ticket, TicketIssuer};
use crate::ui::layout;
use crate::ui::results::ResultsViewer;
use crate::ui::theme::Theme;
use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;
use tracing::{debug, info};

/// Full-screen views available once signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Console,
    Settings,
}

/// Keyboard context: the focused panel, or the overlay / gate in front of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelFocus {
    Auth,
    QueryEditor,
    ResultsViewer,
    CreateForm,
    EditForm,
    ConnectionList,
    Picker,
    ExportMenu,
    Confirm,
    Alert,
}

impl PanelFocus {
    /// Contexts in which global bindings other than quit are suppressed
    pub fn is_modal(self) -> bool {
        matches!(
            self,
            PanelFocus::Auth
                | PanelFocus::Picker
                | PanelFocus::ExportMenu
                | PanelFocus::Confirm
                | PanelFocus::Alert
        )
    }
}

/// Popups drawn over the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Connection picker with the highlighted row
    Picker { cursor: usize },
    /// Secondary export formats with the highlighted row
    ExportMenu { cursor: usize },
    /// Waiting for the user to confirm deleting a profile
    ConfirmDelete(ConnectionId),
    /// Blocking notification that must be dismissed
    Alert(String),
}

/// Status message with severity level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
    pub level: StatusLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Application events from the event loop
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event
    Key(KeyEvent),
    /// Mouse input (only captured while the picker is open)
    Mouse(MouseEvent),
    /// Terminal resize event
    Resize(u16, u16),
    /// Bracketed paste event
    Paste(String),
    AuthCompleted {
        ticket: Ticket,
        result: std::result::Result<Session, String>,
    },
    ConnectionsLoaded {
        ticket: Ticket,
        result: std::result::Result<Vec<ConnectionProfile>, String>,
    },
    ConnectionCreated {
        ticket: Ticket,
        result: std::result::Result<ConnectionProfile, String>,
    },
    ConnectionUpdated {
        ticket: Ticket,
        result: std::result::Result<ConnectionProfile, String>,
    },
    ConnectionDeleted {
        ticket: Ticket,
        id: ConnectionId,
        result: std::result::Result<(), String>,
    },
    ConnectionTested {
        ticket: Ticket,
        form: FormKind,
        outcome: TestOutcome,
    },
    QueryCompleted {
        ticket: Ticket,
        result: std::result::Result<QueryResult, String>,
    },
    /// An export was written (path) or failed (message)
    ExportFinished {
        ticket: Ticket,
        result: std::result::Result<PathBuf, String>,
    },
}

/// Actions returned by event handlers for the main loop to execute
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    Authenticate {
        ticket: Ticket,
        request: AuthRequest,
    },
    LoadConnections {
        ticket: Ticket,
    },
    CreateConnection {
        ticket: Ticket,
        draft: ConnectionDraft,
    },
    UpdateConnection {
        ticket: Ticket,
        id: ConnectionId,
        draft: ConnectionDraft,
    },
    DeleteConnection {
        ticket: Ticket,
        id: ConnectionId,
    },
    TestConnection {
        ticket: Ticket,
        form: FormKind,
        connection_string: String,
    },
    ExecuteQuery {
        ticket: Ticket,
        request: SqlRequest,
    },
    Export {
        ticket: Ticket,
        format: ExportFormat,
        content: String,
    },
}

/// Main application state
pub struct App {
    pub session: SessionController,
    pub auth: AuthForm,
    pub store: ConnectionStore,
    pub connection_editor: ConnectionEditor,
    pub console: QueryConsole,
    pub results_viewer: ResultsViewer,

    pub page: Page,
    /// Focused panel on the current page
    pub focus: PanelFocus,
    pub overlay: Option<Overlay>,
    /// Highlighted row of the connection list on the settings page
    pub list_cursor: usize,

    /// Data-driven keybinding configuration
    pub keymap: KeyMap,
    /// UI theme (created once, reused every frame)
    pub theme: Theme,
    pub status_message: Option<StatusMessage>,
    /// Last known terminal size, for mouse hit-testing
    pub viewport: Rect,

    issuer: TicketIssuer,

    /// Whether the application is running
    pub running: bool,
}

impl App {
    pub fn new(session: SessionController, settings: &Settings) -> Self {
        Self {
            session,
            auth: AuthForm::new(),
            store: ConnectionStore::new(),
            connection_editor: ConnectionEditor::new(),
            console: QueryConsole::new(&settings.default_query),
            results_viewer: ResultsViewer::new(),
            page: Page::Console,
            focus: PanelFocus::QueryEditor,
            overlay: None,
            list_cursor: 0,
            keymap: KeyMap::default(),
            theme: Theme::default(),
            status_message: None,
            viewport: Rect::new(0, 0, 80, 24),
            issuer: TicketIssuer::new(),
            running: true,
        }
    }

    /// Effective keyboard context
    pub fn context(&self) -> PanelFocus {
        if !self.session.is_authenticated() {
            return PanelFocus::Auth;
        }
        match self.overlay {
            Some(Overlay::Picker { .. }) => PanelFocus::Picker,
            Some(Overlay::ExportMenu { .. }) => PanelFocus::ExportMenu,
            Some(Overlay::ConfirmDelete(_)) => PanelFocus::Confirm,
            Some(Overlay::Alert(_)) => PanelFocus::Alert,
            None => self.focus,
        }
    }

    /// Whether the terminal should report mouse events. True only while
    /// the picker is open, so clicks outside it can dismiss it.
    pub fn wants_mouse(&self) -> bool {
        matches!(self.overlay, Some(Overlay::Picker { .. }))
    }

    /// Handle an application event and return resulting action
    pub fn handle_event(&mut self, event: AppEvent) -> Result<Action> {
        let action = match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Action::None
            }
            AppEvent::Resize(width, height) => {
                self.viewport = Rect::new(0, 0, width, height);
                Action::None
            }
            AppEvent::Paste(data) => {
                self.handle_paste(&data);
                Action::None
            }
            AppEvent::AuthCompleted { ticket, result } => self.on_auth_completed(ticket, result),
            AppEvent::ConnectionsLoaded { ticket, result } => {
                if self.is_current(ticket) && self.store.finish_refresh(ticket, result) {
                    self.after_store_change();
                }
                Action::None
            }
            AppEvent::ConnectionCreated { ticket, result } => {
                self.on_connection_created(ticket, result);
                Action::None
            }
            AppEvent::ConnectionUpdated { ticket, result } => {
                self.on_connection_updated(ticket, result);
                Action::None
            }
            AppEvent::ConnectionDeleted { ticket, id, result } => {
                self.on_connection_deleted(ticket, id, result);
                Action::None
            }
            AppEvent::ConnectionTested {
                ticket,
                form,
                outcome,
            } => {
                if self.is_current(ticket) {
                    self.connection_editor.finish_test(form, ticket, outcome);
                }
                Action::None
            }
            AppEvent::QueryCompleted { ticket, result } => {
                self.on_query_completed(ticket, result);
                Action::None
            }
            AppEvent::ExportFinished { ticket, result } => {
                if self.is_current(ticket) {
                    self.on_export_finished(result);
                }
                Action::None
            }
        };
        Ok(action)
    }

    /// Whether `ticket` was issued in the current session epoch
    fn is_current(&self, ticket: Ticket) -> bool {
        let current = self.issuer.is_current_epoch(ticket);
        if !current {
            debug!(ticket = ticket.value(), "dropping completion from a previous session");
        }
        current
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind == KeyEventKind::Release {
            return Action::None;
        }
        self.status_message = None;
        let context = self.context();

        if let Some(key_action) = self.keymap.resolve(context, key) {
            // Suppress global actions in modal contexts so the key neither
            // acts nor falls through to a text input.
            if key_action.is_global() && key_action != KeyAction::Quit && context.is_modal() {
                if context == PanelFocus::Auth {
                    match key_action {
                        KeyAction::CycleFocus => self.auth.focus_next(),
                        KeyAction::CycleFocusReverse => self.auth.focus_prev(),
                        _ => {}
                    }
                }
                return Action::None;
            }
            return self.execute_key_action(context, key_action);
        }

        // Fall through to text input
        match context {
            PanelFocus::Auth => {
                self.auth.handle_key(key);
            }
            PanelFocus::QueryEditor => {
                self.console.editor.handle_key(key);
            }
            PanelFocus::CreateForm | PanelFocus::EditForm => {
                if let Some(form) = self.focused_form_mut() {
                    form.handle_key(key);
                }
            }
            _ => {}
        }
        Action::None
    }

    fn execute_key_action(&mut self, context: PanelFocus, action: KeyAction) -> Action {
        match action {
            // ── Global ───────────────────────────────────────
            KeyAction::Quit => return Action::Quit,
            KeyAction::ShowConsole => self.show_page(Page::Console),
            KeyAction::ShowSettings => self.show_page(Page::Settings),
            KeyAction::CycleFocus => self.cycle_focus(true),
            KeyAction::CycleFocusReverse => self.cycle_focus(false),
            KeyAction::RefreshConnections => return self.refresh_connections(),
            KeyAction::OpenPicker => self.open_picker(),
            KeyAction::Logout => {
                self.logout();
            }

            // ── Console ──────────────────────────────────────
            KeyAction::ExecuteQuery => return self.run_query(),
            KeyAction::ExportPrimary => return self.export(ExportFormat::PRIMARY),
            KeyAction::OpenExportMenu => self.open_export_menu(),

            // ── Navigation ───────────────────────────────────
            KeyAction::MoveUp
            | KeyAction::MoveDown
            | KeyAction::MoveLeft
            | KeyAction::MoveRight
            | KeyAction::PageUp
            | KeyAction::PageDown
            | KeyAction::GoToTop
            | KeyAction::GoToBottom
            | KeyAction::Home
            | KeyAction::End => self.navigate(context, action),

            // ── Connection list ──────────────────────────────
            KeyAction::EditConnection => {
                if let Some(id) = self.highlighted_connection() {
                    self.start_edit(id);
                }
            }
            KeyAction::DeleteConnection => {
                if let Some(id) = self.highlighted_connection() {
                    self.request_delete(id);
                }
            }
            KeyAction::SelectConnection => {
                if let Some(id) = self.highlighted_connection() {
                    self.select_connection(id);
                }
            }

            // ── Forms ────────────────────────────────────────
            KeyAction::NextField | KeyAction::PrevField => {
                if context == PanelFocus::Auth {
                    if action == KeyAction::NextField {
                        self.auth.focus_next();
                    } else {
                        self.auth.focus_prev();
                    }
                } else if let Some(form) = self.focused_form_mut() {
                    let next = form.focus().toggle();
                    form.set_focus(next);
                }
            }
            KeyAction::TestConnection => {
                if let Some(kind) = form_kind(context) {
                    return self.test_connection(kind);
                }
            }
            KeyAction::CancelEdit => self.cancel_edit(),
            KeyAction::ToggleAuthMode => self.auth.toggle_mode(),

            // ── Modal ────────────────────────────────────────
            KeyAction::Submit => return self.submit(context),
            KeyAction::Confirm => return self.confirm_delete(),
            KeyAction::Dismiss => self.dismiss_overlay(),
        }
        Action::None
    }

    /// Enter in a context that submits something
    fn submit(&mut self, context: PanelFocus) -> Action {
        match context {
            PanelFocus::Auth => self.submit_auth(),
            PanelFocus::CreateForm => self.submit_create(),
            PanelFocus::EditForm => self.submit_update(),
            PanelFocus::Picker => {
                if let Some(Overlay::Picker { cursor }) = self.overlay
                    && let Some(profile) = self.store.profiles().get(cursor)
                {
                    let id = profile.id;
                    self.select_connection(id);
                }
                Action::None
            }
            PanelFocus::ExportMenu => {
                if let Some(Overlay::ExportMenu { cursor }) = self.overlay
                    && let Some(format) = ExportFormat::SECONDARY.get(cursor).copied()
                {
                    return self.export(format);
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn navigate(&mut self, context: PanelFocus, action: KeyAction) {
        match context {
            PanelFocus::ResultsViewer => {
                let viewer = &mut self.results_viewer;
                match action {
                    KeyAction::MoveUp => viewer.move_up(),
                    KeyAction::MoveDown => viewer.move_down(),
                    KeyAction::MoveLeft => viewer.move_left(),
                    KeyAction::MoveRight => viewer.move_right(),
                    KeyAction::PageUp => viewer.page_up(),
                    KeyAction::PageDown => viewer.page_down(),
                    KeyAction::GoToTop => viewer.go_to_top(),
                    KeyAction::GoToBottom => viewer.go_to_bottom(),
                    KeyAction::Home => viewer.go_to_home(),
                    KeyAction::End => viewer.go_to_end(),
                    _ => {}
                }
            }
            PanelFocus::ConnectionList => {
                let len = self.store.len();
                self.list_cursor = step(self.list_cursor, len, action);
            }
            PanelFocus::Picker => {
                let len = self.store.len();
                if let Some(Overlay::Picker { cursor }) = &mut self.overlay {
                    *cursor = step(*cursor, len, action);
                }
            }
            PanelFocus::ExportMenu => {
                let len = ExportFormat::SECONDARY.len();
                if let Some(Overlay::ExportMenu { cursor }) = &mut self.overlay {
                    *cursor = step(*cursor, len, action);
                }
            }
            _ => {}
        }
    }

    fn handle_paste(&mut self, data: &str) {
        match self.context() {
            PanelFocus::Auth => self.auth.paste(data),
            PanelFocus::QueryEditor => self.console.editor.insert_text(data),
            PanelFocus::CreateForm | PanelFocus::EditForm => {
                if let Some(form) = self.focused_form_mut() {
                    form.paste(data);
                }
            }
            _ => {}
        }
    }

    /// Left click while the picker is open: an item selects it, anywhere
    /// outside the menu closes it.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.wants_mouse() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some(Overlay::Picker { cursor }) = self.overlay else {
            return;
        };
        let items = self.store.len();
        let menu = layout::picker_menu(self.viewport, items);
        let offset = layout::menu_offset(cursor, menu.height.saturating_sub(2) as usize);
        if let Some(idx) = layout::menu_item_at(menu, items, offset, mouse.column, mouse.row) {
            if let Some(id) = self.store.profiles().get(idx).map(|p| p.id) {
                self.select_connection(id);
            }
        } else if !layout::contains(menu, mouse.column, mouse.row) {
            self.close_picker();
        }
    }

    // ── Session ──────────────────────────────────────────────

    /// Re-establish a persisted session at startup
    pub fn restore_session(&mut self) -> Action {
        if self.session.restore() {
            self.refresh_connections()
        } else {
            Action::None
        }
    }

    pub fn submit_auth(&mut self) -> Action {
        match self.auth.begin_submit(&mut self.issuer) {
            Some((ticket, request)) => Action::Authenticate { ticket, request },
            None => Action::None,
        }
    }

    fn on_auth_completed(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<Session, String>,
    ) -> Action {
        if !self.is_current(ticket) {
            return Action::None;
        }
        match self.auth.finish_submit(ticket, result) {
            Some(session) => {
                self.session.start(session);
                self.page = Page::Console;
                self.focus = PanelFocus::QueryEditor;
                self.refresh_connections()
            }
            None => Action::None,
        }
    }

    /// Total reset back to the sign-in screen. Returns false when there was
    /// nothing to do (no session, or a logout already in progress).
    pub fn logout(&mut self) -> bool {
        if !self.session.begin_logout() {
            return false;
        }
        // Every completion still in flight now belongs to a dead session
        self.issuer.new_epoch();
        self.page = Page::Console;
        self.focus = PanelFocus::QueryEditor;
        self.overlay = None;
        self.auth.reset();
        self.store.clear();
        self.connection_editor.reset();
        self.console.reset();
        self.results_viewer.clear();
        self.list_cursor = 0;
        self.status_message = None;
        self.session.finish_logout();
        info!("logged out");
        true
    }

    // ── Connection store ─────────────────────────────────────

    pub fn refresh_connections(&mut self) -> Action {
        if !self.session.is_authenticated() {
            return Action::None;
        }
        let ticket = self.store.begin_refresh(&mut self.issuer);
        Action::LoadConnections { ticket }
    }

    pub fn select_connection(&mut self, id: ConnectionId) {
        if !self.store.select(id) {
            return;
        }
        if let Some(message) = self.store.get(id).map(|p| format!("Using {}", p.name)) {
            self.set_status(message, StatusLevel::Info);
        }
        self.close_picker();
    }

    pub fn submit_create(&mut self) -> Action {
        match self.connection_editor.begin_create(&mut self.issuer) {
            Some((ticket, draft)) => Action::CreateConnection { ticket, draft },
            None => Action::None,
        }
    }

    fn on_connection_created(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<ConnectionProfile, String>,
    ) {
        if !self.is_current(ticket) {
            return;
        }
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        if !self.connection_editor.finish_create(ticket, outcome) {
            return;
        }
        if let Ok(profile) = result {
            self.set_status(format!("Saved {}", profile.name), StatusLevel::Success);
            self.store.apply_created(profile);
            self.after_store_change();
        }
    }

    /// Begin editing `id`. Ignored for ids not in the collection.
    pub fn start_edit(&mut self, id: ConnectionId) -> bool {
        let Some(profile) = self.store.get(id) else {
            return false;
        };
        self.connection_editor.start_edit(profile);
        self.page = Page::Settings;
        self.focus = PanelFocus::EditForm;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.connection_editor.cancel_edit();
        self.fix_focus();
    }

    pub fn submit_update(&mut self) -> Action {
        match self.connection_editor.begin_update(&mut self.issuer) {
            Some((ticket, id, draft)) => Action::UpdateConnection { ticket, id, draft },
            None => Action::None,
        }
    }

    fn on_connection_updated(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<ConnectionProfile, String>,
    ) {
        if !self.is_current(ticket) {
            return;
        }
        // The server accepted the change even if the edit was abandoned
        let outcome = match result {
            Ok(profile) => {
                if self.store.apply_updated(profile.clone()) {
                    self.set_status(format!("Updated {}", profile.name), StatusLevel::Success);
                }
                Ok(())
            }
            Err(message) => Err(message),
        };
        if self.connection_editor.finish_update(ticket, outcome) {
            self.fix_focus();
        }
    }

    /// Ask for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: ConnectionId) {
        if self.store.contains(id) {
            self.overlay = Some(Overlay::ConfirmDelete(id));
        }
    }

    /// Dispatch the delete awaiting confirmation
    pub fn confirm_delete(&mut self) -> Action {
        let Some(Overlay::ConfirmDelete(id)) = self.overlay else {
            return Action::None;
        };
        self.overlay = None;
        let ticket = self.issuer.issue();
        Action::DeleteConnection { ticket, id }
    }

    fn on_connection_deleted(
        &mut self,
        ticket: Ticket,
        id: ConnectionId,
        result: std::result::Result<(), String>,
    ) {
        if !self.is_current(ticket) {
            return;
        }
        match result {
            Ok(()) => {
                if self.store.apply_deleted(id) {
                    self.set_status("Connection deleted".to_string(), StatusLevel::Success);
                }
                self.after_store_change();
            }
            Err(message) => {
                self.overlay = Some(Overlay::Alert(message));
            }
        }
    }

    pub fn test_connection(&mut self, form: FormKind) -> Action {
        match self.connection_editor.begin_test(form, &mut self.issuer) {
            Some((ticket, connection_string)) => Action::TestConnection {
                ticket,
                form,
                connection_string,
            },
            None => Action::None,
        }
    }

    /// Reconcile everything that depends on the collection
    fn after_store_change(&mut self) {
        self.connection_editor.reconcile(&self.store);
        let last = self.store.len().saturating_sub(1);
        if self.store.is_empty() {
            self.close_picker();
        } else if let Some(Overlay::Picker { cursor }) = &mut self.overlay {
            *cursor = (*cursor).min(last);
        }
        self.list_cursor = self.list_cursor.min(last);
        self.fix_focus();
    }

    // ── Console ──────────────────────────────────────────────

    pub fn run_query(&mut self) -> Action {
        match self.console.begin_run(self.store.selection(), &mut self.issuer) {
            Ok((ticket, request)) => {
                self.results_viewer.clear();
                Action::ExecuteQuery { ticket, request }
            }
            Err(RunRejected::AlreadyRunning) => Action::None,
            Err(RunRejected::Invalid(message)) => {
                self.set_status(message.to_string(), StatusLevel::Warning);
                Action::None
            }
        }
    }

    fn on_query_completed(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<QueryResult, String>,
    ) {
        if !self.is_current(ticket) {
            return;
        }
        let status = match &result {
            Ok(r) => (format!("{} rows", r.row_count), StatusLevel::Success),
            Err(_) => ("Query failed".to_string(), StatusLevel::Error),
        };
        if self.console.finish_run(ticket, result) {
            if let Some(r) = self.console.result() {
                self.results_viewer.load(r);
            }
            self.set_status(status.0, status.1);
        }
    }

    /// Label of the connection the current result came from
    pub fn result_connection_label(&self) -> &str {
        self.console
            .target()
            .and_then(|id| self.store.get(id))
            .map(|p| p.name.as_str())
            .unwrap_or(crate::console::UNKNOWN_CONNECTION)
    }

    // ── Export ───────────────────────────────────────────────

    fn on_export_finished(&mut self, result: std::result::Result<PathBuf, String>) {
        match result {
            Ok(path) => self.set_status(
                format!("Exported to {}", path.display()),
                StatusLevel::Success,
            ),
            Err(message) => {
                self.set_status(format!("Export failed: {message}"), StatusLevel::Error)
            }
        }
    }

    pub fn export(&mut self, format: ExportFormat) -> Action {
        if matches!(self.overlay, Some(Overlay::ExportMenu { .. })) {
            self.overlay = None;
        }
        let Some(result) = self.console.result().filter(|r| r.is_exportable()) else {
            self.set_status("No rows to export".to_string(), StatusLevel::Warning);
            return Action::None;
        };
        match format.render(result) {
            Ok(content) => Action::Export {
                ticket: self.issuer.issue(),
                format,
                content,
            },
            Err(e) => {
                self.set_status(e.to_string(), StatusLevel::Error);
                Action::None
            }
        }
    }

    pub fn open_export_menu(&mut self) {
        if self.console.can_export() {
            self.overlay = Some(Overlay::ExportMenu { cursor: 0 });
        } else {
            self.set_status("No rows to export".to_string(), StatusLevel::Warning);
        }
    }

    // ── Overlays and focus ───────────────────────────────────

    /// Open the connection picker. Unavailable while the collection is
    /// empty or loading.
    pub fn open_picker(&mut self) {
        if self.store.is_empty() || self.store.is_loading() {
            self.set_status("No connections available.".to_string(), StatusLevel::Warning);
            return;
        }
        self.page = Page::Console;
        let cursor = self
            .store
            .selection()
            .and_then(|id| self.store.position(id))
            .unwrap_or(0);
        self.overlay = Some(Overlay::Picker { cursor });
    }

    pub fn close_picker(&mut self) {
        if matches!(self.overlay, Some(Overlay::Picker { .. })) {
            self.overlay = None;
        }
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay = None;
    }

    fn show_page(&mut self, page: Page) {
        self.page = page;
        self.overlay = None;
        self.focus = self.focus_order()[0];
    }

    /// Panels that can take focus on the current page, in Tab order
    fn focus_order(&self) -> Vec<PanelFocus> {
        match self.page {
            Page::Console => vec![PanelFocus::QueryEditor, PanelFocus::ResultsViewer],
            Page::Settings => {
                let mut order = vec![PanelFocus::CreateForm];
                if self.connection_editor.edit_target().is_some() {
                    order.push(PanelFocus::EditForm);
                }
                order.push(PanelFocus::ConnectionList);
                order
            }
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % order.len()
        } else {
            (idx + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    /// Move focus off a panel that no longer exists
    fn fix_focus(&mut self) {
        if !self.focus_order().contains(&self.focus) {
            self.focus = match self.page {
                Page::Console => PanelFocus::QueryEditor,
                Page::Settings => PanelFocus::ConnectionList,
            };
        }
    }

    fn focused_form_mut(&mut self) -> Option<&mut ConnectionForm> {
        let kind = form_kind(self.focus)?;
        self.connection_editor.form_mut(kind)
    }

    fn highlighted_connection(&self) -> Option<ConnectionId> {
        self.store.profiles().get(self.list_cursor).map(|p| p.id)
    }

    pub fn set_status(&mut self, message: String, level: StatusLevel) {
        self.status_message = Some(StatusMessage { message, level });
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth.mode()
    }

    /// Focused field of a connection form, for cursor placement
    pub fn form_focus(&self, kind: FormKind) -> Option<FormField> {
        self.connection_editor.form(kind).map(|f| f.focus())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(SessionController::in_memory(), &Settings::default())
    }
}

fn form_kind(focus: PanelFocus) -> Option<FormKind> {
    match focus {
        PanelFocus::CreateForm => Some(FormKind::Create),
        PanelFocus::EditForm => Some(FormKind::Edit),
        _ => None,
    }
}

/// Apply a vertical navigation action to a list cursor
fn step(cursor: usize, len: usize, action: KeyAction) -> usize {
    let last = len.saturating_sub(1);
    match action {
        KeyAction::MoveUp => cursor.saturating_sub(1),
        KeyAction::MoveDown => (cursor + 1).min(last),
        KeyAction::PageUp => cursor.saturating_sub(10),
        KeyAction::PageDown => (cursor + 10).min(last),
        KeyAction::GoToTop | KeyAction::Home => 0,
        KeyAction::GoToBottom | KeyAction::End => last,
        _ => cursor.min(last),
    }
}
