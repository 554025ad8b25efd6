//! Data-driven keybinding configuration
//!
//! All keybindings are defined as data in `KeyMap::default()`, not as match arms
//! scattered across components. To add a new binding, add an entry to the
//! appropriate context in `KeyMap::default()` and handle the `KeyAction` in
//! `App::execute_key_action()`.

use crate::app::PanelFocus;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// A key combination (code + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

impl From<KeyEvent> for KeyBind {
    fn from(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Semantic key actions: what a key means, not what key it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Global
    Quit,
    ShowConsole,
    ShowSettings,
    CycleFocus,
    CycleFocusReverse,
    RefreshConnections,
    OpenPicker,
    Logout,

    // Navigation (shared by results, lists, menus)
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Home,
    End,

    // Editor-specific
    ExecuteQuery,

    // Results-specific
    ExportPrimary,
    OpenExportMenu,

    // Connection list
    EditConnection,
    DeleteConnection,
    SelectConnection,

    // Forms
    NextField,
    PrevField,
    TestConnection,
    CancelEdit,
    ToggleAuthMode,

    // Modal dismiss/submit
    Dismiss,
    Submit,
    Confirm,
}

impl KeyAction {
    /// Whether this action belongs to the global table
    pub fn is_global(self) -> bool {
        matches!(
            self,
            KeyAction::Quit
                | KeyAction::ShowConsole
                | KeyAction::ShowSettings
                | KeyAction::CycleFocus
                | KeyAction::CycleFocusReverse
                | KeyAction::RefreshConnections
                | KeyAction::OpenPicker
                | KeyAction::Logout
        )
    }
}

/// Keybinding configuration: maps key combos to semantic actions per context.
pub struct KeyMap {
    /// Bindings that apply regardless of focus (checked first)
    global: HashMap<KeyBind, KeyAction>,
    /// Per-panel bindings (checked after global)
    panels: HashMap<PanelFocus, HashMap<KeyBind, KeyAction>>,
}

impl KeyMap {
    /// Resolve a key event to a semantic action.
    /// Checks global bindings first, then panel-specific bindings.
    pub fn resolve(&self, focus: PanelFocus, key: KeyEvent) -> Option<KeyAction> {
        let bind = KeyBind::from(key);
        if let Some(action) = self.global.get(&bind) {
            return Some(*action);
        }
        self.panels
            .get(&focus)
            .and_then(|m| m.get(&bind))
            .copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let global = HashMap::from([
            (
                KeyBind::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
                KeyAction::Quit,
            ),
            (KeyBind::plain(KeyCode::F(1)), KeyAction::ShowConsole),
            (KeyBind::plain(KeyCode::F(2)), KeyAction::ShowSettings),
            (KeyBind::plain(KeyCode::Tab), KeyAction::CycleFocus),
            (
                KeyBind::new(KeyCode::BackTab, KeyModifiers::SHIFT),
                KeyAction::CycleFocusReverse,
            ),
            (
                KeyBind::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
                KeyAction::RefreshConnections,
            ),
            (
                KeyBind::new(KeyCode::Char('o'), KeyModifiers::CONTROL),
                KeyAction::OpenPicker,
            ),
            (KeyBind::plain(KeyCode::F(10)), KeyAction::Logout),
        ]);

        let mut panels = HashMap::new();

        // ── Auth ─────────────────────────────────────────────────
        let mut auth = HashMap::new();
        auth.insert(KeyBind::plain(KeyCode::Enter), KeyAction::Submit);
        auth.insert(KeyBind::plain(KeyCode::Down), KeyAction::NextField);
        auth.insert(KeyBind::plain(KeyCode::Up), KeyAction::PrevField);
        auth.insert(
            KeyBind::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
            KeyAction::ToggleAuthMode,
        );
        panels.insert(PanelFocus::Auth, auth);

        // ── Editor ───────────────────────────────────────────────
        // Ctrl+Enter is the primary accelerator; Super+Enter covers Cmd on
        // macOS. Legacy terminals send Ctrl+Enter as a bare line feed, which
        // arrives as Ctrl+J. F5 covers terminals that report none of these.
        let mut editor = HashMap::new();
        editor.insert(KeyBind::plain(KeyCode::F(5)), KeyAction::ExecuteQuery);
        editor.insert(
            KeyBind::new(KeyCode::Char('j'), KeyModifiers::CONTROL),
            KeyAction::ExecuteQuery,
        );
        editor.insert(
            KeyBind::new(KeyCode::Enter, KeyModifiers::CONTROL),
            KeyAction::ExecuteQuery,
        );
        editor.insert(
            KeyBind::new(KeyCode::Enter, KeyModifiers::SUPER),
            KeyAction::ExecuteQuery,
        );
        panels.insert(PanelFocus::QueryEditor, editor);

        // ── Results ──────────────────────────────────────────────
        let mut results = HashMap::new();
        insert_vim_nav(&mut results);
        results.insert(KeyBind::plain(KeyCode::F(5)), KeyAction::ExecuteQuery);
        results.insert(KeyBind::plain(KeyCode::Char('e')), KeyAction::ExportPrimary);
        results.insert(
            KeyBind::new(KeyCode::Char('E'), KeyModifiers::SHIFT),
            KeyAction::OpenExportMenu,
        );
        results.insert(KeyBind::plain(KeyCode::Char('x')), KeyAction::OpenExportMenu);
        panels.insert(PanelFocus::ResultsViewer, results);

        // ── Connection forms ─────────────────────────────────────
        let mut create_form = HashMap::new();
        insert_form_keys(&mut create_form);
        panels.insert(PanelFocus::CreateForm, create_form);

        let mut edit_form = HashMap::new();
        insert_form_keys(&mut edit_form);
        edit_form.insert(KeyBind::plain(KeyCode::Esc), KeyAction::CancelEdit);
        panels.insert(PanelFocus::EditForm, edit_form);

        // ── Connection list ──────────────────────────────────────
        let mut list = HashMap::new();
        insert_scroll_nav(&mut list);
        list.insert(KeyBind::plain(KeyCode::Enter), KeyAction::EditConnection);
        list.insert(KeyBind::plain(KeyCode::Char('e')), KeyAction::EditConnection);
        list.insert(KeyBind::plain(KeyCode::Char('d')), KeyAction::DeleteConnection);
        list.insert(KeyBind::plain(KeyCode::Delete), KeyAction::DeleteConnection);
        list.insert(KeyBind::plain(KeyCode::Char('s')), KeyAction::SelectConnection);
        list.insert(KeyBind::plain(KeyCode::Char(' ')), KeyAction::SelectConnection);
        panels.insert(PanelFocus::ConnectionList, list);

        // ── Menus ────────────────────────────────────────────────
        for menu_focus in [PanelFocus::Picker, PanelFocus::ExportMenu] {
            let mut menu = HashMap::new();
            insert_scroll_nav(&mut menu);
            menu.insert(KeyBind::plain(KeyCode::Enter), KeyAction::Submit);
            menu.insert(KeyBind::plain(KeyCode::Esc), KeyAction::Dismiss);
            panels.insert(menu_focus, menu);
        }

        // ── Confirmation / alert ─────────────────────────────────
        let mut confirm = HashMap::new();
        confirm.insert(KeyBind::plain(KeyCode::Char('y')), KeyAction::Confirm);
        confirm.insert(KeyBind::plain(KeyCode::Enter), KeyAction::Confirm);
        confirm.insert(KeyBind::plain(KeyCode::Char('n')), KeyAction::Dismiss);
        confirm.insert(KeyBind::plain(KeyCode::Esc), KeyAction::Dismiss);
        panels.insert(PanelFocus::Confirm, confirm);

        let mut alert = HashMap::new();
        alert.insert(KeyBind::plain(KeyCode::Enter), KeyAction::Dismiss);
        alert.insert(KeyBind::plain(KeyCode::Esc), KeyAction::Dismiss);
        panels.insert(PanelFocus::Alert, alert);

        Self { global, panels }
    }
}

/// Submit, test and field switching shared by both connection forms
fn insert_form_keys(map: &mut HashMap<KeyBind, KeyAction>) {
    map.insert(KeyBind::plain(KeyCode::Enter), KeyAction::Submit);
    map.insert(
        KeyBind::new(KeyCode::Char('t'), KeyModifiers::CONTROL),
        KeyAction::TestConnection,
    );
    map.insert(KeyBind::plain(KeyCode::Down), KeyAction::NextField);
    map.insert(KeyBind::plain(KeyCode::Up), KeyAction::PrevField);
}

/// Insert vim-style navigation bindings (arrows + hjkl + page + g/G + Home/End)
fn insert_vim_nav(map: &mut HashMap<KeyBind, KeyAction>) {
    insert_scroll_nav(map);

    map.insert(KeyBind::plain(KeyCode::Right), KeyAction::MoveRight);
    map.insert(KeyBind::plain(KeyCode::Char('l')), KeyAction::MoveRight);
    map.insert(KeyBind::plain(KeyCode::Left), KeyAction::MoveLeft);
    map.insert(KeyBind::plain(KeyCode::Char('h')), KeyAction::MoveLeft);
    map.insert(KeyBind::plain(KeyCode::Home), KeyAction::Home);
    map.insert(KeyBind::plain(KeyCode::End), KeyAction::End);
}

/// Insert vertical navigation bindings (arrows + jk + page + g/G)
fn insert_scroll_nav(map: &mut HashMap<KeyBind, KeyAction>) {
    map.insert(KeyBind::plain(KeyCode::Down), KeyAction::MoveDown);
    map.insert(KeyBind::plain(KeyCode::Char('j')), KeyAction::MoveDown);
    map.insert(KeyBind::plain(KeyCode::Up), KeyAction::MoveUp);
    map.insert(KeyBind::plain(KeyCode::Char('k')), KeyAction::MoveUp);
    map.insert(KeyBind::plain(KeyCode::PageDown), KeyAction::PageDown);
    map.insert(KeyBind::plain(KeyCode::PageUp), KeyAction::PageUp);
    map.insert(KeyBind::plain(KeyCode::Char('g')), KeyAction::GoToTop);
    map.insert(
        KeyBind::new(KeyCode::Char('G'), KeyModifiers::SHIFT),
        KeyAction::GoToBottom,
    );
    map.insert(KeyBind::plain(KeyCode::Home), KeyAction::GoToTop);
    map.insert(KeyBind::plain(KeyCode::End), KeyAction::GoToBottom);
}
