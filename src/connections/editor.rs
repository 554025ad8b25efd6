//! Connection editor
//!
//! Two independent forms: the create form is always present, the edit form
//! only while an edit target is set. Each form owns its own in-flight slots
//! for testing and submitting, so a test on one form never blocks the other.
//! A reopened edit starts with fresh slots and therefore never accepts a
//! completion that belonged to the abandoned one.

use super::store::ConnectionStore;
use super::{BLANK_TEST_MESSAGE, REQUIRED_FIELDS_MESSAGE};
use crate::api::{ConnectionDraft, ConnectionId, ConnectionProfile, TestOutcome};
use crate::ticket::{InFlight, Ticket, TicketIssuer};
use crate::ui::input::TextInput;
use crossterm::event::KeyEvent;
use tracing::debug;

/// Which form a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Create,
    Edit,
}

/// Field with keyboard focus inside a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    ConnectionString,
}

impl FormField {
    pub fn toggle(self) -> Self {
        match self {
            FormField::Name => FormField::ConnectionString,
            FormField::ConnectionString => FormField::Name,
        }
    }
}

/// A name + connection string form with its transient state
#[derive(Debug, Default)]
pub struct ConnectionForm {
    name: TextInput,
    connection_string: TextInput,
    focus: FormField,
    test_outcome: Option<TestOutcome>,
    error: Option<String>,
    testing: InFlight,
    submitting: InFlight,
}

impl ConnectionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing profile
    pub fn from_profile(profile: &ConnectionProfile) -> Self {
        let mut form = Self::default();
        form.set_fields(&profile.name, &profile.connection_string);
        form
    }

    pub fn name(&self) -> &TextInput {
        &self.name
    }

    pub fn connection_string(&self) -> &TextInput {
        &self.connection_string
    }

    pub fn set_fields(&mut self, name: &str, connection_string: &str) {
        self.name.set_value(name);
        self.connection_string.set_value(connection_string);
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn set_focus(&mut self, field: FormField) {
        self.focus = field;
    }

    pub fn test_outcome(&self) -> Option<&TestOutcome> {
        self.test_outcome.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_testing(&self) -> bool {
        self.testing.is_busy()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::ConnectionString => &mut self.connection_string,
        }
    }

    /// Feed an editing key to the focused field. Any change clears the form
    /// error; a change to the connection string also clears the test outcome.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let before = self.focused_input().value().to_string();
        let consumed = self.focused_input().handle_key(key);
        if self.focused_input().value() != before {
            self.on_edited();
        }
        consumed
    }

    pub fn paste(&mut self, text: &str) {
        self.focused_input().insert_str(text);
        self.on_edited();
    }

    fn on_edited(&mut self) {
        self.error = None;
        if self.focus == FormField::ConnectionString {
            self.test_outcome = None;
        }
    }

    /// Start a connectivity test. A blank connection string settles
    /// immediately with a failing outcome; a test already running makes this
    /// a no-op. Returns the ticket and the trimmed string to probe.
    pub fn begin_test(&mut self, issuer: &mut TicketIssuer) -> Option<(Ticket, String)> {
        if self.testing.is_busy() {
            return None;
        }
        let value = self.connection_string.value().trim();
        if value.is_empty() {
            self.test_outcome = Some(TestOutcome::failed(BLANK_TEST_MESSAGE));
            return None;
        }
        let value = value.to_string();
        self.test_outcome = None;
        Some((self.testing.begin(issuer), value))
    }

    pub fn finish_test(&mut self, ticket: Ticket, outcome: TestOutcome) -> bool {
        if !self.testing.settle(ticket) {
            return false;
        }
        self.test_outcome = Some(outcome);
        true
    }

    /// Validate and start a submission. Blank fields set the validation
    /// error and make no request; a submission already running makes this a
    /// no-op.
    pub fn begin_submit(&mut self, issuer: &mut TicketIssuer) -> Option<(Ticket, ConnectionDraft)> {
        if self.submitting.is_busy() {
            return None;
        }
        let Some(draft) =
            ConnectionDraft::from_input(self.name.value(), self.connection_string.value())
        else {
            self.error = Some(REQUIRED_FIELDS_MESSAGE.to_string());
            return None;
        };
        self.error = None;
        Some((self.submitting.begin(issuer), draft))
    }

    /// Settle the submission slot. Returns false for a completion that does
    /// not belong to this form's outstanding submission.
    fn settle_submit(&mut self, ticket: Ticket) -> bool {
        self.submitting.settle(ticket)
    }

    fn clear_fields(&mut self) {
        self.name.clear();
        self.connection_string.clear();
        self.focus = FormField::Name;
        self.test_outcome = None;
        self.error = None;
    }
}

/// The profile being edited and its draft
#[derive(Debug)]
pub struct EditSession {
    target: ConnectionId,
    form: ConnectionForm,
}

impl EditSession {
    pub fn target(&self) -> ConnectionId {
        self.target
    }

    pub fn form(&self) -> &ConnectionForm {
        &self.form
    }
}

#[derive(Debug, Default)]
pub struct ConnectionEditor {
    create: ConnectionForm,
    edit: Option<EditSession>,
}

impl ConnectionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_form(&self) -> &ConnectionForm {
        &self.create
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn edit_target(&self) -> Option<ConnectionId> {
        self.edit.as_ref().map(|e| e.target)
    }

    pub fn form(&self, kind: FormKind) -> Option<&ConnectionForm> {
        match kind {
            FormKind::Create => Some(&self.create),
            FormKind::Edit => self.edit.as_ref().map(|e| &e.form),
        }
    }

    pub fn form_mut(&mut self, kind: FormKind) -> Option<&mut ConnectionForm> {
        match kind {
            FormKind::Create => Some(&mut self.create),
            FormKind::Edit => self.edit.as_mut().map(|e| &mut e.form),
        }
    }

    /// Begin editing `profile`, replacing any previous edit session.
    pub fn start_edit(&mut self, profile: &ConnectionProfile) {
        debug!(id = profile.id, "edit started");
        self.edit = Some(EditSession {
            target: profile.id,
            form: ConnectionForm::from_profile(profile),
        });
    }

    /// Drop the edit session. Outstanding edit requests are left to finish
    /// and their completions are ignored.
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.edit.take() {
            debug!(id = session.target, "edit cancelled");
        }
    }

    pub fn begin_create(&mut self, issuer: &mut TicketIssuer) -> Option<(Ticket, ConnectionDraft)> {
        let started = self.create.begin_submit(issuer);
        if started.is_some() {
            self.create.test_outcome = None;
        }
        started
    }

    /// Apply a create completion to the form. Returns true when the
    /// completion belongs to the outstanding submission; only then may the
    /// caller apply the profile to the store.
    pub fn finish_create(&mut self, ticket: Ticket, result: Result<(), String>) -> bool {
        if !self.create.settle_submit(ticket) {
            debug!(ticket = ticket.value(), "ignoring stale create completion");
            return false;
        }
        match result {
            Ok(()) => self.create.clear_fields(),
            Err(message) => self.create.error = Some(message),
        }
        true
    }

    /// Validate and start submitting the edit draft. No-op without an edit
    /// target.
    pub fn begin_update(
        &mut self,
        issuer: &mut TicketIssuer,
    ) -> Option<(Ticket, ConnectionId, ConnectionDraft)> {
        let session = self.edit.as_mut()?;
        let (ticket, draft) = session.form.begin_submit(issuer)?;
        Some((ticket, session.target, draft))
    }

    /// Apply an update completion to the edit session. Success ends the
    /// session; failure keeps it with the error. Completions from an
    /// abandoned session are ignored.
    pub fn finish_update(&mut self, ticket: Ticket, result: Result<(), String>) -> bool {
        let Some(session) = self.edit.as_mut() else {
            return false;
        };
        if !session.form.settle_submit(ticket) {
            debug!(ticket = ticket.value(), "ignoring stale update completion");
            return false;
        }
        match result {
            Ok(()) => self.edit = None,
            Err(message) => session.form.error = Some(message),
        }
        true
    }

    pub fn begin_test(
        &mut self,
        kind: FormKind,
        issuer: &mut TicketIssuer,
    ) -> Option<(Ticket, String)> {
        self.form_mut(kind)?.begin_test(issuer)
    }

    pub fn finish_test(&mut self, kind: FormKind, ticket: Ticket, outcome: TestOutcome) -> bool {
        match self.form_mut(kind) {
            Some(form) => form.finish_test(ticket, outcome),
            None => false,
        }
    }

    /// Clear the edit session if its target is no longer in the store.
    pub fn reconcile(&mut self, store: &ConnectionStore) {
        if let Some(target) = self.edit_target()
            && !store.contains(target)
        {
            debug!(id = target, "edit target vanished");
            self.edit = None;
        }
    }

    /// Both drafts and every transient state back to their initial values
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
