//! Login / signup form state
//!
//! Thin glue in front of the session: collects credentials, guards its own
//! submission and turns gateway failures into the form's error line. A
//! signup registers the account and then logs in with the same
//! credentials, so both modes end with a `Session`.

use crate::api::{LoginPayload, RegisterPayload, Session};
use crate::error::ApiError;
use crate::ticket::{InFlight, Ticket, TicketIssuer};
use crate::ui::input::TextInput;
use crossterm::event::KeyEvent;

pub const LOGIN_FAILED_MESSAGE: &str = "Unable to login with the provided credentials.";
pub const REGISTER_FAILED_MESSAGE: &str = "Unable to create your account. Try again later.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error. Please try again.";
pub const MISSING_FIELDS_MESSAGE: &str = "Fill in all fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggle(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Sign in to continue",
            AuthMode::Signup => "Create your account",
        }
    }

    /// Fields shown in this mode, top to bottom
    pub fn fields(self) -> &'static [AuthField] {
        match self {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Signup => &[AuthField::FullName, AuthField::Email, AuthField::Password],
        }
    }

    /// Message for a failed submission in this mode
    pub fn failure_message(self, error: &ApiError) -> String {
        if !error.is_http() {
            return UNEXPECTED_ERROR_MESSAGE.to_string();
        }
        match error.detail() {
            Some(detail) => detail.to_string(),
            None => match self {
                AuthMode::Login => LOGIN_FAILED_MESSAGE.to_string(),
                AuthMode::Signup => REGISTER_FAILED_MESSAGE.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    FullName,
    Email,
    Password,
}

impl AuthField {
    pub fn label(self) -> &'static str {
        match self {
            AuthField::FullName => "Full name",
            AuthField::Email => "Email address",
            AuthField::Password => "Password",
        }
    }
}

/// What a submission asks the gateway for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login(LoginPayload),
    /// Register, then log in with the same credentials
    Register(RegisterPayload),
}

#[derive(Debug)]
pub struct AuthForm {
    mode: AuthMode,
    full_name: TextInput,
    email: TextInput,
    password: TextInput,
    focus: AuthField,
    error: Option<String>,
    submit: InFlight,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            full_name: TextInput::new(),
            email: TextInput::new(),
            password: TextInput::masked(),
            focus: AuthField::Email,
            error: None,
            submit: InFlight::default(),
        }
    }
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn focus(&self) -> AuthField {
        self.focus
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_busy()
    }

    pub fn input(&self, field: AuthField) -> &TextInput {
        match field {
            AuthField::FullName => &self.full_name,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    fn input_mut(&mut self, field: AuthField) -> &mut TextInput {
        match field {
            AuthField::FullName => &mut self.full_name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    /// Switch mode, clearing the error and focusing the first field.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
        self.focus = mode.fields()[0];
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggle());
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        let len = self.mode.fields().len();
        self.step_focus(len - 1);
    }

    fn step_focus(&mut self, by: usize) {
        let fields = self.mode.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + by) % fields.len()];
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.input_mut(self.focus).handle_key(key)
    }

    pub fn paste(&mut self, text: &str) {
        self.input_mut(self.focus).insert_str(text);
    }

    /// Validate and start a submission. No-op while one is in flight.
    pub fn begin_submit(&mut self, issuer: &mut TicketIssuer) -> Option<(Ticket, AuthRequest)> {
        if self.submit.is_busy() {
            return None;
        }
        if self.mode.fields().iter().any(|f| self.input(*f).is_blank()) {
            self.error = Some(MISSING_FIELDS_MESSAGE.to_string());
            return None;
        }
        let email = self.email.value().to_string();
        let password = self.password.value().to_string();
        let request = match self.mode {
            AuthMode::Login => AuthRequest::Login(LoginPayload { email, password }),
            AuthMode::Signup => AuthRequest::Register(RegisterPayload {
                email,
                password,
                full_name: self.full_name.value().to_string(),
            }),
        };
        self.error = None;
        Some((self.submit.begin(issuer), request))
    }

    /// Apply a submission completion. Returns the session on success; the
    /// form is cleared so credentials do not linger.
    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<Session, String>,
    ) -> Option<Session> {
        if !self.submit.settle(ticket) {
            return None;
        }
        match result {
            Ok(session) => {
                let mode = self.mode;
                *self = Self::default();
                self.set_mode(mode);
                Some(session)
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    /// Back to an empty login form
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
