//! Query console
//!
//! State machine over `Idle -> Running -> Succeeded | Failed`. A run needs
//! a selected connection and non-blank query text; entering `Running` drops
//! the previous result and error before the request goes out. The running
//! guard is the in-flight slot: a trigger while it is busy is a no-op.

use crate::api::{ConnectionId, QueryResult, SqlRequest};
use crate::ticket::{InFlight, Ticket, TicketIssuer};
use crate::ui::editor::QueryEditor;
use tracing::debug;

/// Initial query text
pub const DEFAULT_QUERY: &str = "SELECT version();";

pub const NO_CONNECTION_MESSAGE: &str = "Select a connection before running a query.";
pub const EMPTY_QUERY_MESSAGE: &str = "Enter a SQL statement to execute.";

/// Label used when the connection a result came from no longer exists
pub const UNKNOWN_CONNECTION: &str = "Unknown connection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Why a run did not start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRejected {
    /// A run is already in flight; nothing changed
    AlreadyRunning,
    /// Local validation failed; the message is now the console error
    Invalid(&'static str),
}

#[derive(Debug)]
pub struct QueryConsole {
    pub editor: QueryEditor,
    initial_query: String,
    status: QueryStatus,
    result: Option<QueryResult>,
    error: Option<String>,
    /// Connection the last started run targeted
    target: Option<ConnectionId>,
    run: InFlight,
}

impl QueryConsole {
    pub fn new(initial_query: &str) -> Self {
        Self {
            editor: QueryEditor::with_content(initial_query),
            initial_query: initial_query.to_string(),
            status: QueryStatus::Idle,
            result: None,
            error: None,
            target: None,
            run: InFlight::default(),
        }
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.run.is_busy()
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn target(&self) -> Option<ConnectionId> {
        self.target
    }

    /// Whether the current result can be exported
    pub fn can_export(&self) -> bool {
        self.result.as_ref().is_some_and(QueryResult::is_exportable)
    }

    /// Validate and start a run against `selection`. The query text is sent
    /// exactly as typed.
    pub fn begin_run(
        &mut self,
        selection: Option<ConnectionId>,
        issuer: &mut TicketIssuer,
    ) -> Result<(Ticket, SqlRequest), RunRejected> {
        if self.run.is_busy() {
            debug!("query already running");
            return Err(RunRejected::AlreadyRunning);
        }
        let Some(connection_id) = selection else {
            return Err(self.reject(NO_CONNECTION_MESSAGE));
        };
        if self.editor.is_blank() {
            return Err(self.reject(EMPTY_QUERY_MESSAGE));
        }

        self.result = None;
        self.error = None;
        self.status = QueryStatus::Running;
        self.target = Some(connection_id);
        let ticket = self.run.begin(issuer);
        debug!(ticket = ticket.value(), connection_id, "query started");
        Ok((
            ticket,
            SqlRequest {
                connection_id,
                query: self.editor.content(),
            },
        ))
    }

    fn reject(&mut self, message: &'static str) -> RunRejected {
        self.status = QueryStatus::Failed;
        self.error = Some(message.to_string());
        RunRejected::Invalid(message)
    }

    /// Apply a run completion. Returns false for a stale ticket.
    pub fn finish_run(&mut self, ticket: Ticket, outcome: Result<QueryResult, String>) -> bool {
        if !self.run.settle(ticket) {
            debug!(ticket = ticket.value(), "ignoring stale query result");
            return false;
        }
        match outcome {
            Ok(result) => {
                self.status = QueryStatus::Succeeded;
                self.result = Some(result);
            }
            Err(message) => {
                self.status = QueryStatus::Failed;
                self.error = Some(message);
            }
        }
        true
    }

    /// Back to the initial query with no result, error or run in flight
    pub fn reset(&mut self) {
        *self = Self::new(&self.initial_query);
    }
}

impl Default for QueryConsole {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one_row() -> QueryResult {
        QueryResult {
            columns: vec!["x".to_string()],
            rows: vec![json!({"x": 1}).as_object().unwrap().clone()],
            row_count: 1,
            message: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let console = QueryConsole::default();
        assert_eq!(console.editor.content(), DEFAULT_QUERY);
        assert_eq!(console.status(), QueryStatus::Idle);
        assert!(!console.can_export());
    }

    #[test]
    fn test_no_selection_rejected_first() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("");
        let err = console.begin_run(None, &mut issuer).unwrap_err();
        assert_eq!(err, RunRejected::Invalid(NO_CONNECTION_MESSAGE));
        assert_eq!(console.error(), Some(NO_CONNECTION_MESSAGE));
        assert_eq!(console.status(), QueryStatus::Failed);
        assert!(!console.is_running());
    }

    #[test]
    fn test_blank_query_rejected() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("   \n ");
        let err = console.begin_run(Some(1), &mut issuer).unwrap_err();
        assert_eq!(err, RunRejected::Invalid(EMPTY_QUERY_MESSAGE));
    }

    #[test]
    fn test_run_clears_previous_result_and_error() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("SELECT 1");
        let (t, _) = console.begin_run(Some(1), &mut issuer).unwrap();
        console.finish_run(t, Ok(one_row()));
        assert!(console.result().is_some());

        let (t, _) = console.begin_run(Some(1), &mut issuer).unwrap();
        assert_eq!(console.status(), QueryStatus::Running);
        assert!(console.result().is_none());
        assert!(console.error().is_none());
        console.finish_run(t, Err("relation does not exist".to_string()));
        assert_eq!(console.status(), QueryStatus::Failed);
        assert_eq!(console.error(), Some("relation does not exist"));
    }

    #[test]
    fn test_validation_failure_keeps_previous_result() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("SELECT 1");
        let (t, _) = console.begin_run(Some(1), &mut issuer).unwrap();
        console.finish_run(t, Ok(one_row()));
        assert!(console.begin_run(None, &mut issuer).is_err());
        assert!(console.result().is_some());
    }

    #[test]
    fn test_query_sent_untrimmed() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("  SELECT 1;  ");
        let (_, request) = console.begin_run(Some(4), &mut issuer).unwrap();
        assert_eq!(request.query, "  SELECT 1;  ");
        assert_eq!(request.connection_id, 4);
        assert_eq!(console.target(), Some(4));
    }

    #[test]
    fn test_running_guard() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("SELECT 1");
        let (t, _) = console.begin_run(Some(1), &mut issuer).unwrap();
        assert_eq!(
            console.begin_run(Some(2), &mut issuer).unwrap_err(),
            RunRejected::AlreadyRunning
        );
        assert_eq!(console.status(), QueryStatus::Running);
        assert_eq!(console.target(), Some(1));
        assert!(console.finish_run(t, Ok(one_row())));
        assert_eq!(console.status(), QueryStatus::Succeeded);
        assert!(console.can_export());
    }

    #[test]
    fn test_stale_completion_ignored_after_reset() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("SELECT 1");
        let (t, _) = console.begin_run(Some(1), &mut issuer).unwrap();
        console.reset();
        assert!(!console.finish_run(t, Ok(one_row())));
        assert!(console.result().is_none());
        assert_eq!(console.status(), QueryStatus::Idle);
    }

    #[test]
    fn test_reset_restores_initial_query() {
        let mut console = QueryConsole::new("SELECT version();");
        console.editor.set_content("DROP TABLE x");
        console.reset();
        assert_eq!(console.editor.content(), "SELECT version();");
    }

    #[test]
    fn test_zero_rows_not_exportable() {
        let mut issuer = TicketIssuer::new();
        let mut console = QueryConsole::new("CREATE TABLE t ()");
        let (t, _) = console.begin_run(Some(1), &mut issuer).unwrap();
        console.finish_run(
            t,
            Ok(QueryResult {
                columns: vec!["x".to_string()],
                rows: vec![],
                row_count: 0,
                message: None,
            }),
        );
        assert!(!console.can_export());
    }
}
