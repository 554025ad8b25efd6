//! Wire types exchanged with the backend
//!
//! Core data structures for connection profiles, query results and
//! authenticated sessions, shaped exactly like the JSON the API speaks.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Stable identifier of a connection profile
pub type ConnectionId = i64;

/// A single result row: column name → value, in column order
pub type Row = serde_json::Map<String, Value>;

/// A named, reusable database connection string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: ConnectionId,
    pub name: String,
    pub connection_string: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Body of create/update requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDraft {
    pub name: String,
    pub connection_string: String,
}

impl ConnectionDraft {
    /// Build a draft from raw form text, trimming both fields.
    /// Returns `None` when either field is blank after trimming.
    pub fn from_input(name: &str, connection_string: &str) -> Option<Self> {
        let name = name.trim();
        let connection_string = connection_string.trim();
        if name.is_empty() || connection_string.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            connection_string: connection_string.to_string(),
        })
    }
}

/// Body of the connection test request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTestRequest {
    pub connection_string: String,
}

/// Result of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub ok: bool,
    pub message: String,
}

impl TestOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Body of the SQL execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlRequest {
    pub connection_id: ConnectionId,
    pub query: String,
}

/// Query execution results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Result rows
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Rows returned or affected
    pub row_count: i64,
    /// Informational message (set for statements without a result set)
    #[serde(default)]
    pub message: Option<String>,
}

impl QueryResult {
    /// Whether there is anything to export
    pub fn is_exportable(&self) -> bool {
        self.row_count > 0 && !self.rows.is_empty()
    }

    /// Value of `column` in `row`, if both exist
    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        let name = self.columns.get(column)?;
        self.rows.get(row)?.get(name)
    }
}

/// Render a cell for display: NULL, compact JSON for nested values,
/// strings verbatim.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Credentials for `/auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Account details for `/auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl RegisterPayload {
    /// Credentials to log in with once the account exists
    pub fn login(&self) -> LoginPayload {
        LoginPayload {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Authenticated session returned by login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub message: String,
    pub user: AuthenticatedUser,
}

/// Accept RFC 3339 timestamps as well as naive ISO timestamps, which the
/// backend emits for UTC values.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
