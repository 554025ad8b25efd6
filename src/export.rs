//! Query results export (CSV / JSON / YAML)
//!
//! Serialization is pure and works on the rows of a `QueryResult`. The
//! `ExportSink` delivers a rendered payload: it writes a timestamped file
//! into the export directory and optionally hands it to the OS opener.

use crate::api::{QueryResult, Row};
use crate::error::{ExportError, ExportResult};
use chrono::Local;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Export format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    /// Format used by the primary export action
    pub const PRIMARY: ExportFormat = ExportFormat::Csv;

    /// Formats offered by the secondary export menu
    pub const SECONDARY: [ExportFormat; 2] = [ExportFormat::Json, ExportFormat::Yaml];

    /// File extension for this format (without leading dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "text/yaml",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Yaml => "YAML",
        }
    }

    /// Serialize the rows of `result`. Fails with `ExportError::Empty` when
    /// there is nothing to export.
    pub fn render(&self, result: &QueryResult) -> ExportResult<String> {
        if !result.is_exportable() {
            return Err(ExportError::Empty);
        }
        match self {
            ExportFormat::Csv => Ok(to_csv(&result.columns, &result.rows)),
            ExportFormat::Json => to_json(&result.rows),
            ExportFormat::Yaml => to_yaml(&result.rows),
        }
    }
}

/// Serialize rows as RFC 4180 CSV with a header from `columns`.
/// Lines are joined with `\n`, without a trailing newline.
pub fn to_csv(columns: &[String], rows: &[Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            header.push(',');
        }
        csv_escape_into(&mut header, col);
    }
    lines.push(header);

    for row in rows {
        let mut line = String::new();
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let text = row.get(col).map(value_to_export_string).unwrap_or_default();
            csv_escape_into(&mut line, &text);
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Serialize rows as a compact JSON array of objects, key order preserved.
pub fn to_json(rows: &[Row]) -> ExportResult<String> {
    serde_json::to_string(rows).map_err(|e| ExportError::Serialize {
        format: "JSON",
        message: e.to_string(),
    })
}

/// Serialize rows as a YAML sequence of mappings.
pub fn to_yaml(rows: &[Row]) -> ExportResult<String> {
    serde_yaml::to_string(rows).map_err(|e| ExportError::Serialize {
        format: "YAML",
        message: e.to_string(),
    })
}

/// Full value string for CSV export (null → empty string).
fn value_to_export_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Quote a field if it contains `,` `"` or a newline (RFC 4180).
fn csv_escape_into(out: &mut String, field: &str) {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        out.push('"');
        for c in field.chars() {
            if c == '"' {
                out.push_str("\"\"");
            } else {
                out.push(c);
            }
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Writes rendered exports to disk and opens them
#[derive(Debug, Clone)]
pub struct ExportSink {
    dir: PathBuf,
    open_files: bool,
}

impl ExportSink {
    pub fn new(dir: impl Into<PathBuf>, open_files: bool) -> Self {
        Self {
            dir: dir.into(),
            open_files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `content` to a new `export_<timestamp>.<ext>` file and, if
    /// enabled, open it. Returns the written path.
    pub fn deliver(&self, format: ExportFormat, content: &str) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.unique_path(format);
        std::fs::write(&path, content)?;
        info!(
            path = %path.display(),
            mime = format.mime_type(),
            bytes = content.len(),
            "export written"
        );

        if self.open_files {
            open::that_detached(&path).map_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to open export");
                ExportError::Open(e.to_string())
            })?;
        }
        Ok(path)
    }

    /// Timestamped file name, suffixed when a file from the same second exists
    fn unique_path(&self, format: ExportFormat) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H%M%S");
        let ext = format.extension();
        let mut path = self.dir.join(format!("export_{stamp}.{ext}"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("export_{stamp}-{n}.{ext}"));
            n += 1;
        }
        path
    }
}
