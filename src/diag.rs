//! Lint diagnostic records.
//!
//! This module provides the [`Diagnostic`] type shared by every rule
//! producer, with optional source position tracking and a structured
//! `data` payload for machine consumers (cycle paths, node names, counts).
//!
//! Diagnostics are immutable value objects: a producer creates one, the
//! severity policy may rewrite its level or drop it, and nothing else
//! mutates it. Rendering is deterministic: record fields are emitted in
//! a fixed order and `data` keys are sorted (BTreeMap).

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Informational finding, never affects disposition.
    Info,
    /// Warning that should be addressed.
    Warn,
    /// Error that fails the run.
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// A position within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based).
    pub column: usize,
    /// Byte offset from the start of the file (0-based).
    pub offset: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// One reported lint finding.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Stable rule code, e.g. `E_IMPORT_CYCLE`.
    pub code: String,
    /// Severity of this diagnostic.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Source path or manifest name the finding refers to.
    pub file: String,
    /// Optional source position.
    pub pos: Option<Position>,
    /// Optional structured payload.
    pub data: Option<BTreeMap<String, Value>>,
}

/// Serialized NDJSON shape; field order here is the wire order.
#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    level: Level,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pos: Option<&'a Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a BTreeMap<String, Value>>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(
        code: impl Into<String>,
        level: Level,
        message: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            level,
            message: message.into(),
            file: file.into(),
            pos: None,
            data: None,
        }
    }

    /// Add a source position.
    pub fn with_pos(mut self, pos: Position) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Add one key/value entry to the structured payload.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Return a new diagnostic with a rewritten level.
    pub fn at_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Render the structured NDJSON form (no trailing newline).
    pub fn to_ndjson(&self, now: DateTime<Utc>) -> String {
        let record = Record {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: self.level,
            code: &self.code,
            message: &self.message,
            file: &self.file,
            pos: self.pos.as_ref(),
            data: self.data.as_ref(),
        };
        // A record is a flat struct of serializable fields; this cannot fail.
        serde_json::to_string(&record).unwrap_or_default()
    }

    /// Render the human one-line form.
    pub fn to_human(&self) -> String {
        match &self.pos {
            Some(p) => format!(
                "lint: {} {}: {} ({}:{}:{})",
                self.level, self.code, self.message, self.file, p.line, p.column
            ),
            None => format!(
                "lint: {} {}: {} ({})",
                self.level, self.code, self.message, self.file
            ),
        }
    }
}
