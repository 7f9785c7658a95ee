//! Compiled statements and the SQL text writer shared by the builders

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{CompileError, DatabaseOperation};
use crate::value::Value;

/// Plain or schema-qualified SQL identifier
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("identifier regex is valid")
});

/// Projections accepted in addition to plain identifiers
const SPECIAL_PROJECTIONS: [&str; 2] = ["*", "count(*)"];

/// A parameterized SQL statement
///
/// Placeholders are `$1..$n`, numbered across the whole statement in the order
/// the arguments appear in `args`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    /// SQL text
    pub sql: String,
    /// Bound arguments, in placeholder order
    pub args: Vec<Value>,
}

impl Statement {
    /// Create a statement
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Kind of operation this statement performs, derived from its leading keyword
    pub fn operation(&self) -> DatabaseOperation {
        let keyword = self
            .sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match keyword.as_str() {
            "INSERT" => DatabaseOperation::Insert,
            "UPDATE" => DatabaseOperation::Update,
            "DELETE" => DatabaseOperation::Delete,
            _ => DatabaseOperation::Query,
        }
    }
}

/// Check that `name` is safe to splice into SQL as an identifier
pub fn validate_identifier(name: &str) -> Result<(), CompileError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(CompileError::InvalidIdentifier(name.to_string()))
    }
}

/// Like [`validate_identifier`], also accepting `*` and `count(*)`
pub(crate) fn validate_projection(name: &str) -> Result<(), CompileError> {
    if SPECIAL_PROJECTIONS.contains(&name) {
        return Ok(());
    }
    validate_identifier(name)
}

/// Accumulates SQL text and numbered arguments
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    args: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Bind `value` and write its placeholder
    pub(crate) fn push_arg(&mut self, value: Value) {
        self.args.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.args.len().to_string());
    }

    /// Write `value`: the literal `NULL` for null, a placeholder otherwise
    pub(crate) fn push_value(&mut self, value: Value) {
        if value.is_null() {
            self.sql.push_str("NULL");
        } else {
            self.push_arg(value);
        }
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            args: self.args,
        }
    }
}
