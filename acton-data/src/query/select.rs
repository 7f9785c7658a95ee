//! SELECT statement builder

use crate::condition::SortDirection;
use crate::error::CompileError;

use super::predicate::{write_conjunction, Predicate};
use super::statement::{validate_identifier, validate_projection, SqlWriter, Statement};

/// Builds `SELECT <columns> FROM <table> [WHERE ..] [ORDER BY ..] [LIMIT n OFFSET m]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectBuilder {
    columns: Vec<String>,
    table: String,
    predicates: Vec<Predicate>,
    order_by: Vec<(String, SortDirection)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectBuilder {
    /// Select the given columns
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// `SELECT count(*) FROM table`
    pub fn count(table: impl Into<String>) -> Self {
        Self::new(["count(*)"]).from(table)
    }

    /// Target table
    #[must_use]
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Add a predicate; predicates are combined with AND
    #[must_use]
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append an ORDER BY term
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((field.into(), direction));
        self
    }

    /// Set LIMIT
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Compile to SQL
    pub fn to_statement(&self) -> Result<Statement, CompileError> {
        validate_identifier(&self.table)?;
        if self.columns.is_empty() {
            return Err(CompileError::EmptyColumns {
                table: self.table.clone(),
            });
        }
        for column in &self.columns {
            validate_projection(column)?;
        }

        let mut w = SqlWriter::new();
        w.push_str("SELECT ");
        w.push_str(&self.columns.join(", "));
        w.push_str(" FROM ");
        w.push_str(&self.table);

        if !self.predicates.is_empty() {
            w.push_str(" WHERE ");
            write_conjunction(&mut w, &self.predicates)?;
        }

        if !self.order_by.is_empty() {
            w.push_str(" ORDER BY ");
            for (i, (field, direction)) in self.order_by.iter().enumerate() {
                validate_identifier(field)?;
                if i > 0 {
                    w.push_str(", ");
                }
                w.push_str(field);
                if *direction == SortDirection::Desc {
                    w.push_str(" DESC");
                }
            }
        }

        if let Some(limit) = self.limit {
            w.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            w.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(w.finish())
    }
}
