//! UPDATE statement builder
//!
//! Soft deletes are UPDATEs, and a record's delete hook receives the builder
//! by value and returns it, so the builder is the one extension point that can
//! change the shape of a delete.

use crate::error::CompileError;
use crate::value::Value;

use super::predicate::{write_conjunction, Predicate};
use super::statement::{validate_identifier, SqlWriter, Statement};

/// Builds `UPDATE <table> SET <col> = <val>, .. [WHERE ..]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<(String, Value)>,
    predicates: Vec<Predicate>,
}

impl UpdateBuilder {
    /// Update rows of `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Add a SET assignment
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// Add a predicate; predicates are combined with AND
    #[must_use]
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns assigned so far, in order
    pub fn assigned_columns(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(c, _)| c.as_str())
    }

    /// Whether any SET assignment was added
    pub fn has_assignments(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Compile to SQL; SET arguments are numbered before WHERE arguments
    pub fn to_statement(&self) -> Result<Statement, CompileError> {
        validate_identifier(&self.table)?;
        if self.assignments.is_empty() {
            return Err(CompileError::EmptySet {
                table: self.table.clone(),
            });
        }

        let mut w = SqlWriter::new();
        w.push_str("UPDATE ");
        w.push_str(&self.table);
        w.push_str(" SET ");
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            validate_identifier(column)?;
            if i > 0 {
                w.push_str(", ");
            }
            w.push_str(column);
            w.push_str(" = ");
            w.push_value(value.clone());
        }

        if !self.predicates.is_empty() {
            w.push_str(" WHERE ");
            write_conjunction(&mut w, &self.predicates)?;
        }

        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_numbering() {
        let stmt = UpdateBuilder::new("users")
            .set("name", "carol")
            .set("nickname", Value::Null)
            .set("age", 30_i64)
            .and_where(Predicate::eq("id", 7_i64))
            .to_statement()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE users SET name = $1, nickname = NULL, age = $2 WHERE id = $3"
        );
        assert_eq!(
            stmt.args,
            vec![Value::from("carol"), Value::Int(30), Value::Int(7)]
        );
    }

    #[test]
    fn test_update_without_set() {
        let err = UpdateBuilder::new("users")
            .and_where(Predicate::eq("id", 1_i64))
            .to_statement()
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::EmptySet {
                table: "users".into()
            }
        );
    }

    #[test]
    fn test_assigned_columns() {
        let builder = UpdateBuilder::new("t").set("a", 1_i64).set("b", 2_i64);
        assert!(builder.has_assignments());
        assert_eq!(builder.assigned_columns().collect::<Vec<_>>(), ["a", "b"]);
    }
}
