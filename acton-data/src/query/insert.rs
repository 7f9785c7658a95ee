//! INSERT statement builder

use crate::error::CompileError;
use crate::value::Value;

use super::statement::{validate_identifier, SqlWriter, Statement};

/// Builds `INSERT INTO <table> (<cols>) VALUES (..), (..) [RETURNING <col>]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    returning: Option<String>,
}

impl InsertBuilder {
    /// Insert into `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Column list
    #[must_use]
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append one value row
    #[must_use]
    pub fn values(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    /// Append a RETURNING clause
    #[must_use]
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = Some(column.into());
        self
    }

    /// Compile to SQL
    pub fn to_statement(&self) -> Result<Statement, CompileError> {
        validate_identifier(&self.table)?;
        if self.columns.is_empty() {
            return Err(CompileError::EmptyColumns {
                table: self.table.clone(),
            });
        }
        if self.rows.is_empty() {
            return Err(CompileError::EmptyValues {
                table: self.table.clone(),
            });
        }
        for column in &self.columns {
            validate_identifier(column)?;
        }

        let mut w = SqlWriter::new();
        w.push_str("INSERT INTO ");
        w.push_str(&self.table);
        w.push_str(" (");
        w.push_str(&self.columns.join(","));
        w.push_str(") VALUES ");

        for (row_index, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(CompileError::RowWidthMismatch {
                    row: row_index,
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
            if row_index > 0 {
                w.push_str(",");
            }
            w.push_str("(");
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    w.push_str(",");
                }
                w.push_value(value.clone());
            }
            w.push_str(")");
        }

        if let Some(column) = &self.returning {
            validate_identifier(column)?;
            w.push_str(" RETURNING ");
            w.push_str(column);
        }

        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_row_insert() {
        let stmt = InsertBuilder::new("users")
            .columns(["name", "age"])
            .values(vec![Value::from("a"), Value::Int(1)])
            .values(vec![Value::from("b"), Value::Null])
            .returning("id")
            .to_statement()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO users (name,age) VALUES ($1,$2),($3,NULL) RETURNING id"
        );
        assert_eq!(stmt.args.len(), 3);
    }

    #[test]
    fn test_row_width_mismatch() {
        let err = InsertBuilder::new("users")
            .columns(["name", "age"])
            .values(vec![Value::from("a"), Value::Int(1)])
            .values(vec![Value::from("b")])
            .to_statement()
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::RowWidthMismatch {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_no_rows() {
        let err = InsertBuilder::new("users")
            .columns(["name"])
            .to_statement()
            .unwrap_err();
        assert!(matches!(err, CompileError::EmptyValues { .. }));
    }
}
