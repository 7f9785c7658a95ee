//! Compiled WHERE predicates
//!
//! [`Predicate::from_condition`] is the single operator switch used by every
//! statement kind. Operand handling follows these rules:
//!
//! | operator | `Null` operand | `List` operand | scalar |
//! |---|---|---|---|
//! | `eq`, `in` | `f IS NULL` | `f IN (..)`, empty list `(1=0)` | `f = $n` |
//! | `ne` | `f IS NOT NULL` | `f NOT IN (..)`, empty list `(1=1)` | `f <> $n` |
//! | comparisons and patterns | error | error | `f < $n`, `f LIKE $n`, ... |

use crate::condition::{Condition, Operator};
use crate::error::CompileError;
use crate::value::Value;

use super::statement::{validate_identifier, SqlWriter};

/// Predicate shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Equality, NULL test or set membership
    Eq,
    /// Inequality, NOT NULL test or set exclusion
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtOrEq,
    /// `>=`
    GtOrEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `ILIKE`
    ILike,
    /// `NOT ILIKE`
    NotILike,
}

impl PredicateKind {
    fn scalar_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtOrEq => "<=",
            Self::GtOrEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
        }
    }
}

impl From<Operator> for PredicateKind {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Equal | Operator::In => Self::Eq,
            Operator::NotEqual => Self::NotEq,
            Operator::LessThan => Self::Lt,
            Operator::GreaterThan => Self::Gt,
            Operator::LessThanOrEqual => Self::LtOrEq,
            Operator::GreaterThanOrEqual => Self::GtOrEq,
            Operator::Like => Self::Like,
            Operator::NotLike => Self::NotLike,
            Operator::ILike => Self::ILike,
            Operator::NotILike => Self::NotILike,
        }
    }
}

/// One compiled predicate: field, shape and operand
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    kind: PredicateKind,
    value: Value,
}

impl Predicate {
    /// Create a predicate
    pub fn new(field: impl Into<String>, kind: PredicateKind, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            kind,
            value: value.into(),
        }
    }

    /// `field = value` (or `IS NULL` / `IN`)
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, PredicateKind::Eq, value)
    }

    /// `field <> value` (or `IS NOT NULL` / `NOT IN`)
    pub fn not_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, PredicateKind::NotEq, value)
    }

    /// Translate a condition, matching its operator token case-insensitively
    pub fn from_condition(condition: &Condition) -> Result<Self, CompileError> {
        let op: Operator = condition.op.parse()?;
        Ok(Self::new(
            condition.field.clone(),
            op.into(),
            condition.value.clone(),
        ))
    }

    /// Field this predicate tests
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Predicate shape
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    pub(crate) fn write(&self, w: &mut SqlWriter) -> Result<(), CompileError> {
        validate_identifier(&self.field)?;

        match (self.kind, &self.value) {
            (PredicateKind::Eq, Value::Null) => {
                w.push_str(&self.field);
                w.push_str(" IS NULL");
            }
            (PredicateKind::NotEq, Value::Null) => {
                w.push_str(&self.field);
                w.push_str(" IS NOT NULL");
            }
            (PredicateKind::Eq, Value::List(items)) if items.is_empty() => w.push_str("(1=0)"),
            (PredicateKind::NotEq, Value::List(items)) if items.is_empty() => {
                w.push_str("(1=1)")
            }
            (kind @ (PredicateKind::Eq | PredicateKind::NotEq), Value::List(items)) => {
                w.push_str(&self.field);
                w.push_str(if kind == PredicateKind::Eq {
                    " IN ("
                } else {
                    " NOT IN ("
                });
                for (i, item) in items.iter().enumerate() {
                    if item.is_list() {
                        return Err(self.invalid_operand());
                    }
                    if i > 0 {
                        w.push_str(",");
                    }
                    w.push_value(item.clone());
                }
                w.push_str(")");
            }
            (_, Value::Null | Value::List(_)) => return Err(self.invalid_operand()),
            (kind, value) => {
                w.push_str(&self.field);
                w.push_str(" ");
                w.push_str(kind.scalar_operator());
                w.push_str(" ");
                w.push_arg(value.clone());
            }
        }
        Ok(())
    }

    fn invalid_operand(&self) -> CompileError {
        CompileError::InvalidOperand {
            field: self.field.clone(),
            operator: self.kind.scalar_operator().to_string(),
        }
    }
}

/// Write predicates joined with AND
pub(crate) fn write_conjunction(
    w: &mut SqlWriter,
    predicates: &[Predicate],
) -> Result<(), CompileError> {
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            w.push_str(" AND ");
        }
        predicate.write(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(predicate: &Predicate) -> Result<(String, Vec<Value>), CompileError> {
        let mut w = SqlWriter::new();
        predicate.write(&mut w)?;
        let stmt = w.finish();
        Ok((stmt.sql, stmt.args))
    }

    #[test]
    fn test_eq_scalar() {
        let (sql, args) = render(&Predicate::eq("name", "bob")).unwrap();
        assert_eq!(sql, "name = $1");
        assert_eq!(args, vec![Value::from("bob")]);
    }

    #[test]
    fn test_eq_null_is_null() {
        let (sql, args) = render(&Predicate::eq("deleted_at", Value::Null)).unwrap();
        assert_eq!(sql, "deleted_at IS NULL");
        assert!(args.is_empty());

        let (sql, _) = render(&Predicate::not_eq("deleted_at", Value::Null)).unwrap();
        assert_eq!(sql, "deleted_at IS NOT NULL");
    }

    #[test]
    fn test_in_list() {
        let cond = Condition::new("id", vec![1_i64, 2, 3], "IN");
        let (sql, args) = render(&Predicate::from_condition(&cond).unwrap()).unwrap();
        assert_eq!(sql, "id IN ($1,$2,$3)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_empty_lists() {
        let empty = Value::List(Vec::new());
        assert_eq!(render(&Predicate::eq("id", empty.clone())).unwrap().0, "(1=0)");
        assert_eq!(render(&Predicate::not_eq("id", empty)).unwrap().0, "(1=1)");
    }

    #[test]
    fn test_not_in_list() {
        let (sql, _) = render(&Predicate::not_eq("status", vec!["a", "b"])).unwrap();
        assert_eq!(sql, "status NOT IN ($1,$2)");
    }

    #[test]
    fn test_pattern_operators() {
        for (op, expected) in [
            ("like", "name LIKE $1"),
            ("not_like", "name NOT LIKE $1"),
            ("ilike", "name ILIKE $1"),
            ("not_ilike", "name NOT ILIKE $1"),
            ("lte", "name <= $1"),
            ("gt", "name > $1"),
        ] {
            let cond = Condition::new("name", "a%", op);
            let (sql, _) = render(&Predicate::from_condition(&cond).unwrap()).unwrap();
            assert_eq!(sql, expected);
        }
    }

    #[test]
    fn test_list_operand_for_comparison_fails() {
        let cond = Condition::new("age", vec![1_i64, 2], "lt");
        let err = render(&Predicate::from_condition(&cond).unwrap()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidOperand { .. }));
    }

    #[test]
    fn test_unknown_operator() {
        let cond = Condition::new("age", 1_i64, "between");
        assert_eq!(
            Predicate::from_condition(&cond),
            Err(CompileError::UnsupportedOperator("between".into()))
        );
    }

    #[test]
    fn test_invalid_field() {
        let err = render(&Predicate::eq("name = name OR 1", 1_i64)).unwrap_err();
        assert!(matches!(err, CompileError::InvalidIdentifier(_)));
    }
}
