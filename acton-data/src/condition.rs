//! Declarative filters, sort keys and paging
//!
//! A [`CommonCondition`] is built fresh for each repository call, mutated
//! through its fluent methods and then handed over by value: the repository
//! consumes it, so one condition can never be reused across calls.
//!
//! # Example
//!
//! ```rust
//! use acton_data::condition::{CommonCondition, Operator, SortDirection};
//!
//! let condition = CommonCondition::new()
//!     .with_condition("status", "active", Operator::Equal)
//!     .with_condition("age", 18_i64, Operator::GreaterThanOrEqual)
//!     .with_sorting("created_at", SortDirection::Desc)
//!     .with_paging(20, 2);
//!
//! assert_eq!(condition.conditions.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;
use crate::value::Value;

/// Limit used when paging is applied without an explicit limit
pub const DEFAULT_LIMIT: u64 = 10;

/// Page used when paging is applied without an explicit page
pub const DEFAULT_PAGE: u64 = 1;

/// Comparison operators accepted in a [`Condition`]
///
/// Conditions store the operator as its token so that unknown tokens reach the
/// compiler and fail there; this enum is the recognised set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `eq`
    Equal,
    /// `ne`
    NotEqual,
    /// `lt`
    LessThan,
    /// `gt`
    GreaterThan,
    /// `lte`
    LessThanOrEqual,
    /// `gte`
    GreaterThanOrEqual,
    /// `in`
    In,
    /// `like`
    Like,
    /// `not_like`
    NotLike,
    /// `ilike`
    ILike,
    /// `not_ilike`
    NotILike,
}

impl Operator {
    /// Every supported operator
    pub const ALL: [Operator; 11] = [
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanOrEqual,
        Self::GreaterThanOrEqual,
        Self::In,
        Self::Like,
        Self::NotLike,
        Self::ILike,
        Self::NotILike,
    ];

    /// Operator token
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::LessThan => "lt",
            Self::GreaterThan => "gt",
            Self::LessThanOrEqual => "lte",
            Self::GreaterThanOrEqual => "gte",
            Self::In => "in",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::ILike => "ilike",
            Self::NotILike => "not_ilike",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == token)
            .ok_or_else(|| CompileError::UnsupportedOperator(s.to_string()))
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (implicit in SQL)
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(CompileError::UnsupportedSortDirection(s.to_string())),
        }
    }
}

/// One filter predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column the predicate applies to
    pub field: String,
    /// Operand
    pub value: Value,
    /// Operator token, matched case-insensitively at compile time
    pub op: String,
}

impl Condition {
    /// Create a condition
    pub fn new(field: impl Into<String>, value: impl Into<Value>, op: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            op: op.into(),
        }
    }
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    /// Column to sort on
    pub field: String,
    /// Sort direction
    pub order: SortDirection,
}

/// Page request; `page` is 1-based
///
/// A zero page or zero limit means no pagination was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paging {
    /// Page number
    pub page: u64,
    /// Items per page
    pub limit: u64,
}

impl Paging {
    /// Create a page request
    pub const fn new(limit: u64, page: u64) -> Self {
        Self { page, limit }
    }

    /// Whether this requests pagination at all
    pub const fn is_requested(&self) -> bool {
        self.page != 0 && self.limit != 0
    }

    /// Apply the defaults in place and return `(limit, offset)`
    ///
    /// A zero limit becomes [`DEFAULT_LIMIT`] and a zero page [`DEFAULT_PAGE`].
    pub fn limit_offset(&mut self) -> (u64, u64) {
        if self.limit == 0 {
            self.limit = DEFAULT_LIMIT;
        }
        if self.page == 0 {
            self.page = DEFAULT_PAGE;
        }
        let offset = (self.page - 1).saturating_mul(self.limit);
        (self.limit, offset)
    }
}

/// `(limit, offset)` for an optional page request; `(0, 0)` when absent
pub fn get_limit_offset(paging: Option<&mut Paging>) -> (u64, u64) {
    paging.map_or((0, 0), Paging::limit_offset)
}

/// Everything a query needs: conditions, sorting and paging
///
/// Conditions are combined with AND; sorting keys apply in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonCondition {
    /// Filter predicates
    pub conditions: Vec<Condition>,
    /// ORDER BY keys
    pub sorting: Vec<Sorting>,
    /// Page request
    pub paging: Option<Paging>,
}

impl Default for CommonCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl CommonCondition {
    /// Empty condition with an empty (unrequested) page
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            sorting: Vec::new(),
            paging: Some(Paging::default()),
        }
    }

    /// Turn an optional condition into one with empty defaults
    pub fn normalize(condition: Option<CommonCondition>) -> CommonCondition {
        condition.unwrap_or_default()
    }

    /// Append a predicate
    pub fn add_condition(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
        op: impl Into<String>,
    ) {
        self.conditions.push(Condition::new(field, value, op));
    }

    /// Set the page request, creating one if absent
    pub fn set_paging(&mut self, limit: u64, page: u64) {
        let paging = self.paging.get_or_insert_with(Paging::default);
        paging.limit = limit;
        paging.page = page;
    }

    /// Append a sort key
    pub fn add_sorting(&mut self, field: impl Into<String>, order: SortDirection) {
        self.sorting.push(Sorting {
            field: field.into(),
            order,
        });
    }

    /// Replace the page request
    #[must_use]
    pub fn with_paging(mut self, limit: u64, page: u64) -> Self {
        self.paging = Some(Paging::new(limit, page));
        self
    }

    /// Append a predicate
    #[must_use]
    pub fn with_condition(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
        op: impl Into<String>,
    ) -> Self {
        self.add_condition(field, value, op);
        self
    }

    /// Append a sort key
    #[must_use]
    pub fn with_sorting(mut self, field: impl Into<String>, order: SortDirection) -> Self {
        self.add_sorting(field, order);
        self
    }

    /// Same predicates, no sorting and no paging
    pub(crate) fn filters_only(&self) -> CommonCondition {
        CommonCondition {
            conditions: self.conditions.clone(),
            sorting: Vec::new(),
            paging: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_case_insensitive() {
        assert_eq!("EQ".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!("Not_ILike".parse::<Operator>().unwrap(), Operator::NotILike);
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn test_operator_parse_unknown() {
        assert_eq!(
            "between".parse::<Operator>(),
            Err(CompileError::UnsupportedOperator("between".into()))
        );
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!(SortDirection::default(), SortDirection::Asc);
    }

    #[test]
    fn test_new_has_empty_paging() {
        let cond = CommonCondition::new();
        assert!(cond.conditions.is_empty());
        assert!(cond.sorting.is_empty());
        assert_eq!(cond.paging, Some(Paging::default()));
    }

    #[test]
    fn test_normalize_none() {
        assert_eq!(CommonCondition::normalize(None), CommonCondition::new());
    }

    #[test]
    fn test_fluent_builders_preserve_order() {
        let cond = CommonCondition::new()
            .with_condition("a", 1_i64, Operator::Equal)
            .with_condition("b", "x", "like")
            .with_sorting("a", SortDirection::Desc)
            .with_sorting("b", SortDirection::Asc)
            .with_paging(25, 3);

        assert_eq!(cond.conditions[0].field, "a");
        assert_eq!(cond.conditions[1].op, "like");
        assert_eq!(cond.sorting[0].order, SortDirection::Desc);
        assert_eq!(cond.paging, Some(Paging { page: 3, limit: 25 }));
    }

    #[test]
    fn test_set_paging_on_missing_paging() {
        let mut cond = CommonCondition {
            paging: None,
            ..CommonCondition::new()
        };
        cond.set_paging(5, 2);
        assert_eq!(cond.paging, Some(Paging { page: 2, limit: 5 }));
    }

    #[test]
    fn test_limit_offset_defaults() {
        let mut paging = Paging::default();
        assert_eq!(paging.limit_offset(), (10, 0));
        // defaults are written back
        assert_eq!(paging, Paging { page: 1, limit: 10 });
    }

    #[test]
    fn test_limit_offset_third_page() {
        let mut paging = Paging::new(10, 3);
        assert_eq!(get_limit_offset(Some(&mut paging)), (10, 20));
        assert_eq!(get_limit_offset(None), (0, 0));
    }

    #[test]
    fn test_is_requested() {
        assert!(!Paging::new(0, 1).is_requested());
        assert!(!Paging::new(10, 0).is_requested());
        assert!(Paging::new(10, 1).is_requested());
    }
}
