//! Query compiler
//!
//! Turns a [`CommonCondition`](crate::condition::CommonCondition) and a table
//! name into parameterized statements. Identifiers are validated before they
//! are spliced into SQL and every operand is bound as a `$n` argument, except
//! `NULL` which is written literally.
//!
//! ```rust
//! use acton_data::condition::{CommonCondition, Operator};
//! use acton_data::query::{build_query, SelectBuilder};
//!
//! let condition = CommonCondition::new()
//!     .with_condition("email", "%@example.com", Operator::ILike)
//!     .with_paging(10, 2);
//! let stmt = build_query(SelectBuilder::new(["id", "email"]).from("users"), condition)
//!     .unwrap()
//!     .to_statement()
//!     .unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT id, email FROM users WHERE email ILIKE $1 LIMIT 10 OFFSET 10"
//! );
//! ```

mod compile;
mod insert;
mod meta;
mod predicate;
mod select;
mod statement;
mod update;

pub use compile::{
    build_conditions, build_count, build_paging, build_query, build_sorting,
    build_update_conditions,
};
pub use insert::InsertBuilder;
pub use meta::{get_meta_pagination, Meta, Pagination};
pub use predicate::{Predicate, PredicateKind};
pub use select::SelectBuilder;
pub use statement::{validate_identifier, Statement};
pub use update::UpdateBuilder;
