//! Generic repository over record types
//!
//! One implementation, [`Repository`], serves every [`Record`](crate::record::Record)
//! type: it compiles conditions into statements, routes them through the
//! request scope's transaction and maps rows back into records.
//!
//! # Features
//!
//! - **Condition queries**: count, paginated and unpaginated reads from a [`CommonCondition`](crate::condition::CommonCondition)
//! - **Lookups by id**: soft-deleted rows are excluded
//! - **Read-back**: [`BaseRepository::create`] returns the stored row, database defaults included
//! - **Bulk insert**: one multi-row INSERT returning the generated ids
//! - **Soft delete**: deletes are UPDATEs shaped by the record's delete hook
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_data::prelude::*;
//!
//! let users: Repository<PgStorage, User> = Repository::new(storage.clone(), "users");
//! let scope = RequestScope::new();
//!
//! let alice = users.create(&scope, User::named("alice")).await?;
//!
//! let page = users
//!     .get_by_condition(
//!         &scope,
//!         CommonCondition::new()
//!             .with_condition("name", "a%", Operator::Like)
//!             .with_sorting("created_at", SortDirection::Desc)
//!             .with_paging(20, 1),
//!     )
//!     .await?;
//! println!("{} of {} users", page.data.len(), page.meta.total_items);
//!
//! users.delete(&scope, alice.base.id).await?;
//! ```

mod generic;
mod traits;

pub use generic::Repository;
pub use traits::BaseRepository;

/// Identity column
pub const ID_COLUMN: &str = "id";

/// Soft-delete marker column; rows with a non-null value are deleted
pub use crate::record::SOFT_DELETE_COLUMN;
