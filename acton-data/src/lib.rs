//! # acton-data
//!
//! Generic repository layer for relational storage. One repository
//! implementation serves every record type: filtered search, pagination,
//! bulk insert and soft delete are written once, and a request scope lets a
//! chain of operations share one transaction.
//!
//! ## Features
//!
//! - **Condition model**: declarative filters, sort keys and paging ([`condition`])
//! - **Query compiler**: injection-safe parameterized SQL ([`query`])
//! - **Column mapping**: records describe their columns through a trait, with one level of shared base fields ([`record`])
//! - **Generic repository**: CRUD, soft delete and read-back after insert ([`repository`])
//! - **Scoped transactions**: an explicit [`RequestScope`](transaction::RequestScope) carries the active transaction ([`transaction`])
//! - **Middleware**: tower layers for transaction scoping and mutual exclusion ([`middleware`])
//! - **PostgreSQL backend**: sqlx connection pool with retries (`postgres` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use acton_data::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     let db = config.database.clone().ok_or_else(|| Error::Other("database not configured".into()))?;
//!     let storage = Arc::new(PgStorage::connect(&db).await?);
//!     let users: Repository<PgStorage, User> = Repository::new(storage.clone(), "users");
//!
//!     let scope = RequestScope::new();
//!     let page = users
//!         .get_by_condition(&scope, CommonCondition::new().with_paging(20, 1))
//!         .await?;
//!     println!("{} users", page.meta.total_items);
//!
//!     Ok(())
//! }
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod query;
pub mod record;
pub mod repository;
pub mod storage;
pub mod transaction;
pub mod value;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::condition::{
        get_limit_offset, CommonCondition, Condition, Operator, Paging, SortDirection, Sorting,
    };
    pub use crate::config::{Config, DatabaseConfig, ServiceConfig};
    pub use crate::error::{
        CompileError, DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, MappingError,
        Result,
    };
    pub use crate::ids::TraceId;
    pub use crate::middleware::{
        execute, unit_of_work, LockLayer, LockManager, TransactionLayer, UnitOfWork,
    };
    pub use crate::observability::init_tracing;
    pub use crate::query::{get_meta_pagination, Meta, Pagination, Statement, UpdateBuilder};
    pub use crate::record::{soft_delete_marker, AuditBase, FieldWriter, Fields, Hooks, Record};
    pub use crate::repository::{BaseRepository, Repository};
    pub use crate::storage::Storage;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PgStorage;
    pub use crate::transaction::{RequestScope, TransactionManager};
    pub use crate::value::{FromValue, Row, Value};
}
