//! Storage collaborator
//!
//! The repository never talks to a driver directly. It compiles a
//! [`Statement`] and hands it to a [`Storage`], optionally together with the
//! transaction the current request scope carries. Backends decode result
//! columns into driver-neutral [`Row`]s.
//!
//! The PostgreSQL backend lives in [`postgres`] behind the `postgres` feature.

use std::future::Future;

use crate::error::Result;
use crate::query::Statement;
use crate::value::Row;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PgStorage;

/// Statement execution and transaction primitives of one database
///
/// When `tx` is `Some`, the statement runs inside that transaction; otherwise
/// on a connection the backend chooses.
pub trait Storage: Send + Sync + 'static {
    /// Open transaction handle
    type Tx: Send + 'static;

    /// Open a new transaction
    fn begin(&self) -> impl Future<Output = Result<Self::Tx>> + Send;

    /// Commit and consume a transaction
    fn commit(&self, tx: Self::Tx) -> impl Future<Output = Result<()>> + Send;

    /// Roll back and consume a transaction
    fn rollback(&self, tx: Self::Tx) -> impl Future<Output = Result<()>> + Send;

    /// Run a statement that returns rows
    fn fetch_all(
        &self,
        tx: Option<&mut Self::Tx>,
        statement: &Statement,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Run a statement and return the number of affected rows
    fn execute(
        &self,
        tx: Option<&mut Self::Tx>,
        statement: &Statement,
    ) -> impl Future<Output = Result<u64>> + Send;
}
