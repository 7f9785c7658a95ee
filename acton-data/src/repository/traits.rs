//! Repository trait definition
//!
//! Async methods use RPITIT (Return Position Impl Trait In Traits), available
//! since Rust 1.75, so no `async_trait` is needed.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_data::prelude::*;
//!
//! async fn restock<R: BaseRepository<Widget>>(repo: &R, scope: &RequestScope<R::Tx>) -> Result<u64> {
//!     let empty = CommonCondition::new().with_condition("quantity", 0_i64, Operator::Equal);
//!     let stale = repo.count_by_condition(scope, empty.clone()).await?;
//!     repo.delete_by_condition(scope, empty).await?;
//!     Ok(stale)
//! }
//! ```

use std::future::Future;

use crate::condition::CommonCondition;
use crate::error::Result;
use crate::query::Pagination;
use crate::record::Record;
use crate::transaction::RequestScope;

/// CRUD surface over one record type
///
/// Every method takes the caller's [`RequestScope`] first; statements run in
/// the scope's transaction when it carries one. Conditions are taken by value
/// and consumed.
///
/// # Errors
///
/// Shared by every method:
///
/// - [`Error::Compile`](crate::Error::Compile) when a condition names an
///   unsupported operator or an invalid identifier. No statement is issued.
/// - [`Error::Database`](crate::Error::Database) when the backend fails.
/// - [`Error::InvalidData`](crate::Error::InvalidData) when the backend
///   reports a constraint violation.
/// - [`Error::TransactionFinished`](crate::Error::TransactionFinished) when the
///   scope's transaction was already committed or rolled back.
pub trait BaseRepository<T: Record>: Send + Sync {
    /// Transaction type of the underlying storage
    type Tx: Send + 'static;

    /// Count rows matching the condition's predicates; sorting and paging are ignored
    ///
    /// # Errors
    ///
    /// A negative count from the backend is reported as a
    /// [`DatabaseErrorKind::TypeConversion`](crate::error::DatabaseErrorKind::TypeConversion)
    /// error.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let low = CommonCondition::new().with_condition("quantity", 5_i64, Operator::LessThan);
    /// let n = repo.count_by_condition(&scope, low).await?;
    /// ```
    fn count_by_condition(
        &self,
        scope: &RequestScope<Self::Tx>,
        condition: CommonCondition,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// One page of matching records with pagination metadata
    ///
    /// Runs the count first, then the paginated select. The metadata reflects
    /// the paging as requested; without paging it describes a single page
    /// holding every match.
    ///
    /// # Errors
    ///
    /// If the select fails its error is returned and no partial result.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let condition = CommonCondition::new()
    ///     .with_sorting("name", SortDirection::Asc)
    ///     .with_paging(20, 2);
    /// let page = repo.get_by_condition(&scope, condition).await?;
    /// println!("page {} of {}", page.meta.current_page, page.meta.total_pages);
    /// ```
    fn get_by_condition(
        &self,
        scope: &RequestScope<Self::Tx>,
        condition: CommonCondition,
    ) -> impl Future<Output = Result<Pagination<T>>> + Send;

    /// Matching records, honoring the condition's sorting and paging as given
    ///
    /// Soft-deleted rows are included unless the condition excludes them.
    fn get_many(
        &self,
        scope: &RequestScope<Self::Tx>,
        condition: CommonCondition,
    ) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// The record with this id unless soft-deleted
    ///
    /// Returns `Ok(None)` when nothing matches.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// match repo.get_by_id(&scope, 42).await? {
    ///     Some(widget) => println!("found {}", widget.name),
    ///     None => println!("no such widget"),
    /// }
    /// ```
    fn get_by_id(
        &self,
        scope: &RequestScope<Self::Tx>,
        id: T::Id,
    ) -> impl Future<Output = Result<Option<T>>> + Send;

    /// The records with these ids that are not soft-deleted
    ///
    /// An empty id list matches nothing; the statement is still issued.
    fn get_by_ids(
        &self,
        scope: &RequestScope<Self::Tx>,
        ids: Vec<T::Id>,
    ) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// Insert a record and return it as stored
    ///
    /// `before_create` runs first and may rewrite the record. The row is then
    /// read back by its generated id so that database defaults are reflected.
    ///
    /// # Errors
    ///
    /// - [`Error::Hook`](crate::Error::Hook) when `before_create` rejects the
    ///   record. Nothing is issued.
    /// - [`Error::NotFoundAfterInsert`](crate::Error::NotFoundAfterInsert) when
    ///   the read-back finds nothing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let stored = repo.create(&scope, Widget::named("sprocket", 4)).await?;
    /// assert!(stored.id > 0);
    /// ```
    fn create(
        &self,
        scope: &RequestScope<Self::Tx>,
        entity: T,
    ) -> impl Future<Output = Result<T>> + Send;

    /// Insert records in one statement and return their ids in insertion order
    ///
    /// Empty input issues no statement and returns no ids.
    ///
    /// # Errors
    ///
    /// [`MappingError::ColumnMismatch`](crate::error::MappingError::ColumnMismatch)
    /// when the records do not all map to the same columns.
    fn create_many(
        &self,
        scope: &RequestScope<Self::Tx>,
        entities: Vec<T>,
    ) -> impl Future<Output = Result<Vec<T::Id>>> + Send;

    /// Write the record's columns, except the identity column, to the row with this id
    fn update(
        &self,
        scope: &RequestScope<Self::Tx>,
        id: T::Id,
        entity: T,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Soft-delete the row with this id
    ///
    /// The record's `before_delete` hook supplies the SET clause, usually via
    /// [`soft_delete_marker`](crate::record::soft_delete_marker).
    ///
    /// # Errors
    ///
    /// [`CompileError::EmptySet`](crate::error::CompileError::EmptySet) when
    /// the hook leaves the update without assignments.
    fn delete(
        &self,
        scope: &RequestScope<Self::Tx>,
        id: T::Id,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Soft-delete the rows with these ids
    fn delete_many(
        &self,
        scope: &RequestScope<Self::Tx>,
        ids: Vec<T::Id>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Soft-delete the rows matching the condition's predicates
    fn delete_by_condition(
        &self,
        scope: &RequestScope<Self::Tx>,
        condition: CommonCondition,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Whether a row with this id exists and is not soft-deleted
    fn exist_by_id(
        &self,
        scope: &RequestScope<Self::Tx>,
        id: T::Id,
    ) -> impl Future<Output = Result<bool>> + Send;
}
