//! The generic repository implementation

use std::marker::PhantomData;
use std::sync::Arc;

use crate::condition::{CommonCondition, Operator};
use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
use crate::query::{
    build_count, build_query, build_update_conditions, get_meta_pagination, InsertBuilder,
    Pagination, Predicate, SelectBuilder, Statement, UpdateBuilder,
};
use crate::record::{columns_and_values, columns_and_values_for_many, columns_of, Record};
use crate::storage::Storage;
use crate::transaction::{self, RequestScope};
use crate::value::{Row, Value};

use super::traits::BaseRepository;
use super::{ID_COLUMN, SOFT_DELETE_COLUMN};

/// Repository for records of type `T` in one table
///
/// Column lists come from the record's [`Fields`](crate::record::Fields)
/// mapping, and rows are decoded with [`Record::from_row`]. Lookups by id
/// skip rows whose `deleted_at` is set; condition queries do not. Every
/// failure is logged with the scope's trace id before it is returned.
///
/// # Example
///
/// ```rust,ignore
/// use acton_data::prelude::*;
///
/// let storage = Arc::new(PgStorage::connect(&config.database).await?);
/// let widgets: Repository<_, Widget> = Repository::new(storage, "widgets");
///
/// let scope = RequestScope::new();
/// let created = widgets.create(&scope, Widget::named("sprocket", 4)).await?;
/// widgets.delete(&scope, created.id).await?;
/// ```
pub struct Repository<S, T> {
    storage: Arc<S>,
    table: String,
    _record: PhantomData<fn() -> T>,
}

impl<S, T> Clone for Repository<S, T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<S, T> std::fmt::Debug for Repository<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<S: Storage, T: Record> Repository<S, T> {
    /// Repository over `table`
    ///
    /// The table name is validated when the first statement is compiled, and
    /// an invalid one fails that call with
    /// [`CompileError::InvalidIdentifier`](crate::error::CompileError::InvalidIdentifier).
    pub fn new(storage: Arc<S>, table: impl Into<String>) -> Self {
        Self {
            storage,
            table: table.into(),
            _record: PhantomData,
        }
    }

    /// Underlying storage
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Table this repository reads and writes
    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn log_failure(&self, scope: &RequestScope<S::Tx>, operation: &'static str, err: &Error) {
        tracing::error!(
            trace_id = %scope.trace_id(),
            table = %self.table,
            operation,
            error = %err,
            "repository operation failed"
        );
    }

    fn select(&self) -> Result<SelectBuilder> {
        Ok(SelectBuilder::new(columns_of::<T>()?).from(self.table.as_str()))
    }

    async fn fetch(&self, scope: &RequestScope<S::Tx>, statement: &Statement) -> Result<Vec<Row>> {
        transaction::fetch_all(self.storage.as_ref(), scope, statement).await
    }

    async fn execute(&self, scope: &RequestScope<S::Tx>, statement: &Statement) -> Result<u64> {
        transaction::execute(self.storage.as_ref(), scope, statement).await
    }

    async fn fetch_records(
        &self,
        scope: &RequestScope<S::Tx>,
        statement: &Statement,
    ) -> Result<Vec<T>> {
        let rows = self.fetch(scope, statement).await?;
        rows.iter().map(T::from_row).collect()
    }

    async fn fetch_count(&self, scope: &RequestScope<S::Tx>, statement: &Statement) -> Result<u64> {
        let rows = self.fetch(scope, statement).await?;
        let count = match rows.first() {
            Some(row) => row.get::<i64>("count")?,
            None => 0,
        };
        u64::try_from(count).map_err(|_| {
            DatabaseError::new(
                DatabaseOperation::Query,
                DatabaseErrorKind::TypeConversion,
                format!("row count {count} is negative"),
            )
            .with_context(self.table.clone())
            .into()
        })
    }

    async fn count_matching(
        &self,
        scope: &RequestScope<S::Tx>,
        condition: &CommonCondition,
    ) -> Result<u64> {
        let statement = build_count(&self.table, condition)?.to_statement()?;
        self.fetch_count(scope, &statement).await
    }

    async fn page(
        &self,
        scope: &RequestScope<S::Tx>,
        condition: CommonCondition,
    ) -> Result<Pagination<T>> {
        let total = self.count_matching(scope, &condition).await?;
        // metadata reflects the paging as requested, before defaults apply
        let meta = get_meta_pagination(total, condition.paging.as_ref());
        let data = self.many(scope, condition).await?;
        Ok(Pagination { data, meta })
    }

    async fn many(&self, scope: &RequestScope<S::Tx>, condition: CommonCondition) -> Result<Vec<T>> {
        let statement = build_query(self.select()?, condition)?.to_statement()?;
        self.fetch_records(scope, &statement).await
    }

    /// Live rows whose identity matches `id`, which may be a list
    fn live_by_id(&self, select: SelectBuilder, id: Value) -> SelectBuilder {
        select
            .and_where(Predicate::eq(ID_COLUMN, id))
            .and_where(Predicate::eq(SOFT_DELETE_COLUMN, Value::Null))
    }

    async fn insert_one(&self, scope: &RequestScope<S::Tx>, mut entity: T) -> Result<T> {
        entity.before_create(self.storage.as_ref(), scope).await?;

        let (columns, values) = columns_and_values(&entity)?;
        let statement = InsertBuilder::new(self.table.as_str())
            .columns(columns)
            .values(values)
            .returning(ID_COLUMN)
            .to_statement()?;

        let rows = self.fetch(scope, &statement).await?;
        let id = rows
            .first()
            .and_then(|row| row.value(ID_COLUMN))
            .cloned()
            .ok_or_else(|| self.not_found_after_insert())?;

        let read_back = CommonCondition::new().with_condition(ID_COLUMN, id, Operator::Equal);
        self.page(scope, read_back)
            .await?
            .data
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found_after_insert())
    }

    async fn insert_many(
        &self,
        scope: &RequestScope<S::Tx>,
        mut entities: Vec<T>,
    ) -> Result<Vec<T::Id>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        for entity in &mut entities {
            entity.before_create(self.storage.as_ref(), scope).await?;
        }

        let (columns, rows) = columns_and_values_for_many(&entities)?;
        let statement = rows
            .into_iter()
            .fold(
                InsertBuilder::new(self.table.as_str()).columns(columns),
                InsertBuilder::values,
            )
            .returning(ID_COLUMN)
            .to_statement()?;

        let rows = self.fetch(scope, &statement).await?;
        rows.iter()
            .map(|row| row.get::<T::Id>(ID_COLUMN).map_err(Error::from))
            .collect()
    }

    async fn update_one(&self, scope: &RequestScope<S::Tx>, id: T::Id, mut entity: T) -> Result<()> {
        entity.before_update(self.storage.as_ref(), scope).await?;

        let (columns, values) = columns_and_values(&entity)?;
        let statement = columns
            .into_iter()
            .zip(values)
            .filter(|(column, _)| column != ID_COLUMN)
            .fold(UpdateBuilder::new(self.table.as_str()), |builder, (column, value)| {
                builder.set(column, value)
            })
            .and_where(Predicate::eq(ID_COLUMN, id))
            .to_statement()?;

        self.execute(scope, &statement).await?;
        Ok(())
    }

    async fn soft_delete(&self, scope: &RequestScope<S::Tx>, builder: UpdateBuilder) -> Result<()> {
        let builder = T::before_delete(self.storage.as_ref(), scope, builder).await?;
        let statement = builder.to_statement()?;
        self.execute(scope, &statement).await?;
        Ok(())
    }

    fn not_found_after_insert(&self) -> Error {
        Error::NotFoundAfterInsert {
            table: self.table.clone(),
        }
    }
}

fn id_list<I: Into<Value>>(ids: Vec<I>) -> Value {
    Value::List(ids.into_iter().map(Into::into).collect())
}

impl<S: Storage, T: Record> BaseRepository<T> for Repository<S, T> {
    type Tx = S::Tx;

    async fn count_by_condition(
        &self,
        scope: &RequestScope<S::Tx>,
        condition: CommonCondition,
    ) -> Result<u64> {
        self.count_matching(scope, &condition)
            .await
            .inspect_err(|e| self.log_failure(scope, "count_by_condition", e))
    }

    async fn get_by_condition(
        &self,
        scope: &RequestScope<S::Tx>,
        condition: CommonCondition,
    ) -> Result<Pagination<T>> {
        self.page(scope, condition)
            .await
            .inspect_err(|e| self.log_failure(scope, "get_by_condition", e))
    }

    async fn get_many(&self, scope: &RequestScope<S::Tx>, condition: CommonCondition) -> Result<Vec<T>> {
        self.many(scope, condition)
            .await
            .inspect_err(|e| self.log_failure(scope, "get_many", e))
    }

    async fn get_by_id(&self, scope: &RequestScope<S::Tx>, id: T::Id) -> Result<Option<T>> {
        let result: Result<Option<T>> = async {
            let statement = self.live_by_id(self.select()?, id.into()).to_statement()?;
            let records = self.fetch_records(scope, &statement).await?;
            Ok(records.into_iter().next())
        }
        .await;
        result.inspect_err(|e| self.log_failure(scope, "get_by_id", e))
    }

    async fn get_by_ids(&self, scope: &RequestScope<S::Tx>, ids: Vec<T::Id>) -> Result<Vec<T>> {
        let result: Result<Vec<T>> = async {
            let statement = self.live_by_id(self.select()?, id_list(ids)).to_statement()?;
            self.fetch_records(scope, &statement).await
        }
        .await;
        result.inspect_err(|e| self.log_failure(scope, "get_by_ids", e))
    }

    async fn create(&self, scope: &RequestScope<S::Tx>, entity: T) -> Result<T> {
        self.insert_one(scope, entity)
            .await
            .inspect_err(|e| self.log_failure(scope, "create", e))
    }

    async fn create_many(&self, scope: &RequestScope<S::Tx>, entities: Vec<T>) -> Result<Vec<T::Id>> {
        self.insert_many(scope, entities)
            .await
            .inspect_err(|e| self.log_failure(scope, "create_many", e))
    }

    async fn update(&self, scope: &RequestScope<S::Tx>, id: T::Id, entity: T) -> Result<()> {
        self.update_one(scope, id, entity)
            .await
            .inspect_err(|e| self.log_failure(scope, "update", e))
    }

    async fn delete(&self, scope: &RequestScope<S::Tx>, id: T::Id) -> Result<()> {
        let builder =
            UpdateBuilder::new(self.table.as_str()).and_where(Predicate::eq(ID_COLUMN, id));
        self.soft_delete(scope, builder)
            .await
            .inspect_err(|e| self.log_failure(scope, "delete", e))
    }

    async fn delete_many(&self, scope: &RequestScope<S::Tx>, ids: Vec<T::Id>) -> Result<()> {
        let builder = UpdateBuilder::new(self.table.as_str())
            .and_where(Predicate::eq(ID_COLUMN, id_list(ids)));
        self.soft_delete(scope, builder)
            .await
            .inspect_err(|e| self.log_failure(scope, "delete_many", e))
    }

    async fn delete_by_condition(
        &self,
        scope: &RequestScope<S::Tx>,
        condition: CommonCondition,
    ) -> Result<()> {
        let result: Result<()> = async {
            let builder =
                build_update_conditions(UpdateBuilder::new(self.table.as_str()), &condition.conditions)?;
            self.soft_delete(scope, builder).await
        }
        .await;
        result.inspect_err(|e| self.log_failure(scope, "delete_by_condition", e))
    }

    async fn exist_by_id(&self, scope: &RequestScope<S::Tx>, id: T::Id) -> Result<bool> {
        let result: Result<bool> = async {
            let statement = self
                .live_by_id(SelectBuilder::count(self.table.as_str()), id.into())
                .to_statement()?;
            Ok(self.fetch_count(scope, &statement).await? > 0)
        }
        .await;
        result.inspect_err(|e| self.log_failure(scope, "exist_by_id", e))
    }
}
