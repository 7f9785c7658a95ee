//! Record contract and column mapping
//!
//! A record type describes its columns by writing them into a [`FieldWriter`].
//! The same description yields both the column list of the type (used for
//! SELECT projections) and the column/value pairs of one instance (used for
//! INSERT and UPDATE).
//!
//! Fields written with [`FieldWriter::omittable`] are left out of an
//! instance's pairs when they hold their default value, which is how partial
//! updates are expressed. One level of shared base fields, such as
//! [`AuditBase`], can be spliced in with [`FieldWriter::base`].
//!
//! ```rust
//! use acton_data::record::{columns_and_values, columns_of, AuditBase, FieldWriter, Fields, Hooks, Record};
//! use acton_data::value::Row;
//! use uuid::Uuid;
//!
//! #[derive(Debug, Default, Clone)]
//! struct User {
//!     base: AuditBase,
//!     name: String,
//!     nickname: Option<String>,
//! }
//!
//! impl Fields for User {
//!     fn write_fields(&self, out: &mut FieldWriter) {
//!         out.base(&self.base);
//!         out.column("name", &self.name);
//!         out.omittable("nickname", &self.nickname);
//!     }
//! }
//!
//! impl Hooks for User {}
//!
//! impl Record for User {
//!     type Id = Uuid;
//!     const NAME: &'static str = "User";
//!
//!     fn from_row(row: &Row) -> acton_data::Result<Self> {
//!         Ok(Self {
//!             base: AuditBase::from_row(row)?,
//!             name: row.get("name")?,
//!             nickname: row.get("nickname")?,
//!         })
//!     }
//! }
//!
//! assert_eq!(
//!     columns_of::<User>().unwrap(),
//!     ["id", "created_at", "updated_at", "deleted_at", "name", "nickname"]
//! );
//!
//! let user = User { name: "ada".into(), ..Default::default() };
//! let (columns, _values) = columns_and_values(&user).unwrap();
//! assert_eq!(columns, ["name"]);
//! ```

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use uuid::Uuid;

use crate::error::{MappingError, Result};
use crate::query::UpdateBuilder;
use crate::storage::Storage;
use crate::transaction::RequestScope;
use crate::value::{FromValue, Row, Value};

/// Name of the soft-delete marker column
pub const SOFT_DELETE_COLUMN: &str = "deleted_at";

/// Types that describe their columns
///
/// Implemented by records and by base structs embedded in records.
pub trait Fields {
    /// Write every column in declaration order
    fn write_fields(&self, out: &mut FieldWriter);
}

/// Optional per-record hooks run by the repository
///
/// Every method has a no-op default, so a record overrides only the hooks it
/// needs. An error returned from a hook aborts the operation before any
/// statement is issued.
pub trait Hooks {
    /// Runs on each record before it is mapped for INSERT
    fn before_create<S: Storage>(
        &mut self,
        _storage: &S,
        _scope: &RequestScope<S::Tx>,
    ) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Runs on the record before it is mapped for UPDATE
    fn before_update<S: Storage>(
        &mut self,
        _storage: &S,
        _scope: &RequestScope<S::Tx>,
    ) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Shapes the soft-delete UPDATE
    ///
    /// Receives the builder with its WHERE clause already set and returns the
    /// builder to compile. The default adds no SET clause, so a record that
    /// supports deletion must override this, typically with
    /// [`soft_delete_marker`].
    fn before_delete<S: Storage>(
        _storage: &S,
        _scope: &RequestScope<S::Tx>,
        builder: UpdateBuilder,
    ) -> impl Future<Output = Result<UpdateBuilder>> + Send {
        async move { Ok(builder) }
    }
}

/// A record type stored in one table
pub trait Record: Fields + Hooks + Default + Send + Sync + Sized + 'static {
    /// Identity column type
    type Id: Into<Value> + FromValue + Clone + Send + Sync + Display;

    /// Record name used in error messages
    const NAME: &'static str;

    /// Build a record from a result row
    fn from_row(row: &Row) -> Result<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Column names of the type; nothing is omitted
    Columns,
    /// Column/value pairs of an instance; default omittable fields are skipped
    Values,
}

/// Sink for a record's column description
#[derive(Debug)]
pub struct FieldWriter {
    record: &'static str,
    mode: WriteMode,
    base_depth: usize,
    columns: Vec<String>,
    values: Vec<Value>,
    error: Option<MappingError>,
}

impl FieldWriter {
    fn new(record: &'static str, mode: WriteMode) -> Self {
        Self {
            record,
            mode,
            base_depth: 0,
            columns: Vec::new(),
            values: Vec::new(),
            error: None,
        }
    }

    /// Write a column that is always present
    pub fn column(&mut self, name: &str, value: impl Into<Value>) {
        self.columns.push(name.to_string());
        self.values.push(value.into());
    }

    /// Write a column that is left out of an instance's pairs while it holds its default
    pub fn omittable<V>(&mut self, name: &str, value: &V)
    where
        V: Default + PartialEq + Clone + Into<Value>,
    {
        if self.mode == WriteMode::Values && *value == V::default() {
            return;
        }
        self.column(name, value.clone());
    }

    /// Splice an embedded base struct's columns in place
    ///
    /// Only one level is flattened; a base that embeds another base fails the
    /// mapping with [`MappingError::NestedBase`].
    pub fn base<B: Fields + ?Sized>(&mut self, base: &B) {
        if self.base_depth > 0 {
            self.error.get_or_insert(MappingError::NestedBase {
                record: self.record,
            });
            return;
        }
        self.base_depth += 1;
        base.write_fields(self);
        self.base_depth -= 1;
    }

    fn finish(self) -> std::result::Result<(Vec<String>, Vec<Value>), MappingError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.columns, self.values)),
        }
    }
}

/// Column list of a record type, including omittable columns
pub fn columns_of<T: Record>() -> std::result::Result<Vec<String>, MappingError> {
    let mut writer = FieldWriter::new(T::NAME, WriteMode::Columns);
    T::default().write_fields(&mut writer);
    let (columns, _) = writer.finish()?;
    if columns.is_empty() {
        return Err(MappingError::NoColumns { record: T::NAME });
    }
    Ok(columns)
}

/// Column/value pairs of one record, omitting default omittable fields
pub fn columns_and_values<T: Record>(
    record: &T,
) -> std::result::Result<(Vec<String>, Vec<Value>), MappingError> {
    let mut writer = FieldWriter::new(T::NAME, WriteMode::Values);
    record.write_fields(&mut writer);
    writer.finish()
}

/// Shared column list and one value row per record
///
/// Every record must map to the same columns as the first one.
pub fn columns_and_values_for_many<T: Record>(
    records: &[T],
) -> std::result::Result<(Vec<String>, Vec<Vec<Value>>), MappingError> {
    let mut shared: Option<Vec<String>> = None;
    let mut rows = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let (columns, values) = columns_and_values(record)?;
        match &shared {
            None => shared = Some(columns),
            Some(expected) if *expected != columns => {
                return Err(MappingError::ColumnMismatch {
                    index,
                    expected: expected.clone(),
                    actual: columns,
                });
            }
            Some(_) => {}
        }
        rows.push(values);
    }

    Ok((shared.unwrap_or_default(), rows))
}

/// Set the soft-delete marker to the current time
pub fn soft_delete_marker(builder: UpdateBuilder) -> UpdateBuilder {
    builder.set(SOFT_DELETE_COLUMN, Utc::now())
}

/// Shared audit columns: identity, timestamps and soft-delete marker
///
/// Every field is omittable so that the database supplies the identity and
/// timestamps on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditBase {
    /// Identity
    pub id: Uuid,
    /// Creation time
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete time
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuditBase {
    /// Read the audit columns from a row
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get(SOFT_DELETE_COLUMN)?,
        })
    }

    /// Whether the soft-delete marker is set
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Fields for AuditBase {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.omittable("id", &self.id);
        out.omittable("created_at", &self.created_at);
        out.omittable("updated_at", &self.updated_at);
        out.omittable(SOFT_DELETE_COLUMN, &self.deleted_at);
    }
}
