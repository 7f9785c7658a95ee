//! Error types for the data-access layer
//!
//! Errors fall into a small taxonomy:
//!
//! - [`CompileError`]: the condition or statement shape is invalid. Never retried.
//! - [`MappingError`]: a record could not be turned into columns, or a row back into a record.
//! - [`DatabaseError`]: the driver failed while executing a statement.
//! - [`Error::InvalidData`]: a constraint violation reported by the driver, normalized
//!   so driver-specific error shapes do not leak to callers.
//! - [`Error::NotFoundAfterInsert`]: the post-create read-back found nothing.
//! - [`Error::NoActiveTransaction`] / [`Error::TransactionFinished`]: transaction state misuse.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Driver errors
// ============================================================================

/// Step that was running when a backend failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Opening the pool
    Connect,
    /// A row-returning statement
    Query,
    /// An INSERT
    Insert,
    /// An UPDATE, soft deletes included
    Update,
    /// A DELETE
    Delete,
    /// Begin, commit or rollback
    Transaction,
    /// Waiting for a pooled connection
    PoolAcquire,
}

impl DatabaseOperation {
    /// Name used in messages and log fields
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Query => "query",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Transaction => "transaction",
            Self::PoolAcquire => "pool_acquire",
        }
    }
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure category reported by a backend
///
/// Constraint violations have no kind here; backends report them as
/// [`Error::InvalidData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// The server could not be reached
    ConnectionFailed,
    /// No pooled connection became free in time
    PoolExhausted,
    /// The statement failed on the server
    QueryFailed,
    /// Begin, commit or rollback failed
    TransactionFailed,
    /// A column could not be decoded, or an argument encoded
    TypeConversion,
    /// Bad connection settings
    Configuration,
}

impl DatabaseErrorKind {
    /// Name used in messages and log fields
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionFailed => "connection_failed",
            Self::PoolExhausted => "pool_exhausted",
            Self::QueryFailed => "query_failed",
            Self::TransactionFailed => "transaction_failed",
            Self::TypeConversion => "type_conversion",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend failure tagged with the step it happened in
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} during {operation}: {message}{}", context_suffix(.context))]
pub struct DatabaseError {
    /// Step that failed
    pub operation: DatabaseOperation,
    /// Failure category
    pub kind: DatabaseErrorKind,
    /// Driver message
    pub message: String,
    /// Extra detail such as a sanitized URL
    pub context: Option<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|ctx| format!(" ({ctx})"))
        .unwrap_or_default()
}

impl DatabaseError {
    /// Create an error without context
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// The pool could not be opened
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::ConnectionFailed,
            message,
        )
    }

    /// A statement failed on the server
    pub fn query_failed(operation: DatabaseOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatabaseErrorKind::QueryFailed, message)
    }

    /// Begin, commit or rollback failed
    pub fn transaction_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Transaction,
            DatabaseErrorKind::TransactionFailed,
            message,
        )
    }

    /// Attach extra detail
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether the same call may succeed when retried
    ///
    /// Nothing in this crate retries statements; connection setup does.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::ConnectionFailed | DatabaseErrorKind::PoolExhausted
        )
    }
}

// ============================================================================
// Compile and mapping errors
// ============================================================================

/// The condition or statement could not be turned into SQL.
///
/// These indicate a caller bug; no statement is issued when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Operator token outside the supported set
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Sort direction token other than asc/desc
    #[error("unsupported sort direction: {0}")]
    UnsupportedSortDirection(String),

    /// Table, column or sort field that is not a plain SQL identifier
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Operand shape not accepted by the operator (e.g. a list for `lt`)
    #[error("invalid operand for {operator} on field {field}")]
    InvalidOperand {
        /// Field the condition targets
        field: String,
        /// Operator token
        operator: String,
    },

    /// UPDATE statement without any SET clause
    #[error("update statement on {table} has no SET clause")]
    EmptySet {
        /// Target table
        table: String,
    },

    /// INSERT or SELECT without columns
    #[error("statement on {table} has no columns")]
    EmptyColumns {
        /// Target table
        table: String,
    },

    /// INSERT without any value row
    #[error("insert statement on {table} has no values")]
    EmptyValues {
        /// Target table
        table: String,
    },

    /// INSERT value row whose width differs from the column list
    #[error("insert row {row} has {actual} values, expected {expected}")]
    RowWidthMismatch {
        /// Zero-based row index
        row: usize,
        /// Column count
        expected: usize,
        /// Values supplied
        actual: usize,
    },
}

/// A record could not be mapped to columns, or a row back to a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Record type resolved to an empty column list
    #[error("record {record} has no columns")]
    NoColumns {
        /// Record name
        record: &'static str,
    },

    /// A base record embedded inside another base record
    #[error("record {record} embeds a base inside its base")]
    NestedBase {
        /// Record name
        record: &'static str,
    },

    /// A record in a batch maps to a different column set than the first one
    #[error("record {index} maps to columns {actual:?}, expected {expected:?}")]
    ColumnMismatch {
        /// Zero-based index in the batch
        index: usize,
        /// Columns of the first record
        expected: Vec<String>,
        /// Columns of the offending record
        actual: Vec<String>,
    },

    /// Row does not contain the requested column
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Column value cannot be converted to the requested type
    #[error("column {column}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Column name
        column: String,
        /// Requested type
        expected: &'static str,
        /// Type of the stored value
        actual: &'static str,
    },

    /// Driver column type with no [`Value`](crate::value::Value) counterpart
    #[error("column {column} has unsupported type {type_name}")]
    UnsupportedColumnType {
        /// Column name
        column: String,
        /// Driver type name
        type_name: String,
    },
}

// ============================================================================
// Crate error
// ============================================================================

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the data-access layer
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Query compilation error
    #[error("Query compile error: {0}")]
    Compile(#[from] CompileError),

    /// Record mapping error
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Structured database error with operation context
    #[error("{0}")]
    Database(DatabaseError),

    /// Constraint violation normalized away from the driver's error shape
    #[error("data invalid")]
    InvalidData,

    /// The row written by a create could not be read back
    #[error("not found record after insert into {table}")]
    NotFoundAfterInsert {
        /// Target table
        table: String,
    },

    /// Commit or rollback requested without a transaction in scope
    #[error("no transaction found in request scope")]
    NoActiveTransaction,

    /// The scope's transaction was already committed or rolled back
    #[error("transaction in request scope is already finished")]
    TransactionFinished,

    /// A record hook rejected the operation
    #[error("{hook} hook failed: {message}")]
    Hook {
        /// Hook name (before_create, before_update, before_delete)
        hook: &'static str,
        /// Failure reported by the hook
        message: String,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a hook failure
    pub fn hook(hook: &'static str, message: impl Into<String>) -> Self {
        Self::Hook {
            hook,
            message: message.into(),
        }
    }

    /// Whether this error came from the query compiler
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Whether this error is a normalized constraint violation
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData)
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<DatabaseError> for Error {
    fn from(err: DatabaseError) -> Self {
        Error::Database(err)
    }
}
