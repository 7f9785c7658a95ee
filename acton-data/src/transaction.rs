//! Request scopes and transaction management
//!
//! A [`RequestScope`] is threaded explicitly through every repository call. It
//! carries the request's [`TraceId`] and, once a transaction has been begun,
//! a shared [`TransactionHandle`]. Statements issued with a scope that holds an
//! active transaction run inside it; all others run on the storage's own
//! connections.
//!
//! State per scope chain: no transaction, then active, then finished
//! (committed or rolled back).
//!
//! ```rust,ignore
//! let manager = TransactionManager::new(storage.clone());
//! let scope = manager.begin_transaction(&RequestScope::new()).await?;
//!
//! users.create(&scope, alice).await?;
//! accounts.create(&scope, alice_account).await?;
//!
//! manager.commit_transaction(&scope).await?;
//! ```

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::ids::TraceId;
use crate::query::Statement;
use crate::storage::Storage;
use crate::value::Row;

/// Shared handle to one transaction
///
/// Clones refer to the same transaction. The inner slot is emptied when the
/// transaction is committed or rolled back.
pub struct TransactionHandle<Tx> {
    inner: Arc<Mutex<Option<Tx>>>,
}

impl<Tx> TransactionHandle<Tx> {
    fn new(tx: Tx) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Whether both handles refer to the same transaction
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the transaction is still open
    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    async fn take(&self) -> Option<Tx> {
        self.inner.lock().await.take()
    }
}

impl<Tx> Clone for TransactionHandle<Tx> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Tx> fmt::Debug for TransactionHandle<Tx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

/// Per-request context: trace id and optional transaction
pub struct RequestScope<Tx> {
    trace_id: TraceId,
    transaction: Option<TransactionHandle<Tx>>,
}

impl<Tx> RequestScope<Tx> {
    /// Scope with a freshly generated trace id and no transaction
    pub fn new() -> Self {
        Self::with_trace_id(TraceId::new())
    }

    /// Scope for an incoming trace id
    pub fn with_trace_id(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            transaction: None,
        }
    }

    /// Trace id for log correlation
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Transaction handle, if one was begun in this scope chain
    pub fn transaction(&self) -> Option<&TransactionHandle<Tx>> {
        self.transaction.as_ref()
    }

    /// Whether a transaction handle is attached
    pub fn has_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    fn with_transaction(&self, handle: TransactionHandle<Tx>) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            transaction: Some(handle),
        }
    }
}

impl<Tx> Default for RequestScope<Tx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tx> Clone for RequestScope<Tx> {
    fn clone(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            transaction: self.transaction.clone(),
        }
    }
}

impl<Tx> fmt::Debug for RequestScope<Tx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("trace_id", &self.trace_id)
            .field("transaction", &self.transaction)
            .finish()
    }
}

/// Begins, commits and rolls back the transaction carried by a [`RequestScope`]
pub struct TransactionManager<S> {
    storage: Arc<S>,
}

impl<S> Clone for TransactionManager<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> TransactionManager<S> {
    /// Manage transactions on `storage`
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Underlying storage
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Begin a transaction unless the scope already carries an active one
    ///
    /// Returns a scope to use for the rest of the unit of work. When a
    /// transaction is already active the returned scope shares its handle.
    pub async fn begin_transaction(&self, scope: &RequestScope<S::Tx>) -> Result<RequestScope<S::Tx>> {
        if let Some(handle) = scope.transaction() {
            if handle.is_active().await {
                return Ok(scope.clone());
            }
        }

        let tx = self.storage.begin().await.inspect_err(|e| {
            tracing::error!(trace_id = %scope.trace_id(), error = %e, "failed to begin transaction");
        })?;
        Ok(scope.with_transaction(TransactionHandle::new(tx)))
    }

    /// Commit the scope's transaction
    pub async fn commit_transaction(&self, scope: &RequestScope<S::Tx>) -> Result<()> {
        let tx = Self::take_active(scope).await?;
        self.storage.commit(tx).await
    }

    /// Roll back the scope's transaction
    pub async fn rollback_transaction(&self, scope: &RequestScope<S::Tx>) -> Result<()> {
        let tx = Self::take_active(scope).await?;
        self.storage.rollback(tx).await
    }

    /// The scope's transaction handle, if any; never begins one
    pub fn get_transaction<'a>(
        &self,
        scope: &'a RequestScope<S::Tx>,
    ) -> Option<&'a TransactionHandle<S::Tx>> {
        scope.transaction()
    }

    async fn take_active(scope: &RequestScope<S::Tx>) -> Result<S::Tx> {
        match scope.transaction() {
            Some(handle) => handle.take().await.ok_or(Error::NoActiveTransaction),
            None => Err(Error::NoActiveTransaction),
        }
    }
}

/// Run a row-returning statement in the scope's transaction, or on the storage
pub async fn fetch_all<S: Storage>(
    storage: &S,
    scope: &RequestScope<S::Tx>,
    statement: &Statement,
) -> Result<Vec<Row>> {
    match scope.transaction() {
        Some(handle) => {
            let mut slot = handle.inner.lock().await;
            let tx = slot.as_mut().ok_or(Error::TransactionFinished)?;
            storage.fetch_all(Some(tx), statement).await
        }
        None => storage.fetch_all(None, statement).await,
    }
}

/// Run a statement in the scope's transaction, or on the storage
pub async fn execute<S: Storage>(
    storage: &S,
    scope: &RequestScope<S::Tx>,
    statement: &Statement,
) -> Result<u64> {
    match scope.transaction() {
        Some(handle) => {
            let mut slot = handle.inner.lock().await;
            let tx = slot.as_mut().ok_or(Error::TransactionFinished)?;
            storage.execute(Some(tx), statement).await
        }
        None => storage.execute(None, statement).await,
    }
}
