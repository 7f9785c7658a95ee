//! Transaction-scoping middleware
//!
//! Begins a transaction before the inner unit of work runs, commits it when
//! the inner call succeeds and rolls it back when it fails. A scope that
//! already carries an active transaction is passed straight through, so
//! nested units of work share the outer transaction.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::Error;
use crate::storage::Storage;
use crate::transaction::TransactionManager;

use super::UnitOfWork;

/// Layer wrapping a unit of work in a transaction
pub struct TransactionLayer<S> {
    manager: TransactionManager<S>,
}

impl<S: Storage> TransactionLayer<S> {
    /// Scope transactions with `manager`
    pub fn new(manager: TransactionManager<S>) -> Self {
        Self { manager }
    }
}

impl<S> Clone for TransactionLayer<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
        }
    }
}

impl<Svc, S> Layer<Svc> for TransactionLayer<S> {
    type Service = TransactionService<Svc, S>;

    fn layer(&self, inner: Svc) -> Self::Service {
        TransactionService {
            inner,
            manager: self.manager.clone(),
        }
    }
}

/// Transaction service implementation
pub struct TransactionService<Svc, S> {
    inner: Svc,
    manager: TransactionManager<S>,
}

impl<Svc: Clone, S> Clone for TransactionService<Svc, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            manager: self.manager.clone(),
        }
    }
}

impl<Svc, S, I> Service<UnitOfWork<S::Tx, I>> for TransactionService<Svc, S>
where
    S: Storage,
    Svc: Service<UnitOfWork<S::Tx, I>, Error = Error> + Clone + Send + 'static,
    Svc::Future: Send + 'static,
    Svc::Response: Send + 'static,
    I: Send + 'static,
{
    type Response = Svc::Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: UnitOfWork<S::Tx, I>) -> Self::Future {
        let mut inner = self.inner.clone();
        let manager = self.manager.clone();

        Box::pin(async move {
            let UnitOfWork { scope, input } = req;

            let already_active = match scope.transaction() {
                Some(handle) => handle.is_active().await,
                None => false,
            };
            if already_active {
                return inner.call(UnitOfWork::new(scope, input)).await;
            }

            let scope = manager.begin_transaction(&scope).await?;

            match inner.call(UnitOfWork::new(scope.clone(), input)).await {
                Ok(output) => {
                    manager.commit_transaction(&scope).await.inspect_err(|e| {
                        tracing::error!(
                            trace_id = %scope.trace_id(),
                            error = %e,
                            "failed to commit transaction"
                        );
                    })?;
                    Ok(output)
                }
                Err(err) => {
                    if let Err(rollback_err) = manager.rollback_transaction(&scope).await {
                        tracing::error!(
                            trace_id = %scope.trace_id(),
                            error = %rollback_err,
                            cause = %err,
                            "failed to rollback transaction"
                        );
                    }
                    Err(err)
                }
            }
        })
    }
}
