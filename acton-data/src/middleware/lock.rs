//! Mutual-exclusion middleware
//!
//! Every unit of work wrapped with the same [`LockManager`] runs alone: the
//! lock is taken before the inner call and released when it completes,
//! whether it succeeded or not.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Mutex;
use tower::{Layer, Service};

use super::UnitOfWork;

/// Shared lock; clones refer to the same lock
#[derive(Debug, Clone, Default)]
pub struct LockManager {
    mutex: Arc<Mutex<()>>,
}

impl LockManager {
    /// Create a new, unlocked lock
    pub fn new() -> Self {
        Self::default()
    }
}

/// Layer serializing a unit of work on a [`LockManager`]
#[derive(Debug, Clone)]
pub struct LockLayer {
    lock: LockManager,
}

impl LockLayer {
    /// Serialize on `lock`
    pub fn new(lock: LockManager) -> Self {
        Self { lock }
    }
}

impl<Svc> Layer<Svc> for LockLayer {
    type Service = LockService<Svc>;

    fn layer(&self, inner: Svc) -> Self::Service {
        LockService {
            inner,
            lock: self.lock.clone(),
        }
    }
}

/// Lock service implementation
#[derive(Debug, Clone)]
pub struct LockService<Svc> {
    inner: Svc,
    lock: LockManager,
}

impl<Svc, Tx, I> Service<UnitOfWork<Tx, I>> for LockService<Svc>
where
    Svc: Service<UnitOfWork<Tx, I>> + Clone + Send + 'static,
    Svc::Error: fmt::Display,
    Svc::Future: Send + 'static,
    Tx: Send + 'static,
    I: Send + 'static,
{
    type Response = Svc::Response;
    type Error = Svc::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: UnitOfWork<Tx, I>) -> Self::Future {
        let mut inner = self.inner.clone();
        let mutex = Arc::clone(&self.lock.mutex);

        Box::pin(async move {
            let trace_id = req.scope.trace_id().clone();

            let guard = mutex.lock_owned().await;
            tracing::debug!(trace_id = %trace_id, "mutex locked");

            let result = inner.call(req).await;

            drop(guard);
            tracing::debug!(trace_id = %trace_id, "mutex unlocked");

            result.inspect_err(|e| {
                tracing::error!(
                    trace_id = %trace_id,
                    error = %e,
                    "error during locked execution"
                );
            })
        })
    }
}
