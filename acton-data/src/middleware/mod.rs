//! Execution middleware for units of work
//!
//! A unit of work is any tower [`Service`] that takes a [`UnitOfWork`] (the
//! request scope plus an input) and fails with [`crate::Error`]. Middleware are
//! tower [`Layer`](tower::Layer)s composed with [`tower::ServiceBuilder`]: the
//! first layer added is the outermost one, so it observes the request first
//! and the response last.
//!
//! ```rust,ignore
//! use acton_data::middleware::{execute, unit_of_work, LockLayer, LockManager, TransactionLayer};
//! use tower::ServiceBuilder;
//!
//! let transfer = ServiceBuilder::new()
//!     .layer(LockLayer::new(lock_manager.clone()))
//!     .layer(TransactionLayer::new(TransactionManager::new(storage.clone())))
//!     .service(unit_of_work(move |scope, (from, to, amount)| {
//!         let accounts = accounts.clone();
//!         async move {
//!             accounts.update(&scope, from, debit(amount)).await?;
//!             accounts.update(&scope, to, credit(amount)).await
//!         }
//!     }));
//!
//! execute(transfer, RequestScope::new(), (alice, bob, 100)).await?;
//! ```

use std::future::Future;
use tower::util::{service_fn, ServiceFn};
use tower::{Service, ServiceExt};

use crate::error::{Error, Result};
use crate::transaction::RequestScope;

mod lock;
mod transaction;

pub use lock::{LockLayer, LockManager, LockService};
pub use transaction::{TransactionLayer, TransactionService};

/// Request passed through the middleware chain
pub struct UnitOfWork<Tx, I> {
    /// Request scope; the transaction middleware replaces it with a transactional one
    pub scope: RequestScope<Tx>,
    /// Caller input
    pub input: I,
}

impl<Tx, I> UnitOfWork<Tx, I> {
    /// Create a request
    pub fn new(scope: RequestScope<Tx>, input: I) -> Self {
        Self { scope, input }
    }
}

/// Adapt an async function of `(scope, input)` into a unit-of-work service
pub fn unit_of_work<Tx, I, O, F, Fut>(
    f: F,
) -> ServiceFn<impl FnMut(UnitOfWork<Tx, I>) -> Fut + Clone>
where
    F: Fn(RequestScope<Tx>, I) -> Fut + Clone,
    Fut: Future<Output = Result<O>>,
{
    service_fn(move |req: UnitOfWork<Tx, I>| f(req.scope, req.input))
}

/// Drive one call through a composed service
pub async fn execute<Svc, Tx, I, O>(service: Svc, scope: RequestScope<Tx>, input: I) -> Result<O>
where
    Svc: Service<UnitOfWork<Tx, I>, Response = O, Error = Error>,
{
    service.oneshot(UnitOfWork::new(scope, input)).await
}
