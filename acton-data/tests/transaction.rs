//! Transaction manager and request scope routing

mod common;

use acton_data::prelude::*;
use common::{widget_row, widgets, MockStorage, Widget};

#[tokio::test]
async fn test_begin_is_idempotent() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());

    let scope = manager.begin_transaction(&RequestScope::new()).await.unwrap();
    let again = manager.begin_transaction(&scope).await.unwrap();

    assert_eq!(storage.begins(), 1);
    let (first, second) = (scope.transaction().unwrap(), again.transaction().unwrap());
    assert!(first.same_as(second));
    assert_eq!(scope.trace_id(), again.trace_id());
}

#[tokio::test]
async fn test_begin_keeps_trace_id() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage);
    let trace_id = TraceId::new();

    let scope = manager
        .begin_transaction(&RequestScope::with_trace_id(trace_id.clone()))
        .await
        .unwrap();

    assert_eq!(scope.trace_id(), &trace_id);
    assert!(manager.get_transaction(&scope).is_some());
}

#[tokio::test]
async fn test_commit_without_transaction() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());
    let scope = RequestScope::new();

    assert!(matches!(
        manager.commit_transaction(&scope).await,
        Err(Error::NoActiveTransaction)
    ));
    assert!(matches!(
        manager.rollback_transaction(&scope).await,
        Err(Error::NoActiveTransaction)
    ));
    assert!(manager.get_transaction(&scope).is_none());
    assert_eq!(storage.begins(), 0);
}

#[tokio::test]
async fn test_commit_twice_fails() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());
    let scope = manager.begin_transaction(&RequestScope::new()).await.unwrap();

    manager.commit_transaction(&scope).await.unwrap();
    assert!(matches!(
        manager.commit_transaction(&scope).await,
        Err(Error::NoActiveTransaction)
    ));
    assert_eq!(storage.commits(), 1);
    assert!(!scope.transaction().unwrap().is_active().await);
}

#[tokio::test]
async fn test_statements_route_through_scope_transaction() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());
    let repo = widgets(&storage);

    let scope = manager.begin_transaction(&RequestScope::new()).await.unwrap();
    repo.update(&scope, 1, Widget::named("a", 1)).await.unwrap();
    repo.delete(&scope, 2).await.unwrap();

    assert!(storage.statements().iter().all(|s| s.tx == Some(1)));
    assert!(storage.committed().is_empty());

    manager.commit_transaction(&scope).await.unwrap();
    assert_eq!(storage.committed().len(), 2);
}

#[tokio::test]
async fn test_rollback_discards_writes() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());
    let repo = widgets(&storage);

    let scope = manager.begin_transaction(&RequestScope::new()).await.unwrap();
    repo.update(&scope, 1, Widget::named("a", 1)).await.unwrap();
    manager.rollback_transaction(&scope).await.unwrap();

    assert_eq!(storage.rollbacks(), 1);
    assert!(storage.committed().is_empty());
}

#[tokio::test]
async fn test_finished_transaction_rejects_statements() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());
    let repo = widgets(&storage);

    let scope = manager.begin_transaction(&RequestScope::new()).await.unwrap();
    manager.commit_transaction(&scope).await.unwrap();

    let err = repo.get_by_id(&scope, 1).await.unwrap_err();
    assert!(matches!(err, Error::TransactionFinished));
    assert!(storage.statements().is_empty());
}

#[tokio::test]
async fn test_scope_without_transaction_uses_storage() {
    let storage = MockStorage::new();
    storage.push_rows(vec![widget_row(1, "a", 1)]);

    let found = widgets(&storage)
        .get_by_id(&RequestScope::new(), 1)
        .await
        .unwrap();

    assert!(found.is_some());
    assert_eq!(storage.statements()[0].tx, None);
}

#[tokio::test]
async fn test_begin_after_finish_opens_new_transaction() {
    let storage = MockStorage::new();
    let manager = TransactionManager::new(storage.clone());

    let scope = manager.begin_transaction(&RequestScope::new()).await.unwrap();
    manager.rollback_transaction(&scope).await.unwrap();
    let next = manager.begin_transaction(&scope).await.unwrap();

    assert_eq!(storage.begins(), 2);
    assert!(!next
        .transaction()
        .unwrap()
        .same_as(scope.transaction().unwrap()));
}
