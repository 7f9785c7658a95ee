//! Shared fixtures: a recording in-memory storage and sample records
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use acton_data::prelude::*;
use acton_data::query::UpdateBuilder;
use chrono::{DateTime, Utc};

/// A statement as the storage saw it
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub args: Vec<Value>,
    /// Transaction the statement ran in, if any
    pub tx: Option<usize>,
}

/// Transaction of [`MockStorage`]; writes become visible on commit
#[derive(Debug)]
pub struct MockTx {
    pub id: usize,
    writes: Vec<String>,
}

#[derive(Default)]
struct State {
    statements: Vec<Recorded>,
    responses: VecDeque<Result<Vec<Row>>>,
    committed: Vec<String>,
    begins: usize,
    commits: usize,
    rollbacks: usize,
    fail_commit: bool,
    fail_rollback: bool,
}

impl State {
    fn record(&mut self, tx: Option<&mut MockTx>, statement: &Statement) {
        self.statements.push(Recorded {
            sql: statement.sql().to_string(),
            args: statement.args().to_vec(),
            tx: tx.as_ref().map(|tx| tx.id),
        });

        if statement.operation() == DatabaseOperation::Query {
            return;
        }
        match tx {
            Some(tx) => tx.writes.push(statement.sql().to_string()),
            None => self.committed.push(statement.sql().to_string()),
        }
    }
}

/// Storage that records every statement and answers row queries from a script
///
/// Scripted responses are consumed in order by `fetch_all`; when the script
/// is exhausted, queries return no rows.
#[derive(Default)]
pub struct MockStorage {
    state: Mutex<State>,
}

impl MockStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn push_rows(&self, rows: Vec<Row>) {
        self.state().responses.push_back(Ok(rows));
    }

    pub fn push_count(&self, count: i64) {
        self.push_rows(vec![Row::from_pairs([("count", count)])]);
    }

    pub fn push_ids(&self, ids: &[i64]) {
        self.push_rows(ids.iter().map(|id| Row::from_pairs([("id", *id)])).collect());
    }

    pub fn push_error(&self, err: Error) {
        self.state().responses.push_back(Err(err));
    }

    pub fn fail_commits(&self) {
        self.state().fail_commit = true;
    }

    pub fn fail_rollbacks(&self) {
        self.state().fail_rollback = true;
    }

    pub fn statements(&self) -> Vec<Recorded> {
        self.state().statements.clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.state().statements.iter().map(|s| s.sql.clone()).collect()
    }

    /// Writes visible outside any transaction
    pub fn committed(&self) -> Vec<String> {
        self.state().committed.clone()
    }

    pub fn begins(&self) -> usize {
        self.state().begins
    }

    pub fn commits(&self) -> usize {
        self.state().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }
}

impl Storage for MockStorage {
    type Tx = MockTx;

    async fn begin(&self) -> Result<MockTx> {
        let mut state = self.state();
        state.begins += 1;
        Ok(MockTx {
            id: state.begins,
            writes: Vec::new(),
        })
    }

    async fn commit(&self, tx: MockTx) -> Result<()> {
        let mut state = self.state();
        if state.fail_commit {
            return Err(DatabaseError::transaction_failed("commit refused").into());
        }
        state.commits += 1;
        state.committed.extend(tx.writes);
        Ok(())
    }

    async fn rollback(&self, _tx: MockTx) -> Result<()> {
        let mut state = self.state();
        if state.fail_rollback {
            return Err(DatabaseError::transaction_failed("rollback refused").into());
        }
        state.rollbacks += 1;
        Ok(())
    }

    async fn fetch_all(&self, tx: Option<&mut MockTx>, statement: &Statement) -> Result<Vec<Row>> {
        let mut state = self.state();
        state.record(tx, statement);
        state.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute(&self, tx: Option<&mut MockTx>, statement: &Statement) -> Result<u64> {
        self.state().record(tx, statement);
        Ok(1)
    }
}

/// Record with soft delete and a validating create hook
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Widget {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Widget {
    pub fn named(name: &str, quantity: i64) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            ..Default::default()
        }
    }
}

impl Fields for Widget {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.omittable("id", &self.id);
        out.column("name", &self.name);
        out.column("quantity", self.quantity);
        out.omittable("note", &self.note);
        out.omittable("deleted_at", &self.deleted_at);
    }
}

impl Hooks for Widget {
    async fn before_create<S: Storage>(
        &mut self,
        _storage: &S,
        _scope: &RequestScope<S::Tx>,
    ) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::hook("before_create", "name is required"));
        }
        self.name = name.to_string();
        Ok(())
    }

    async fn before_delete<S: Storage>(
        _storage: &S,
        _scope: &RequestScope<S::Tx>,
        builder: UpdateBuilder,
    ) -> Result<UpdateBuilder> {
        Ok(soft_delete_marker(builder))
    }
}

impl Record for Widget {
    type Id = i64;
    const NAME: &'static str = "Widget";

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
            note: row.get("note")?,
            deleted_at: row.get("deleted_at")?,
        })
    }
}

/// Full result row for a widget
pub fn widget_row(id: i64, name: &str, quantity: i64) -> Row {
    let mut row = Row::new();
    row.push("id", id);
    row.push("name", name);
    row.push("quantity", quantity);
    row.push("note", Value::Null);
    row.push("deleted_at", Value::Null);
    row
}

/// Record that keeps the default delete hook
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

impl Fields for Tag {
    fn write_fields(&self, out: &mut FieldWriter) {
        out.omittable("id", &self.id);
        out.column("label", &self.label);
    }
}

impl Hooks for Tag {}

impl Record for Tag {
    type Id = i64;
    const NAME: &'static str = "Tag";

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            label: row.get("label")?,
        })
    }
}

/// Formatted log output of a scoped subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber writing plain text into this buffer; install it with
    /// `tracing::subscriber::set_default`
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn widgets(storage: &Arc<MockStorage>) -> Repository<MockStorage, Widget> {
    Repository::new(Arc::clone(storage), "widgets")
}
