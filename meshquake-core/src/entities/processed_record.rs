//! Durable markers for events that have already been reported.
//!
//! Each run mode writes to its own table so rehearsal runs never hide an
//! event from live delivery.

use kanau::processor::Processor;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProcessedRecord {
    pub id: String,
    /// The exact alert text that was composed for the event.
    pub message: String,
    /// Event time in epoch seconds.
    pub timestamp: i64,
}

/// Namespace for processed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTable {
    Live,
    Rehearsal,
}

impl RecordTable {
    pub fn name(self) -> &'static str {
        match self {
            RecordTable::Live => "processed_quakes",
            RecordTable::Rehearsal => "processed_quakes_dev",
        }
    }
}

/// Record store bound to a single table for the whole run.
///
/// Table names come from the closed [`RecordTable`] enum; every value is
/// bound as a query parameter.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    table: RecordTable,
}

impl RecordStore {
    pub fn new(pool: SqlitePool, table: RecordTable) -> Self {
        Self { pool, table }
    }

    /// Open (creating if needed) the SQLite database at `url`.
    ///
    /// A single connection is enough: this process is the only writer.
    pub async fn connect(url: &str, table: RecordTable) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool, table))
    }

    pub fn table(&self) -> RecordTable {
        self.table
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the table for this store if it does not exist yet.
    #[tracing::instrument(skip_all, err, name = "SQL:EnsureProcessedTable")]
    pub async fn ensure_table(&self) -> Result<(), sqlx::Error> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                message TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            self.table.name()
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        tracing::info!(table = self.table.name(), "Initialized record table");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, Clone)]
/// Whether a record with this id exists.
pub struct IsEventProcessed {
    pub id: String,
}

impl Processor<IsEventProcessed> for RecordStore {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:IsEventProcessed")]
    async fn process(&self, query: IsEventProcessed) -> Result<bool, sqlx::Error> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", self.table.name());
        let row = sqlx::query(&sql)
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[derive(Debug, Clone)]
/// Insert a processed record.
///
/// Uses INSERT OR IGNORE: a second insert with the same id keeps the first
/// row untouched. Returns true if a new row was written.
pub struct MarkEventProcessed {
    pub id: String,
    pub message: String,
    pub timestamp: i64,
}

impl Processor<MarkEventProcessed> for RecordStore {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkEventProcessed")]
    async fn process(&self, insert: MarkEventProcessed) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} (id, message, timestamp) VALUES (?, ?, ?)",
            self.table.name()
        );
        let result = sqlx::query(&sql)
            .bind(insert.id)
            .bind(insert.message)
            .bind(insert.timestamp)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Copy)]
/// All records of the table, newest timestamp first.
pub struct ListProcessedRecords;

impl Processor<ListProcessedRecords> for RecordStore {
    type Output = Vec<ProcessedRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListProcessedRecords")]
    async fn process(&self, _: ListProcessedRecords) -> Result<Vec<ProcessedRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT id, message, timestamp FROM {} ORDER BY timestamp DESC",
            self.table.name()
        );
        let records = sqlx::query_as::<_, ProcessedRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }
}

/// In-memory store with its table already created.
#[cfg(test)]
pub(crate) async fn memory_store(table: RecordTable) -> RecordStore {
    let store = RecordStore::connect("sqlite::memory:", table).await.unwrap();
    store.ensure_table().await.unwrap();
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(id: &str, message: &str, timestamp: i64) -> MarkEventProcessed {
        MarkEventProcessed {
            id: id.to_string(),
            message: message.to_string(),
            timestamp,
        }
    }

    fn is_processed(id: &str) -> IsEventProcessed {
        IsEventProcessed { id: id.to_string() }
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_processed() {
        let store = memory_store(RecordTable::Live).await;
        assert!(!store.process(is_processed("nc1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_then_check() {
        let store = memory_store(RecordTable::Live).await;
        assert!(store.process(mark("nc1", "M3.0", 100)).await.unwrap());
        assert!(store.process(is_processed("nc1")).await.unwrap());
        assert!(!store.process(is_processed("nc2")).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_is_idempotent_and_keeps_first_row() {
        let store = memory_store(RecordTable::Live).await;
        assert!(store.process(mark("nc1", "first", 100)).await.unwrap());
        assert!(!store.process(mark("nc1", "second", 200)).await.unwrap());

        let records = store.process(ListProcessedRecords).await.unwrap();
        assert_eq!(
            records,
            vec![ProcessedRecord {
                id: "nc1".to_string(),
                message: "first".to_string(),
                timestamp: 100,
            }]
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = memory_store(RecordTable::Rehearsal).await;
        store.process(mark("a", "a", 100)).await.unwrap();
        store.process(mark("c", "c", 300)).await.unwrap();
        store.process(mark("b", "b", 200)).await.unwrap();

        let ids: Vec<_> = store
            .process(ListProcessedRecords)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_tables_are_isolated() {
        let live = memory_store(RecordTable::Live).await;
        let rehearsal = RecordStore::new(live.pool().clone(), RecordTable::Rehearsal);
        rehearsal.ensure_table().await.unwrap();

        rehearsal.process(mark("nc1", "dry run", 100)).await.unwrap();

        assert!(rehearsal.process(is_processed("nc1")).await.unwrap());
        assert!(!live.process(is_processed("nc1")).await.unwrap());
        assert!(live.process(ListProcessedRecords).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_table_is_repeatable() {
        let store = memory_store(RecordTable::Live).await;
        store.process(mark("nc1", "kept", 1)).await.unwrap();
        store.ensure_table().await.unwrap();
        assert!(store.process(is_processed("nc1")).await.unwrap());
    }

    #[test]
    fn test_table_names() {
        assert_eq!(RecordTable::Live.name(), "processed_quakes");
        assert_eq!(RecordTable::Rehearsal.name(), "processed_quakes_dev");
    }
}
