//! SQLite Binding Store
//!
//! Implements BindingStore on a single SQLite table. The primary key
//! serves logical-id lookups and a unique index serves backend-id lookups,
//! so both paths always read the same rows.

use crate::domain::entities::Binding;
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::BindingStore;
use crate::domain::value_objects::ObjectKind;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lb_bindings (
    kind        TEXT NOT NULL,
    logical_id  TEXT NOT NULL,
    instance_id TEXT NOT NULL,
    backend_id  TEXT NOT NULL,
    extra       TEXT,
    PRIMARY KEY (kind, logical_id, instance_id)
);
CREATE UNIQUE INDEX IF NOT EXISTS lb_bindings_backend
    ON lb_bindings (kind, instance_id, backend_id);
";

/// SQLite-backed binding store.
pub struct SqliteBindingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBindingStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Private in-memory database, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection off the async runtime.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| DriverError::Storage(format!("spawn_blocking error: {}", e)))?
    }

    /// Convert a SQLite row to a Binding.
    fn row_to_binding(row: &Row) -> rusqlite::Result<Binding> {
        let kind: String = row.get(0)?;
        let kind = ObjectKind::parse(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown binding kind {}", kind).into(),
            )
        })?;

        Ok(Binding {
            kind,
            logical_id: row.get(1)?,
            instance_id: row.get(2)?,
            backend_id: row.get(3)?,
            extra: row.get(4)?,
        })
    }
}

#[async_trait]
impl BindingStore for SqliteBindingStore {
    async fn put(&self, binding: Binding) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO lb_bindings (kind, logical_id, instance_id, backend_id, extra)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    binding.kind.as_str(),
                    binding.logical_id,
                    binding.instance_id,
                    binding.backend_id,
                    binding.extra
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<Binding> {
        let logical_id = logical_id.to_string();
        let instance_id = instance_id.to_string();

        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT kind, logical_id, instance_id, backend_id, extra FROM lb_bindings
                 WHERE kind = ?1 AND logical_id = ?2 AND instance_id = ?3",
                params![kind.as_str(), logical_id, instance_id],
                Self::row_to_binding,
            )
            .optional()?
            .ok_or(DriverError::BindingNotFound {
                kind,
                id: logical_id,
                instance: instance_id,
            })
        })
        .await
    }

    async fn get_by_backend_id(
        &self,
        kind: ObjectKind,
        instance_id: &str,
        backend_id: &str,
    ) -> Result<Binding> {
        let instance_id = instance_id.to_string();
        let backend_id = backend_id.to_string();

        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT kind, logical_id, instance_id, backend_id, extra FROM lb_bindings
                 WHERE kind = ?1 AND instance_id = ?2 AND backend_id = ?3",
                params![kind.as_str(), instance_id, backend_id],
                Self::row_to_binding,
            )
            .optional()?
            .ok_or(DriverError::BindingNotFound {
                kind,
                id: backend_id,
                instance: instance_id,
            })
        })
        .await
    }

    async fn delete(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<()> {
        let logical_id = logical_id.to_string();
        let instance_id = instance_id.to_string();

        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM lb_bindings WHERE kind = ?1 AND logical_id = ?2 AND instance_id = ?3",
                params![kind.as_str(), logical_id, instance_id],
            )?;
            Ok(())
        })
        .await
    }
}
