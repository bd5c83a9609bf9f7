use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, OptionalExtension};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};
use crate::posts::PostKind;

/// JSON documents grouped into named collections, kept in SQLite.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

impl DocumentStore {
    /// Open the store named by `uri`: a database path, optionally written as
    /// `sqlite://<path>`.
    pub fn open(uri: &str, collection: &str) -> SiteResult<Self> {
        let path = uri.strip_prefix("sqlite://").unwrap_or(uri).trim();
        if path.is_empty() {
            return Err(SiteError::Configuration(
                "document store connection string is empty".to_string(),
            ));
        }

        let conn = Connection::open(Path::new(path))?;
        Self::run_migrations(&conn)?;

        info!("Document store opened at {} (collection '{}')", path, collection);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
        })
    }

    /// Open an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory(collection: &str) -> SiteResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
        })
    }

    fn run_migrations(conn: &Connection) -> SiteResult<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection
                ON documents(collection);
            ",
        )?;
        Ok(())
    }

    pub async fn ping(&self) -> SiteResult<()> {
        let conn = self.conn.lock().await;
        let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(())
    }

    /// All documents in the collection whose `type` field is `kind`, in
    /// insertion order.
    pub async fn find_by_type(&self, kind: PostKind) -> SiteResult<Vec<Value>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT body FROM documents
             WHERE collection = ?1 AND json_extract(body, '$.type') = ?2
             ORDER BY rowid",
        )?;
        let bodies = stmt
            .query_map(rusqlite::params![&self.collection, kind.as_str()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        bodies.iter().map(|body| parse_body(body)).collect()
    }

    /// Insert a JSON object, returning its generated id.
    pub async fn insert_one(&self, mut doc: Value) -> SiteResult<String> {
        let Some(fields) = doc.as_object_mut() else {
            return Err(SiteError::MalformedData {
                origin: "document store".to_string(),
                message: "only JSON objects can be stored".to_string(),
            });
        };
        let id = Uuid::new_v4().to_string();
        fields.insert("_id".to_string(), json!(id));

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3)",
            rusqlite::params![&id, &self.collection, doc.to_string()],
        )?;
        Ok(id)
    }

    pub async fn count_by_name(&self, name: &str) -> SiteResult<u64> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM documents
             WHERE collection = ?1 AND json_extract(body, '$.name') = ?2",
            rusqlite::params![&self.collection, name],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub async fn find_one_by_name(&self, name: &str) -> SiteResult<Option<Value>> {
        let conn = self.conn.lock().await;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents
                 WHERE collection = ?1 AND json_extract(body, '$.name') = ?2
                 ORDER BY rowid LIMIT 1",
                rusqlite::params![&self.collection, name],
                |row| row.get(0),
            )
            .optional()?;
        body.as_deref().map(parse_body).transpose()
    }

    pub async fn delete_one_by_name(&self, name: &str) -> SiteResult<bool> {
        let conn = self.conn.lock().await;
        let rows = conn.execute(
            "DELETE FROM documents WHERE rowid = (
                SELECT rowid FROM documents
                WHERE collection = ?1 AND json_extract(body, '$.name') = ?2
                ORDER BY rowid LIMIT 1
             )",
            rusqlite::params![&self.collection, name],
        )?;
        Ok(rows > 0)
    }

    /// Startup smoke test: ping, then insert, read back and delete a sample
    /// document. Leaves the collection as it found it.
    pub async fn check_connection(&self) -> SiteResult<()> {
        self.ping().await?;
        info!("Pinged the document store, connection is working");

        let name = "John Doe";
        if self.count_by_name(name).await? == 0 {
            self.insert_one(json!({ "name": name })).await?;
            info!("Added a sample document to '{}'", self.collection);
        }

        let found = self.find_one_by_name(name).await?.ok_or_else(|| {
            SiteError::store("sample document missing right after insert")
        })?;
        info!("Retrieved the sample document: {}", found);

        self.delete_one_by_name(name).await?;
        info!("Deleted the sample document");
        Ok(())
    }
}

fn parse_body(body: &str) -> SiteResult<Value> {
    serde_json::from_str(body).map_err(|e| SiteError::MalformedData {
        origin: "document store".to_string(),
        message: e.to_string(),
    })
}
