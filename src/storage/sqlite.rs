use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use super::{namespaces, Collection, Collections, Predicate};
use crate::errors::Result;

/// One table per namespace on a shared connection; values are stored as
/// their JSON encoding.
pub struct SqliteCollection<T> {
    connection: Arc<Mutex<Connection>>,
    table: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SqliteCollection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(connection: Arc<Mutex<Connection>>, table: &'static str) -> Result<Self> {
        {
            let conn = connection.lock().unwrap();
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    table
                ),
                [],
            )?;
        }

        Ok(Self {
            connection,
            table,
            _marker: PhantomData,
        })
    }
}

#[async_trait]
impl<T> Collection<T> for SqliteCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>> {
        let conn = self.connection.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT value FROM {} WHERE key = ?1",
            self.table
        ))?;

        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(value) => Ok(Some(serde_json::from_str(&value)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: T) -> Result<()> {
        let json = serde_json::to_string(&value)?;
        let conn = self.connection.lock().unwrap();

        conn.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                self.table
            ),
            params![key, json],
        )?;

        Ok(())
    }

    async fn filter(&self, predicate: Predicate<T>) -> Result<Vec<T>> {
        let conn = self.connection.lock().unwrap();

        let mut stmt = conn.prepare(&format!("SELECT value FROM {}", self.table))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut matches = Vec::new();
        for row in rows {
            let value = row?;
            match serde_json::from_str::<T>(&value) {
                Ok(record) => {
                    if predicate(&record) {
                        matches.push(record);
                    }
                }
                Err(e) => {
                    // Skip broken rows rather than failing the whole scan.
                    error!("Undecodable record in {}: {}", self.table, e);
                }
            }
        }

        Ok(matches)
    }
}

/// Open (or create) the database and build the four namespaces on it.
pub fn open_collections(path: &str) -> Result<Collections> {
    let conn = Connection::open(path)?;
    let connection = Arc::new(Mutex::new(conn));
    info!("SqliteCollection ready: {}", path);

    Ok(Collections {
        users: Arc::new(SqliteCollection::new(
            connection.clone(),
            namespaces::USERS,
        )?),
        shortcodes: Arc::new(SqliteCollection::new(
            connection.clone(),
            namespaces::SHORTCODES,
        )?),
        creations: Arc::new(SqliteCollection::new(
            connection.clone(),
            namespaces::SHORTCODE_CREATIONS,
        )?),
        invocations: Arc::new(SqliteCollection::new(
            connection,
            namespaces::SHORTCODE_INVOCATIONS,
        )?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_collection(dir: &TempDir) -> SqliteCollection<String> {
        let conn = Connection::open(dir.path().join("test.db")).unwrap();
        SqliteCollection::new(Arc::new(Mutex::new(conn)), "test_values").unwrap()
    }

    #[tokio::test]
    async fn test_get_absent() {
        let dir = TempDir::new().unwrap();
        let collection = test_collection(&dir);
        assert!(collection.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let collection = test_collection(&dir);
        collection.set("k", "v".to_string()).await.unwrap();
        assert_eq!(collection.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let dir = TempDir::new().unwrap();
        let collection = test_collection(&dir);
        collection.set("k", "old".to_string()).await.unwrap();
        collection.set("k", "new".to_string()).await.unwrap();
        assert_eq!(collection.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_filter() {
        let dir = TempDir::new().unwrap();
        let collection = test_collection(&dir);
        collection.set("a", "apple".to_string()).await.unwrap();
        collection.set("b", "banana".to_string()).await.unwrap();

        let result = collection
            .filter(Box::new(|v: &String| v.starts_with('b')))
            .await
            .unwrap();
        assert_eq!(result, vec!["banana".to_string()]);
    }
}
