use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::connection::Database;

impl Database {
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM storage WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read storage key '{key}'"))?;
            Ok(value)
        })
        .await
    }

    /// Inserts or overwrites `key`.
    pub async fn put_value(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO storage (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write storage key '{key}'"))?;
            Ok(())
        })
        .await
    }

    /// Returns whether a row was actually removed.
    pub async fn delete_value(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.execute(move |conn| {
            let rows_affected = conn
                .execute("DELETE FROM storage WHERE key = ?1", params![key])
                .with_context(|| format!("failed to delete storage key '{key}'"))?;
            Ok(rows_affected > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_overwrite_delete() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("log.sqlite3")).unwrap();

        assert_eq!(db.get_value("k").await.unwrap(), None);

        db.put_value("k", "first".into()).await.unwrap();
        assert_eq!(db.get_value("k").await.unwrap().as_deref(), Some("first"));

        db.put_value("k", "second".into()).await.unwrap();
        assert_eq!(db.get_value("k").await.unwrap().as_deref(), Some("second"));

        assert!(db.delete_value("k").await.unwrap());
        assert!(!db.delete_value("k").await.unwrap());
        assert_eq!(db.get_value("k").await.unwrap(), None);
    }
}
