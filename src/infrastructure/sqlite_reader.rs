//! `SQLite` reader for Cursor's per-workspace state.vscdb files.
//!
//! Chat payloads live in the `ItemTable` key/value table.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};

use crate::domain::SourceKey;

/// Raw key-value pair from the database.
#[derive(Debug)]
pub struct RawKvEntry {
    pub key: SourceKey,
    pub value: Vec<u8>,
}

/// Read-only connection to one workspace state database.
///
/// The connection is closed when the reader is dropped.
pub struct StateDbReader {
    conn: Connection,
}

impl StateDbReader {
    /// Opens a state database in read-only mode.
    ///
    /// # Errors
    /// Returns error if database cannot be opened.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags)?;

        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA temp_store = MEMORY;",
        )?;

        Ok(Self { conn })
    }

    /// Fetches the rows stored under the known chat keys.
    ///
    /// # Errors
    /// Returns error if the query fails (e.g. `ItemTable` is missing).
    pub fn fetch_chat_entries(&self) -> rusqlite::Result<Vec<RawKvEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT [key], value FROM ItemTable WHERE [key] IN (?1, ?2)")?;

        let keys = [SourceKey::ChatData.as_str(), SourceKey::ComposerData.as_str()];
        let rows = stmt.query_map(params![keys[0], keys[1]], |row| {
            let key: String = row.get(0)?;
            // Handle both TEXT and BLOB value types
            let value = match row.get_ref(1)? {
                ValueRef::Blob(b) => b.to_vec(),
                ValueRef::Text(t) => t.to_vec(),
                _ => Vec::new(),
            };
            Ok((key, value))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            match row {
                Ok((key, value)) => {
                    if let Some(key) = SourceKey::from_key(&key) {
                        entries.push(RawKvEntry { key, value });
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read row: {}", e);
                }
            }
        }

        // Chat data before composer data, regardless of rowid order
        entries.sort_by_key(|e| e.key != SourceKey::ChatData);

        tracing::debug!("Fetched {} chat entries", entries.len());

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_db(path: &Path, rows: &[(&str, &str)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch("CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);")
            .unwrap();
        for (key, value) in rows {
            conn.execute(
                "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_fetch_only_known_keys() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.vscdb");
        create_db(
            &db_path,
            &[
                ("composer.composerData", "{}"),
                ("unrelated.key", "{}"),
                ("workbench.panel.aichat.view.aichat.chatdata", r#"{"tabs":[]}"#),
            ],
        );

        let reader = StateDbReader::open(&db_path).unwrap();
        let entries = reader.fetch_chat_entries().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, SourceKey::ChatData);
        assert_eq!(entries[0].value, br#"{"tabs":[]}"#.to_vec());
        assert_eq!(entries[1].key, SourceKey::ComposerData);
    }

    #[test]
    fn test_blob_values_are_read() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.vscdb");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("CREATE TABLE ItemTable (key TEXT, value BLOB);")
            .unwrap();
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
            params!["composer.composerData", b"{\"a\":1}".to_vec()],
        )
        .unwrap();
        drop(conn);

        let reader = StateDbReader::open(&db_path).unwrap();
        let entries = reader.fetch_chat_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, b"{\"a\":1}".to_vec());
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.vscdb");
        Connection::open(&db_path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();

        let reader = StateDbReader::open(&db_path).unwrap();
        assert!(reader.fetch_chat_entries().is_err());
    }
}
