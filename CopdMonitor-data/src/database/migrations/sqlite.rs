use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_documents_table(conn)?;
    create_collection_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the documents table.
///
/// Every document lives in one row keyed by its full path. `collection` holds
/// the parent collection path so a collection can be listed without parsing paths.
fn create_documents_table(conn: &Connection) -> Result<(), String> {
    info!("Creating documents table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            path TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            data TEXT NOT NULL,
            written_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on the parent collection for collection queries
fn create_collection_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on collection");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection
        ON documents (collection)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'documents'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
