//! Database connection module for COPD Monitor
//!
//! Documents persist to a single SQLite file reached through an r2d2 pool.
//! The pool is created once at startup and shared through a global cell.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// SQLite connection pool
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<SqlitePool> = OnceCell::new();

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Filesystem error while preparing the database location
    #[error("Database path error: {0}")]
    PathError(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "./data/copd_monitor.db".to_string(),
            pool_size: 5,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);

        let pool_size = env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.pool_size);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={}, pool_size={}, timeout={}s",
            sqlite_path, pool_size, timeout_seconds
        );

        Self {
            sqlite_path,
            pool_size,
            timeout_seconds,
        }
    }
}

/// Build a SQLite pool for the given configuration and run migrations on it
pub fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    info!("Initializing SQLite database at: {}", config.sqlite_path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {:?}: {}", parent, e);
                DatabaseError::PathError(e.to_string())
            })?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Build a pool over a private in-memory database.
///
/// Limited to one connection: every `:memory:` connection opens its own database.
pub fn create_in_memory_pool() -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder().max_size(1).build(manager)?;

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    Ok(pool)
}

/// Initialize the global database connection pool from the environment
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env();
    let pool = match create_pool(&config) {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Failed to open {} ({}), falling back to in-memory database", config.sqlite_path, e);
            create_in_memory_pool()?
        }
    };

    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<SqlitePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;
    Some(describe_pool(pool))
}

/// Describe a pool's backing file and connection counts
pub fn describe_pool(pool: &SqlitePool) -> String {
    match pool.get() {
        Ok(conn) => {
            let location = match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
                Ok(path) if path.is_empty() || path == ":memory:" => "SQLite in-memory database".to_string(),
                Ok(path) => format!("SQLite database at {}", path),
                Err(_) => "SQLite database (path unknown)".to_string(),
            };

            let state = pool.state();
            format!(
                "{} healthy (connections: active={}, idle={})",
                location, state.connections, state.idle_connections
            )
        },
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            format!("SQLite connection error: {}", e)
        }
    }
}
