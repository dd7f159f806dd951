//src/db.rs
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

// Logical storage keys. Values are JSON documents.
pub const KEY_TEMPLATES: &str = "workoutTemplates";
pub const KEY_HISTORY: &str = "workoutHistory"; // Newest first
pub const KEY_MEASUREMENTS: &str = "measurements";
pub const KEY_CURRENT_WORKOUT: &str = "currentWorkout";
pub const KEY_WORKOUT_START_TIME: &str = "workoutStartTime";
pub const KEY_CUSTOM_EXERCISES: &str = "customExercises";

const DB_FILE_NAME: &str = "workouts.sqlite";
const APP_DATA_DIR: &str = "workout-logger";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed for '{key}': {source}")]
    WriteFailed {
        key: String,
        source: rusqlite::Error,
    },
    #[error("Stored value for '{key}' could not be (de)serialized: {source}")]
    Serialization {
        key: String,
        source: serde_json::Error,
    },
}

/// Gets the path to the SQLite database file within the app's data directory.
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::Connection)
}

/// Creates the key/value table if it does not exist.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,       -- JSON document
            updated_at TEXT NOT NULL   -- RFC3339
        )",
        [],
    )
    .map_err(DbError::Connection)?;
    Ok(())
}

pub fn get_raw(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(DbError::QueryFailed)
}

pub fn set_raw(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )
    .map_err(|source| DbError::WriteFailed {
        key: key.to_string(),
        source,
    })?;
    debug!(key, bytes = value.len(), "Stored value");
    Ok(())
}

pub fn remove(conn: &Connection, key: &str) -> Result<(), DbError> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
        .map_err(|source| DbError::WriteFailed {
            key: key.to_string(),
            source,
        })?;
    Ok(())
}

pub fn load<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>, DbError> {
    get_raw(conn, key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| DbError::Serialization {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

pub fn save<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<(), DbError> {
    let json = serde_json::to_string(value).map_err(|source| DbError::Serialization {
        key: key.to_string(),
        source,
    })?;
    set_raw(conn, key, &json)
}

/// Loads `key`, treating a missing, unreadable or corrupt value as the default.
pub fn load_or_default<T: DeserializeOwned + Default>(conn: &Connection, key: &str) -> T {
    match load(conn, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "Ignoring stored value that could not be loaded");
            T::default()
        }
    }
}
