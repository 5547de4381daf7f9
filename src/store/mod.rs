// src/store/mod.rs — Local history and prediction storage

pub mod db;
pub mod schema;
pub mod server;

pub use db::{PredictionRow, Store};
pub use server::{spawn_store_server, StoreHandle};

use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the database at the given path and apply migrations.
pub fn open(path: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    schema::run_migrations(&conn)?;
    Ok(Store::new(conn))
}

/// Create an in-memory database (for testing).
pub fn in_memory() -> anyhow::Result<Store> {
    let conn = Connection::open_in_memory()?;
    schema::run_migrations(&conn)?;
    Ok(Store::new(conn))
}
