//! SQLite persistence for favorites and stored server profiles.
//!
//! Connections returned from here always have the schema migrated to the
//! latest version, tracked through `PRAGMA user_version`.

pub mod favorites;
pub mod servers;

use crate::utils::error::{CmisError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

pub fn open_db(path: impl AsRef<Path>) -> Result<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(path)?;
    bootstrap_connection(&mut conn)?;

    tracing::debug!(
        "Opened database {} in {}ms",
        path.display(),
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

pub fn open_db_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_connection(&mut conn)?;
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let current_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();

    if current_version > latest {
        return Err(CmisError::config(format!(
            "database schema version {current_version} is newer than supported {latest}"
        )));
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        tracing::info!("Applied database migration {}", migration.version);
    }
    tx.commit()?;

    Ok(())
}
