//! Connection bootstrap.
//!
//! Returned connections have `foreign_keys=ON` (subject deletes cascade), a
//! busy timeout, and every migration applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database file at `path`, creating missing parent
/// directories.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started = Instant::now();
    let result = create_parent_dir(path)
        .and_then(|()| Connection::open(path).map_err(DbError::from))
        .and_then(prepare);
    log_outcome("file", started, result)
}

/// Opens a scratch database that lives as long as the connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started = Instant::now();
    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(prepare);
    log_outcome("memory", started, result)
}

fn create_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

fn prepare(mut conn: Connection) -> DbResult<Connection> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn log_outcome(
    mode: &str,
    started: Instant,
    result: DbResult<Connection>,
) -> DbResult<Connection> {
    let elapsed_ms = started.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={elapsed_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={elapsed_ms} error={err}"
        ),
    }
    result
}
