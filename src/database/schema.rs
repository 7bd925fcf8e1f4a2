/*!
 * Database schema definitions.
 *
 * The `texts` and `history` tables belong to the corpus. A fresh database
 * gets every table through `initialize_schema`; an existing corpus is only
 * checked by `verify_corpus` and never altered, except for the
 * `migration_checkpoints` table which is added on the first checkpointed run.
 */

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

/// Schema version written by this build
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA_VERSION_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );";

// One row per (work, version) pair
const TEXTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS texts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        version_title TEXT NOT NULL,
        language TEXT NOT NULL,
        chapter TEXT NOT NULL DEFAULT '[]'
    );
    CREATE INDEX IF NOT EXISTS idx_texts_version ON texts(version_title, language);";

// Edit log; references versions by title only
const HISTORY_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ref TEXT NOT NULL,
        version TEXT NOT NULL,
        language TEXT NOT NULL,
        revision INTEGER NOT NULL DEFAULT 1,
        date TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_history_version ON history(version, language);";

const CHECKPOINTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS migration_checkpoints (
        plan_fingerprint TEXT NOT NULL,
        step_index INTEGER NOT NULL,
        description TEXT NOT NULL,
        affected INTEGER NOT NULL,
        completed_at TEXT NOT NULL,
        PRIMARY KEY (plan_fingerprint, step_index)
    );";

/// Create every table in a database this tool owns (new files, tests)
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    match stored_version(conn)? {
        None => {
            info!("Creating corpus schema v{}", SCHEMA_VERSION);
            create_tables(conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
                [SCHEMA_VERSION],
            )?;
        }
        Some(version) if version > SCHEMA_VERSION => {
            bail!(
                "Database schema v{} is newer than supported v{}",
                version,
                SCHEMA_VERSION
            );
        }
        Some(version) => debug!("Corpus schema v{} already in place", version),
    }

    Ok(())
}

/// Check an existing corpus can be migrated, without writing to it
pub fn verify_corpus(conn: &Connection) -> Result<()> {
    for table in ["texts", "history"] {
        if !has_table(conn, table)? {
            bail!("Not a corpus database: table '{}' is missing", table);
        }
    }

    if let Some(version) = stored_version(conn)? {
        if version > SCHEMA_VERSION {
            bail!(
                "Database schema v{} is newer than supported v{}",
                version,
                SCHEMA_VERSION
            );
        }
    }
    Ok(())
}

/// Add the checkpoint table if the corpus does not have it yet
pub fn ensure_checkpoint_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CHECKPOINTS_TABLE)
        .context("Failed to create migration_checkpoints")
}

/// Whether `name` is a table of this database
pub fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )
    .context("Failed to inspect sqlite_master")
}

/// Version recorded in `schema_version`, `None` if the table is missing or empty
fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    if !has_table(conn, "schema_version")? {
        return Ok(None);
    }

    let version = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version)
}

fn create_tables(conn: &Connection) -> Result<()> {
    for ddl in [SCHEMA_VERSION_TABLE, TEXTS_TABLE, HISTORY_TABLE, CHECKPOINTS_TABLE] {
        conn.execute_batch(ddl)
            .with_context(|| format!("Failed to run DDL:{}", ddl))?;
    }
    Ok(())
}
