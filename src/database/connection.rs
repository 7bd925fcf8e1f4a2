/*!
 * Corpus database handle.
 *
 * One SQLite connection shared behind a mutex. Async callers go through
 * `execute_async`, which runs the closure on tokio's blocking pool so the
 * runtime never waits on disk I/O.
 */

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::schema;

/// Corpus file name inside the data directory
const CORPUS_FILENAME: &str = "corpus.db";

/// Application directory under the platform's local data directory
const APP_DIRNAME: &str = "retitle";

/// Shared handle to the corpus database
#[derive(Clone, Debug)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open an existing corpus without creating or reshaping anything
    ///
    /// Fails when the file is missing or lacks the `texts` / `history` tables.
    pub fn open_existing<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if !db_path.is_file() {
            bail!("Corpus database {:?} does not exist", db_path);
        }

        info!("Opening corpus database {:?}", db_path);
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;

        schema::verify_corpus(&conn)
            .with_context(|| format!("Cannot migrate {:?}", db_path))?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open (or create) a database at `db_path` owned by this tool, with every table
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        info!("Opening corpus database {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;

        Self::prepare(conn, db_path)
    }

    /// Throwaway in-memory corpus
    pub fn new_in_memory() -> Result<Self> {
        debug!("Opening in-memory corpus database");
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;

        Self::prepare(conn, PathBuf::from(":memory:"))
    }

    fn prepare(conn: Connection, db_path: PathBuf) -> Result<Self> {
        schema::initialize_schema(&conn)
            .with_context(|| format!("Failed to prepare schema in {:?}", db_path))?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data-local-dir>/retitle/corpus.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine a data directory"))?;

        Ok(base.join(APP_DIRNAME).join(CORPUS_FILENAME))
    }

    /// Location of the database, `:memory:` for in-memory ones
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
        connection
            .lock()
            .map_err(|e| anyhow!("Database lock poisoned: {}", e))
    }

    /// Run `f` with the connection on the current thread
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = Self::lock(&self.connection)?;
        f(&conn)
    }

    /// Run `f` with the connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || {
            let conn = Self::lock(&connection)?;
            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Add the checkpoint table to an existing corpus if it is missing
    pub fn ensure_checkpoints(&self) -> Result<()> {
        self.execute(schema::ensure_checkpoint_table)
    }

    /// Row counts of the corpus tables
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.execute(|conn| {
            let (text_count, history_count) = conn.query_row(
                "SELECT (SELECT COUNT(*) FROM texts), (SELECT COUNT(*) FROM history)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let checkpoint_count = if schema::has_table(conn, "migration_checkpoints")? {
                conn.query_row("SELECT COUNT(*) FROM migration_checkpoints", [], |row| {
                    row.get(0)
                })?
            } else {
                0
            };

            Ok(DatabaseStats {
                text_count,
                history_count,
                checkpoint_count,
            })
        })
    }
}

/// Row counts, logged before and after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub text_count: i64,
    pub history_count: i64,
    pub checkpoint_count: i64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} text(s), {} history entr(ies), {} checkpoint(s)",
            self.text_count, self.history_count, self.checkpoint_count
        )
    }
}
