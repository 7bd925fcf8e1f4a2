/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{OptionalExtension, params};

use super::connection::DatabaseConnection;
use super::models::{CheckpointRecord, HistoryRecord, TextRecord};
use crate::errors::MigrationError;
use crate::migration::VersionStore;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Text Operations
    // =========================================================================

    /// Insert a text record, returning its row id
    pub async fn insert_text(&self, record: &TextRecord) -> Result<i64> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO texts (title, version_title, language, chapter) VALUES (?1, ?2, ?3, ?4)",
                    params![record.title, record.version_title, record.language, record.chapter],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    /// List all text records in insertion order
    pub async fn list_texts(&self) -> Result<Vec<TextRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, version_title, language, chapter FROM texts ORDER BY id",
                )?;
                let records = stmt
                    .query_map([], |row| {
                        Ok(TextRecord {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            version_title: row.get(2)?,
                            language: row.get(3)?,
                            chapter: row.get(4)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Set `version_title = new` where `version_title = old` and `language` matches
    pub async fn update_text_version_title(
        &self,
        old: &str,
        new: &str,
        language: &str,
    ) -> Result<u64> {
        if old.is_empty() {
            return Err(MigrationError::EmptySelector.into());
        }
        let (old, new, language) = (old.to_string(), new.to_string(), language.to_string());

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE texts SET version_title = ?1 WHERE version_title = ?2 AND language = ?3",
                    params![new, old, language],
                )?;
                debug!("texts: '{}' -> '{}' [{}]: {} row(s)", old, new, language, updated);
                Ok(updated as u64)
            })
            .await
    }

    /// Delete text records with the given version title and language
    pub async fn delete_texts_by_version(&self, title: &str, language: &str) -> Result<u64> {
        let (title, language) = (title.to_string(), language.to_string());

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM texts WHERE version_title = ?1 AND language = ?2",
                    params![title, language],
                )?;
                debug!("texts: deleted '{}' [{}]: {} row(s)", title, language, deleted);
                Ok(deleted as u64)
            })
            .await
    }

    /// Count text records with the given version title and language
    pub async fn count_texts_by_version(&self, title: &str, language: &str) -> Result<u64> {
        let (title, language) = (title.to_string(), language.to_string());

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM texts WHERE version_title = ?1 AND language = ?2",
                    params![title, language],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
    }

    // =========================================================================
    // History Operations
    // =========================================================================

    /// Insert a history record, returning its row id
    pub async fn insert_history(&self, record: &HistoryRecord) -> Result<i64> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO history (ref, version, language, revision, date) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        record.reference,
                        record.version,
                        record.language,
                        record.revision,
                        record.date
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    /// List all history records in insertion order
    pub async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, ref, version, language, revision, date FROM history ORDER BY id",
                )?;
                let records = stmt
                    .query_map([], |row| {
                        Ok(HistoryRecord {
                            id: row.get(0)?,
                            reference: row.get(1)?,
                            version: row.get(2)?,
                            language: row.get(3)?,
                            revision: row.get(4)?,
                            date: row.get(5)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Set `version = new` where `version = old` and `language` matches
    pub async fn update_history_version(
        &self,
        old: &str,
        new: &str,
        language: &str,
    ) -> Result<u64> {
        if old.is_empty() {
            return Err(MigrationError::EmptySelector.into());
        }
        let (old, new, language) = (old.to_string(), new.to_string(), language.to_string());

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE history SET version = ?1 WHERE version = ?2 AND language = ?3",
                    params![new, old, language],
                )?;
                debug!("history: '{}' -> '{}' [{}]: {} row(s)", old, new, language, updated);
                Ok(updated as u64)
            })
            .await
    }

    /// Count history records with the given version title and language
    pub async fn count_history_by_version(&self, title: &str, language: &str) -> Result<u64> {
        let (title, language) = (title.to_string(), language.to_string());

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM history WHERE version = ?1 AND language = ?2",
                    params![title, language],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
    }

    // =========================================================================
    // Checkpoint Operations
    // =========================================================================

    /// Highest completed step index for a plan fingerprint
    pub async fn get_last_checkpoint(&self, fingerprint: &str) -> Result<Option<usize>> {
        let fingerprint = fingerprint.to_string();

        self.db
            .execute_async(move |conn| {
                let last: Option<i64> = conn
                    .query_row(
                        "SELECT MAX(step_index) FROM migration_checkpoints WHERE plan_fingerprint = ?1",
                        [&fingerprint],
                        |row| row.get::<_, Option<i64>>(0),
                    )
                    .optional()?
                    .flatten();
                Ok(last.map(|i| i as usize))
            })
            .await
    }

    /// List the checkpoints of a plan in step order
    pub async fn get_checkpoints(&self, fingerprint: &str) -> Result<Vec<CheckpointRecord>> {
        let fingerprint = fingerprint.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT plan_fingerprint, step_index, description, affected, completed_at
                    FROM migration_checkpoints
                    WHERE plan_fingerprint = ?1
                    ORDER BY step_index
                    "#,
                )?;
                let records = stmt
                    .query_map([&fingerprint], |row| {
                        Ok(CheckpointRecord {
                            plan_fingerprint: row.get(0)?,
                            step_index: row.get::<_, i64>(1)? as usize,
                            description: row.get(2)?,
                            affected: row.get::<_, i64>(3)? as u64,
                            completed_at: row.get(4)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Record a completed step
    pub async fn insert_checkpoint(&self, record: &CheckpointRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT OR REPLACE INTO migration_checkpoints
                        (plan_fingerprint, step_index, description, affected, completed_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        record.plan_fingerprint,
                        record.step_index as i64,
                        record.description,
                        record.affected as i64,
                        record.completed_at
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Remove all checkpoints of a plan
    pub async fn delete_checkpoints(&self, fingerprint: &str) -> Result<u64> {
        let fingerprint = fingerprint.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM migration_checkpoints WHERE plan_fingerprint = ?1",
                    [&fingerprint],
                )?;
                Ok(deleted as u64)
            })
            .await
    }
}

#[async_trait]
impl VersionStore for Repository {
    async fn rename_title_in_texts(
        &self,
        old: &str,
        new: &str,
        language: &str,
    ) -> Result<u64, MigrationError> {
        Ok(self.update_text_version_title(old, new, language).await?)
    }

    async fn rename_title_in_history(
        &self,
        old: &str,
        new: &str,
        language: &str,
    ) -> Result<u64, MigrationError> {
        Ok(self.update_history_version(old, new, language).await?)
    }

    async fn delete_versions_matching(
        &self,
        title: &str,
        language: &str,
    ) -> Result<u64, MigrationError> {
        Ok(self.delete_texts_by_version(title, language).await?)
    }

    async fn count_texts(&self, title: &str, language: &str) -> Result<u64, MigrationError> {
        Ok(self.count_texts_by_version(title, language).await?)
    }

    async fn count_history(&self, title: &str, language: &str) -> Result<u64, MigrationError> {
        Ok(self.count_history_by_version(title, language).await?)
    }

    async fn last_checkpoint(&self, fingerprint: &str) -> Result<Option<usize>, MigrationError> {
        self.get_last_checkpoint(fingerprint)
            .await
            .map_err(|e| MigrationError::Checkpoint(format!("{:#}", e)))
    }

    async fn record_checkpoint(&self, record: &CheckpointRecord) -> Result<(), MigrationError> {
        self.insert_checkpoint(record)
            .await
            .map_err(|e| MigrationError::Checkpoint(format!("{:#}", e)))
    }

    async fn clear_checkpoints(&self, fingerprint: &str) -> Result<u64, MigrationError> {
        self.delete_checkpoints(fingerprint)
            .await
            .map_err(|e| MigrationError::Checkpoint(format!("{:#}", e)))
    }
}
