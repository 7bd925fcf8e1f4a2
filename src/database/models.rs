/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};

/// One version of one work in the `texts` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Row id (0 until inserted)
    pub id: i64,
    /// Work the text belongs to, e.g. `Genesis`
    pub title: String,
    /// Version title identifying the edition
    pub version_title: String,
    /// Language code of the edition
    pub language: String,
    /// Text body as JSON
    pub chapter: String,
}

impl TextRecord {
    /// Create a new text record with an empty body
    pub fn new(title: &str, version_title: &str, language: &str) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            version_title: version_title.to_string(),
            language: language.to_string(),
            chapter: "[]".to_string(),
        }
    }

    /// Attach a text body
    pub fn with_chapter(mut self, chapter: serde_json::Value) -> Self {
        self.chapter = chapter.to_string();
        self
    }
}

/// One edit-log entry in the `history` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row id (0 until inserted)
    pub id: i64,
    /// Reference the edit touched, e.g. `Genesis 1:1`
    pub reference: String,
    /// Version title the edit was made against
    pub version: String,
    /// Language code of the version
    pub language: String,
    /// Revision number
    pub revision: i64,
    /// RFC 3339 timestamp of the edit
    pub date: String,
}

impl HistoryRecord {
    /// Create a new history record stamped with the current time
    pub fn new(reference: &str, version: &str, language: &str, revision: i64) -> Self {
        Self {
            id: 0,
            reference: reference.to_string(),
            version: version.to_string(),
            language: language.to_string(),
            revision,
            date: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A completed step of a checkpointed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Fingerprint of the plan the step belongs to
    pub plan_fingerprint: String,
    /// Zero-based step index
    pub step_index: usize,
    /// Step description at the time it ran
    pub description: String,
    /// Records the step affected
    pub affected: u64,
    /// RFC 3339 completion timestamp
    pub completed_at: String,
}
