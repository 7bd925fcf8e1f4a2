/*!
 * Database module for the text corpus.
 *
 * This module provides SQLite-based access to:
 * - Text records keyed by version title and language
 * - History records referencing versions by title
 * - Checkpoints of migration runs
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{CheckpointRecord, HistoryRecord, TextRecord};
pub use repository::Repository;
