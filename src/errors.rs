/*!
 * Error types for the retitle application.
 *
 * This module contains custom error types for the migration and configuration
 * layers, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while validating or running a migration plan
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The backing store failed to execute an operation
    #[error("Database error: {0}")]
    Database(String),

    /// A step selects records by an empty title
    #[error("Step {step}: source title must not be empty")]
    EmptyTitle {
        /// Zero-based step index
        step: usize,
    },

    /// A store rename was called with an empty source title
    #[error("Refusing to rename records selected by an empty title")]
    EmptySelector,

    /// A rename step would write the title it reads
    #[error("Step {step}: rename from '{title}' to itself")]
    IdenticalTitles {
        /// Zero-based step index
        step: usize,
        /// The repeated title
        title: String,
    },

    /// A step carries a language code that is not ISO 639
    #[error("Step {step}: invalid language code '{code}'")]
    InvalidLanguage {
        /// Zero-based step index
        step: usize,
        /// The rejected code
        code: String,
    },

    /// Strict mode found nothing to operate on
    #[error("Step {step} ({description}): no records match '{title}' [{language}]")]
    NoMatches {
        /// Zero-based step index
        step: usize,
        /// Human-readable step description
        description: String,
        /// Title the step selects
        title: String,
        /// Language the step selects
        language: String,
    },

    /// Reading or writing checkpoints failed
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
}

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {message}")]
    Read {
        /// Path of the file
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The config file is not valid JSON for this schema
    #[error("Failed to parse config file {path}: {message}")]
    Parse {
        /// Path of the file
        path: String,
        /// Underlying serde message
        message: String,
    },

    /// No database location was given and none could be derived
    #[error("Could not determine a database location")]
    NoDatabasePath,

    /// The plan in the configuration is invalid
    #[error("Invalid plan: {0}")]
    Plan(#[from] MigrationError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the migration
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<anyhow::Error> for MigrationError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<MigrationError>() {
            Ok(typed) => typed,
            Err(error) => Self::Database(format!("{:#}", error)),
        }
    }
}
