/*!
 * # retitle - version title migrations for a text corpus
 *
 * Renames version titles across the `texts` and `history` tables of a
 * corpus database and removes versions that were moved aside, so that a
 * newly imported source can take over the names of a legacy one.
 *
 * ## Features
 *
 * - Declarative migration plans (built in, generated, or loaded from JSON)
 * - Dry runs that report how many records each step would touch
 * - Strict mode that refuses to run a step matching no records
 * - Checkpoints so an interrupted run resumes after its last completed step
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `database`: SQLite access to texts, history and checkpoints
 * - `migration`: Plans, steps and the plan runner:
 *   - `migration::step`: Single rename/delete steps
 *   - `migration::plan`: Ordered plans and the built-in source swap
 *   - `migration::runner`: Sequential plan interpreter
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod migration;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use database::{DatabaseConnection, Repository};
pub use errors::{AppError, ConfigError, MigrationError};
pub use migration::{MigrationPlan, MigrationRunner, RunOptions, VersionStore};
