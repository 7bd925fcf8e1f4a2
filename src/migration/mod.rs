/*!
 * Version title migration.
 *
 * A migration is a declarative [`MigrationPlan`]: an ordered list of steps,
 * each renaming a version title in one table or deleting a version from the
 * texts table. The [`MigrationRunner`] interprets a plan against any
 * [`VersionStore`] one step at a time.
 */

use async_trait::async_trait;

use crate::database::CheckpointRecord;
use crate::errors::MigrationError;

pub mod plan;
pub mod runner;
pub mod step;

pub use plan::{MigrationPlan, SourceSwap, SwapSlot};
pub use runner::{MigrationReport, MigrationRunner, RunOptions, StepOutcome};
pub use step::{PlanStep, StepAction};

/// Storage primitives a migration needs
///
/// Every selector is an exact `(title, language)` match. Zero matches is
/// not an error for any operation.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Set `version_title = new` on every text record titled `old` in `language`
    async fn rename_title_in_texts(
        &self,
        old: &str,
        new: &str,
        language: &str,
    ) -> Result<u64, MigrationError>;

    /// Set `version = new` on every history record titled `old` in `language`
    async fn rename_title_in_history(
        &self,
        old: &str,
        new: &str,
        language: &str,
    ) -> Result<u64, MigrationError>;

    /// Permanently remove every text record titled `title` in `language`
    async fn delete_versions_matching(
        &self,
        title: &str,
        language: &str,
    ) -> Result<u64, MigrationError>;

    /// Count text records titled `title` in `language`
    async fn count_texts(&self, title: &str, language: &str) -> Result<u64, MigrationError>;

    /// Count history records titled `title` in `language`
    async fn count_history(&self, title: &str, language: &str) -> Result<u64, MigrationError>;

    /// Highest completed step index recorded for a plan, if any
    async fn last_checkpoint(&self, fingerprint: &str) -> Result<Option<usize>, MigrationError>;

    /// Record a completed step
    async fn record_checkpoint(&self, record: &CheckpointRecord) -> Result<(), MigrationError>;

    /// Forget every recorded step of a plan, returning how many were removed
    async fn clear_checkpoints(&self, fingerprint: &str) -> Result<u64, MigrationError>;
}
