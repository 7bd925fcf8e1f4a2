/*!
 * Plan interpreter.
 *
 * Runs a [`MigrationPlan`] against a [`VersionStore`] strictly in order.
 * The first failing step aborts the run; steps already applied stay applied.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Serialize;

use crate::database::CheckpointRecord;
use crate::errors::MigrationError;

use super::VersionStore;
use super::plan::MigrationPlan;

/// How a plan is run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Count matches instead of writing
    pub dry_run: bool,
    /// Fail a step whose selector matches nothing
    pub require_matches: bool,
    /// Record completed steps and resume after the last one
    pub checkpoint: bool,
    /// Forget recorded steps of this plan before running
    pub reset_checkpoints: bool,
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Zero-based step index
    pub index: usize,
    /// Step label
    pub label: String,
    /// Records touched, or that would be touched in a dry run
    pub affected: u64,
    /// Step was skipped because a checkpoint shows it already ran
    pub skipped: bool,
}

/// Result of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub plan_name: String,
    pub fingerprint: String,
    pub dry_run: bool,
    pub outcomes: Vec<StepOutcome>,
}

impl MigrationReport {
    /// Records touched across all executed steps
    pub fn total_affected(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| !o.skipped)
            .map(|o| o.affected)
            .sum()
    }

    /// Number of steps executed in this run
    pub fn executed_steps(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.skipped).count()
    }

    /// Number of steps skipped thanks to checkpoints
    pub fn skipped_steps(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }
}

/// Executes plans against a store
pub struct MigrationRunner<'a, S: VersionStore + ?Sized> {
    store: &'a S,
    options: RunOptions,
    progress: ProgressBar,
    echo_status: bool,
}

impl<'a, S: VersionStore + ?Sized> MigrationRunner<'a, S> {
    /// Create a silent runner
    pub fn new(store: &'a S, options: RunOptions) -> Self {
        Self {
            store,
            options,
            progress: ProgressBar::hidden(),
            echo_status: false,
        }
    }

    /// Drive `progress` and print each step's status line to stdout
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        self.progress = progress;
        self.echo_status = true;
        self
    }

    fn status_line(&self, line: &str) {
        if self.echo_status {
            self.progress.suspend(|| println!("{}", line));
        }
    }

    /// Run `plan` from the start, or from after its last checkpoint
    pub async fn run(&self, plan: &MigrationPlan) -> Result<MigrationReport, MigrationError> {
        plan.validate()?;

        let fingerprint = plan.fingerprint();
        let dry_run = self.options.dry_run;
        let checkpointing = self.options.checkpoint && !dry_run;

        info!(
            "Running plan '{}' ({} steps, fingerprint {})",
            plan.name,
            plan.steps.len(),
            &fingerprint[..12]
        );

        if self.options.reset_checkpoints && !dry_run {
            let cleared = self.store.clear_checkpoints(&fingerprint).await?;
            info!("Cleared {} checkpoint(s)", cleared);
        }

        let resume_after = if checkpointing {
            self.store.last_checkpoint(&fingerprint).await?
        } else {
            None
        };
        if let Some(last) = resume_after {
            info!("Resuming after step {}", last + 1);
        }

        if dry_run {
            warn!("Dry run: counts reflect the current data; later steps do not see earlier ones");
        }

        self.progress.set_length(plan.steps.len() as u64);
        let mut outcomes = Vec::with_capacity(plan.steps.len());

        for (index, step) in plan.steps.iter().enumerate() {
            let label = step.label();

            if resume_after.is_some_and(|last| index <= last) {
                debug!("Skipping completed step {}: {}", index + 1, label);
                outcomes.push(StepOutcome {
                    index,
                    label,
                    affected: 0,
                    skipped: true,
                });
                self.progress.inc(1);
                continue;
            }

            if let Some(description) = &step.description {
                self.status_line(description);
            }
            self.progress.set_message(label.clone());
            info!("Step {}/{}: {}", index + 1, plan.steps.len(), step.action);

            let affected = if dry_run {
                let matches = step.action.count_matches(self.store).await?;
                if matches == 0 {
                    warn!("Step {} would match no records", index + 1);
                }
                matches
            } else {
                if self.options.require_matches {
                    let matches = step.action.count_matches(self.store).await?;
                    if matches == 0 {
                        return Err(MigrationError::NoMatches {
                            step: index,
                            description: label,
                            title: step.action.source_title().to_string(),
                            language: step.action.language().to_string(),
                        });
                    }
                }

                let affected = step.action.apply(self.store).await?;
                if affected == 0 {
                    warn!("Step {} matched no records", index + 1);
                } else {
                    info!("{} record(s) affected", affected);
                }

                if checkpointing {
                    self.store
                        .record_checkpoint(&CheckpointRecord {
                            plan_fingerprint: fingerprint.clone(),
                            step_index: index,
                            description: label.clone(),
                            affected,
                            completed_at: chrono::Utc::now().to_rfc3339(),
                        })
                        .await?;
                }
                affected
            };

            outcomes.push(StepOutcome {
                index,
                label,
                affected,
                skipped: false,
            });
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();

        let report = MigrationReport {
            plan_name: plan.name.clone(),
            fingerprint,
            dry_run,
            outcomes,
        };
        info!(
            "Plan '{}' finished: {} step(s) run, {} skipped, {} record(s) affected",
            report.plan_name,
            report.executed_steps(),
            report.skipped_steps(),
            report.total_affected()
        );

        Ok(report)
    }
}
