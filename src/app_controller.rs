use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::info;
use serde::Serialize;
use std::fmt::Write as _;

use crate::app_config::Config;
use crate::database::{DatabaseConnection, Repository};
use crate::language_utils;
use crate::migration::{MigrationReport, MigrationRunner, RunOptions, StepAction};

/// Number of records carrying one version title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCount {
    pub title: String,
    pub language: String,
    pub texts: u64,
    pub history: u64,
}

/// Application controller for version title migrations
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a controller, rejecting an invalid plan up front
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    /// Configuration the controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the configured corpus; it must already exist
    pub fn open_repository(&self) -> Result<Repository> {
        let path = self.config.resolve_database_path()?;
        let db = DatabaseConnection::open_existing(&path)?;
        Ok(Repository::new(db))
    }

    /// Run the configured plan against the configured database, with a progress bar
    pub async fn run(&self, options: RunOptions) -> Result<MigrationReport> {
        let repo = self.open_repository()?;
        info!("Corpus before migration: {}", repo.connection().stats()?);

        let report = self
            .run_with_repository(&repo, options, Some(ProgressBar::new(0)))
            .await?;

        info!("Corpus after migration: {}", repo.connection().stats()?);
        Ok(report)
    }

    /// Run the configured plan against `repo`
    pub async fn run_with_repository(
        &self,
        repo: &Repository,
        options: RunOptions,
        progress: Option<ProgressBar>,
    ) -> Result<MigrationReport> {
        let writes_checkpoints = !options.dry_run && (options.checkpoint || options.reset_checkpoints);
        if writes_checkpoints {
            repo.connection().ensure_checkpoints()?;
        }

        let mut runner = MigrationRunner::new(repo, options);
        if let Some(progress) = progress {
            runner = runner.with_progress(progress);
        }

        let report = runner
            .run(&self.config.plan)
            .await
            .with_context(|| format!("Migration '{}' failed", self.config.plan.name))?;

        Ok(report)
    }

    /// Record counts for every title the plan mentions
    pub async fn status(&self, repo: &Repository) -> Result<Vec<VersionCount>> {
        let mut rows = Vec::new();
        for (title, language) in self.config.plan.titles() {
            let texts = repo.count_texts_by_version(&title, &language).await?;
            let history = repo.count_history_by_version(&title, &language).await?;
            rows.push(VersionCount {
                title,
                language,
                texts,
                history,
            });
        }
        Ok(rows)
    }

    /// Human-readable listing of the plan
    pub fn describe_plan(&self) -> String {
        let plan = &self.config.plan;
        let mut out = String::new();

        let _ = writeln!(out, "Plan: {} ({} steps)", plan.name, plan.steps.len());
        let _ = writeln!(out, "Fingerprint: {}", plan.fingerprint());
        for (index, step) in plan.steps.iter().enumerate() {
            let verb = match step.action {
                StepAction::RenameTexts { .. } | StepAction::RenameHistory { .. } => "rename",
                StepAction::DeleteTexts { .. } => "delete",
            };
            let language = language_utils::get_language_name(step.action.language())
                .unwrap_or_else(|_| step.action.language().to_string());
            let _ = writeln!(
                out,
                "{:>3}. [{}] {} ({})",
                index + 1,
                verb,
                step.action,
                language
            );
            if let Some(description) = &step.description {
                let _ = writeln!(out, "     \"{}\"", description);
            }
        }
        out
    }
}

/// Render status rows as an aligned table
pub fn format_status(rows: &[VersionCount]) -> String {
    let width = rows.iter().map(|r| r.title.len()).max().unwrap_or(5).max(5);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<width$}  {:<4}  {:>8}  {:>8}",
        "Title",
        "Lang",
        "Texts",
        "History",
        width = width
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:<4}  {:>8}  {:>8}",
            row.title,
            row.language,
            row.texts,
            row.history,
            width = width
        );
    }
    out
}

/// Render a run report, one line per step
pub fn format_report(report: &MigrationReport) -> String {
    let mut out = String::new();
    let verb = if report.dry_run { "would affect" } else { "affected" };

    for outcome in &report.outcomes {
        if outcome.skipped {
            let _ = writeln!(out, "{:>3}. {} (already done)", outcome.index + 1, outcome.label);
        } else {
            let _ = writeln!(
                out,
                "{:>3}. {}: {} {} record(s)",
                outcome.index + 1,
                outcome.label,
                verb,
                outcome.affected
            );
        }
    }
    let _ = writeln!(
        out,
        "Total: {} {} record(s) in {} step(s)",
        verb,
        report.total_affected(),
        report.executed_steps()
    );
    out
}
