/*!
 * Migration steps.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::MigrationError;
use crate::language_utils;

use super::VersionStore;

/// What a single step does to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    /// Rename a version title in the texts table
    RenameTexts {
        from: String,
        to: String,
        language: String,
    },
    /// Rename a version title in the history table
    RenameHistory {
        from: String,
        to: String,
        language: String,
    },
    /// Delete a version from the texts table
    DeleteTexts { title: String, language: String },
}

impl StepAction {
    /// Title the step selects records by
    pub fn source_title(&self) -> &str {
        match self {
            Self::RenameTexts { from, .. } | Self::RenameHistory { from, .. } => from,
            Self::DeleteTexts { title, .. } => title,
        }
    }

    /// Language the step selects records by
    pub fn language(&self) -> &str {
        match self {
            Self::RenameTexts { language, .. }
            | Self::RenameHistory { language, .. }
            | Self::DeleteTexts { language, .. } => language,
        }
    }

    /// Title the step writes, for renames
    pub fn target_title(&self) -> Option<&str> {
        match self {
            Self::RenameTexts { to, .. } | Self::RenameHistory { to, .. } => Some(to),
            Self::DeleteTexts { .. } => None,
        }
    }

    /// Check the step is well formed; `index` is only used in the error
    pub fn validate(&self, index: usize) -> Result<(), MigrationError> {
        if self.source_title().is_empty() {
            return Err(MigrationError::EmptyTitle { step: index });
        }

        if language_utils::validate_language_code(self.language()).is_err() {
            return Err(MigrationError::InvalidLanguage {
                step: index,
                code: self.language().to_string(),
            });
        }

        if self.target_title() == Some(self.source_title()) {
            return Err(MigrationError::IdenticalTitles {
                step: index,
                title: self.source_title().to_string(),
            });
        }

        Ok(())
    }

    /// Number of records the step would touch in the store's current state
    pub async fn count_matches<S: VersionStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<u64, MigrationError> {
        match self {
            Self::RenameTexts { from, language, .. } => store.count_texts(from, language).await,
            Self::RenameHistory { from, language, .. } => {
                store.count_history(from, language).await
            }
            Self::DeleteTexts { title, language } => store.count_texts(title, language).await,
        }
    }

    /// Apply the step, returning the number of records touched
    pub async fn apply<S: VersionStore + ?Sized>(&self, store: &S) -> Result<u64, MigrationError> {
        match self {
            Self::RenameTexts { from, to, language } => {
                store.rename_title_in_texts(from, to, language).await
            }
            Self::RenameHistory { from, to, language } => {
                store.rename_title_in_history(from, to, language).await
            }
            Self::DeleteTexts { title, language } => {
                store.delete_versions_matching(title, language).await
            }
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RenameTexts { from, to, language } => {
                write!(f, "texts: '{}' -> '{}' [{}]", from, to, language)
            }
            Self::RenameHistory { from, to, language } => {
                write!(f, "history: '{}' -> '{}' [{}]", from, to, language)
            }
            Self::DeleteTexts { title, language } => {
                write!(f, "texts: delete '{}' [{}]", title, language)
            }
        }
    }
}

/// A step in a plan, with the status line printed before it runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Status line; steps continuing a group leave it empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub action: StepAction,
}

impl PlanStep {
    /// A step that announces itself with `description`
    pub fn announced(description: impl Into<String>, action: StepAction) -> Self {
        Self {
            description: Some(description.into()),
            action,
        }
    }

    /// A step that runs silently as part of the preceding group
    pub fn quiet(action: StepAction) -> Self {
        Self {
            description: None,
            action,
        }
    }

    /// Description if set, otherwise the action summary
    pub fn label(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.action.to_string())
    }
}
