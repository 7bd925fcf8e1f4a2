/*!
 * Migration plans.
 *
 * A plan is plain data: it can be built in code, generated from a
 * [`SourceSwap`], or loaded from the config file.
 */

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::MigrationError;

use super::step::{PlanStep, StepAction};

/// Name of the built-in plan
pub const DEFAULT_PLAN_NAME: &str = "default-bible-versions";

/// An ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Plan name, shown in logs and reports
    pub name: String,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

/// One source slot of a [`SourceSwap`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSlot {
    /// Short name used in status lines, e.g. `nikkud`
    pub name: String,
    /// Title the legacy source carries today, and the incoming source will take
    pub legacy: String,
    /// Where the legacy data is moved aside before being deleted;
    /// `None` when no legacy data exists under `legacy`
    #[serde(default)]
    pub renamed: Option<String>,
    /// Title the incoming source was imported under
    pub incoming: String,
}

/// Replace a set of legacy default versions with a newly imported source
///
/// Generates three phases: move legacy versions aside, give the incoming
/// versions the legacy names, then delete what was moved aside. The order
/// matters: phase two reuses the names phase one vacates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSwap {
    /// Language all slots live in
    pub language: String,
    /// Short name of the incoming source used in status lines
    pub incoming_label: String,
    /// Slots in the order they are processed
    pub slots: Vec<SwapSlot>,
}

impl SourceSwap {
    /// Hebrew Tanach defaults replaced by the Westminster Leningrad Codex
    pub fn leningrad_codex() -> Self {
        Self {
            language: "he".to_string(),
            incoming_label: "Leningrad".to_string(),
            slots: vec![
                SwapSlot {
                    name: "taamei hamikra".to_string(),
                    legacy: "Tanach with Ta'amei Hamikra".to_string(),
                    renamed: Some("Wikisource with Ta'amei Hamikra".to_string()),
                    incoming: "Westminster Leningrad Codex".to_string(),
                },
                SwapSlot {
                    name: "nikkud".to_string(),
                    legacy: "Tanach with Nikkud".to_string(),
                    renamed: Some("Wikisource with Nikkud".to_string()),
                    incoming: "Westminster Leningrad Codex - Vowels".to_string(),
                },
                SwapSlot {
                    name: "no nikkud".to_string(),
                    legacy: "Tanach without Nikkud".to_string(),
                    renamed: None,
                    incoming: "Westminster Leningrad Codex - Consonants".to_string(),
                },
            ],
        }
    }
}

impl MigrationPlan {
    /// Create an empty plan
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    /// The built-in plan
    pub fn default_bible_versions() -> Self {
        Self::for_source_swap(DEFAULT_PLAN_NAME, &SourceSwap::leningrad_codex())
    }

    /// Generate the three-phase plan for a source swap
    pub fn for_source_swap(name: impl Into<String>, swap: &SourceSwap) -> Self {
        let language = swap.language.clone();
        let mut plan = Self::new(name);

        for slot in &swap.slots {
            let Some(renamed) = &slot.renamed else {
                continue;
            };
            plan.steps.push(PlanStep::announced(
                format!("renaming default {}", slot.name),
                StepAction::RenameTexts {
                    from: slot.legacy.clone(),
                    to: renamed.clone(),
                    language: language.clone(),
                },
            ));
            plan.steps.push(PlanStep::announced(
                format!("changing old {} history", slot.name),
                StepAction::RenameHistory {
                    from: slot.legacy.clone(),
                    to: renamed.clone(),
                    language: language.clone(),
                },
            ));
        }

        for slot in &swap.slots {
            let destination = if slot.renamed.is_some() {
                "old default name"
            } else {
                "an old style default name"
            };
            plan.steps.push(PlanStep::announced(
                format!(
                    "renaming {} {} to {}",
                    swap.incoming_label, slot.name, destination
                ),
                StepAction::RenameTexts {
                    from: slot.incoming.clone(),
                    to: slot.legacy.clone(),
                    language: language.clone(),
                },
            ));
            plan.steps.push(PlanStep::quiet(StepAction::RenameHistory {
                from: slot.incoming.clone(),
                to: slot.legacy.clone(),
                language: language.clone(),
            }));
        }

        let mut announced = false;
        for renamed in swap.slots.iter().filter_map(|s| s.renamed.as_ref()) {
            let action = StepAction::DeleteTexts {
                title: renamed.clone(),
                language: language.clone(),
            };
            if announced {
                plan.steps.push(PlanStep::quiet(action));
            } else {
                plan.steps
                    .push(PlanStep::announced("deleting old texts versions", action));
                announced = true;
            }
        }

        plan
    }

    /// Check every step is well formed
    pub fn validate(&self) -> Result<(), MigrationError> {
        self.steps
            .iter()
            .enumerate()
            .try_for_each(|(index, step)| step.action.validate(index))
    }

    /// Stable identity of the plan's content, used to key checkpoints
    pub fn fingerprint(&self) -> String {
        // Serializing derived structs with string fields cannot fail
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Every `(title, language)` pair the plan reads or writes, in first-seen order
    pub fn titles(&self) -> Vec<(String, String)> {
        let mut seen: Vec<(String, String)> = Vec::new();
        for step in &self.steps {
            let language = step.action.language();
            let titles = std::iter::once(step.action.source_title()).chain(step.action.target_title());
            for title in titles {
                let pair = (title.to_string(), language.to_string());
                if !seen.contains(&pair) {
                    seen.push(pair);
                }
            }
        }
        seen
    }
}

impl Default for MigrationPlan {
    fn default() -> Self {
        Self::default_bible_versions()
    }
}
