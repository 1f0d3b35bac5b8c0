use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Settings for one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Task whose id scheme and cohorts apply
    pub task: Task,

    /// Column identifying the encounter
    pub id_column: String,

    /// Column holding the note text
    pub note_column: String,

    /// Column holding the source dialogue
    pub dialogue_column: String,

    /// Abort when no prediction yields any section division
    pub use_section_check: bool,

    /// Dialogues with at most this many words are "short"
    pub note_length_cutoff: usize,

    /// Prefix of the results file
    pub experiment: String,

    /// Relax the full-split id count check
    pub debug: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            task: Task::B,
            id_column: "TestID".to_string(),
            note_column: "SystemOutput".to_string(),
            dialogue_column: "dialogue".to_string(),
            use_section_check: false,
            note_length_cutoff: 512,
            experiment: "default".to_string(),
            debug: false,
        }
    }
}

impl EvalConfig {
    /// Results file name for this experiment
    #[must_use]
    pub fn results_file_name(&self) -> String {
        format!("{}_results.json", self.experiment)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("id_column", &self.id_column),
            ("note_column", &self.note_column),
            ("dialogue_column", &self.dialogue_column),
            ("experiment", &self.experiment),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }

        if self.id_column == self.note_column {
            return Err(format!(
                "id_column and note_column must differ (both '{}')",
                self.id_column
            ));
        }

        Ok(())
    }
}
