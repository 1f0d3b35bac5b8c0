use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Shared task encounters carry this id prefix
pub const DIALOGUE_TO_NOTE_PREFIX: &str = "D2N";

/// Summarization task being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    /// Snippet summarization
    #[serde(rename = "taskA")]
    A,
    /// Full note summarization
    #[serde(rename = "taskB")]
    B,
    /// Full note summarization, second test split
    #[serde(rename = "taskC")]
    C,
}

impl Task {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "taskA",
            Self::B => "taskB",
            Self::C => "taskC",
        }
    }

    /// Encounter id prefix
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::A => "",
            Self::B | Self::C => DIALOGUE_TO_NOTE_PREFIX,
        }
    }

    /// Numeric encounter ids of the test split
    #[must_use]
    pub const fn id_range(self) -> RangeInclusive<u32> {
        match self {
            Self::A => 0..=199,
            Self::B => 88..=127,
            Self::C => 128..=167,
        }
    }

    /// Whether notes are also scored per section division
    #[must_use]
    pub const fn scores_divisions(self) -> bool {
        matches!(self, Self::B)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "taskA" => Ok(Self::A),
            "taskB" => Ok(Self::B),
            "taskC" => Ok(Self::C),
            other => Err(EvalError::UnknownTask(other.to_string())),
        }
    }
}

/// Check that prediction ids belong to the task's test split.
///
/// The first id decides the prefix branch. Ids must fall inside the task range and,
/// unless `debug`, cover the whole split.
pub fn validate_ids(task: Task, ids: &[String], debug: bool) -> Result<()> {
    let first = ids
        .first()
        .ok_or_else(|| EvalError::invalid_ids("No prediction ids to validate"))?;

    if task == Task::A {
        return validate_range(task, ids, debug);
    }
    if first.contains(DIALOGUE_TO_NOTE_PREFIX) {
        return validate_range(task, ids, debug);
    }

    Err(EvalError::invalid_ids(format!(
        "Your encounter ID -> {first} does not have an identifiable prefix supported by this evaluation"
    )))
}

fn validate_range(task: Task, ids: &[String], debug: bool) -> Result<()> {
    let numeric = ids
        .iter()
        .map(|id| {
            id.trim()
                .replace(task.id_prefix(), "")
                .parse::<u32>()
                .map_err(|_| EvalError::invalid_ids(format!("Encounter ID '{id}' is not numeric")))
        })
        .collect::<Result<Vec<u32>>>()?;

    let range = task.id_range();
    let (Some(min), Some(max)) = (numeric.iter().min(), numeric.iter().max()) else {
        return Err(EvalError::invalid_ids("No prediction ids to validate"));
    };
    if !range.contains(min) || !range.contains(max) {
        return Err(EvalError::invalid_ids(
            "Your encounter ID range does not match the test encounters",
        ));
    }

    let expected = (range.end() - range.start() + 1) as usize;
    if !debug && numeric.len() != expected {
        return Err(EvalError::invalid_ids(
            "The number of test encounters does not match expected for this task!",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, range: RangeInclusive<u32>) -> Vec<String> {
        range.map(|n| format!("{prefix}{n:03}")).collect()
    }

    #[test]
    fn test_task_parse_and_labels() {
        assert_eq!("taskB".parse::<Task>().unwrap(), Task::B);
        assert!(matches!("taskD".parse::<Task>(), Err(EvalError::UnknownTask(_))));
        assert_eq!(Task::C.to_string(), "taskC");
        assert!(Task::B.scores_divisions());
        assert!(!Task::A.scores_divisions());
    }

    #[test]
    fn test_full_split_is_valid() {
        assert!(validate_ids(Task::B, &ids("D2N", 88..=127), false).is_ok());
        assert!(validate_ids(Task::C, &ids("D2N", 128..=167), false).is_ok());
        assert!(validate_ids(Task::A, &ids("", 0..=199), false).is_ok());
    }

    #[test]
    fn test_partial_split_needs_debug() {
        let partial = ids("D2N", 88..=90);
        assert!(validate_ids(Task::B, &partial, false).is_err());
        assert!(validate_ids(Task::B, &partial, true).is_ok());
    }

    #[test]
    fn test_out_of_range_ids_are_rejected() {
        let err = validate_ids(Task::B, &ids("D2N", 128..=167), true).unwrap_err();
        assert!(err.to_string().contains("range does not match"));
    }

    #[test]
    fn test_unknown_prefix_is_rejected() {
        let err = validate_ids(Task::B, &ids("X", 88..=127), false).unwrap_err();
        assert!(err.to_string().contains("identifiable prefix"));
    }

    #[test]
    fn test_non_numeric_ids_are_rejected() {
        let bad = vec!["D2N088".to_string(), "D2Nabc".to_string()];
        assert!(validate_ids(Task::B, &bad, true).is_err());
        assert!(validate_ids(Task::A, &[], true).is_err());
    }
}
