//! Shared-task run file validation.

use note_section_eval::{Task, DIALOGUE_TO_NOTE_PREFIX};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("File path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("File name must start with 'taskA', 'taskB', or 'taskC'")]
    UnknownTask,

    #[error("File must be a CSV file")]
    NotCsv,

    #[error("{0}")]
    ColumnCount(&'static str),

    #[error("{message} (row {row}: '{value}')")]
    InvalidTestId {
        message: &'static str,
        row: usize,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

struct RunFileShape {
    columns: usize,
    column_message: &'static str,
    id_message: &'static str,
    valid_id: fn(&str) -> bool,
}

fn shape(task: Task) -> RunFileShape {
    match task {
        Task::A => RunFileShape {
            columns: 3,
            column_message:
                "Task A run file must have 3 columns TestID, SystemOutput1, and SystemOutput2.",
            id_message: "First column of Task A run file must contain test IDs.",
            valid_id: |id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()),
        },
        Task::B | Task::C => RunFileShape {
            columns: 2,
            column_message: "Task B/C run file must have 2 columns TestID and SystemOutput.",
            id_message: "First column of Task B/C run file must contain test IDs.",
            valid_id: |id| id.starts_with(DIALOGUE_TO_NOTE_PREFIX),
        },
    }
}

/// Check a run file's name, header width and test ids; returns the task it targets
pub fn check_submission(path: &Path) -> Result<Task, SubmissionError> {
    if !path.exists() {
        return Err(SubmissionError::NotFound(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let task = [Task::A, Task::B, Task::C]
        .into_iter()
        .find(|task| file_name.starts_with(task.as_str()))
        .ok_or(SubmissionError::UnknownTask)?;
    if !file_name.ends_with(".csv") {
        return Err(SubmissionError::NotCsv);
    }

    let shape = shape(task);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    if reader.headers()?.len() != shape.columns {
        return Err(SubmissionError::ColumnCount(shape.column_message));
    }

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let id = record.get(0).unwrap_or_default();
        if !(shape.valid_id)(id) {
            return Err(SubmissionError::InvalidTestId {
                message: shape.id_message,
                row: index + 1,
                value: id.to_string(),
            });
        }
    }

    Ok(task)
}
