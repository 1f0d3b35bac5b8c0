//! Gold, system and metadata CSV loading.

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Column a gold file may carry instead of the note column
pub const REFERENCE_COLUMN: &str = "reference";

/// Column a system file may carry instead of the note column
pub const PREDICTION_COLUMN: &str = "prediction";

/// Metadata column grouping encounters into datasets
pub const DATASET_COLUMN: &str = "dataset";

/// Dataset label used when no metadata is supplied
pub const DEFAULT_DATASET: &str = "0";

/// A headed CSV file held in memory
#[derive(Debug, Clone)]
pub struct CsvTable {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl CsvTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(path.display().to_string(), file)
    }

    pub fn from_reader<R: Read>(source_name: impl Into<String>, reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            source_name: source_name.into(),
            headers,
            rows,
        })
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EvalError::missing_column(name, &self.source_name))
    }

    /// Every value of a column, in row order
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        let index = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| cell(row, index)).collect())
    }

    /// First column present among `candidates`
    fn first_column(&self, candidates: &[&str]) -> Result<usize> {
        candidates
            .iter()
            .find_map(|name| self.column_index(name))
            .ok_or_else(|| EvalError::missing_column(candidates.join(" or "), &self.source_name))
    }
}

fn cell(row: &csv::StringRecord, index: usize) -> String {
    row.get(index).unwrap_or_default().to_string()
}

/// One encounter with its gold and system notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    pub dataset: String,
    /// Whitespace-separated words in the source dialogue
    pub dialogue_words: usize,
    pub reference: String,
    pub prediction: String,
}

/// Join gold and system tables on the id column.
///
/// Gold order is kept. Gold ids with no system row are dropped with a warning.
pub fn join_records(
    config: &EvalConfig,
    gold: &CsvTable,
    system: &CsvTable,
    metadata: Option<&CsvTable>,
) -> Result<Vec<NoteRecord>> {
    let gold_id = gold.require_column(&config.id_column)?;
    let gold_note = gold.first_column(&[REFERENCE_COLUMN, &config.note_column])?;
    let system_id = system.require_column(&config.id_column)?;
    let system_note = system.first_column(&[PREDICTION_COLUMN, &config.note_column])?;

    let mut predictions: HashMap<String, String> = HashMap::with_capacity(system.len());
    for row in &system.rows {
        let id = cell(row, system_id);
        if predictions.contains_key(&id) {
            log::warn!("Duplicate id '{id}' in {}, keeping the first row", system.source_name);
            continue;
        }
        predictions.insert(id, cell(row, system_note));
    }

    let meta = metadata.map(|table| MetadataIndex::new(config, table)).transpose()?;
    let gold_dialogue = gold.column_index(&config.dialogue_column);
    if gold_dialogue.is_none() && meta.as_ref().and_then(|m| m.dialogue).is_none() {
        log::warn!(
            "No '{}' column found, source lengths count as 0 words",
            config.dialogue_column
        );
    }

    let mut records = Vec::with_capacity(gold.len());
    for row in &gold.rows {
        let id = cell(row, gold_id);
        let Some(prediction) = predictions.get(&id) else {
            log::warn!("No system output for id '{id}', skipping");
            continue;
        };

        let meta_row = meta.as_ref().and_then(|m| m.rows.get(&id).map(|r| (m, *r)));
        let dataset = match (&meta, meta_row) {
            (_, Some((m, r))) => m
                .dataset
                .map_or_else(|| DEFAULT_DATASET.to_string(), |i| cell(&m.table.rows[r], i)),
            (Some(_), None) => {
                log::warn!("No metadata for id '{id}', using dataset {DEFAULT_DATASET}");
                DEFAULT_DATASET.to_string()
            }
            (None, None) => DEFAULT_DATASET.to_string(),
        };

        let dialogue = match (gold_dialogue, meta_row) {
            (Some(i), _) => cell(row, i),
            (None, Some((m, r))) => m
                .dialogue
                .map(|i| cell(&m.table.rows[r], i))
                .unwrap_or_default(),
            (None, None) => String::new(),
        };

        records.push(NoteRecord {
            dialogue_words: dialogue.split_whitespace().count(),
            reference: cell(row, gold_note),
            prediction: prediction.clone(),
            dataset,
            id,
        });
    }

    log::info!(
        "Joined {} of {} gold notes with system output",
        records.len(),
        gold.len()
    );
    Ok(records)
}

/// Read and join the evaluation inputs from disk
pub fn load_records(
    config: &EvalConfig,
    gold_path: &Path,
    system_path: &Path,
    metadata_path: Option<&Path>,
) -> Result<Vec<NoteRecord>> {
    let gold = CsvTable::from_path(gold_path)?;
    let system = CsvTable::from_path(system_path)?;
    let metadata = metadata_path.map(CsvTable::from_path).transpose()?;
    join_records(config, &gold, &system, metadata.as_ref())
}

struct MetadataIndex<'a> {
    table: &'a CsvTable,
    rows: HashMap<String, usize>,
    dataset: Option<usize>,
    dialogue: Option<usize>,
}

impl<'a> MetadataIndex<'a> {
    fn new(config: &EvalConfig, table: &'a CsvTable) -> Result<Self> {
        let id = table.require_column(&config.id_column)?;
        let dataset = table.column_index(DATASET_COLUMN);
        if dataset.is_none() {
            log::warn!(
                "{} has no '{DATASET_COLUMN}' column, using dataset {DEFAULT_DATASET}",
                table.source_name
            );
        }

        let mut rows = HashMap::with_capacity(table.len());
        for (index, row) in table.rows.iter().enumerate() {
            rows.entry(cell(row, id)).or_insert(index);
        }

        Ok(Self {
            table,
            rows,
            dataset,
            dialogue: table.column_index(&config.dialogue_column),
        })
    }
}
