//! Dataset CSV splitting into model input/target files.

use anyhow::{bail, Context as AnyhowContext, Result};
use note_section_eval::LINE_FEED_PLACEHOLDER;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub const TRANSCRIPT_COLUMN: &str = "dialogue";
pub const NOTE_COLUMN: &str = "note";

/// Files produced by [`split_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutputs {
    pub metadata: PathBuf,
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub text_dir: PathBuf,
    pub encounters: usize,
}

/// Write `<prefix>_metadata.csv`, `<prefix>.src`, `<prefix>.tgt` and
/// `output/<prefix>/<id>.{transcript,report}.txt` next to the input file.
pub fn split_file(path: &Path, id_column: &str) -> Result<SplitOutputs> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid input path {}", path.display()))?;
    let prefix = file_name.replace(".csv", "");
    let outdir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let column = |name: &str| headers.iter().position(|h| h == name);
    let Some(id_index) = column(id_column) else {
        bail!("Column '{id_column}' not found in {}", path.display());
    };
    let dialogue_index = column(TRANSCRIPT_COLUMN);
    let note_index = column(NOTE_COLUMN);
    let value =
        |row: &csv::StringRecord, index: usize| row.get(index).unwrap_or_default().to_string();

    let metadata_columns: Vec<usize> = (0..headers.len())
        .filter(|&i| Some(i) != dialogue_index && Some(i) != note_index)
        .collect();
    let metadata = outdir.join(format!("{prefix}_metadata.csv"));
    let mut writer = csv::Writer::from_path(&metadata)
        .with_context(|| format!("Failed to create {}", metadata.display()))?;
    writer.write_record(metadata_columns.iter().map(|&i| headers[i].as_str()))?;
    for row in &rows {
        writer.write_record(metadata_columns.iter().map(|&i| row.get(i).unwrap_or_default()))?;
    }
    writer.flush()?;

    let spaces = Regex::new("[ ]+")?;
    let source = match dialogue_index {
        Some(index) => {
            let lines = rows
                .iter()
                .map(|row| collapse_spaces(&spaces, &value(row, index).replace('\n', " ")));
            Some(write_lines(&outdir.join(format!("{prefix}.src")), lines)?)
        }
        None => None,
    };
    let target = match note_index {
        Some(index) => {
            let encoded = format!(" {LINE_FEED_PLACEHOLDER} ");
            let lines = rows
                .iter()
                .map(|row| collapse_spaces(&spaces, &value(row, index).replace('\n', &encoded)));
            Some(write_lines(&outdir.join(format!("{prefix}.tgt")), lines)?)
        }
        None => None,
    };

    let text_dir = outdir.join("output").join(&prefix);
    fs::create_dir_all(&text_dir)
        .with_context(|| format!("Failed to create {}", text_dir.display()))?;
    for row in &rows {
        let id = value(row, id_index);
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id == "." || id == ".." {
            bail!("Encounter id '{id}' cannot be used as a file name");
        }
        if let Some(index) = dialogue_index {
            fs::write(text_dir.join(format!("{id}.transcript.txt")), value(row, index))?;
        }
        if let Some(index) = note_index {
            fs::write(text_dir.join(format!("{id}.report.txt")), value(row, index))?;
        }
    }

    Ok(SplitOutputs {
        metadata,
        source,
        target,
        text_dir,
        encounters: rows.len(),
    })
}

fn collapse_spaces(spaces: &Regex, text: &str) -> String {
    spaces.replace_all(text, " ").into_owned()
}

/// One single-column CSV record per line, quoted only where needed
fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<PathBuf> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for line in lines {
        writer.write_record([line])?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}
