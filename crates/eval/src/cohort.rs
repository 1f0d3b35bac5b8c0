//! Instance cohorts and per-cohort aggregation.

use crate::division::SECTION_DIVISIONS;
use crate::records::NoteRecord;
use crate::scorer::ScoreColumns;

/// Named subset of instance indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    pub name: String,
    pub indices: Vec<usize>,
}

impl Cohort {
    pub fn new(name: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            indices,
        }
    }

    /// Mean of every score column over this cohort's indices
    #[must_use]
    pub fn aggregate(&self, scores: &ScoreColumns) -> Vec<(String, f64)> {
        scores
            .iter()
            .map(|(key, values)| {
                let picked: Vec<f64> = self
                    .indices
                    .iter()
                    .filter_map(|&i| values.get(i).copied())
                    .collect();
                (key.to_string(), mean(&picked))
            })
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Cohorts over the instance list.
///
/// `all` and `dataset-*` cover the full-note block only. With `with_divisions`, one
/// `division-*` cohort per division block follows, then `shorter-src` / `longer-src`.
/// Empty cohorts are left out, so every reported mean is over at least one instance.
#[must_use]
pub fn build_cohorts(records: &[NoteRecord], with_divisions: bool, length_cutoff: usize) -> Vec<Cohort> {
    let num_records = records.len();
    let mut cohorts = vec![Cohort::new("all", (0..num_records).collect())];

    let mut datasets: Vec<&str> = Vec::new();
    for record in records {
        if !datasets.contains(&record.dataset.as_str()) {
            datasets.push(&record.dataset);
        }
    }
    for dataset in datasets {
        let indices = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.dataset == dataset)
            .map(|(i, _)| i)
            .collect();
        cohorts.push(Cohort::new(format!("dataset-{dataset}"), indices));
    }

    if !with_divisions {
        cohorts.retain(|cohort| !cohort.indices.is_empty());
        return cohorts;
    }

    for (block, division) in SECTION_DIVISIONS.iter().enumerate() {
        let start = (block + 1) * num_records;
        let end = (block + 2) * num_records;
        cohorts.push(Cohort::new(
            format!("division-{division}"),
            (start..end).collect(),
        ));
    }

    let (short, long): (Vec<usize>, Vec<usize>) =
        (0..num_records).partition(|&i| records[i].dialogue_words <= length_cutoff);
    if !short.is_empty() {
        cohorts.push(Cohort::new("shorter-src", short));
    }
    if !long.is_empty() {
        cohorts.push(Cohort::new("longer-src", long));
    }

    cohorts.retain(|cohort| !cohort.indices.is_empty());
    cohorts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(dataset: &str, words: usize) -> NoteRecord {
        NoteRecord {
            id: String::new(),
            dataset: dataset.to_string(),
            dialogue_words: words,
            reference: String::new(),
            prediction: String::new(),
        }
    }

    fn names(cohorts: &[Cohort]) -> Vec<&str> {
        cohorts.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_full_note_cohorts() {
        let records = vec![record("b", 10), record("a", 10), record("b", 10)];
        let cohorts = build_cohorts(&records, false, 512);

        assert_eq!(names(&cohorts), vec!["all", "dataset-b", "dataset-a"]);
        assert_eq!(cohorts[1].indices, vec![0, 2]);
    }

    #[test]
    fn test_division_and_length_cohorts() {
        let records = vec![record("0", 600), record("0", 20)];
        let cohorts = build_cohorts(&records, true, 512);

        assert_eq!(
            names(&cohorts),
            vec![
                "all",
                "dataset-0",
                "division-subjective",
                "division-objective_exam",
                "division-objective_results",
                "division-assessment_and_plan",
                "shorter-src",
                "longer-src",
            ]
        );
        assert_eq!(cohorts[2].indices, vec![2, 3]);
        assert_eq!(cohorts[5].indices, vec![8, 9]);
        assert_eq!(cohorts[6].indices, vec![1]);
        assert_eq!(cohorts[7].indices, vec![0]);
    }

    #[test]
    fn test_empty_length_cohort_is_omitted() {
        let records = vec![record("0", 512)];
        let cohorts = build_cohorts(&records, true, 512);
        assert_eq!(cohorts.last().map(|c| c.name.as_str()), Some("shorter-src"));
    }

    #[test]
    fn test_no_records_yield_no_cohorts() {
        assert!(build_cohorts(&[], false, 512).is_empty());
        assert!(build_cohorts(&[], true, 512).is_empty());
    }

    #[test]
    fn test_aggregate_means() {
        let mut scores = ScoreColumns::new();
        scores.insert("rouge1", vec![1.0, 0.5, 0.0]);
        scores.insert("rouge2", vec![0.0, 0.5, 1.0]);

        let cohort = Cohort::new("pair", vec![0, 1]);
        assert_eq!(
            cohort.aggregate(&scores),
            vec![("rouge1".to_string(), 0.75), ("rouge2".to_string(), 0.25)]
        );
    }
}
