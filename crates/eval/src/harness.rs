//! Evaluation driver: instances, scoring and cohort reports.

use crate::cohort::build_cohorts;
use crate::config::EvalConfig;
use crate::division::{divide_into_divisions, SectionDivisions, SECTION_DIVISIONS};
use crate::error::{EvalError, Result};
use crate::records::{join_records, CsvTable, NoteRecord};
use crate::rouge::LexicalOverlapScorer;
use crate::scorer::{ScoreColumns, Scorer};
use crate::task::validate_ids;
use note_section_tagger::SectionTagger;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::path::Path;

/// Aligned reference/prediction lists handed to the scorers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instances {
    pub references: Vec<String>,
    pub predictions: Vec<String>,
    /// Full-note instances at the head of both lists
    pub num_records: usize,
}

impl Instances {
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Mean scores per cohort, in cohort order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalReport {
    cohorts: Vec<(String, Vec<(String, f64)>)>,
}

impl EvalReport {
    #[must_use]
    pub fn cohorts(&self) -> &[(String, Vec<(String, f64)>)] {
        &self.cohorts
    }

    /// Mean of `key` in `cohort`
    #[must_use]
    pub fn get(&self, cohort: &str, key: &str) -> Option<f64> {
        self.cohorts
            .iter()
            .find(|(name, _)| name == cohort)
            .and_then(|(_, means)| means.iter().find(|(k, _)| k == key))
            .map(|(_, value)| *value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

struct CohortMeans<'a>(&'a [(String, f64)]);

impl Serialize for CohortMeans<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for EvalReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cohorts.len()))?;
        for (name, means) in &self.cohorts {
            map.serialize_entry(name, &CohortMeans(means))?;
        }
        map.end()
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, means) in &self.cohorts {
            writeln!(f, "{name}")?;
            for (key, value) in means {
                writeln!(f, "\t{key} -> {}", rounded_mean(*value))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Mean rounded to 3 places in shortest form, keeping one decimal for whole numbers
fn rounded_mean(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

/// Runs the summarization evaluation for one configuration
pub struct Evaluator {
    tagger: SectionTagger,
    config: EvalConfig,
    scorers: Vec<Box<dyn Scorer>>,
}

impl Evaluator {
    /// Evaluator with the lexical-overlap scorer
    pub fn new(tagger: SectionTagger, config: EvalConfig) -> Result<Self> {
        config.validate().map_err(EvalError::InvalidConfig)?;
        Ok(Self {
            tagger,
            config,
            scorers: vec![Box::new(LexicalOverlapScorer::new())],
        })
    }

    /// Add another scorer; its keys follow the existing ones
    #[must_use]
    pub fn with_scorer(mut self, scorer: Box<dyn Scorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Check the system file's ids against the task split
    pub fn validate_system_ids(&self, system: &CsvTable) -> Result<()> {
        let ids = system.column(&self.config.id_column)?;
        validate_ids(self.config.task, &ids, self.config.debug)
    }

    /// Full-note pairs, followed by one block per division when the task scores them
    pub fn build_instances(&self, records: &[NoteRecord]) -> Result<Instances> {
        let num_records = records.len();
        let mut references: Vec<String> = records.iter().map(|r| r.reference.clone()).collect();
        let mut predictions: Vec<String> = records.iter().map(|r| r.prediction.clone()).collect();

        if !self.config.task.scores_divisions() {
            return Ok(Instances {
                references,
                predictions,
                num_records,
            });
        }

        let divided: Vec<(SectionDivisions, SectionDivisions)> = records
            .iter()
            .map(|r| {
                (
                    divide_into_divisions(&self.tagger, &r.reference),
                    divide_into_divisions(&self.tagger, &r.prediction),
                )
            })
            .collect();

        let detected: usize = divided.iter().map(|(_, p)| p.len()).sum();
        log::debug!("Detected {detected} prediction divisions across {num_records} notes");
        if detected == 0 {
            log::warn!("We detected 0 sections in the system output");
            if self.config.use_section_check {
                return Err(EvalError::NoSectionsDetected);
            }
        }

        for division in SECTION_DIVISIONS {
            for (reference, prediction) in &divided {
                references.push(reference.get_or_marker(division).to_string());
                predictions.push(prediction.get_or_marker(division).to_string());
            }
        }

        let expected = num_records * (SECTION_DIVISIONS.len() + 1);
        if references.len() != expected || predictions.len() != expected {
            return Err(EvalError::InstanceMismatch {
                references: references.len(),
                predictions: predictions.len(),
                expected,
            });
        }

        Ok(Instances {
            references,
            predictions,
            num_records,
        })
    }

    /// Run every scorer over the instances
    pub fn score(&self, instances: &Instances) -> Result<ScoreColumns> {
        let mut all = ScoreColumns::new();
        for scorer in &self.scorers {
            log::info!("Scoring {} instances with {}", instances.len(), scorer.name());
            let columns = scorer.score(&instances.references, &instances.predictions)?;
            if let Some((key, values)) = columns.iter().find(|(_, v)| v.len() != instances.len()) {
                return Err(EvalError::scorer(
                    scorer.name(),
                    format!(
                        "'{key}' has {} values for {} instances",
                        values.len(),
                        instances.len()
                    ),
                ));
            }
            all.extend(columns);
        }
        Ok(all)
    }

    /// Score joined records and aggregate them per cohort
    pub fn evaluate(&self, records: &[NoteRecord]) -> Result<EvalReport> {
        let instances = self.build_instances(records)?;
        let scores = self.score(&instances)?;

        let cohorts = build_cohorts(
            records,
            self.config.task.scores_divisions(),
            self.config.note_length_cutoff,
        )
        .into_iter()
        .map(|cohort| {
            let means = cohort.aggregate(&scores);
            (cohort.name, means)
        })
        .collect();

        Ok(EvalReport { cohorts })
    }

    /// Validate ids, join the tables and evaluate
    pub fn evaluate_tables(
        &self,
        gold: &CsvTable,
        system: &CsvTable,
        metadata: Option<&CsvTable>,
    ) -> Result<EvalReport> {
        log::info!("Gold path: {} ({} summaries)", gold.source_name(), gold.len());
        log::info!("System path: {} ({} summaries)", system.source_name(), system.len());

        self.validate_system_ids(system)?;
        let records = join_records(&self.config, gold, system, metadata)?;
        self.evaluate(&records)
    }

    /// Read the CSV inputs from disk and evaluate
    pub fn evaluate_files(
        &self,
        gold_path: &Path,
        system_path: &Path,
        metadata_path: Option<&Path>,
    ) -> Result<EvalReport> {
        let gold = CsvTable::from_path(gold_path)?;
        let system = CsvTable::from_path(system_path)?;
        let metadata = metadata_path.map(CsvTable::from_path).transpose()?;
        self.evaluate_tables(&gold, &system, metadata.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::EMPTY_SECTION_MARKER;
    use crate::task::Task;
    use pretty_assertions::assert_eq;

    fn record(id: &str, reference: &str, prediction: &str) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            dataset: "0".to_string(),
            dialogue_words: 10,
            reference: reference.to_string(),
            prediction: prediction.to_string(),
        }
    }

    fn evaluator(task: Task) -> Evaluator {
        let config = EvalConfig {
            task,
            debug: true,
            ..Default::default()
        };
        Evaluator::new(SectionTagger::with_builtin_table().unwrap(), config).unwrap()
    }

    #[test]
    fn test_instances_for_full_note_task() {
        let records = vec![record("D2N088", "CC: a __lf1__ PLAN: b", "CC: a")];
        let instances = evaluator(Task::B).build_instances(&records).unwrap();

        assert_eq!(instances.len(), 5);
        assert_eq!(instances.num_records, 1);
        assert_eq!(instances.references[1], "CC: a __lf1__");
        assert_eq!(instances.predictions[1], "CC: a");
        assert_eq!(instances.references[4], " PLAN: b");
        assert_eq!(instances.predictions[4], EMPTY_SECTION_MARKER);
        assert_eq!(instances.references[2], EMPTY_SECTION_MARKER);
    }

    #[test]
    fn test_snippet_task_has_no_division_blocks() {
        let records = vec![record("1", "a", "a"), record("2", "b", "c")];
        let instances = evaluator(Task::A).build_instances(&records).unwrap();
        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn test_section_check_aborts_without_divisions() {
        let config = EvalConfig {
            use_section_check: true,
            ..Default::default()
        };
        let evaluator =
            Evaluator::new(SectionTagger::with_builtin_table().unwrap(), config).unwrap();
        let records: Vec<NoteRecord> = Vec::new();

        assert!(matches!(
            evaluator.build_instances(&records),
            Err(EvalError::NoSectionsDetected)
        ));
    }

    #[test]
    fn test_evaluate_reports_cohorts_in_order() {
        let records = vec![
            record("D2N088", "CC: cough __lf1__ PLAN: rest", "CC: cough __lf1__ PLAN: rest"),
            record("D2N089", "CC: fever", "HPI: fever"),
        ];
        let report = evaluator(Task::B).evaluate(&records).unwrap();

        let names: Vec<&str> = report.cohorts().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "all",
                "dataset-0",
                "division-subjective",
                "division-objective_exam",
                "division-objective_results",
                "division-assessment_and_plan",
                "shorter-src",
            ]
        );
        assert_eq!(report.get("division-subjective", "rouge1"), Some(0.75));
        // both sides missing the division score the marker against itself
        assert_eq!(report.get("division-objective_exam", "rouge1"), Some(1.0));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert!(json["all"]["rougeLsum"].is_number());
        assert!(report.to_string().starts_with("all\n\trouge1 -> "));
    }

    #[test]
    fn test_printed_means_are_rounded_not_padded() {
        assert_eq!(rounded_mean(0.5), "0.5");
        assert_eq!(rounded_mean(1.0), "1.0");
        assert_eq!(rounded_mean(2.0 / 3.0), "0.667");
        assert_eq!(rounded_mean(0.12349), "0.123");

        let report = EvalReport {
            cohorts: vec![("all".to_string(), vec![("rouge1".to_string(), 0.5)])],
        };
        assert_eq!(report.to_string(), "all\n\trouge1 -> 0.5\n\n");
    }

    struct ShortScorer;

    impl Scorer for ShortScorer {
        fn name(&self) -> &str {
            "short"
        }

        fn score(&self, _: &[String], _: &[String]) -> Result<ScoreColumns> {
            let mut columns = ScoreColumns::new();
            columns.insert("short", vec![1.0]);
            Ok(columns)
        }
    }

    #[test]
    fn test_malformed_scorer_columns_are_rejected() {
        let evaluator = evaluator(Task::A).with_scorer(Box::new(ShortScorer));
        let records = vec![record("1", "a", "a"), record("2", "b", "b")];

        let err = evaluator.evaluate(&records).unwrap_err();
        assert!(matches!(err, EvalError::Scorer { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EvalConfig {
            experiment: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            Evaluator::new(SectionTagger::with_builtin_table().unwrap(), config),
            Err(EvalError::InvalidConfig(_))
        ));
    }
}
