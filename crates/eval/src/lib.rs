//! # Note Section Eval
//!
//! Scores generated clinical notes against gold notes, both as whole notes and per
//! section division found by `note-section-tagger`.
//!
//! ## Pipeline
//!
//! ```text
//! gold.csv + system.csv (+ metadata.csv)
//!     │
//!     ├──> validate_ids       encounter ids fit the task split
//!     ├──> join_records       NoteRecord per encounter, gold order
//!     ├──> build_instances    full notes, then one block per division (taskB)
//!     ├──> Scorer(s)          one value per instance and key
//!     └──> cohorts            mean per key → EvalReport
//! ```
//!
//! ## Example
//!
//! ```rust
//! use note_section_eval::{EvalConfig, Evaluator, NoteRecord, Task};
//! use note_section_tagger::SectionTagger;
//!
//! let config = EvalConfig { task: Task::A, debug: true, ..Default::default() };
//! let evaluator = Evaluator::new(SectionTagger::with_builtin_table().unwrap(), config).unwrap();
//!
//! let records = vec![NoteRecord {
//!     id: "1".into(),
//!     dataset: "0".into(),
//!     dialogue_words: 3,
//!     reference: "cough for three days".into(),
//!     prediction: "cough for three days".into(),
//! }];
//! let report = evaluator.evaluate(&records).unwrap();
//! assert_eq!(report.get("all", "rouge1"), Some(1.0));
//! ```

pub mod cohort;
pub mod config;
pub mod division;
pub mod error;
pub mod harness;
pub mod records;
pub mod rouge;
pub mod scorer;
pub mod task;

pub use cohort::{build_cohorts, Cohort};
pub use config::EvalConfig;
pub use division::{
    decode_line_feeds, divide_into_divisions, encode_line_feeds, SectionDivisions,
    EMPTY_SECTION_MARKER, LINE_FEED_PLACEHOLDER, SECTION_DIVISIONS,
};
pub use error::{EvalError, Result};
pub use harness::{EvalReport, Evaluator, Instances};
pub use records::{join_records, load_records, CsvTable, NoteRecord};
pub use rouge::{LexicalOverlapScorer, OverlapScore, ROUGE_KEYS};
pub use scorer::{ScoreColumns, Scorer};
pub use task::{validate_ids, Task, DIALOGUE_TO_NOTE_PREFIX};
