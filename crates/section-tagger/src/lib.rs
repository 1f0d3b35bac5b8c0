//! # Note Section Tagger
//!
//! Locates the canonical sections of a clinical note (Subjective, Objective/Exam,
//! Objective/Results, Assessment-and-Plan) in free text written with informal headers.
//!
//! ## Architecture
//!
//! ```text
//! PatternTable (ordered lexicon, built once)
//!     │
//!     └──> Pattern Compiler → one CompiledPattern per subsection
//!
//! Note text
//!     │
//!     ├──> Line Scanner        every line × every pattern, table order
//!     │
//!     ├──> Conflict Resolver   first hit per line wins
//!     │
//!     ├──> Section Assembler   header → next header, contiguous spans
//!     │
//!     └──> Meta-Section Reducer (optional)
//!          ├─> leading unheaded text becomes subjective
//!          ├─> first span per macro-section is kept
//!          └─> boundaries re-stitched to cover the whole note
//! ```
//!
//! ## Example
//!
//! ```rust
//! use note_section_tagger::{MacroSection, PatternTable, SectionTagger};
//!
//! let tagger = SectionTagger::new(&PatternTable::builtin()).unwrap();
//!
//! let note = "CC: cough\nHPI: 3 days\nPE: normal\nAssessment: viral\nPlan: rest";
//! let spans = tagger.divide_note_by_metasections(note);
//!
//! assert_eq!(spans.len(), 3);
//! assert_eq!(spans[0].macro_section, MacroSection::Subjective);
//! assert_eq!(&note[spans[1].range()], "PE: normal\n");
//! ```

mod assembler;
mod compiler;
mod error;
mod patterns;
mod reducer;
mod scanner;
mod tagger;
mod types;

pub use compiler::CompiledPattern;
pub use error::{Result, TaggerError};
pub use patterns::{
    LexiconFile, LexiconSection, PatternTable, PatternTableBuilder, SubsectionSpec,
    SubsectionToMacro,
};
pub use reducer::reduce_to_meta_sections;
pub use scanner::resolve_line_conflicts;
pub use tagger::SectionTagger;
pub use types::{
    MacroSection, SectionSpan, SubsectionHit, DEFAULT_SUBSECTION, IMPRESSION_SUBSECTION,
};
