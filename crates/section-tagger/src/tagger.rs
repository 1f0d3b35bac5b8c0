use crate::assembler::assemble_sections;
use crate::compiler::{CompiledPattern, ImpressionPattern};
use crate::error::Result;
use crate::patterns::{PatternTable, SubsectionToMacro};
use crate::reducer::reduce_to_meta_sections;
use crate::scanner::{resolve_line_conflicts, LineScanner};
use crate::types::{SectionSpan, SubsectionHit};
use std::collections::BTreeMap;

/// Section tagging engine.
///
/// Patterns are compiled once at construction; tagging calls only read them, so one
/// tagger can be shared across threads.
#[derive(Debug, Clone)]
pub struct SectionTagger {
    patterns: Vec<CompiledPattern>,
    impression: ImpressionPattern,
    mapping: SubsectionToMacro,
}

impl SectionTagger {
    /// Compile every subsection of `table`
    pub fn new(table: &PatternTable) -> Result<Self> {
        let patterns = table
            .entries()
            .map(|(section, spec)| CompiledPattern::compile(section, spec))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("compiled {} subsection patterns", patterns.len());

        Ok(Self {
            patterns,
            impression: ImpressionPattern::compile()?,
            mapping: table.subsection_to_macro(),
        })
    }

    /// Tagger over the builtin English lexicon
    pub fn with_builtin_table() -> Result<Self> {
        Self::new(&PatternTable::builtin())
    }

    /// Compiled patterns in table order
    #[must_use]
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    #[must_use]
    pub const fn subsection_to_macro(&self) -> &SubsectionToMacro {
        &self.mapping
    }

    /// Every header hit in the note, before same-line conflicts are resolved
    #[must_use]
    pub fn tag_section_headers(&self, text: &str) -> Vec<SubsectionHit> {
        LineScanner::new(&self.patterns, &self.impression).scan(text)
    }

    /// The winning header hit of every line that has one
    #[must_use]
    pub fn classify_lines(&self, text: &str) -> BTreeMap<usize, SubsectionHit> {
        resolve_line_conflicts(self.tag_section_headers(text))
    }

    /// Full, contiguous span sequence: one span per detected header
    #[must_use]
    pub fn tag_sections(&self, text: &str) -> Vec<SectionSpan> {
        let winners = self.classify_lines(text);
        assemble_sections(text, &winners, &self.mapping)
    }

    /// At most one span per macro-section, covering the whole note
    #[must_use]
    pub fn divide_note_by_metasections(&self, text: &str) -> Vec<SectionSpan> {
        reduce_to_meta_sections(self.tag_sections(text), text.len())
    }
}
