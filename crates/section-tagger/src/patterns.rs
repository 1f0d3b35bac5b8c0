//! Header lexicon: ordered subsections, their phrasings and their parent macro-sections.
//!
//! Declaration order is part of the contract. When two subsections match the same line,
//! the one declared first wins, so the table is always an ordered list.

use crate::error::{Result, TaggerError};
use crate::types::{MacroSection, DEFAULT_SUBSECTION, IMPRESSION_SUBSECTION};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A subsection and the literal header phrasings that introduce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionSpec {
    pub name: String,
    /// Tried in order; a trailing colon also allows a bare header on its own line
    pub phrasings: Vec<String>,
}

impl SubsectionSpec {
    pub fn new<I, S>(name: impl Into<String>, phrasings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            phrasings: phrasings.into_iter().map(Into::into).collect(),
        }
    }
}

/// On-disk lexicon shape (TOML or JSON)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconFile {
    pub sections: Vec<LexiconSection>,
}

/// One macro-section and its subsections, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconSection {
    pub macro_section: MacroSection,
    #[serde(default)]
    pub subsections: Vec<SubsectionSpec>,
}

/// Immutable, validated header lexicon.
///
/// Build one with [`PatternTable::builder`], [`PatternTable::builtin`] or load it from a
/// lexicon file. Reloading always yields a new table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    entries: Vec<(MacroSection, SubsectionSpec)>,
}

impl PatternTable {
    /// Start an empty builder
    #[must_use]
    pub fn builder() -> PatternTableBuilder {
        PatternTableBuilder::default()
    }

    /// The default English lexicon
    #[must_use]
    pub fn builtin() -> Self {
        let spec = |name: &str, phrasings: &[&str]| SubsectionSpec::new(name, phrasings.iter().copied());

        let entries = vec![
            (
                MacroSection::Subjective,
                spec("cc", &["cc :", "chief complaint :", "reason for visit :"]),
            ),
            (
                MacroSection::Subjective,
                spec(
                    "hpi",
                    &[
                        "history :",
                        "history of present illness :",
                        "history of present illness",
                        "hpi :",
                        "hpi",
                        "hpi notes :",
                        "interval history :",
                        "interval hx :",
                        "subjective :",
                    ],
                ),
            ),
            (
                MacroSection::Subjective,
                spec("ros", &["ros :", "review of system :", "review of systems :"]),
            ),
            (
                MacroSection::ObjectiveExam,
                spec(
                    "pe",
                    &[
                        "physical exam :",
                        "physical examination :",
                        "pe :",
                        "physical findings :",
                        "examination :",
                        "exam :",
                    ],
                ),
            ),
            (
                MacroSection::ObjectiveResults,
                spec("findings", &["results :", "findings :"]),
            ),
            (
                MacroSection::AssessmentAndPlan,
                spec("assessment", &["assessment :", "a:"]),
            ),
            (
                MacroSection::AssessmentAndPlan,
                spec(
                    "plan",
                    &[
                        "plan :",
                        "plan of care :",
                        "p:",
                        "medical decision-making plan :",
                        "summary plan",
                    ],
                ),
            ),
            (
                MacroSection::AssessmentAndPlan,
                spec(
                    "ap",
                    &[
                        "ap :",
                        "a / p :",
                        "assessment and plan :",
                        "assessment & plan :",
                        "disposition / plan :",
                    ],
                ),
            ),
        ];

        Self { entries }
    }

    /// Build from a decoded lexicon file
    pub fn from_lexicon(lexicon: LexiconFile) -> Result<Self> {
        let mut builder = Self::builder();
        for section in lexicon.sections {
            builder = builder.section(section.macro_section);
            for subsection in section.subsections {
                builder = builder.subsection(subsection.name, subsection.phrasings);
            }
        }
        builder.build()
    }

    /// Parse a lexicon from JSON, falling back to TOML
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let lexicon = match serde_json::from_slice::<LexiconFile>(bytes) {
            Ok(lexicon) => lexicon,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes)
                    .map_err(|err| TaggerError::invalid_lexicon(format!("{json_err}; {err}")))?;
                toml::from_str(utf8).map_err(|toml_err| {
                    TaggerError::invalid_lexicon(format!(
                        "not valid JSON ({json_err}); TOML parse error: {toml_err}"
                    ))
                })?
            }
        };
        Self::from_lexicon(lexicon)
    }

    /// Parse a TOML lexicon
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let lexicon: LexiconFile = toml::from_str(contents)
            .map_err(|err| TaggerError::invalid_lexicon(format!("TOML parse error: {err}")))?;
        Self::from_lexicon(lexicon)
    }

    /// Parse a JSON lexicon
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let lexicon: LexiconFile = serde_json::from_str(contents)
            .map_err(|err| TaggerError::invalid_lexicon(format!("JSON parse error: {err}")))?;
        Self::from_lexicon(lexicon)
    }

    /// Load a lexicon file, choosing the format by extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext @ ("toml" | "json")) => {
                let contents = String::from_utf8(contents).map_err(|err| {
                    TaggerError::invalid_lexicon(format!("{} is not UTF-8: {err}", path.display()))
                })?;
                if ext == "toml" {
                    Self::from_toml_str(&contents)
                } else {
                    Self::from_json_str(&contents)
                }
            }
            _ => Self::from_bytes(&contents),
        }
    }

    /// Export the table in lexicon file shape, grouping consecutive subsections
    #[must_use]
    pub fn to_lexicon(&self) -> LexiconFile {
        let mut sections: Vec<LexiconSection> = Vec::new();
        for (macro_section, spec) in &self.entries {
            match sections.last_mut() {
                Some(last) if last.macro_section == *macro_section => {
                    last.subsections.push(spec.clone());
                }
                _ => sections.push(LexiconSection {
                    macro_section: *macro_section,
                    subsections: vec![spec.clone()],
                }),
            }
        }
        LexiconFile { sections }
    }

    /// Subsections with their parents, in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (MacroSection, &SubsectionSpec)> {
        self.entries.iter().map(|(section, spec)| (*section, spec))
    }

    /// Parent macro-section of a declared subsection
    #[must_use]
    pub fn macro_for(&self, subsection: &str) -> Option<MacroSection> {
        self.entries
            .iter()
            .find(|(_, spec)| spec.name == subsection)
            .map(|(section, _)| *section)
    }

    /// Build the total subsection → macro-section mapping
    #[must_use]
    pub fn subsection_to_macro(&self) -> SubsectionToMacro {
        SubsectionToMacro::new(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Incremental, validating constructor for [`PatternTable`]
#[derive(Debug, Default)]
pub struct PatternTableBuilder {
    current: Option<MacroSection>,
    entries: Vec<(Option<MacroSection>, SubsectionSpec)>,
}

impl PatternTableBuilder {
    /// Subsequent subsections belong to `macro_section`
    #[must_use]
    pub fn section(mut self, macro_section: MacroSection) -> Self {
        self.current = Some(macro_section);
        self
    }

    /// Declare the next subsection under the current macro-section
    #[must_use]
    pub fn subsection<I, S>(mut self, name: impl Into<String>, phrasings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((self.current, SubsectionSpec::new(name, phrasings)));
        self
    }

    /// Validate and freeze the table
    pub fn build(self) -> Result<PatternTable> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());

        for (parent, mut spec) in self.entries {
            spec.name = spec.name.trim().to_string();
            let name = spec.name.as_str();
            if name.is_empty() {
                return Err(TaggerError::EmptySubsectionName);
            }
            if name == DEFAULT_SUBSECTION || name == IMPRESSION_SUBSECTION {
                return Err(TaggerError::ReservedSubsection(spec.name));
            }
            let Some(parent) = parent else {
                return Err(TaggerError::MissingParent(spec.name));
            };
            if parent.is_default() {
                return Err(TaggerError::DefaultParent(spec.name));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(TaggerError::DuplicateSubsection(spec.name));
            }
            if spec.phrasings.is_empty() {
                return Err(TaggerError::NoPhrasings(spec.name));
            }
            if let Some(index) = spec.phrasings.iter().position(|p| is_blank_phrasing(p)) {
                return Err(TaggerError::BlankPhrasing {
                    subsection: spec.name,
                    index,
                });
            }
            entries.push((parent, spec));
        }

        Ok(PatternTable { entries })
    }
}

/// Blank outright, or blank once the trailing colon of the bare form is dropped
fn is_blank_phrasing(phrasing: &str) -> bool {
    phrasing.trim().is_empty()
        || phrasing
            .strip_suffix(':')
            .is_some_and(|bare| bare.trim().is_empty())
}

/// Total mapping from subsection name to macro-section.
///
/// Covers every declared subsection plus the synthetic `default` and `impression` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsectionToMacro {
    map: HashMap<String, MacroSection>,
}

impl SubsectionToMacro {
    #[must_use]
    pub fn new(table: &PatternTable) -> Self {
        let mut map: HashMap<String, MacroSection> = table
            .entries()
            .map(|(section, spec)| (spec.name.clone(), section))
            .collect();
        map.insert(DEFAULT_SUBSECTION.to_string(), MacroSection::Default);
        // An uppercase IMPRESSION header reads as an assessment in this corpus.
        map.insert(
            IMPRESSION_SUBSECTION.to_string(),
            MacroSection::AssessmentAndPlan,
        );
        Self { map }
    }

    /// Macro-section for a subsection; unknown names fall back to `default`
    #[must_use]
    pub fn resolve(&self, subsection: &str) -> MacroSection {
        self.map
            .get(subsection)
            .copied()
            .unwrap_or(MacroSection::Default)
    }

    #[must_use]
    pub fn contains(&self, subsection: &str) -> bool {
        self.map.contains_key(subsection)
    }
}
