use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Subsection name used for text that precedes any detected header
pub const DEFAULT_SUBSECTION: &str = "default";

/// Synthetic subsection for the uppercase `IMPRESSION` header
pub const IMPRESSION_SUBSECTION: &str = "impression";

/// Top-level division of a clinical note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroSection {
    /// History, complaints and review of systems
    Subjective,
    /// Physical examination
    ObjectiveExam,
    /// Results and findings
    ObjectiveResults,
    /// Assessment, plan and impression
    AssessmentAndPlan,
    /// No header seen yet
    Default,
}

impl MacroSection {
    /// The four real divisions, in reduction priority order
    pub const DIVISIONS: [Self; 4] = [
        Self::Subjective,
        Self::ObjectiveExam,
        Self::ObjectiveResults,
        Self::AssessmentAndPlan,
    ];

    /// Get the snake_case label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subjective => "subjective",
            Self::ObjectiveExam => "objective_exam",
            Self::ObjectiveResults => "objective_results",
            Self::AssessmentAndPlan => "assessment_and_plan",
            Self::Default => "default",
        }
    }

    /// Check if this is the placeholder for unheaded text
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for MacroSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MacroSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subjective" => Ok(Self::Subjective),
            "objective_exam" => Ok(Self::ObjectiveExam),
            "objective_results" => Ok(Self::ObjectiveResults),
            "assessment_and_plan" => Ok(Self::AssessmentAndPlan),
            "default" => Ok(Self::Default),
            other => Err(format!("unknown macro-section: {other}")),
        }
    }
}

/// A header detected on one line.
///
/// Offsets are absolute byte offsets into the whole note. `char_start` is the start of
/// the line and `char_end` the end of the matched header text on that line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionHit {
    pub subsection: String,
    pub line: usize,
    pub char_start: usize,
    pub char_end: usize,
}

impl SubsectionHit {
    /// Create a new hit
    pub fn new(subsection: impl Into<String>, line: usize, char_start: usize, char_end: usize) -> Self {
        Self {
            subsection: subsection.into(),
            line,
            char_start,
            char_end,
        }
    }

    /// Placeholder header seeding a note whose first line has no header
    #[must_use]
    pub fn unheaded() -> Self {
        Self::new(DEFAULT_SUBSECTION, 0, 0, 0)
    }

    /// Byte range of the header text
    #[must_use]
    pub const fn header_range(&self) -> Range<usize> {
        self.char_start..self.char_end
    }
}

/// A contiguous region of a note attributed to one subsection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub macro_section: MacroSection,
    pub subsection: String,
    /// Line carrying the header (0-based)
    pub header_line: usize,
    /// Start of the header line; the span begins here
    pub header_char_start: usize,
    /// End of the header text
    pub header_char_end: usize,
    /// Start of the next span, or the note length
    pub span_end: usize,
}

impl SectionSpan {
    /// Close a header into a span ending at `span_end`
    #[must_use]
    pub fn from_hit(macro_section: MacroSection, hit: SubsectionHit, span_end: usize) -> Self {
        Self {
            macro_section,
            subsection: hit.subsection,
            header_line: hit.line,
            header_char_start: hit.char_start,
            header_char_end: hit.char_end,
            span_end,
        }
    }

    /// Byte range covered by the span
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.header_char_start..self.span_end
    }

    /// Byte range of the header text
    #[must_use]
    pub const fn header_range(&self) -> Range<usize> {
        self.header_char_start..self.header_char_end
    }

    /// Number of bytes covered
    #[must_use]
    pub const fn len(&self) -> usize {
        self.span_end.saturating_sub(self.header_char_start)
    }

    /// Check if the span covers no text
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slice the span's text out of the note it was computed from
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.range()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_macro_section_labels_round_trip() {
        for section in MacroSection::DIVISIONS {
            assert_eq!(section.as_str().parse::<MacroSection>(), Ok(section));
        }
        assert_eq!("default".parse::<MacroSection>(), Ok(MacroSection::Default));
        assert!("history".parse::<MacroSection>().is_err());
    }

    #[test]
    fn test_macro_section_serializes_snake_case() {
        let json = serde_json::to_string(&MacroSection::AssessmentAndPlan).unwrap();
        assert_eq!(json, "\"assessment_and_plan\"");
    }

    #[test]
    fn test_span_slice_and_ranges() {
        let text = "PE: normal\nPlan: rest";
        let span = SectionSpan::from_hit(
            MacroSection::ObjectiveExam,
            SubsectionHit::new("pe", 0, 0, 3),
            11,
        );
        assert_eq!(span.slice(text), "PE: normal\n");
        assert_eq!(&text[span.header_range()], "PE:");
        assert_eq!(span.len(), 11);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_slice_out_of_bounds_is_empty() {
        let span = SectionSpan::from_hit(
            MacroSection::Subjective,
            SubsectionHit::unheaded(),
            40,
        );
        assert_eq!(span.slice("short"), "");
    }
}
