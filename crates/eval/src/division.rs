//! Per-division slicing of encoded notes.

use note_section_tagger::{MacroSection, SectionTagger};
use std::collections::BTreeMap;

/// Newline stand-in used when notes travel through single-line CSV cells
pub const LINE_FEED_PLACEHOLDER: &str = "__lf1__";

/// Scored in place of a division the tagger did not find
pub const EMPTY_SECTION_MARKER: &str = "#####EMPTY#####";

/// Divisions scored separately, in report order
pub const SECTION_DIVISIONS: [MacroSection; 4] = MacroSection::DIVISIONS;

#[must_use]
pub fn decode_line_feeds(text: &str) -> String {
    text.replace(LINE_FEED_PLACEHOLDER, "\n")
}

#[must_use]
pub fn encode_line_feeds(text: &str) -> String {
    text.replace('\n', LINE_FEED_PLACEHOLDER)
}

/// Text of each division found in one note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDivisions {
    slices: BTreeMap<MacroSection, String>,
}

impl SectionDivisions {
    /// Encoded text of a division, if the tagger found it
    #[must_use]
    pub fn get(&self, division: MacroSection) -> Option<&str> {
        self.slices.get(&division).map(String::as_str)
    }

    /// Encoded text of a division, or the empty marker
    #[must_use]
    pub fn get_or_marker(&self, division: MacroSection) -> &str {
        self.get(division).unwrap_or(EMPTY_SECTION_MARKER)
    }

    /// Number of divisions found
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Decode `encoded`, divide it into meta-sections and re-encode each slice
#[must_use]
pub fn divide_into_divisions(tagger: &SectionTagger, encoded: &str) -> SectionDivisions {
    let text = decode_line_feeds(encoded);
    let slices = tagger
        .divide_note_by_metasections(&text)
        .into_iter()
        .filter(|span| !span.macro_section.is_default())
        .map(|span| (span.macro_section, encode_line_feeds(span.slice(&text))))
        .collect();
    SectionDivisions { slices }
}
