use crate::error::{Result, TaggerError};
use crate::patterns::SubsectionSpec;
use crate::types::MacroSection;
use regex::{Regex, RegexBuilder};

const COLON_GROUP: &str = "colon";
const BARE_GROUP: &str = "bare";

/// Line matcher for one subsection.
///
/// A line matches when, after leading whitespace, it starts with one of the phrasings
/// (anything may follow), or when the phrasing ends in a colon and its colon-less form
/// is the whole remaining line. The first form is always tried first.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    subsection: String,
    macro_section: MacroSection,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile all phrasings of a subsection into one case-insensitive pattern
    pub fn compile(macro_section: MacroSection, spec: &SubsectionSpec) -> Result<Self> {
        let pattern = build_pattern(&spec.phrasings);
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| TaggerError::PatternCompile {
                subsection: spec.name.clone(),
                source,
            })?;

        Ok(Self {
            subsection: spec.name.clone(),
            macro_section,
            regex,
        })
    }

    #[must_use]
    pub fn subsection(&self) -> &str {
        &self.subsection
    }

    #[must_use]
    pub const fn macro_section(&self) -> MacroSection {
        self.macro_section
    }

    /// Source of the compiled expression
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// End of the header text within `line`, if the line opens this subsection
    #[must_use]
    pub fn match_header(&self, line: &str) -> Option<usize> {
        let caps = self.regex.captures(line)?;
        caps.name(COLON_GROUP)
            .or_else(|| caps.name(BARE_GROUP))
            .map(|m| m.end())
    }
}

/// Matcher for the uppercase-only `IMPRESSION` header
#[derive(Debug, Clone)]
pub(crate) struct ImpressionPattern {
    regex: Regex,
}

impl ImpressionPattern {
    pub(crate) fn compile() -> Result<Self> {
        let regex = Regex::new(r"^\s*IMPRESSION").map_err(|source| TaggerError::PatternCompile {
            subsection: crate::types::IMPRESSION_SUBSECTION.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub(crate) fn match_header(&self, line: &str) -> Option<usize> {
        self.regex.find(line).map(|m| m.end())
    }
}

/// Escape a phrasing, letting every literal space stand for any run of whitespace
fn phrasing_expression(phrasing: &str) -> String {
    phrasing
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*")
}

fn build_pattern(phrasings: &[String]) -> String {
    let colon_forms: Vec<String> = phrasings
        .iter()
        .map(|p| format!("(?:{})", phrasing_expression(p)))
        .collect();
    let bare_forms: Vec<String> = phrasings
        .iter()
        .filter_map(|p| p.strip_suffix(':'))
        .map(|p| format!("(?:{})", phrasing_expression(p)))
        .collect();

    let colon = format!(r"\s*(?P<{COLON_GROUP}>{}).*", colon_forms.join("|"));
    if bare_forms.is_empty() {
        return format!("^{colon}");
    }

    let bare = format!(r"\s*(?P<{BARE_GROUP}>{})\s*$", bare_forms.join("|"));
    format!("^(?:{colon}|{bare})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(phrasings: &[&str]) -> CompiledPattern {
        let spec = SubsectionSpec::new("test", phrasings.iter().copied());
        CompiledPattern::compile(MacroSection::Subjective, &spec).unwrap()
    }

    #[test]
    fn test_spaces_become_flexible_whitespace() {
        assert_eq!(phrasing_expression("a / p :"), r"a\s*/\s*p\s*:");
        let pattern = compile(&["a / p :"]);
        assert_eq!(pattern.match_header("a/p: stable"), Some(4));
        assert_eq!(pattern.match_header("A  /  P : stable"), Some(9));
    }

    #[test]
    fn test_colon_form_matches_anywhere_after_leading_whitespace() {
        let pattern = compile(&["physical exam :"]);
        assert_eq!(pattern.match_header("   Physical Exam: normal"), Some(17));
        assert_eq!(pattern.match_header("PHYSICAL EXAM:"), Some(14));
        assert_eq!(pattern.match_header("on physical exam: normal"), None);
    }

    #[test]
    fn test_bare_form_requires_whole_line() {
        let pattern = compile(&["physical exam :"]);
        assert_eq!(pattern.match_header("Physical Exam"), Some(13));
        assert_eq!(pattern.match_header("  physical exam  \t"), Some(18));
        assert_eq!(pattern.match_header("Physical exam was normal"), None);
    }

    #[test]
    fn test_no_bare_form_without_trailing_colon() {
        let pattern = compile(&["summary plan"]);
        assert!(!pattern.as_str().contains(BARE_GROUP));
        assert_eq!(pattern.match_header("summary plan follows"), Some(12));
    }

    #[test]
    fn test_colon_form_attempted_first() {
        let pattern = compile(&["hpi :", "hpi"]);
        assert_eq!(pattern.match_header("HPI: 3 days"), Some(4));
        assert_eq!(pattern.match_header("HPI notes: 3 days"), Some(3));
        assert_eq!(pattern.match_header("hpi"), Some(3));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let pattern = compile(&["assessment & plan :", "plan (a+b) :"]);
        assert_eq!(pattern.match_header("Assessment & Plan: ok"), Some(18));
        assert_eq!(pattern.match_header("plan (a+b): ok"), Some(11));
        assert_eq!(pattern.match_header("plan aab: ok"), None);
    }

    #[test]
    fn test_short_phrasings() {
        let pattern = compile(&["a:"]);
        assert_eq!(pattern.match_header("A: viral"), Some(2));
        assert_eq!(pattern.match_header("a"), Some(1));
        assert_eq!(pattern.match_header("and then"), None);
    }

    #[test]
    fn test_impression_is_case_sensitive() {
        let pattern = ImpressionPattern::compile().unwrap();
        assert_eq!(pattern.match_header("  IMPRESSION: pneumonia"), Some(12));
        assert_eq!(pattern.match_header("Impression: pneumonia"), None);
        assert_eq!(pattern.match_header("impression"), None);
    }
}
