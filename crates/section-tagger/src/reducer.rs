use crate::types::{MacroSection, SectionSpan};

/// Collapse a full span sequence to at most one span per macro-section.
///
/// Leading unheaded text is relabelled `subjective`. For each division the first span
/// wins; later duplicates and leftover `default` spans are dropped and their text is
/// absorbed by the preceding kept span. The result is in document order, contiguous,
/// and ends at `text_len`.
#[must_use]
pub fn reduce_to_meta_sections(mut spans: Vec<SectionSpan>, text_len: usize) -> Vec<SectionSpan> {
    if let Some(first) = spans.first_mut() {
        if first.macro_section.is_default() {
            first.macro_section = MacroSection::Subjective;
        }
    }

    let mut kept: Vec<SectionSpan> = MacroSection::DIVISIONS
        .iter()
        .filter_map(|division| spans.iter().find(|span| span.macro_section == *division))
        .cloned()
        .collect();

    kept.sort_by_key(|span| span.header_char_start);

    let starts: Vec<usize> = kept.iter().skip(1).map(|span| span.header_char_start).collect();
    for (span, next_start) in kept.iter_mut().zip(starts) {
        span.span_end = next_start;
    }
    if let Some(last) = kept.last_mut() {
        last.span_end = text_len;
    }

    log::debug!(
        "reduced {} spans to {} meta-sections",
        spans.len(),
        kept.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubsectionHit;
    use pretty_assertions::assert_eq;

    fn span(section: MacroSection, name: &str, start: usize, end: usize) -> SectionSpan {
        SectionSpan::from_hit(section, SubsectionHit::new(name, 0, start, start), end)
    }

    fn summary(spans: &[SectionSpan]) -> Vec<(MacroSection, &str, usize, usize)> {
        spans
            .iter()
            .map(|s| (s.macro_section, s.subsection.as_str(), s.header_char_start, s.span_end))
            .collect()
    }

    #[test]
    fn test_leading_default_becomes_subjective() {
        let reduced = reduce_to_meta_sections(vec![span(MacroSection::Default, "default", 0, 25)], 25);
        assert_eq!(
            summary(&reduced),
            vec![(MacroSection::Subjective, "default", 0, 25)]
        );
    }

    #[test]
    fn test_duplicates_are_absorbed_by_previous_kept_span() {
        let spans = vec![
            span(MacroSection::Subjective, "cc", 0, 10),
            span(MacroSection::Subjective, "hpi", 10, 22),
            span(MacroSection::ObjectiveExam, "pe", 22, 33),
            span(MacroSection::AssessmentAndPlan, "assessment", 33, 51),
            span(MacroSection::AssessmentAndPlan, "plan", 51, 61),
        ];
        let reduced = reduce_to_meta_sections(spans, 61);
        assert_eq!(
            summary(&reduced),
            vec![
                (MacroSection::Subjective, "cc", 0, 22),
                (MacroSection::ObjectiveExam, "pe", 22, 33),
                (MacroSection::AssessmentAndPlan, "assessment", 33, 61),
            ]
        );
    }

    #[test]
    fn test_priority_selection_is_reordered_by_appearance() {
        let spans = vec![
            span(MacroSection::AssessmentAndPlan, "plan", 0, 5),
            span(MacroSection::Subjective, "hpi", 5, 12),
            span(MacroSection::AssessmentAndPlan, "ap", 12, 20),
            span(MacroSection::ObjectiveResults, "findings", 20, 30),
        ];
        let reduced = reduce_to_meta_sections(spans, 30);
        assert_eq!(
            summary(&reduced),
            vec![
                (MacroSection::AssessmentAndPlan, "plan", 0, 5),
                (MacroSection::Subjective, "hpi", 5, 20),
                (MacroSection::ObjectiveResults, "findings", 20, 30),
            ]
        );
    }

    #[test]
    fn test_default_span_after_first_is_dropped() {
        let spans = vec![
            span(MacroSection::ObjectiveExam, "pe", 0, 4),
            span(MacroSection::Default, "default", 4, 9),
        ];
        let reduced = reduce_to_meta_sections(spans, 9);
        assert_eq!(
            summary(&reduced),
            vec![(MacroSection::ObjectiveExam, "pe", 0, 9)]
        );
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert!(reduce_to_meta_sections(Vec::new(), 0).is_empty());
    }
}
