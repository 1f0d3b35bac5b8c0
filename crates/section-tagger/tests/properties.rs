//! Property-based checks of the span sequences produced for arbitrary notes.

use note_section_tagger::{MacroSection, SectionSpan, SectionTagger};
use proptest::prelude::*;
use std::collections::HashSet;

fn tagger() -> SectionTagger {
    SectionTagger::with_builtin_table().expect("builtin table compiles")
}

/// Lines mixing real headers, near-misses and free text
fn note_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CC: cough".to_string()),
        Just("Chief Complaint".to_string()),
        Just("HPI".to_string()),
        Just("history of present illness: 3 days".to_string()),
        Just("  review of systems :".to_string()),
        Just("PHYSICAL EXAM".to_string()),
        Just("Exam: normal".to_string()),
        Just("RESULTS:".to_string()),
        Just("IMPRESSION".to_string()),
        Just("impression: lowercase".to_string()),
        Just("A/P: rest".to_string()),
        Just("Plan : fluids".to_string()),
        Just("a".to_string()),
        Just(String::new()),
        "[a-zA-Z0-9 ,.:/&é]{0,30}",
    ]
}

fn note_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(note_line_strategy(), 0..12).prop_map(|lines| lines.join("\n"))
}

fn assert_contiguous(spans: &[SectionSpan], text_len: usize) {
    assert!(!spans.is_empty(), "every note yields at least one span");
    assert_eq!(spans[0].header_char_start, 0);
    for pair in spans.windows(2) {
        assert_eq!(pair[0].span_end, pair[1].header_char_start);
    }
    assert_eq!(spans.last().map(|s| s.span_end), Some(text_len));
}

proptest! {
    #[test]
    fn full_sequence_is_contiguous(note in note_strategy()) {
        let spans = tagger().tag_sections(&note);
        assert_contiguous(&spans, note.len());
    }

    #[test]
    fn reduced_sequence_is_contiguous_and_covers_note(note in note_strategy()) {
        let spans = tagger().divide_note_by_metasections(&note);
        assert_contiguous(&spans, note.len());

        let rebuilt: String = spans.iter().map(|span| span.slice(&note)).collect();
        prop_assert_eq!(rebuilt, note);
    }

    #[test]
    fn reduced_sequence_has_one_span_per_division(note in note_strategy()) {
        let spans = tagger().divide_note_by_metasections(&note);
        let mut seen = HashSet::new();
        for span in &spans {
            prop_assert!(span.macro_section != MacroSection::Default);
            prop_assert!(seen.insert(span.macro_section), "duplicate {}", span.macro_section);
        }
        prop_assert!(spans.len() <= 4);
    }

    #[test]
    fn reduced_sequence_is_in_document_order(note in note_strategy()) {
        let spans = tagger().divide_note_by_metasections(&note);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].header_char_start < pair[1].header_char_start);
        }
    }

    #[test]
    fn reduction_is_idempotent_on_rejoined_text(note in note_strategy()) {
        let tagger = tagger();
        let first = tagger.divide_note_by_metasections(&note);
        let rejoined: String = first.iter().map(|span| span.slice(&note)).collect();
        let second = tagger.divide_note_by_metasections(&rejoined);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arbitrary_text_never_panics(note in "\\PC{0,200}") {
        let spans = tagger().divide_note_by_metasections(&note);
        assert_contiguous(&spans, note.len());
    }
}
