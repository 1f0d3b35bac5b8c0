use crate::patterns::SubsectionToMacro;
use crate::types::{SectionSpan, SubsectionHit};
use std::collections::BTreeMap;

/// Turn per-line winning hits into a contiguous span sequence.
///
/// A header on line 0 opens the first span; otherwise the note opens with an unheaded
/// `default` span at offset 0. Each later header closes the active span at the start of
/// its own line, and the last span runs to the end of the note.
pub(crate) fn assemble_sections(
    text: &str,
    winners: &BTreeMap<usize, SubsectionHit>,
    mapping: &SubsectionToMacro,
) -> Vec<SectionSpan> {
    let mut active = winners
        .get(&0)
        .cloned()
        .unwrap_or_else(SubsectionHit::unheaded);
    let mut spans = Vec::with_capacity(winners.len() + 1);

    for hit in winners.range(1..).map(|(_, hit)| hit) {
        // char_start of a hit is the offset of its line
        let line_start = hit.char_start;
        let closed = std::mem::replace(&mut active, hit.clone());
        spans.push(close(closed, line_start, mapping));
    }

    spans.push(close(active, text.len(), mapping));
    spans
}

fn close(hit: SubsectionHit, span_end: usize, mapping: &SubsectionToMacro) -> SectionSpan {
    let macro_section = mapping.resolve(&hit.subsection);
    SectionSpan::from_hit(macro_section, hit, span_end)
}
