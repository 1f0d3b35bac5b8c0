//! Line scanning and same-line conflict resolution.

use crate::compiler::{CompiledPattern, ImpressionPattern};
use crate::types::{SubsectionHit, IMPRESSION_SUBSECTION};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// One line of a note with its absolute starting offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub number: usize,
    pub offset: usize,
    pub text: &'a str,
}

/// Split on `\n` only, tracking where each line starts.
///
/// An empty note still has one (empty) line, and a trailing newline yields a final empty line.
pub(crate) fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.split('\n')
        .enumerate()
        .scan(0usize, |offset, (number, line)| {
            let start = *offset;
            *offset += line.len() + 1;
            Some(Line {
                number,
                offset: start,
                text: line,
            })
        })
}

/// Tests every subsection pattern against every line, in table order
pub(crate) struct LineScanner<'t> {
    patterns: &'t [CompiledPattern],
    impression: &'t ImpressionPattern,
}

impl<'t> LineScanner<'t> {
    pub(crate) const fn new(patterns: &'t [CompiledPattern], impression: &'t ImpressionPattern) -> Self {
        Self {
            patterns,
            impression,
        }
    }

    /// All header hits in the note, unresolved
    pub(crate) fn scan(&self, text: &str) -> Vec<SubsectionHit> {
        let mut hits = Vec::new();
        for line in lines(text) {
            self.scan_line(line, &mut hits);
        }
        hits
    }

    /// Push the hits of one line: table patterns first, then the IMPRESSION special case
    fn scan_line(&self, line: Line<'_>, hits: &mut Vec<SubsectionHit>) {
        for pattern in self.patterns {
            if let Some(end) = pattern.match_header(line.text) {
                hits.push(SubsectionHit::new(
                    pattern.subsection(),
                    line.number,
                    line.offset,
                    line.offset + end,
                ));
            }
        }

        if let Some(end) = self.impression.match_header(line.text) {
            hits.push(SubsectionHit::new(
                IMPRESSION_SUBSECTION,
                line.number,
                line.offset,
                line.offset + end,
            ));
        }
    }
}

/// Keep a single hit per line: the first one in evaluation order.
///
/// Hits must arrive in scan order (table order, then `impression`) for the earlier
/// declared subsection to win.
pub fn resolve_line_conflicts<I>(hits: I) -> BTreeMap<usize, SubsectionHit>
where
    I: IntoIterator<Item = SubsectionHit>,
{
    let mut winners: BTreeMap<usize, SubsectionHit> = BTreeMap::new();
    for hit in hits {
        match winners.entry(hit.line) {
            Entry::Vacant(slot) => {
                slot.insert(hit);
            }
            Entry::Occupied(slot) => {
                log::debug!(
                    "line {}: '{}' matched after '{}', keeping '{}'",
                    hit.line,
                    hit.subsection,
                    slot.get().subsection,
                    slot.get().subsection
                );
            }
        }
    }
    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternTable;
    use pretty_assertions::assert_eq;

    fn compiled(table: &PatternTable) -> Vec<CompiledPattern> {
        table
            .entries()
            .map(|(section, spec)| CompiledPattern::compile(section, spec).unwrap())
            .collect()
    }

    #[test]
    fn test_lines_track_offsets() {
        let collected: Vec<(usize, usize, &str)> = lines("ab\n\ncde\n")
            .map(|line| (line.number, line.offset, line.text))
            .collect();
        assert_eq!(
            collected,
            vec![(0, 0, "ab"), (1, 3, ""), (2, 4, "cde"), (3, 8, "")]
        );
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let collected: Vec<Line<'_>> = lines("").collect();
        assert_eq!(
            collected,
            vec![Line {
                number: 0,
                offset: 0,
                text: ""
            }]
        );
    }

    #[test]
    fn test_scan_reports_every_match_in_table_order() {
        let table = PatternTable::builtin();
        let patterns = compiled(&table);
        let impression = ImpressionPattern::compile().unwrap();
        let scanner = LineScanner::new(&patterns, &impression);

        // "Assessment and Plan:" does not satisfy "assessment :", so ap is the only hit.
        let hits = scanner.scan("Assessment and Plan: rest\nAssessment: viral");
        assert_eq!(
            hits,
            vec![
                SubsectionHit::new("ap", 0, 0, 20),
                SubsectionHit::new("assessment", 1, 26, 37),
            ]
        );
    }

    #[test]
    fn test_scan_records_impression_after_table_hits() {
        let table = PatternTable::builder()
            .section(crate::types::MacroSection::ObjectiveResults)
            .subsection("imaging", ["impression :"])
            .build()
            .unwrap();
        let patterns = compiled(&table);
        let impression = ImpressionPattern::compile().unwrap();
        let scanner = LineScanner::new(&patterns, &impression);

        let hits = scanner.scan("IMPRESSION: clear");
        assert_eq!(
            hits,
            vec![
                SubsectionHit::new("imaging", 0, 0, 11),
                SubsectionHit::new("impression", 0, 0, 10),
            ]
        );

        let winners = resolve_line_conflicts(hits);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[&0].subsection, "imaging");
    }

    #[test]
    fn test_resolve_keeps_first_hit_per_line() {
        let hits = vec![
            SubsectionHit::new("cc", 0, 0, 3),
            SubsectionHit::new("hpi", 0, 0, 4),
            SubsectionHit::new("plan", 2, 10, 15),
            SubsectionHit::new("impression", 2, 10, 20),
        ];
        let winners = resolve_line_conflicts(hits);

        let kept: Vec<(usize, &str)> = winners
            .iter()
            .map(|(line, hit)| (*line, hit.subsection.as_str()))
            .collect();
        assert_eq!(kept, vec![(0, "cc"), (2, "plan")]);
    }
}
