use anyhow::Result;
use note_section_tagger::SectionSpan;
use serde::Serialize;
use std::fmt::Write;

/// Brat standoff: one text-bound header annotation and one type attribute per span
pub fn brat(text: &str, spans: &[SectionSpan]) -> String {
    let mut out = String::new();
    for (id, span) in spans.iter().enumerate() {
        let header = text.get(span.header_range()).unwrap_or_default();
        let _ = writeln!(
            out,
            "T{id}\tSECTIONHEADER {} {}\t{header}",
            span.header_char_start, span.header_char_end
        );
        let _ = writeln!(out, "A{id}\tType T{id} {}", span.subsection);
    }
    out
}

pub fn spans_json(spans: &[SectionSpan]) -> Result<String> {
    Ok(serde_json::to_string_pretty(spans)?)
}

#[derive(Serialize)]
struct Division<'a> {
    #[serde(flatten)]
    span: &'a SectionSpan,
    text: &'a str,
}

/// Reduced spans with the text each one covers
pub fn divisions_json(text: &str, spans: &[SectionSpan]) -> Result<String> {
    let divisions: Vec<Division<'_>> = spans
        .iter()
        .map(|span| Division {
            span,
            text: span.slice(text),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&divisions)?)
}
