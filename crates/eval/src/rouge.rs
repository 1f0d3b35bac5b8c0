//! Lexical overlap (ROUGE) scoring.

use crate::error::{EvalError, Result};
use crate::scorer::{ScoreColumns, Scorer};
use std::collections::{BTreeSet, HashMap};

/// Score keys reported by [`LexicalOverlapScorer`]
pub const ROUGE_KEYS: [&str; 4] = ["rouge1", "rouge2", "rougeL", "rougeLsum"];

/// Precision, recall and F-measure of one comparison
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlapScore {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl OverlapScore {
    fn new(precision: f64, recall: f64) -> Self {
        let fmeasure = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            fmeasure,
        }
    }
}

/// ROUGE-1/2/L/Lsum F-measures per instance
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlapScorer;

impl LexicalOverlapScorer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// All four scores of one pair, in [`ROUGE_KEYS`] order
    #[must_use]
    pub fn score_pair(reference: &str, prediction: &str) -> [OverlapScore; 4] {
        let ref_tokens = tokenize(reference);
        let pred_tokens = tokenize(prediction);
        [
            ngram_overlap(&ref_tokens, &pred_tokens, 1),
            ngram_overlap(&ref_tokens, &pred_tokens, 2),
            lcs_overlap(&ref_tokens, &pred_tokens),
            summary_lcs_overlap(reference, prediction),
        ]
    }
}

impl Scorer for LexicalOverlapScorer {
    fn name(&self) -> &str {
        "rouge"
    }

    fn score(&self, references: &[String], predictions: &[String]) -> Result<ScoreColumns> {
        if references.len() != predictions.len() {
            return Err(EvalError::scorer(
                self.name(),
                format!(
                    "{} references but {} predictions",
                    references.len(),
                    predictions.len()
                ),
            ));
        }

        let mut values: [Vec<f64>; 4] = Default::default();
        for (reference, prediction) in references.iter().zip(predictions) {
            for (column, score) in values
                .iter_mut()
                .zip(Self::score_pair(reference, prediction))
            {
                column.push(score.fmeasure);
            }
        }

        let mut columns = ScoreColumns::new();
        for (key, column) in ROUGE_KEYS.iter().zip(values) {
            columns.insert(*key, column);
        }
        Ok(columns)
    }
}

/// Lowercase, then split on every run of characters outside `[a-z0-9]`
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

fn ngram_overlap(reference: &[String], prediction: &[String], n: usize) -> OverlapScore {
    let ref_counts = ngram_counts(reference, n);
    let pred_counts = ngram_counts(prediction, n);

    let hits: usize = ref_counts
        .iter()
        .map(|(gram, count)| (*count).min(pred_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let ref_total: usize = ref_counts.values().sum();
    let pred_total: usize = pred_counts.values().sum();

    OverlapScore::new(
        hits as f64 / pred_total.max(1) as f64,
        hits as f64 / ref_total.max(1) as f64,
    )
}

fn lcs_table(reference: &[String], prediction: &[String]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; prediction.len() + 1]; reference.len() + 1];
    for i in 1..=reference.len() {
        for j in 1..=prediction.len() {
            table[i][j] = if reference[i - 1] == prediction[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

fn lcs_overlap(reference: &[String], prediction: &[String]) -> OverlapScore {
    if reference.is_empty() || prediction.is_empty() {
        return OverlapScore::default();
    }
    let table = lcs_table(reference, prediction);
    let lcs = table[reference.len()][prediction.len()] as f64;
    OverlapScore::new(lcs / prediction.len() as f64, lcs / reference.len() as f64)
}

/// Reference positions on one longest common subsequence
fn lcs_indices(reference: &[String], prediction: &[String]) -> Vec<usize> {
    let table = lcs_table(reference, prediction);
    let (mut i, mut j) = (reference.len(), prediction.len());
    let mut indices = Vec::new();
    while i > 0 && j > 0 {
        if reference[i - 1] == prediction[j - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    indices.reverse();
    indices
}

/// Summary-level LCS over newline-separated sentences (union LCS per reference sentence)
fn summary_lcs_overlap(reference: &str, prediction: &str) -> OverlapScore {
    let ref_sentences: Vec<Vec<String>> = reference.split('\n').map(tokenize).collect();
    let pred_sentences: Vec<Vec<String>> = prediction.split('\n').map(tokenize).collect();

    let ref_total: usize = ref_sentences.iter().map(Vec::len).sum();
    let pred_total: usize = pred_sentences.iter().map(Vec::len).sum();
    if ref_total == 0 || pred_total == 0 {
        return OverlapScore::default();
    }

    let mut ref_budget: HashMap<&str, usize> = HashMap::new();
    for token in ref_sentences.iter().flatten() {
        *ref_budget.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut pred_budget: HashMap<&str, usize> = HashMap::new();
    for token in pred_sentences.iter().flatten() {
        *pred_budget.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0usize;
    for sentence in &ref_sentences {
        let union: BTreeSet<usize> = pred_sentences
            .iter()
            .flat_map(|candidate| lcs_indices(sentence, candidate))
            .collect();
        for index in union {
            let token = sentence[index].as_str();
            let (Some(r), Some(p)) = (ref_budget.get_mut(token), pred_budget.get_mut(token)) else {
                continue;
            };
            if *r > 0 && *p > 0 {
                *r -= 1;
                *p -= 1;
                hits += 1;
            }
        }
    }

    OverlapScore::new(
        hits as f64 / pred_total as f64,
        hits as f64 / ref_total as f64,
    )
}
