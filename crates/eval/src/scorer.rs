use crate::error::Result;

/// Per-instance score columns, in the order the scorer reports them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreColumns {
    columns: Vec<(String, Vec<f64>)>,
}

impl ScoreColumns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, replacing any column with the same key in place
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<f64>) {
        let key = key.into();
        if let Some(slot) = self.columns.iter_mut().find(|(k, _)| *k == key) {
            log::warn!("score key '{key}' reported twice, keeping the latest values");
            slot.1 = values;
        } else {
            self.columns.push((key, values));
        }
    }

    /// Append every column of `other`
    pub fn extend(&mut self, other: Self) {
        for (key, values) in other.columns {
            self.insert(key, values);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A metric computed for every (reference, prediction) pair.
///
/// Implementations return one value per instance for each of their keys. Learned
/// similarity metrics live outside this crate and plug in through this trait.
pub trait Scorer: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Score aligned reference/prediction lists
    fn score(&self, references: &[String], predictions: &[String]) -> Result<ScoreColumns>;
}
