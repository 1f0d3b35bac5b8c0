use thiserror::Error;

/// Result type for tagger construction
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Errors raised while building a pattern table or compiling it.
///
/// Tagging itself never fails: any note text yields a valid segmentation.
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Subsection declared without a name
    #[error("Subsection name must not be empty")]
    EmptySubsectionName,

    /// Same subsection declared twice
    #[error("Duplicate subsection: {0}")]
    DuplicateSubsection(String),

    /// Name clashes with a synthetic subsection
    #[error("Subsection name '{0}' is reserved")]
    ReservedSubsection(String),

    /// Subsection has no phrasings to match
    #[error("Subsection '{0}' has no phrasings")]
    NoPhrasings(String),

    /// Blank phrasing would match every line
    #[error("Subsection '{subsection}' has a blank phrasing at position {index}")]
    BlankPhrasing { subsection: String, index: usize },

    /// Subsection parented to the placeholder macro-section
    #[error("Subsection '{0}' cannot belong to the default macro-section")]
    DefaultParent(String),

    /// Subsection declared before any macro-section
    #[error("Subsection '{0}' declared before any macro-section")]
    MissingParent(String),

    /// Pattern failed to compile
    #[error("Failed to compile pattern for subsection '{subsection}': {source}")]
    PatternCompile {
        subsection: String,
        #[source]
        source: regex::Error,
    },

    /// Lexicon file could not be decoded
    #[error("Invalid lexicon: {0}")]
    InvalidLexicon(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TaggerError {
    /// Create an invalid lexicon error
    pub fn invalid_lexicon(msg: impl Into<String>) -> Self {
        Self::InvalidLexicon(msg.into())
    }
}
