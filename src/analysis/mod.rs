//! Text analysis backends.
//!
//! Both backends answer the same question: given one message's text, which
//! phrases deserve a second look? The pipeline holds a `dyn TextAnalyzer`
//! and does not care which implementation is wired in:
//! - [`LexiconAnalyzer`] — built-in rule tables, no I/O
//! - [`PresetApiAnalyzer`] — remote HTTP service with named rule presets

pub mod lexicon;
pub mod preset;

pub use lexicon::LexiconAnalyzer;
pub use preset::PresetApiAnalyzer;

use async_trait::async_trait;

use crate::error::AnalysisError;

/// A single flagged phrase in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Stable identifier of the rule that matched (e.g. "he-she").
    pub rule_id: String,
    /// Human-readable advice, quoted verbatim in the advisory.
    pub message: String,
    /// Which sub-check or preset produced the finding, when known.
    pub source: Option<String>,
}

/// Uniform entry point for text analysis.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Backend name for logs (e.g. "lexicon").
    fn name(&self) -> &str;

    /// Analyze one message's text and return every finding, in the order
    /// the flagged phrases appear in the text.
    async fn analyze(&self, text: &str) -> Result<Vec<Finding>, AnalysisError>;
}
