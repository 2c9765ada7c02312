// Collaborator traits: the swap-ready seams of the analyzer.
//
// The analyzer never loads models itself. Callers construct one extractor
// and one embedder at startup and pass them in by reference, so model
// initialization happens once per process with no global state.

use crate::error::AnalysisError;

/// Output of a term extractor: candidate terms (repeats allowed, so
/// frequencies can be counted) and the text split into sentences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub terms: Vec<String>,
    pub sentences: Vec<String>,
}

/// Produces candidate terms (entities / noun phrases) and sentences from text.
pub trait TermExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Extraction, AnalysisError>;
}

/// Maps text to one fixed-length embedding vector.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, AnalysisError>;

    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;
}
