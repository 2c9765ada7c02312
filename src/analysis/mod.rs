// Document analysis: keyword scoring, term extraction, and embeddings.

pub mod analyzer;
pub mod category;
pub mod download;
pub mod embeddings;
pub mod extractor;
pub mod lexicon;
pub mod traits;
