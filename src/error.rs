// Error taxonomy for the classification and indexing core.
//
// Library code returns these typed errors up to the per-document loop in
// `pipeline::batch`, which alone decides whether a failure skips one
// document or aborts the run. Application plumbing (config, CLI, model
// loading) stays on anyhow.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the vector index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("vector dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector {position} in the batch has a NaN or infinite component")]
    NonFiniteVector { position: usize },

    #[error("cannot add an empty batch to the index")]
    EmptyBatch,

    #[error("vectors must have at least one dimension")]
    ZeroDimension,

    #[error("index file is corrupt: {0}")]
    Corrupt(String),

    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures from the extractor or embedder collaborators.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("term extraction failed: {0}")]
    Extractor(String),

    #[error("embedding failed: {0}")]
    Embedder(String),

    #[error("embedder returned an empty vector")]
    EmptyEmbedding,

    #[error("analysis task aborted: {0}")]
    Aborted(String),
}

/// A per-document failure. The batch loop logs these and moves on.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not extract text from {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not analyze {}: {source}", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        source: AnalysisError,
    },
}

impl DocumentError {
    /// The source document this failure belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            DocumentError::Extraction { path, .. } | DocumentError::Analysis { path, .. } => path,
        }
    }
}
