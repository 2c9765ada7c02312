use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::analysis::download;
use crate::similarity::DEFAULT_NEIGHBORS;

/// Which embedder to construct at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedderBackend {
    /// Local ONNX all-MiniLM-L6-v2 (default)
    Onnx,
    /// Hashed bag of words, no model files needed
    Hashing,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Persisted similarity index (DOCSORT_INDEX_PATH)
    pub index_path: PathBuf,
    /// Root of the per-category folders (DOCSORT_OUTPUT_DIR)
    pub output_dir: PathBuf,
    /// Directory containing the ONNX model files (DOCSORT_MODEL_DIR)
    pub model_dir: PathBuf,
    /// Optional JSON rule file replacing the built-in lexicon (DOCSORT_LEXICON_PATH)
    pub lexicon_path: Option<PathBuf>,
    pub embedder_backend: EmbedderBackend,
    /// Neighbors per document in reports (DOCSORT_NEIGHBORS)
    pub neighbors: usize,
    /// Documents analyzed in parallel (DOCSORT_CONCURRENCY)
    pub concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables. Everything has a default.
    pub fn load() -> Result<Self> {
        let embedder_backend = match env::var("DOCSORT_EMBEDDER").as_deref() {
            Ok("hashing") => EmbedderBackend::Hashing,
            // "onnx" or unset both default to ONNX
            _ => EmbedderBackend::Onnx,
        };

        let model_dir = env::var("DOCSORT_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        Ok(Self {
            index_path: env::var("DOCSORT_INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./document_index.json")),
            output_dir: env::var("DOCSORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./classified_docs")),
            model_dir,
            lexicon_path: env::var("DOCSORT_LEXICON_PATH").ok().map(PathBuf::from),
            embedder_backend,
            neighbors: parse_count("DOCSORT_NEIGHBORS", DEFAULT_NEIGHBORS)?,
            concurrency: parse_count("DOCSORT_CONCURRENCY", 4)?,
        })
    }

    /// Validate that the chosen embedder has what it needs.
    pub fn require_embedder(&self) -> Result<()> {
        match self.embedder_backend {
            EmbedderBackend::Onnx => {
                if !download::embedding_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "Embedding model files not found in {}\n\
                         Run `docsort download-model` to download them.\n\
                         Or set DOCSORT_EMBEDDER=hashing to run without a model.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            EmbedderBackend::Hashing => Ok(()),
        }
    }
}

/// Positive integer from an env var, or `default` when unset.
fn parse_count(var: &str, default: usize) -> Result<usize> {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => anyhow::bail!("{var} must be a positive integer, got {raw:?}"),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_default_when_unset() {
        assert_eq!(parse_count("DOCSORT_TEST_UNSET_COUNT", 7).unwrap(), 7);
    }

    #[test]
    fn test_parse_count_rejects_zero_and_garbage() {
        env::set_var("DOCSORT_TEST_ZERO_COUNT", "0");
        assert!(parse_count("DOCSORT_TEST_ZERO_COUNT", 3).is_err());
        env::set_var("DOCSORT_TEST_BAD_COUNT", "three");
        assert!(parse_count("DOCSORT_TEST_BAD_COUNT", 3).is_err());
        env::set_var("DOCSORT_TEST_GOOD_COUNT", " 5 ");
        assert_eq!(parse_count("DOCSORT_TEST_GOOD_COUNT", 3).unwrap(), 5);
    }
}
