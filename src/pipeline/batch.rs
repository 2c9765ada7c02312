// Batch classification pipeline.
//
// 1. Extract and analyze every document in parallel (CPU-bound work runs on
//    the blocking pool, `concurrency` at a time)
// 2. Optionally move each classified file into its category folder
// 3. Add all embeddings to the index as one batch and checkpoint it
// 4. Query the updated index for each document's nearest neighbors
//
// A document that fails extraction or analysis is logged and skipped; the
// rest of the batch carries on. A batch the index rejects (dimension
// mismatch) is logged and the documents are still reported, just without
// index ids. Only a failed index write aborts the run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::analysis::analyzer::{Analysis, TextAnalyzer};
use crate::analysis::category::{Category, ScoreSet};
use crate::analysis::traits::{Embedder, TermExtractor};
use crate::error::{AnalysisError, DocumentError, IndexError};
use crate::index::shared::SharedIndex;
use crate::pipeline::relocate;
use crate::pipeline::source;
use crate::similarity::{self, DocumentRecord, DocumentResult, DEFAULT_NEIGHBORS};

/// Knobs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Neighbors reported per document.
    pub neighbors: usize,
    /// Documents analyzed at once.
    pub concurrency: usize,
    /// Move files into `<dir>/<category>/` when set.
    pub relocate_to: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            concurrency: 4,
            relocate_to: None,
        }
    }
}

/// The long-lived services a batch needs, constructed once at startup.
#[derive(Clone)]
pub struct Services {
    pub analyzer: Arc<TextAnalyzer>,
    pub extractor: Arc<dyn TermExtractor>,
    pub embedder: Arc<dyn Embedder>,
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchReport {
    /// One per successfully analyzed document, in input order.
    pub results: Vec<DocumentResult>,
    pub records: Vec<DocumentRecord>,
    /// Documents that were skipped, with why.
    pub failures: Vec<DocumentError>,
    /// Sum of every document's scores.
    pub total_scores: ScoreSet,
    /// Documents per assigned category (all five labels present).
    pub category_counts: BTreeMap<&'static str, usize>,
    /// Whether this batch made it into the index.
    pub indexed: bool,
}

/// Classify `paths`, index them, and build similarity reports.
pub async fn run_batch(
    paths: &[PathBuf],
    services: &Services,
    index: &SharedIndex,
    options: &BatchOptions,
) -> Result<BatchReport, IndexError> {
    info!(documents = paths.len(), "Processing batch");

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Analyzing [{bar:30}] {pos}/{len} ({eta})")
            .expect("valid template"),
    );

    let mut analyzed: Vec<(usize, Result<Analysis, DocumentError>)> =
        stream::iter(paths.iter().enumerate().map(|(i, path)| {
            let services = services.clone();
            let path = path.clone();
            let pb = pb.clone();
            async move {
                let result = analyze_path(path, services).await;
                pb.inc(1);
                (i, result)
            }
        }))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    // Completion order is arbitrary; reports follow input order
    analyzed.sort_by_key(|(i, _)| *i);

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for (i, result) in analyzed {
        let src = &paths[i];
        match result {
            Ok(analysis) => records.push(build_record(src, analysis, options)),
            Err(e) => {
                warn!(path = %src.display(), error = %e, "Skipping document");
                failures.push(e);
            }
        }
    }

    let indexed = index_records(&mut records, index)?;

    let results = index.read(|idx| similarity::aggregate(&records, idx, options.neighbors));

    let mut total_scores = ScoreSet::default();
    let mut category_counts: BTreeMap<&'static str, usize> =
        Category::ALL.iter().map(|c| (c.as_str(), 0)).collect();
    for record in &records {
        total_scores.accumulate(&record.scores);
        *category_counts.entry(record.category.as_str()).or_insert(0) += 1;
    }

    info!(
        analyzed = records.len(),
        skipped = failures.len(),
        indexed,
        "Batch complete"
    );

    Ok(BatchReport {
        results,
        records,
        failures,
        total_scores,
        category_counts,
        indexed,
    })
}

async fn analyze_path(path: PathBuf, services: Services) -> Result<Analysis, DocumentError> {
    let task_path = path.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let text = source::extract_text(&task_path)?;
        services
            .analyzer
            .analyze(&text, services.extractor.as_ref(), services.embedder.as_ref())
            .map_err(|source| DocumentError::Analysis {
                path: task_path.clone(),
                source,
            })
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) => Err(DocumentError::Analysis {
            path,
            source: AnalysisError::Aborted(e.to_string()),
        }),
    }
}

fn build_record(src: &Path, analysis: Analysis, options: &BatchOptions) -> DocumentRecord {
    let path = match &options.relocate_to {
        Some(dir) => {
            let dst = relocate::category_destination(dir, analysis.category, src);
            match relocate::safe_move(src, &dst) {
                Ok(moved) => {
                    info!(path = %moved.display(), category = %analysis.category, "Moved document");
                    moved
                }
                Err(e) => {
                    warn!(path = %src.display(), error = %e, "Could not move document, leaving in place");
                    src.to_path_buf()
                }
            }
        }
        None => src.to_path_buf(),
    };

    // Named after where the file ended up, so `_1` renames stay distinguishable
    let identifier = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    DocumentRecord {
        identifier,
        path,
        category: analysis.category,
        scores: analysis.scores,
        embedding: analysis.embedding,
        key_terms: analysis.key_terms,
        index_id: None,
    }
}

/// Add the batch to the index and assign ids. Returns whether it went in.
fn index_records(records: &mut [DocumentRecord], index: &SharedIndex) -> Result<bool, IndexError> {
    if records.is_empty() {
        return Ok(false);
    }

    let vectors: Vec<Vec<f32>> = records.iter().map(|r| r.embedding.clone()).collect();
    let labels: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();

    match index.add_and_persist(&vectors, &labels) {
        Ok(ids) => {
            for (record, id) in records.iter_mut().zip(ids) {
                record.index_id = Some(id);
            }
            info!(
                added = records.len(),
                total = index.len(),
                path = %index.path().display(),
                "Index updated"
            );
            Ok(true)
        }
        Err(e @ (IndexError::Io(_) | IndexError::Serialization(_))) => Err(e),
        // DimensionMismatch, NonFiniteVector: nothing was added
        Err(e) => {
            warn!(error = %e, "Index rejected the batch; documents reported without index ids");
            Ok(false)
        }
    }
}
