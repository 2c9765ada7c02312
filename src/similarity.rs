// Similarity aggregation: turn raw k-NN hits into per-document reports.
//
// Every record in a freshly indexed batch queries the index for k+1
// neighbors, drops the hit whose id is its own (by id, never by distance:
// an exact duplicate at distance 0 is still a legitimate neighbor), keeps
// the first k, and resolves ids to document names.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::analysis::category::{Category, ScoreSet};
use crate::index::flat::VectorIndex;

/// Neighbors per document in the standard report.
pub const DEFAULT_NEIGHBORS: usize = 3;

/// One analyzed document, before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    /// Stable name used when this document shows up as someone's neighbor.
    pub identifier: String,
    /// Where the document lives now (after relocation, if any).
    pub path: PathBuf,
    pub category: Category,
    pub scores: ScoreSet,
    pub embedding: Vec<f32>,
    pub key_terms: Vec<String>,
    /// Id assigned by the index. `None` if the document never made it in.
    pub index_id: Option<u64>,
}

/// A neighbor entry in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarDocument {
    pub id: u64,
    pub name: String,
    pub distance: f32,
}

/// Final per-document output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResult {
    pub path: PathBuf,
    pub category: Category,
    pub scores: ScoreSet,
    /// Ascending by distance, at most k entries, never the document itself.
    pub similar_documents: Vec<SimilarDocument>,
}

impl fmt::Display for DocumentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path.display())?;
        writeln!(f, "Category: {}", self.category)?;
        writeln!(f, "Scores:")?;
        for (category, score) in self.scores.iter() {
            writeln!(f, "  {category}: {score}")?;
        }
        writeln!(f, "Similar Documents:")?;
        for doc in &self.similar_documents {
            writeln!(f, "  - {} (Distance: {:.4})", doc.name, doc.distance)?;
        }
        Ok(())
    }
}

/// Build one `DocumentResult` per record, in record order.
///
/// A failed query (dimension mismatch) is logged and yields an empty
/// neighbor list for that record only.
pub fn aggregate(records: &[DocumentRecord], index: &VectorIndex, k: usize) -> Vec<DocumentResult> {
    let names: HashMap<u64, &str> = records
        .iter()
        .filter_map(|r| r.index_id.map(|id| (id, r.identifier.as_str())))
        .collect();

    records
        .iter()
        .map(|record| {
            let similar_documents = match index.query_knn(&record.embedding, k + 1) {
                Ok(hits) => hits
                    .into_iter()
                    .filter(|hit| Some(hit.id) != record.index_id)
                    .take(k)
                    .map(|hit| SimilarDocument {
                        id: hit.id,
                        name: resolve_name(hit.id, &names, index),
                        distance: hit.distance,
                    })
                    .collect(),
                Err(e) => {
                    warn!(
                        document = %record.identifier,
                        error = %e,
                        "Similarity search failed, reporting without neighbors"
                    );
                    Vec::new()
                }
            };

            DocumentResult {
                path: record.path.clone(),
                category: record.category,
                scores: record.scores,
                similar_documents,
            }
        })
        .collect()
}

/// Current batch first, then the label stored in the index, then `#id`.
fn resolve_name(id: u64, batch: &HashMap<u64, &str>, index: &VectorIndex) -> String {
    batch
        .get(&id)
        .copied()
        .or_else(|| index.label(id))
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{id}"))
}
