// Flat exact nearest-neighbor index with file persistence.
//
// Vectors live in one contiguous buffer ([v0_d0, v0_d1, ..., v1_d0, ...]).
// A vector's id is its insertion position: ids are never reused and the index
// only grows. Queries scan every stored vector and compute exact Euclidean
// distance, so results are deterministic (ties broken by ascending id).
//
// On disk the index is a single JSON document. Writes go to a sibling temp
// file first, flushed to disk, and renamed into place, so a crash mid-write
// leaves the previous checkpoint intact.

use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::IndexError;

const INDEX_FORMAT_VERSION: u32 = 1;

/// One k-NN hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: u64,
    pub distance: f32,
}

/// Persisted layout. Kept separate from `VectorIndex` so the in-memory
/// struct can change without breaking old files.
#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dimension: Option<usize>,
    count: usize,
    data: Vec<f32>,
    #[serde(default)]
    labels: Vec<Option<String>>,
}

/// Growable flat index of fixed-dimension vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    /// Fixed by the first batch (or by `expected_dimension` at creation).
    dimension: Option<usize>,
    data: Vec<f32>,
    /// Optional identifier per vector, parallel to insertion order.
    labels: Vec<Option<String>>,
}

impl VectorIndex {
    /// Empty index. With `Some(dim)` the dimension is fixed up front,
    /// otherwise the first `add_batch` fixes it.
    pub fn new(dimension: Option<usize>) -> Self {
        Self {
            dimension,
            data: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Load the index persisted at `path`, or start a fresh one.
    ///
    /// A missing file gives an empty index. An unreadable or corrupt file is
    /// logged and also gives an empty index; its contents are lost and will
    /// be overwritten by the next `persist`.
    pub fn open_or_create(path: &Path, expected_dimension: Option<usize>) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "No existing index found, creating a new one");
            return Self::new(expected_dimension);
        }

        match Self::load(path) {
            Ok(index) => {
                if let (Some(expected), Some(actual)) = (expected_dimension, index.dimension) {
                    if expected != actual {
                        warn!(
                            path = %path.display(),
                            expected,
                            actual,
                            "Loaded index dimension differs from the embedder dimension"
                        );
                    }
                }
                info!(
                    path = %path.display(),
                    vectors = index.len(),
                    dimension = ?index.dimension,
                    "Loaded existing index"
                );
                index
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Existing index is unreadable, creating a new one"
                );
                Self::new(expected_dimension)
            }
        }
    }

    /// Strict load: any I/O, parse, or consistency problem is an error.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let json = std::fs::read_to_string(path)?;
        let file: IndexFile = serde_json::from_str(&json)?;

        if file.version != INDEX_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported index format version {}",
                file.version
            )));
        }

        let dim = file.dimension.unwrap_or(0);
        if file.count > 0 && dim == 0 {
            return Err(corrupt("vectors present but no dimension recorded"));
        }
        let expected_values = file
            .count
            .checked_mul(dim)
            .ok_or_else(|| corrupt("vector count overflows"))?;
        if file.data.len() != expected_values {
            return Err(corrupt(format!(
                "expected {} values for {} vectors of dimension {}, found {}",
                expected_values,
                file.count,
                dim,
                file.data.len()
            )));
        }
        if file.labels.len() > file.count {
            return Err(corrupt("more labels than vectors"));
        }

        let mut labels = file.labels;
        labels.resize(file.count, None);

        Ok(Self {
            dimension: file.dimension,
            data: file.data,
            labels,
        })
    }

    /// Write the full index to `path`, replacing whatever was there.
    pub fn persist(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = IndexFile {
            version: INDEX_FORMAT_VERSION,
            dimension: self.dimension,
            count: self.len(),
            data: self.data.clone(),
            labels: self.labels.clone(),
        };
        let json = serde_json::to_string(&file)?;

        let tmp = temp_path(path);
        let mut out = File::create(&tmp)?;
        out.write_all(json.as_bytes())?;
        out.sync_all()?;
        drop(out);
        std::fs::rename(&tmp, path)?;

        info!(path = %path.display(), vectors = self.len(), "Index written");
        Ok(())
    }

    /// Append vectors, returning their ids. All-or-nothing: if any vector has
    /// the wrong dimension or a non-finite component the index is left
    /// untouched.
    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<Range<u64>, IndexError> {
        self.add_labeled_batch::<&str>(vectors, &[])
    }

    /// `add_batch` that also records an identifier per vector. `labels[i]`
    /// belongs to `vectors[i]`; vectors without a label get none.
    pub fn add_labeled_batch<S: AsRef<str>>(
        &mut self,
        vectors: &[Vec<f32>],
        labels: &[S],
    ) -> Result<Range<u64>, IndexError> {
        let first = vectors.first().ok_or(IndexError::EmptyBatch)?;
        let dim = self.dimension.unwrap_or(first.len());
        if dim == 0 {
            return Err(IndexError::ZeroDimension);
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }

        // JSON has no NaN or infinity; one such value makes the file unloadable
        if let Some(position) = vectors
            .iter()
            .position(|v| v.iter().any(|x| !x.is_finite()))
        {
            return Err(IndexError::NonFiniteVector { position });
        }

        let start = self.len() as u64;
        self.dimension = Some(dim);
        self.data.reserve(vectors.len() * dim);
        for (i, v) in vectors.iter().enumerate() {
            self.data.extend_from_slice(v);
            self.labels
                .push(labels.get(i).map(|l| l.as_ref().to_string()));
        }

        let ids = start..self.len() as u64;
        debug!(added = vectors.len(), total = self.len(), "Vectors added to index");
        Ok(ids)
    }

    /// The `k` nearest stored vectors by Euclidean distance, ascending, ties
    /// by ascending id. Fewer than `k` when the index is smaller.
    pub fn query_knn(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let dim = self.dimension.unwrap_or(0);
        if vector.len() != dim {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(dim)
            .enumerate()
            .map(|(i, stored)| Neighbor {
                id: i as u64,
                distance: l2_distance(vector, stored),
            })
            .collect();

        hits.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Stored vector for `id`, if any.
    pub fn vector(&self, id: u64) -> Option<&[f32]> {
        let dim = self.dimension?;
        let start = usize::try_from(id).ok()?.checked_mul(dim)?;
        self.data.get(start..start + dim)
    }

    /// Identifier recorded for `id`, if one was given at insertion.
    pub fn label(&self, id: u64) -> Option<&str> {
        self.labels
            .get(usize::try_from(id).ok()?)
            .and_then(|l| l.as_deref())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// Euclidean distance.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn corrupt(message: impl Into<String>) -> IndexError {
    IndexError::Corrupt(message.into())
}
