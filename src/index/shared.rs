// Shared handle over one VectorIndex.
//
// Readers (k-NN queries) take the read lock; `add_and_persist` holds the
// write lock across both the append and the file write, so queries see the
// index either before or after a batch, never halfway, and no other writer
// can interleave between the append and its checkpoint.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::flat::{Neighbor, VectorIndex};
use crate::error::IndexError;

#[derive(Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<VectorIndex>>,
    path: PathBuf,
}

impl SharedIndex {
    /// Open (or create) the index at `path` and wrap it for sharing.
    pub fn open(path: &Path, expected_dimension: Option<usize>) -> Self {
        Self::from_index(VectorIndex::open_or_create(path, expected_dimension), path)
    }

    pub fn from_index(index: VectorIndex, path: &Path) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a labeled batch and checkpoint it to disk under one write lock.
    ///
    /// A rejected batch leaves both memory and disk untouched. If the append
    /// succeeds but the write fails, the error is returned and the in-memory
    /// index keeps the batch.
    pub fn add_and_persist<S: AsRef<str>>(
        &self,
        vectors: &[Vec<f32>],
        labels: &[S],
    ) -> Result<Range<u64>, IndexError> {
        let mut index = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let ids = index.add_labeled_batch(vectors, labels)?;
        index.persist(&self.path)?;
        Ok(ids)
    }

    pub fn query_knn(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        self.read(|index| index.query_knn(vector, k))
    }

    /// Run `f` against a consistent snapshot of the index.
    pub fn read<T>(&self, f: impl FnOnce(&VectorIndex) -> T) -> T {
        let index = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&index)
    }

    pub fn len(&self) -> usize {
        self.read(VectorIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(VectorIndex::is_empty)
    }
}
