// Batch pipeline: extraction, classification, relocation, indexing.

pub mod batch;
pub mod relocate;
pub mod source;
