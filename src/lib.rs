// docsort: keyword-weighted document classification with a persistent
// similarity index.
//
// This is the library root. Each module corresponds to one stage of the
// classify -> index -> compare pipeline.

pub mod analysis;
pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod similarity;
