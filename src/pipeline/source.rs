// Text extraction for source documents.
//
// Reads a UTF-8 text document and lowercases it, which is the form the
// analyzer expects. Anything unreadable (missing, not UTF-8, a directory)
// becomes an extraction failure for that one document.

use std::path::Path;

use crate::error::DocumentError;

pub fn extract_text(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path)
        .map(|text| text.to_lowercase())
        .map_err(|source| DocumentError::Extraction {
            path: path.to_path_buf(),
            source,
        })
}
