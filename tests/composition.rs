// Composition tests: the full batch pipeline end to end.
//
// Extraction -> analysis -> relocation -> index update -> aggregation,
// using the model-free HashingEmbedder and a temp directory for all files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docsort::analysis::analyzer::TextAnalyzer;
use docsort::analysis::category::Category;
use docsort::analysis::embeddings::HashingEmbedder;
use docsort::analysis::extractor::PhraseExtractor;
use docsort::analysis::traits::Embedder;
use docsort::error::{AnalysisError, DocumentError};
use docsort::index::flat::VectorIndex;
use docsort::index::shared::SharedIndex;
use docsort::pipeline::batch::{run_batch, BatchOptions, Services};

const LEGAL_TEXT: &str = "The parties hereby agree to the Terms and Conditions of this contract";

fn services(dimension: usize) -> Services {
    Services {
        analyzer: Arc::new(TextAnalyzer::default()),
        extractor: Arc::new(PhraseExtractor::new()),
        embedder: Arc::new(HashingEmbedder::new(dimension)),
    }
}

/// Embedder whose output cannot be stored in the index.
struct NanEmbedder;

impl Embedder for NanEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, AnalysisError> {
        Ok(vec![f32::NAN; 4])
    }
    fn dimension(&self) -> usize {
        4
    }
}

fn write_doc(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

// ============================================================
// Three identical legal documents
// ============================================================

#[tokio::test]
async fn identical_legal_documents_are_each_others_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    let inbox = dir.path().join("inbox");
    std::fs::create_dir_all(&inbox).unwrap();
    let paths: Vec<PathBuf> = (1..=3)
        .map(|i| write_doc(&inbox, &format!("legal{i}.txt"), LEGAL_TEXT))
        .collect();

    let index_path = dir.path().join("document_index.json");
    let index = SharedIndex::open(&index_path, Some(64));
    let options = BatchOptions {
        neighbors: 3,
        concurrency: 2,
        relocate_to: Some(dir.path().join("classified_docs")),
    };

    let report = run_batch(&paths, &services(64), &index, &options)
        .await
        .unwrap();

    assert!(report.indexed);
    assert!(report.failures.is_empty());
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.category_counts["legal"], 3);
    assert_eq!(report.category_counts["other"], 0);
    assert_eq!(report.total_scores.legal, 27);

    for (i, result) in report.results.iter().enumerate() {
        let own = format!("legal{}.txt", i + 1);
        assert_eq!(result.category, Category::Legal);
        assert_eq!(result.scores.legal, 9);
        assert_eq!(
            result.path,
            dir.path().join("classified_docs").join("legal").join(&own)
        );
        assert!(result.path.exists());

        assert_eq!(result.similar_documents.len(), 2);
        for neighbor in &result.similar_documents {
            assert_ne!(neighbor.name, own);
            assert!(neighbor.distance.abs() < 1e-6);
        }
    }

    // Checkpoint written with all three vectors and their names
    let on_disk = VectorIndex::load(&index_path).unwrap();
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk.label(0), Some("legal1.txt"));
}

#[tokio::test]
async fn report_text_has_expected_layout() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_doc(dir.path(), "a.txt", LEGAL_TEXT),
        write_doc(dir.path(), "b.txt", LEGAL_TEXT),
    ];
    let index = SharedIndex::open(&dir.path().join("index.json"), None);

    let report = run_batch(&paths, &services(32), &index, &BatchOptions::default())
        .await
        .unwrap();

    let text = report.results[0].to_string();
    let expected = format!(
        "File: {}\nCategory: legal\nScores:\n  medical: 0\n  financial: 0\n  legal: 9\n  resume: 0\n\
         Similar Documents:\n  - b.txt (Distance: 0.0000)\n",
        paths[0].display()
    );
    assert_eq!(text, expected);
}

// ============================================================
// Failure isolation
// ============================================================

#[tokio::test]
async fn unreadable_document_is_skipped_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_doc(
            dir.path(),
            "medical1.txt",
            "patient was diagnosed with hypertension, doctor prescribed medication",
        ),
        dir.path().join("missing.txt"),
        write_doc(dir.path(), "legal1.txt", LEGAL_TEXT),
    ];
    let index = SharedIndex::open(&dir.path().join("index.json"), None);

    let report = run_batch(&paths, &services(32), &index, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        DocumentError::Extraction { path, .. } if path.ends_with("missing.txt")
    ));
    assert_eq!(report.results[0].category, Category::Medical);
    assert_eq!(report.results[1].category, Category::Legal);
    assert_eq!(index.len(), 2);
}

#[tokio::test]
async fn dimension_mismatch_keeps_classifications_but_skips_index() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");

    // Existing index built with 8-dimensional vectors
    let mut existing = VectorIndex::new(None);
    existing
        .add_labeled_batch(&[vec![0.5; 8]], &["old.txt"])
        .unwrap();
    existing.persist(&index_path).unwrap();

    let paths = vec![write_doc(dir.path(), "legal1.txt", LEGAL_TEXT)];
    let index = SharedIndex::open(&index_path, Some(16));

    let report = run_batch(&paths, &services(16), &index, &BatchOptions::default())
        .await
        .unwrap();

    assert!(!report.indexed);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].category, Category::Legal);
    assert!(report.results[0].similar_documents.is_empty());
    assert_eq!(report.records[0].index_id, None);

    // Nothing new on disk
    assert_eq!(VectorIndex::load(&index_path).unwrap().len(), 1);
}

#[tokio::test]
async fn non_finite_embedding_skips_document_and_keeps_index() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");

    let mut existing = VectorIndex::new(None);
    existing
        .add_labeled_batch(&[vec![0.5; 4]], &["old.txt"])
        .unwrap();
    existing.persist(&index_path).unwrap();

    let paths = vec![write_doc(dir.path(), "legal1.txt", LEGAL_TEXT)];
    let index = SharedIndex::open(&index_path, Some(4));
    let services = Services {
        analyzer: Arc::new(TextAnalyzer::default()),
        extractor: Arc::new(PhraseExtractor::new()),
        embedder: Arc::new(NanEmbedder),
    };

    let report = run_batch(&paths, &services, &index, &BatchOptions::default())
        .await
        .unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        DocumentError::Analysis {
            source: AnalysisError::Embedder(_),
            ..
        }
    ));

    let reopened = VectorIndex::open_or_create(&index_path, Some(4));
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.label(0), Some("old.txt"));
}

#[tokio::test]
async fn empty_input_leaves_index_alone() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");
    let index = SharedIndex::open(&index_path, None);

    let report = run_batch(&[], &services(16), &index, &BatchOptions::default())
        .await
        .unwrap();

    assert!(report.results.is_empty());
    assert!(!report.indexed);
    assert!(!index_path.exists());
}

// ============================================================
// Naming
// ============================================================

#[tokio::test]
async fn same_file_names_stay_distinct_after_relocation() {
    let dir = tempfile::tempdir().unwrap();
    let first_dir = dir.path().join("a");
    let second_dir = dir.path().join("b");
    std::fs::create_dir_all(&first_dir).unwrap();
    std::fs::create_dir_all(&second_dir).unwrap();
    let paths = vec![
        write_doc(&first_dir, "x.txt", LEGAL_TEXT),
        write_doc(&second_dir, "x.txt", LEGAL_TEXT),
    ];

    let out = dir.path().join("classified_docs");
    let index_path = dir.path().join("index.json");
    let index = SharedIndex::open(&index_path, Some(32));
    let options = BatchOptions {
        relocate_to: Some(out.clone()),
        ..BatchOptions::default()
    };

    let report = run_batch(&paths, &services(32), &index, &options)
        .await
        .unwrap();

    assert_eq!(report.records[0].identifier, "x.txt");
    assert_eq!(report.records[1].identifier, "x_1.txt");
    assert_eq!(report.results[1].path, out.join("legal").join("x_1.txt"));
    assert_eq!(report.results[0].similar_documents[0].name, "x_1.txt");
    assert_eq!(report.results[1].similar_documents[0].name, "x.txt");

    let on_disk = VectorIndex::load(&index_path).unwrap();
    assert_eq!(on_disk.label(1), Some("x_1.txt"));
}

// ============================================================
// Persistence across runs
// ============================================================

#[tokio::test]
async fn later_runs_find_documents_from_earlier_runs() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.json");
    let options = BatchOptions::default();

    let first_batch = vec![
        write_doc(dir.path(), "contract_a.txt", LEGAL_TEXT),
        write_doc(
            dir.path(),
            "invoice_a.txt",
            "invoice number 77. total amount due within 30 days.",
        ),
    ];
    {
        let index = SharedIndex::open(&index_path, Some(64));
        run_batch(&first_batch, &services(64), &index, &options)
            .await
            .unwrap();
    }

    // New process: reopen from disk
    let index = SharedIndex::open(&index_path, Some(64));
    assert_eq!(index.len(), 2);

    let second_batch = vec![write_doc(dir.path(), "contract_b.txt", LEGAL_TEXT)];
    let report = run_batch(&second_batch, &services(64), &index, &options)
        .await
        .unwrap();

    assert_eq!(report.records[0].index_id, Some(2));
    let nearest = &report.results[0].similar_documents[0];
    assert_eq!(nearest.name, "contract_a.txt");
    assert!(nearest.distance.abs() < 1e-6);
    assert_eq!(report.results[0].similar_documents.len(), 2);
}
