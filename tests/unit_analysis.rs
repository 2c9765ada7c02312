// Unit tests for document analysis.
//
// Exercises TextAnalyzer with the real PhraseExtractor and the model-free
// HashingEmbedder: the worked classification examples, determinism, the
// argmax/tie-break rule, and the all-zero fallback.

use docsort::analysis::analyzer::TextAnalyzer;
use docsort::analysis::category::{Category, ScoreSet};
use docsort::analysis::embeddings::HashingEmbedder;
use docsort::analysis::extractor::PhraseExtractor;
use docsort::analysis::lexicon::{CategoryRules, Lexicon};
use docsort::analysis::traits::{Embedder, TermExtractor};

fn analyze(text: &str) -> docsort::analysis::analyzer::Analysis {
    let analyzer = TextAnalyzer::default();
    analyzer
        .analyze(text, &PhraseExtractor::new(), &HashingEmbedder::default())
        .unwrap()
}

// ============================================================
// Worked examples
// ============================================================

#[test]
fn medical_note_scores_medical() {
    let a = analyze("patient was diagnosed with hypertension, doctor prescribed medication");
    // patient + doctor + medication = 3 x 2, plus one sentence bonus of 3
    assert_eq!(a.scores.medical, 9);
    assert_eq!(a.category, Category::Medical);
    assert!(a.scores.medical > a.scores.financial);
    assert!(a.scores.medical > a.scores.legal);
    assert!(a.scores.medical > a.scores.resume);
}

#[test]
fn contract_clause_scores_legal() {
    let a = analyze("the parties hereby agree to the terms and conditions of this contract");
    // contract + terms + conditions = 3 x 2, plus "terms and conditions" bonus
    assert_eq!(a.scores.legal, 9);
    assert_eq!(a.category, Category::Legal);
}

#[test]
fn invoice_scores_financial() {
    let a = analyze("invoice number 1042. total amount due on receipt. payment by bank transfer.");
    assert_eq!(a.category, Category::Financial);
    // invoice, amount, receipt, payment, bank (5 x 2) plus two sentence bonuses
    assert_eq!(a.scores.financial, 16);
}

#[test]
fn resume_scores_resume() {
    let a = analyze(
        "professional summary: ten years of work experience in project management.\n\
         education: degree from the state university.",
    );
    assert_eq!(a.category, Category::Resume);
}

/// Extractor with a short fixed stop list, so phrase boundaries are exact.
fn small_extractor() -> PhraseExtractor {
    PhraseExtractor::with_stop_words(
        ["the", "was", "of", "and", "a", "to"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

#[test]
fn multiword_keywords_are_counted() {
    let a = TextAnalyzer::default()
        .analyze(
            "blood pressure was normal",
            &small_extractor(),
            &HashingEmbedder::default(),
        )
        .unwrap();
    // "blood pressure" is a medical keyword; neither word is on its own
    assert_eq!(a.scores.medical, 2);
}

// ============================================================
// Fallback and edge cases
// ============================================================

#[test]
fn empty_text_is_other() {
    let a = analyze("");
    assert_eq!(a.scores, ScoreSet::default());
    assert_eq!(a.category, Category::Other);
    assert_eq!(a.embedding.len(), HashingEmbedder::default().dimension());
}

#[test]
fn unrelated_text_is_other() {
    let a = analyze("the quick brown fox jumps over the lazy dog");
    assert_eq!(a.category, Category::Other);
}

#[test]
fn keyword_bonus_repeats_per_sentence() {
    let a = analyze("pursuant to clause 1. pursuant to clause 2. pursuant to clause 3.");
    // clause x3 (2 each) plus three sentence bonuses
    assert_eq!(a.scores.legal, 15);
}

// ============================================================
// Invariants
// ============================================================

#[test]
fn analysis_is_deterministic() {
    let text = "invoice for legal services rendered under the contract, payment terms net 30";
    let first = analyze(text);
    for _ in 0..5 {
        assert_eq!(analyze(text), first);
    }
}

#[test]
fn category_is_argmax_with_priority_tie_break() {
    // One medical keyword and one financial keyword: tie at 2, medical wins
    let a = analyze("doctor invoice");
    assert_eq!(a.scores.medical, 2);
    assert_eq!(a.scores.financial, 2);
    assert_eq!(a.category, Category::Medical);

    // Financial vs legal tie: financial wins
    let a = analyze("invoice contract");
    assert_eq!(a.category, Category::Financial);

    // Legal vs resume tie: legal wins
    let a = analyze("contract resume");
    assert_eq!(a.category, Category::Legal);
}

#[test]
fn category_matches_decide_for_many_inputs() {
    let texts = [
        "",
        "doctor",
        "the bank sent a statement about the account balance",
        "court testimony and evidence from the witness",
        "team leadership and career objective",
        "nothing to see here",
    ];
    for text in texts {
        let a = analyze(text);
        assert_eq!(a.category, a.scores.decide(), "text: {text:?}");
        let all_zero = a.scores.iter().all(|(_, s)| s == 0);
        assert_eq!(a.category == Category::Other, all_zero, "text: {text:?}");
    }
}

// ============================================================
// Custom rule sets
// ============================================================

#[test]
fn custom_lexicon_changes_outcome_without_code_changes() {
    let mut lexicon = Lexicon::default();
    lexicon.resume = CategoryRules {
        keywords: vec!["fox".to_string()],
        patterns: vec!["lazy dog".to_string()],
    };
    lexicon.keyword_weight = 5;

    let analyzer = TextAnalyzer::new(lexicon);
    let a = analyzer
        .analyze(
            "the quick brown fox jumps over the lazy dog",
            &PhraseExtractor::new(),
            &HashingEmbedder::default(),
        )
        .unwrap();
    assert_eq!(a.scores.resume, 8);
    assert_eq!(a.category, Category::Resume);
}

#[test]
fn extractor_output_is_what_gets_scored() {
    let extraction = small_extractor()
        .extract("medical history reviewed. vital signs stable.")
        .unwrap();
    assert_eq!(extraction.sentences.len(), 2);
    assert!(extraction.terms.contains(&"medical history".to_string()));
    assert!(extraction.terms.contains(&"vital signs".to_string()));
}
