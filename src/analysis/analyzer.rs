// Keyword-weighted document classification.
//
// Score for a category = keyword weight x frequency of every extracted term
// found in that category's keyword list, plus a flat bonus for each sentence
// containing one of the category's contextual patterns. The category with the
// highest score wins (ties by Category::PRIORITY); all-zero means Other.

use std::collections::HashMap;

use tracing::debug;

use super::category::{Category, ScoreSet};
use super::lexicon::Lexicon;
use super::traits::{Embedder, TermExtractor};
use crate::error::AnalysisError;

/// How many key terms to keep per document for display.
const KEY_TERM_COUNT: usize = 5;

/// Result of analyzing one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub category: Category,
    pub scores: ScoreSet,
    pub embedding: Vec<f32>,
    /// Most frequent multi-character candidate terms, most frequent first.
    pub key_terms: Vec<String>,
}

/// Classifier bound to one rule set. Holds no mutable state, so a single
/// instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct TextAnalyzer {
    lexicon: Lexicon,
}

impl TextAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Classify `text` and embed it.
    ///
    /// `text` is expected to be lowercase already. The embedder is called
    /// exactly once, on the full text.
    pub fn analyze(
        &self,
        text: &str,
        extractor: &dyn TermExtractor,
        embedder: &dyn Embedder,
    ) -> Result<Analysis, AnalysisError> {
        let extraction = extractor.extract(text)?;

        let mut freq: HashMap<String, u32> = HashMap::new();
        for term in &extraction.terms {
            *freq.entry(term.to_lowercase()).or_insert(0) += 1;
        }

        let scores = self.score(&freq, &extraction.sentences);
        let category = scores.decide();

        let embedding = embedder.embed(text)?;
        if embedding.is_empty() {
            return Err(AnalysisError::EmptyEmbedding);
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::Embedder(
                "embedding contains NaN or infinite values".into(),
            ));
        }

        debug!(
            %category,
            medical = scores.medical,
            financial = scores.financial,
            legal = scores.legal,
            resume = scores.resume,
            terms = freq.len(),
            "Scored document"
        );

        Ok(Analysis {
            category,
            scores,
            embedding,
            key_terms: key_terms(&freq),
        })
    }

    /// Keyword and sentence-pattern scoring over precomputed term frequencies.
    pub fn score(&self, freq: &HashMap<String, u32>, sentences: &[String]) -> ScoreSet {
        let mut scores = ScoreSet::default();

        for category in Category::PRIORITY {
            let Some(rules) = self.lexicon.rules(category) else {
                continue;
            };

            let keyword_points: u32 = freq
                .iter()
                .filter(|(term, _)| rules.has_keyword(term))
                .map(|(_, &count)| count * self.lexicon.keyword_weight)
                .sum();
            scores.add(category, keyword_points);

            for sentence in sentences {
                if rules.matches_sentence(&sentence.to_lowercase()) {
                    scores.add(category, self.lexicon.pattern_bonus);
                }
            }
        }

        scores
    }
}

/// Top terms by frequency, ties broken alphabetically so output is stable.
fn key_terms(freq: &HashMap<String, u32>) -> Vec<String> {
    let mut ranked: Vec<(&String, &u32)> = freq.iter().filter(|(t, _)| t.len() > 2).collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(KEY_TERM_COUNT)
        .map(|(t, _)| t.clone())
        .collect()
}
