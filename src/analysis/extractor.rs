// Local candidate-term extractor.
//
// Splits text into sentences, tokenizes each sentence into words, and emits
// every word plus every 2- and 3-word phrase whose first and last words are
// not stop words. Phrases never cross sentence boundaries. This gives the
// analyzer both single keywords ("contract") and multi-word lexicon entries
// ("blood pressure") to count.

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use std::collections::HashSet;

use super::traits::{Extraction, TermExtractor};
use crate::error::AnalysisError;

/// Longest phrase emitted, in words.
const MAX_PHRASE_WORDS: usize = 3;

pub struct PhraseExtractor {
    sentence_split: Regex,
    word: Regex,
    stop_words: HashSet<String>,
}

impl PhraseExtractor {
    pub fn new() -> Self {
        Self::with_stop_words(get(LANGUAGE::English))
    }

    pub fn with_stop_words(stop_words: Vec<String>) -> Self {
        Self {
            sentence_split: Regex::new(r"[.!?;]+(?:\s+|$)|\n+").expect("valid sentence regex"),
            word: Regex::new(r"[a-z0-9][a-z0-9'\-]*").expect("valid word regex"),
            stop_words: stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Non-empty trimmed sentences, case-folded.
    pub fn sentences(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.sentence_split
            .split(&lower)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn is_stop(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    fn phrase_terms(&self, sentence: &str, out: &mut Vec<String>) {
        // Phrases stop at clause punctuation as well as sentence ends
        for clause in sentence.split(|c| matches!(c, ',' | ':' | '(' | ')' | '"')) {
            self.clause_terms(clause, out);
        }
    }

    fn clause_terms(&self, clause: &str, out: &mut Vec<String>) {
        let words: Vec<&str> = self.word.find_iter(clause).map(|m| m.as_str()).collect();
        out.extend(words.iter().map(|w| w.to_string()));

        for n in 2..=MAX_PHRASE_WORDS {
            for window in words.windows(n) {
                let first = window[0];
                let last = window[n - 1];
                if self.is_stop(first) || self.is_stop(last) {
                    continue;
                }
                out.push(window.join(" "));
            }
        }
    }
}

impl Default for PhraseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TermExtractor for PhraseExtractor {
    fn extract(&self, text: &str) -> Result<Extraction, AnalysisError> {
        let sentences = self.sentences(text);
        let mut terms = Vec::new();
        for sentence in &sentences {
            self.phrase_terms(sentence, &mut terms);
        }
        Ok(Extraction { terms, sentences })
    }
}
