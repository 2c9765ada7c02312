// Classification rules as static configuration.
//
// Each scored category has a keyword list (matched against extracted
// candidate terms) and a contextual pattern list (matched as substrings of
// each sentence). The built-in rules can be replaced by a JSON file with the
// same shape, so changing the rules never touches the scoring code.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::category::Category;

/// Points per occurrence of a lexicon keyword.
pub const DEFAULT_KEYWORD_WEIGHT: u32 = 2;
/// Points per sentence containing a contextual pattern.
pub const DEFAULT_PATTERN_BONUS: u32 = 3;

/// Keywords and contextual patterns for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub keywords: Vec<String>,
    pub patterns: Vec<String>,
}

impl CategoryRules {
    fn from_static(keywords: &[&str], patterns: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn has_keyword(&self, term: &str) -> bool {
        self.keywords.iter().any(|k| k == term)
    }

    /// True if the sentence contains at least one pattern.
    pub fn matches_sentence(&self, sentence: &str) -> bool {
        self.patterns.iter().any(|p| sentence.contains(p.as_str()))
    }

    fn normalize(&mut self) {
        for k in self.keywords.iter_mut().chain(self.patterns.iter_mut()) {
            *k = k.trim().to_lowercase();
        }
        self.keywords.retain(|k| !k.is_empty());
        self.patterns.retain(|p| !p.is_empty());
    }
}

/// Full rule set: one `CategoryRules` per scored category plus the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: u32,
    #[serde(default = "default_pattern_bonus")]
    pub pattern_bonus: u32,
    pub medical: CategoryRules,
    pub financial: CategoryRules,
    pub legal: CategoryRules,
    pub resume: CategoryRules,
}

fn default_keyword_weight() -> u32 {
    DEFAULT_KEYWORD_WEIGHT
}

fn default_pattern_bonus() -> u32 {
    DEFAULT_PATTERN_BONUS
}

impl Lexicon {
    /// Rules for a scored category. `Other` has no rules.
    pub fn rules(&self, category: Category) -> Option<&CategoryRules> {
        match category {
            Category::Medical => Some(&self.medical),
            Category::Financial => Some(&self.financial),
            Category::Legal => Some(&self.legal),
            Category::Resume => Some(&self.resume),
            Category::Other => None,
        }
    }

    /// Load a lexicon from a JSON file. Keywords and patterns are lowercased
    /// since the analyzer only ever sees lowercase text.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
        let mut lexicon: Lexicon = serde_json::from_str(&json)
            .with_context(|| format!("Invalid lexicon file {}", path.display()))?;
        for rules in [
            &mut lexicon.medical,
            &mut lexicon.financial,
            &mut lexicon.legal,
            &mut lexicon.resume,
        ] {
            rules.normalize();
        }
        Ok(lexicon)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
            pattern_bonus: DEFAULT_PATTERN_BONUS,
            medical: CategoryRules::from_static(
                &[
                    "patient",
                    "doctor",
                    "hospital",
                    "clinic",
                    "medical",
                    "health",
                    "treatment",
                    "diagnosis",
                    "symptoms",
                    "disease",
                    "prescription",
                    "medication",
                    "healthcare",
                    "physician",
                    "nurse",
                    "surgery",
                    "examination",
                    "laboratory",
                    "test results",
                    "medical history",
                    "vital signs",
                    "blood pressure",
                    "heart rate",
                ],
                &[
                    "diagnosed with",
                    "medical history",
                    "treatment plan",
                    "prescribed",
                ],
            ),
            financial: CategoryRules::from_static(
                &[
                    "invoice",
                    "payment",
                    "amount",
                    "tax",
                    "financial",
                    "bank",
                    "credit",
                    "debit",
                    "transaction",
                    "balance",
                    "account",
                    "money",
                    "price",
                    "cost",
                    "revenue",
                    "profit",
                    "expense",
                    "budget",
                    "investment",
                    "statement",
                    "billing",
                    "purchase",
                    "sale",
                    "receipt",
                ],
                &[
                    "amount due",
                    "payment terms",
                    "invoice number",
                    "total amount",
                ],
            ),
            legal: CategoryRules::from_static(
                &[
                    "contract",
                    "agreement",
                    "law",
                    "legal",
                    "court",
                    "attorney",
                    "clause",
                    "party",
                    "terms",
                    "conditions",
                    "rights",
                    "obligations",
                    "liability",
                    "jurisdiction",
                    "compliance",
                    "regulation",
                    "statute",
                    "plaintiff",
                    "defendant",
                    "witness",
                    "testimony",
                    "evidence",
                ],
                &[
                    "hereby agrees",
                    "terms and conditions",
                    "legal obligation",
                    "pursuant to",
                ],
            ),
            resume: CategoryRules::from_static(
                &[
                    "experience",
                    "education",
                    "skills",
                    "work history",
                    "employment",
                    "qualification",
                    "degree",
                    "university",
                    "college",
                    "certification",
                    "professional",
                    "career",
                    "job",
                    "position",
                    "responsibility",
                    "achievement",
                    "project",
                    "team",
                    "management",
                    "leadership",
                    "resume",
                    "cv",
                    "curriculum vitae",
                    "reference",
                    "objective",
                ],
                &[
                    "work experience",
                    "professional summary",
                    "educational background",
                    "career objective",
                ],
            ),
        }
    }
}
