// Document categories and the fixed-field score record.
//
// Scores exist only for the four keyword-driven categories. `Other` is never
// scored; it is the outcome when every score is zero.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification label assigned to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medical,
    Financial,
    Legal,
    Resume,
    Other,
}

impl Category {
    /// Scored categories in tie-break priority order (first wins a tie).
    pub const PRIORITY: [Category; 4] = [
        Category::Medical,
        Category::Financial,
        Category::Legal,
        Category::Resume,
    ];

    /// Every label, including the `Other` sentinel.
    pub const ALL: [Category; 5] = [
        Category::Medical,
        Category::Financial,
        Category::Legal,
        Category::Resume,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Financial => "financial",
            Category::Legal => "legal",
            Category::Resume => "resume",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category scores. One field per scored category, so a missing or
/// `other` key cannot be represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub medical: u32,
    pub financial: u32,
    pub legal: u32,
    pub resume: u32,
}

impl ScoreSet {
    /// Score for a category. `Other` always reads as 0.
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Medical => self.medical,
            Category::Financial => self.financial,
            Category::Legal => self.legal,
            Category::Resume => self.resume,
            Category::Other => 0,
        }
    }

    /// Add to a category's score. Adding to `Other` is a no-op.
    pub fn add(&mut self, category: Category, amount: u32) {
        match category {
            Category::Medical => self.medical += amount,
            Category::Financial => self.financial += amount,
            Category::Legal => self.legal += amount,
            Category::Resume => self.resume += amount,
            Category::Other => {}
        }
    }

    /// (category, score) pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::PRIORITY.iter().map(move |&c| (c, self.get(c)))
    }

    pub fn max_score(&self) -> u32 {
        self.iter().map(|(_, s)| s).max().unwrap_or(0)
    }

    /// Argmax over the four scores, ties broken by `Category::PRIORITY`.
    /// All-zero scores yield `Other`.
    pub fn decide(&self) -> Category {
        let max = self.max_score();
        if max == 0 {
            return Category::Other;
        }
        self.iter()
            .find(|&(_, s)| s == max)
            .map(|(c, _)| c)
            .unwrap_or(Category::Other)
    }

    /// Element-wise sum, used for batch totals.
    pub fn accumulate(&mut self, other: &ScoreSet) {
        for (category, score) in other.iter() {
            self.add(category, score);
        }
    }
}
