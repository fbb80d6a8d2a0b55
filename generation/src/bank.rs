//! Question bank types shared with `studyforge-quiz`.

use serde::{Deserialize, Serialize};

/// The three closed difficulty levels used by both the competitive
/// question bank and the adaptive quiz engine's state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    #[must_use]
    pub const fn all() -> [Difficulty; 3] {
        [Difficulty::Low, Difficulty::Medium, Difficulty::Hard]
    }
}

/// One multiple-choice item in a [`QuestionBank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankQuestion {
    pub question_id: String,
    pub difficulty: Difficulty,
    pub question: String,
    /// Exactly four distinct strings, each prefixed by a letter A-D.
    pub options: Vec<String>,
    /// A single letter A-D.
    pub correct_answer: String,
    pub hint: String,
    pub explanation: String,
}

/// Where a competitive question bank was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BankSource {
    Document(String),
    Topic(String),
}

/// A pre-generated, difficulty-stratified pool of multiple-choice
/// questions backing a competitive quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub quiz_id: String,
    pub source: BankSource,
    pub items: Vec<BankQuestion>,
}

impl QuestionBank {
    #[must_use]
    pub fn find(&self, question_id: &str) -> Option<&BankQuestion> {
        self.items.iter().find(|q| q.question_id == question_id)
    }

    #[must_use]
    pub fn unused_of_difficulty<'a>(
        &'a self,
        difficulty: Difficulty,
        used: &std::collections::HashSet<String>,
    ) -> Vec<&'a BankQuestion> {
        self.items
            .iter()
            .filter(|q| q.difficulty == difficulty && !used.contains(&q.question_id))
            .collect()
    }

    #[must_use]
    pub fn any_unused<'a>(&'a self, used: &std::collections::HashSet<String>) -> Vec<&'a BankQuestion> {
        self.items.iter().filter(|q| !used.contains(&q.question_id)).collect()
    }
}
