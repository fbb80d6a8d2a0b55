//! Quiz session and turn-history types.

use std::collections::HashSet;

use studyforge_generation::Difficulty;

/// Derived categorical summary of recent performance, part of the
/// Q-learning state alongside the current difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

/// `(current_difficulty, trend)` — 9 possible Q-learning states.
pub type State = (Difficulty, Trend);

/// One graded question in a session's history.
#[derive(Debug, Clone, PartialEq)]
pub struct AnsweredTurn {
    pub question_id: String,
    pub difficulty: Difficulty,
    pub user_answer: String,
    pub is_correct: bool,
    pub reward: f64,
    pub timestamp: time::OffsetDateTime,
}

/// Aggregate stats returned alongside every `answer` response.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub questions_answered: usize,
    pub correct_answers: usize,
    pub accuracy_percent: f64,
    pub total_reward: f64,
    pub performance_trend: Trend,
    pub difficulty_distribution: std::collections::HashMap<Difficulty, usize>,
}

/// Per-session adaptive state: Q-table, bandit parameters, history, and
/// the current question pointer. Mutated only through
/// [`crate::engine::QuizEngine`]'s `start`/`answer` operations, which the
/// session registry serializes with a per-session exclusive lock.
pub struct QuizSession {
    pub session_id: String,
    pub quiz_id: String,
    pub target_count: usize,
    pub answered: Vec<AnsweredTurn>,
    pub q_table: std::collections::HashMap<State, std::collections::HashMap<Difficulty, f64>>,
    pub bandit: std::collections::HashMap<Difficulty, (f64, f64)>,
    pub current_difficulty: Difficulty,
    pub current_question_id: Option<String>,
    pub used_question_ids: HashSet<String>,
}

impl QuizSession {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered.len() >= self.target_count
    }
}
