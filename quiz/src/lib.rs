//! Adaptive quiz engine: combines a Q-learning difficulty controller with
//! a per-difficulty Thompson sampling bandit to pick the next question's
//! difficulty after every graded answer.

pub mod adaptive;
pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use adaptive::{blend_and_adjust, compute_trend, q_policy_recommend, q_update, reward, thompson_policy_recommend};
pub use config::QuizConfig;
pub use engine::{AnswerOutcome, QuizEngine, QuizPrompt};
pub use types::{AnsweredTurn, QuizSession, SessionStats, State, Trend};
