//! Session lifecycle: bank generation, session start, and the
//! answer-grade-reselect loop, serialized per session with an exclusive
//! lock — a contended `answer` call fails fast with
//! [`CoreError::Conflict`] rather than blocking or corrupting state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::rngs::ThreadRng;
use studyforge_core::error::{CoreError, Result};
use studyforge_generation::{BankSource, ContentGenerators, Difficulty, QuestionBank};
use studyforge_rag::RetrievedChunk;
use uuid::Uuid;

use crate::adaptive::{blend_and_adjust, compute_trend, q_policy_recommend, q_update, reward, thompson_policy_recommend};
use crate::config::QuizConfig;
use crate::types::{AnsweredTurn, QuizSession, SessionStats};

/// A question served to the caller, stripped of its correct answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPrompt {
    pub question_id: String,
    pub difficulty: Difficulty,
    pub question: String,
    pub options: Vec<String>,
    pub hint: String,
}

/// Result of grading one answer, including the session's fresh stats.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub reward: f64,
    pub next_question: Option<QuizPrompt>,
    pub next_difficulty: Option<Difficulty>,
    pub session_complete: bool,
    pub stats: SessionStats,
}

fn to_prompt(bank: &QuestionBank, question_id: &str) -> Option<QuizPrompt> {
    bank.find(question_id).map(|q| QuizPrompt {
        question_id: q.question_id.clone(),
        difficulty: q.difficulty,
        question: q.question.clone(),
        options: q.options.clone(),
        hint: q.hint.clone(),
    })
}

/// Draws an unused question for `preferred`, falling back in the order
/// medium -> low -> hard -> any unused item.
fn draw_question<'a>(
    bank: &'a QuestionBank,
    preferred: Difficulty,
    used: &std::collections::HashSet<String>,
) -> Option<&'a str> {
    let unused = bank.unused_of_difficulty(preferred, used);
    if let Some(q) = unused.first() {
        return Some(q.question_id.as_str());
    }
    for fallback in [Difficulty::Medium, Difficulty::Low, Difficulty::Hard] {
        if fallback == preferred {
            continue;
        }
        if let Some(q) = bank.unused_of_difficulty(fallback, used).first() {
            return Some(q.question_id.as_str());
        }
    }
    bank.any_unused(used).first().map(|q| q.question_id.as_str())
}

struct SessionEntry {
    session: Mutex<QuizSession>,
    bank_id: String,
}

/// Owns every generated question bank and every live quiz session.
/// Construct one `QuizEngine` per server process and share it behind an
/// `Arc`.
pub struct QuizEngine {
    generators: Arc<ContentGenerators>,
    config: QuizConfig,
    banks: RwLock<HashMap<String, QuestionBank>>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(generators: Arc<ContentGenerators>, config: QuizConfig) -> Self {
        Self {
            generators,
            config,
            banks: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generates and stores a difficulty-stratified question bank.
    pub async fn generate_bank(
        &self,
        context: &[RetrievedChunk],
        num_questions: usize,
        source: BankSource,
    ) -> Result<QuestionBank> {
        let bank = self.generators.competitive_bank(context, num_questions, source).await?;
        self.banks.write().insert(bank.quiz_id.clone(), bank.clone());
        Ok(bank)
    }

    /// Starts a new adaptive session against a previously generated bank.
    pub fn start(&self, quiz_id: &str, target_count: usize) -> Result<(String, QuizPrompt)> {
        let banks = self.banks.read();
        let bank = banks
            .get(quiz_id)
            .ok_or_else(|| CoreError::NotFound(format!("question bank {quiz_id} not found")))?;

        let used = std::collections::HashSet::new();
        let first_id = draw_question(bank, Difficulty::Medium, &used)
            .ok_or_else(|| CoreError::BadInput("question bank is empty".into()))?
            .to_string();
        let prompt = to_prompt(bank, &first_id).expect("just drawn from this bank");

        let session_id = Uuid::new_v4().to_string();
        let mut used_question_ids = std::collections::HashSet::new();
        used_question_ids.insert(first_id.clone());
        let session = QuizSession {
            session_id: session_id.clone(),
            quiz_id: quiz_id.to_string(),
            target_count: target_count.min(bank.items.len()),
            answered: Vec::new(),
            q_table: HashMap::new(),
            bandit: HashMap::new(),
            current_difficulty: Difficulty::Medium,
            current_question_id: Some(first_id),
            used_question_ids,
        };

        drop(banks);
        self.sessions.write().insert(
            session_id.clone(),
            SessionEntry {
                session: Mutex::new(session),
                bank_id: quiz_id.to_string(),
            },
        );
        Ok((session_id, prompt))
    }

    /// Grades `user_answer` against the session's current question,
    /// updates the Q-table and bandit, and draws the next question.
    pub fn answer(&self, session_id: &str, question_id: &str, user_answer: &str) -> Result<AnswerOutcome> {
        let sessions = self.sessions.read();
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| CoreError::NotFound(format!("quiz session {session_id} not found")))?;

        let mut session = entry
            .session
            .try_lock()
            .ok_or_else(|| CoreError::Conflict("session is already processing another answer".into()))?;

        if session.current_question_id.as_deref() != Some(question_id) {
            return Err(CoreError::BadInput(
                "question_id does not match the session's current question".into(),
            ));
        }
        if session.is_complete() {
            return Err(CoreError::Conflict("session has already reached its target count".into()));
        }

        let banks = self.banks.read();
        let bank = banks
            .get(&entry.bank_id)
            .ok_or_else(|| CoreError::Internal("question bank backing this session was removed".into()))?;
        let question = bank
            .find(question_id)
            .ok_or_else(|| CoreError::Internal("current question missing from its bank".into()))?
            .clone();
        drop(banks);

        let is_correct = user_answer.trim().eq_ignore_ascii_case(question.correct_answer.trim());
        let action = session.current_difficulty;
        let step_reward = reward(action, is_correct);

        let prior_trend = {
            let history: Vec<bool> = session.answered.iter().map(|t| t.is_correct).collect();
            compute_trend(&history)
        };
        let state_before = (action, prior_trend);

        session.used_question_ids.insert(question_id.to_string());
        session.answered.push(AnsweredTurn {
            question_id: question_id.to_string(),
            difficulty: action,
            user_answer: user_answer.to_string(),
            is_correct,
            reward: step_reward,
            timestamp: time::OffsetDateTime::now_utc(),
        });

        let trend_after = {
            let history: Vec<bool> = session.answered.iter().map(|t| t.is_correct).collect();
            compute_trend(&history)
        };
        let state_after = (action, trend_after);

        q_update(&mut session.q_table, state_before, action, step_reward, state_after, &self.config);

        let bandit_entry = session.bandit.entry(action).or_insert((1.0, 1.0));
        if is_correct {
            bandit_entry.0 += 1.0;
        } else {
            bandit_entry.1 += 1.0;
        }

        let mut rng = ThreadRng::default();
        let q_rec = q_policy_recommend(&session.q_table, state_after, self.config.epsilon, &mut rng);
        let thompson_rec = thompson_policy_recommend(&session.bandit, &mut rng);
        let next_difficulty = blend_and_adjust(q_rec, thompson_rec, self.config.blend_weight_q, action, is_correct, &mut rng);
        session.current_difficulty = next_difficulty;

        let session_complete = if session.is_complete() {
            true
        } else {
            let banks = self.banks.read();
            let bank = banks.get(&entry.bank_id).expect("bank exists");
            match draw_question(bank, next_difficulty, &session.used_question_ids).map(str::to_string) {
                Some(id) => {
                    session.used_question_ids.insert(id.clone());
                    session.current_question_id = Some(id);
                    false
                }
                None => {
                    session.target_count = session.answered.len();
                    session.current_question_id = None;
                    true
                }
            }
        };

        let next_question = if session_complete {
            None
        } else {
            let banks = self.banks.read();
            let bank = banks.get(&entry.bank_id).expect("bank exists");
            session.current_question_id.as_deref().and_then(|id| to_prompt(bank, id))
        };

        let stats = compute_stats(&session);
        let next_difficulty = if session_complete { None } else { Some(session.current_difficulty) };

        Ok(AnswerOutcome {
            is_correct,
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            reward: step_reward,
            next_question,
            next_difficulty,
            session_complete,
            stats,
        })
    }
}

fn compute_stats(session: &QuizSession) -> SessionStats {
    let questions_answered = session.answered.len();
    let correct_answers = session.answered.iter().filter(|t| t.is_correct).count();
    let accuracy_percent = if questions_answered == 0 {
        0.0
    } else {
        100.0 * correct_answers as f64 / questions_answered as f64
    };
    let total_reward = session.answered.iter().map(|t| t.reward).sum();
    let history: Vec<bool> = session.answered.iter().map(|t| t.is_correct).collect();
    let performance_trend = compute_trend(&history);
    let mut difficulty_distribution = HashMap::new();
    for turn in &session.answered {
        *difficulty_distribution.entry(turn.difficulty).or_insert(0) += 1;
    }
    SessionStats {
        questions_answered,
        correct_answers,
        accuracy_percent,
        total_reward,
        performance_trend,
        difficulty_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use studyforge_generation::BankQuestion;

    struct NullCompleter;

    #[async_trait]
    impl studyforge_core::Completer for NullCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn sample_bank(quiz_id: &str, per_difficulty: usize) -> QuestionBank {
        let mut items = Vec::new();
        for difficulty in Difficulty::all() {
            for i in 0..per_difficulty {
                items.push(BankQuestion {
                    question_id: format!("{}-{}-{i}", difficulty.as_str(), quiz_id),
                    difficulty,
                    question: format!("Question {i} at {}", difficulty.as_str()),
                    options: vec!["A. one".into(), "B. two".into(), "C. three".into(), "D. four".into()],
                    correct_answer: "A".into(),
                    hint: "hint".into(),
                    explanation: "explanation".into(),
                });
            }
        }
        QuestionBank {
            quiz_id: quiz_id.to_string(),
            source: BankSource::Topic("test".into()),
            items,
        }
    }

    fn engine_with_bank(quiz_id: &str, per_difficulty: usize) -> QuizEngine {
        let generators = Arc::new(ContentGenerators::new(Arc::new(NullCompleter)));
        let engine = QuizEngine::new(generators, QuizConfig::default());
        engine.banks.write().insert(quiz_id.to_string(), sample_bank(quiz_id, per_difficulty));
        engine
    }

    #[test]
    fn start_picks_medium_first_question() {
        let engine = engine_with_bank("quiz-1", 3);
        let (_, prompt) = engine.start("quiz-1", 3).unwrap();
        assert_eq!(prompt.difficulty, Difficulty::Medium);
    }

    #[test]
    fn answer_grades_and_advances_to_next_question() {
        let engine = engine_with_bank("quiz-2", 3);
        let (session_id, prompt) = engine.start("quiz-2", 2).unwrap();
        let outcome = engine.answer(&session_id, &prompt.question_id, "A").unwrap();
        assert!(outcome.is_correct);
        assert!(!outcome.session_complete);
        assert!(outcome.next_question.is_some());
    }

    #[test]
    fn session_completes_when_target_count_reached() {
        let engine = engine_with_bank("quiz-3", 1);
        let (session_id, prompt) = engine.start("quiz-3", 1).unwrap();
        let outcome = engine.answer(&session_id, &prompt.question_id, "A").unwrap();
        assert!(outcome.session_complete);
        assert!(outcome.next_question.is_none());
    }

    #[test]
    fn concurrent_answer_calls_reject_the_loser_without_mutating_state() {
        let engine = Arc::new(engine_with_bank("quiz-4", 5));
        let (session_id, prompt) = engine.start("quiz-4", 5).unwrap();

        let entry_session_id = session_id.clone();
        let engine_a = Arc::clone(&engine);
        let sessions = engine_a.sessions.read();
        let entry = sessions.get(&entry_session_id).unwrap();
        let _held = entry.session.lock();

        let err = engine.answer(&session_id, &prompt.question_id, "A").unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}
