//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use studyforge_generation::{BankQuestion, Difficulty, GeneratedFlashcardSet, GeneratedQuiz, GeneratedSummary, ShortAnswerEvaluation};
use studyforge_quiz::SessionStats;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub filename: String,
    pub page_count: usize,
    pub chunks_created: usize,
}

#[derive(Debug, Serialize)]
pub struct DocumentEntry {
    pub document_id: String,
    pub filename: String,
    pub vector_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub document_id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatSource {
    pub filename: String,
    pub page_number: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<ChatSource>,
    pub from_document: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub document_id: String,
    pub num_questions: usize,
    pub question_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub quiz: GeneratedQuiz,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateAnswerRequest {
    pub user_answer: String,
    pub correct_answer: String,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateAnswerResponse {
    pub is_correct: bool,
    pub feedback: String,
}

impl From<ShortAnswerEvaluation> for EvaluateAnswerResponse {
    fn from(eval: ShortAnswerEvaluation) -> Self {
        Self {
            is_correct: eval.is_correct,
            feedback: eval.feedback,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub document_id: String,
    pub length: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: GeneratedSummary,
}

#[derive(Debug, Deserialize)]
pub struct FlashcardsRequest {
    pub document_id: String,
    pub num_flashcards: usize,
}

#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    pub flashcards: GeneratedFlashcardSet,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBankRequest {
    pub num_questions: usize,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateBankResponse {
    pub quiz_id: String,
    pub question_bank: Vec<BankQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub quiz_id: String,
    pub num_questions: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub question_id: String,
    pub difficulty: Difficulty,
    pub question: String,
    pub options: Vec<String>,
    pub hint: String,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub question: QuestionView,
    pub current_difficulty: Difficulty,
}

#[derive(Debug, Deserialize)]
pub struct AnswerSessionRequest {
    pub session_id: String,
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerSessionResponse {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub reward: f64,
    pub stats: StatsView,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_difficulty: Option<Difficulty>,
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub questions_answered: usize,
    pub correct_answers: usize,
    pub accuracy_percent: f64,
    pub total_reward: f64,
    pub performance_trend: &'static str,
    pub difficulty_distribution: std::collections::HashMap<&'static str, usize>,
}

impl From<SessionStats> for StatsView {
    fn from(stats: SessionStats) -> Self {
        Self {
            questions_answered: stats.questions_answered,
            correct_answers: stats.correct_answers,
            accuracy_percent: stats.accuracy_percent,
            total_reward: stats.total_reward,
            performance_trend: stats.performance_trend.as_str(),
            difficulty_distribution: stats
                .difficulty_distribution
                .into_iter()
                .map(|(d, n)| (d.as_str(), n))
                .collect(),
        }
    }
}
