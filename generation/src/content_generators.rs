//! Quiz, summary, flashcard, short-answer-evaluation, and competitive
//! question-bank generation.

use std::collections::HashSet;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use studyforge_core::Completer;
use studyforge_rag::RetrievedChunk;
use uuid::Uuid;

use crate::bank::{BankQuestion, BankSource, Difficulty, QuestionBank};
use crate::error::{CoreError, Result};
use crate::schema_validate::generate_validated;

/// Allowed values of `question_type` on a generated quiz item.
pub const MULTIPLE_CHOICE: &str = "multiple_choice";
pub const SHORT_ANSWER: &str = "short_answer";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GeneratedQuizItem {
    pub question: String,
    pub question_type: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub hint: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedQuiz {
    pub questions: Vec<GeneratedQuizItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShortAnswerEvaluation {
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedSummary {
    pub summary_title: String,
    pub summary: String,
    pub key_topics: Vec<String>,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedFlashcard {
    pub front: String,
    pub back: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedFlashcardSet {
    pub flashcard_set_title: String,
    pub flashcards: Vec<GeneratedFlashcard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    #[must_use]
    pub const fn target_words(self) -> usize {
        match self {
            Self::Short => 200,
            Self::Medium => 400,
            Self::Long => 800,
        }
    }
}

pub struct ContentGenerators {
    completer: Arc<dyn Completer>,
}

fn context_block(context: &[RetrievedChunk]) -> String {
    context
        .iter()
        .map(|c| {
            format!(
                "[Source: {}, p. {}]\n{}",
                c.chunk.metadata.filename, c.chunk.metadata.page_number, c.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Letters accepted as option prefixes, in order.
const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

fn leading_letter(option: &str) -> Option<char> {
    let mut chars = option.trim().chars();
    let first = chars.next()?;
    let separator = chars.next()?;
    if OPTION_LETTERS.contains(&first.to_ascii_uppercase()) && !separator.is_alphanumeric() {
        Some(first.to_ascii_uppercase())
    } else {
        None
    }
}

fn validate_multiple_choice_shape(options: &[String], correct_answer: &str) -> Result<()> {
    if options.len() != 4 {
        return Err(CoreError::Generation("multiple_choice item must have 4 options".into()));
    }
    let mut letters: Vec<char> = Vec::with_capacity(4);
    for option in options {
        let Some(letter) = leading_letter(option) else {
            return Err(CoreError::Generation(
                "each option must start with a letter A-D".into(),
            ));
        };
        letters.push(letter);
    }
    let unique: HashSet<char> = letters.iter().copied().collect();
    if unique.len() != 4 || !OPTION_LETTERS.iter().all(|l| unique.contains(l)) {
        return Err(CoreError::Generation(
            "options must carry four distinct letters A-D".into(),
        ));
    }
    let answer_letter = correct_answer.trim().chars().next().map(|c| c.to_ascii_uppercase());
    match answer_letter {
        Some(letter) if letters.contains(&letter) => Ok(()),
        _ => Err(CoreError::Generation(
            "correct_answer must match one of the option letters".into(),
        )),
    }
}

fn validate_quiz_item(item: &GeneratedQuizItem, requested_types: &[String]) -> Result<()> {
    if item.question.trim().is_empty() {
        return Err(CoreError::Generation("question text must not be empty".into()));
    }
    if !requested_types.iter().any(|t| t == &item.question_type) {
        return Err(CoreError::Generation(format!(
            "question_type {} was not requested",
            item.question_type
        )));
    }
    match item.question_type.as_str() {
        MULTIPLE_CHOICE => {
            let options = item
                .options
                .as_ref()
                .ok_or_else(|| CoreError::Generation("multiple_choice item missing options".into()))?;
            let correct = item
                .correct_answer
                .as_ref()
                .ok_or_else(|| CoreError::Generation("multiple_choice item missing correct_answer".into()))?;
            validate_multiple_choice_shape(options, correct)?;
        }
        SHORT_ANSWER => {
            if item.options.is_some() || item.correct_answer.is_some() {
                return Err(CoreError::Generation(
                    "short_answer item must not carry options/correct_answer".into(),
                ));
            }
        }
        other => return Err(CoreError::Generation(format!("unknown question_type {other}"))),
    }
    Ok(())
}

impl ContentGenerators {
    #[must_use]
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Generates `num_questions` self-contained quiz items drawn from
    /// `context`, mixing `types` as requested.
    pub async fn quiz(
        &self,
        context: &[RetrievedChunk],
        num_questions: usize,
        types: &[String],
    ) -> Result<GeneratedQuiz> {
        let type_list = types.join(", ");
        let prompt = format!(
            "You write self-contained study questions: each question must carry enough context \
             to be answered without re-reading the source material.\n\nGenerate exactly {num_questions} \
             questions mixing these question types: {type_list}. Include at least one question of \
             each requested type.\n\nFor multiple_choice items, supply exactly 4 options prefixed \
             \"A) \", \"B) \", \"C) \", \"D) \" and a correct_answer that is one of those letters. \
             short_answer items must omit options and correct_answer.\n\nRespond with ONLY JSON of \
             the shape {{\"questions\": [{{\"question\", \"question_type\", \"options\", \
             \"correct_answer\", \"hint\", \"explanation\"}}]}}.\n\nContext:\n{}",
            context_block(context)
        );

        let types = types.to_vec();
        let quiz: GeneratedQuiz = generate_validated(self.completer.as_ref(), &prompt, move |quiz: &GeneratedQuiz| {
            if quiz.questions.len() != num_questions {
                return Err(CoreError::Generation(format!(
                    "expected {num_questions} questions, got {}",
                    quiz.questions.len()
                )));
            }
            for item in &quiz.questions {
                validate_quiz_item(item, &types)?;
            }
            let present: HashSet<&str> = quiz.questions.iter().map(|q| q.question_type.as_str()).collect();
            if !types.iter().all(|t| present.contains(t.as_str())) {
                return Err(CoreError::Generation(
                    "not every requested question type was represented".into(),
                ));
            }
            Ok(())
        })
        .await?;

        Ok(quiz)
    }

    /// A single semantic short-answer grading call.
    pub async fn evaluate_short_answer(
        &self,
        question: &str,
        user_answer: &str,
        correct_answer: &str,
    ) -> Result<ShortAnswerEvaluation> {
        let prompt = format!(
            "Grade a student's short answer semantically: synonymous or paraphrased responses \
             count as correct, and numeric answers must match within the precision the question \
             implies.\n\nQuestion: {question}\nExpected answer: {correct_answer}\nStudent answer: \
             {user_answer}\n\nRespond with ONLY JSON of the shape {{\"is_correct\": bool, \
             \"feedback\": string}}."
        );
        generate_validated(self.completer.as_ref(), &prompt, |_: &ShortAnswerEvaluation| Ok(())).await
    }

    pub async fn summary(&self, context: &[RetrievedChunk], length: SummaryLength) -> Result<GeneratedSummary> {
        let target = length.target_words();
        let prompt = format!(
            "Summarize the following material in approximately {target} words (title + body + key \
             topics).\n\nRespond with ONLY JSON of the shape {{\"summary_title\", \"summary\", \
             \"key_topics\": [string], \"word_count\": number}}.\n\nContext:\n{}",
            context_block(context)
        );
        generate_validated(self.completer.as_ref(), &prompt, move |summary: &GeneratedSummary| {
            let actual_words = summary.summary.split_whitespace().count();
            let tolerance = (target as f64 * 0.3).round() as usize;
            let low = target.saturating_sub(tolerance);
            let high = target + tolerance;
            if actual_words < low || actual_words > high {
                return Err(CoreError::Generation(format!(
                    "summary has {actual_words} words, expected {low}-{high}"
                )));
            }
            if summary.key_topics.is_empty() {
                return Err(CoreError::Generation("summary must list at least one key topic".into()));
            }
            Ok(())
        })
        .await
    }

    pub async fn flashcards(
        &self,
        context: &[RetrievedChunk],
        num_flashcards: usize,
    ) -> Result<GeneratedFlashcardSet> {
        let prompt = format!(
            "Generate exactly {num_flashcards} flashcards from the material below. Each card's \
             \"front\" is a question or term, and \"back\" is its answer or definition.\n\nRespond \
             with ONLY JSON of the shape {{\"flashcard_set_title\", \"flashcards\": [{{\"front\", \
             \"back\", \"category\"}}]}}.\n\nContext:\n{}",
            context_block(context)
        );
        generate_validated(self.completer.as_ref(), &prompt, move |set: &GeneratedFlashcardSet| {
            if set.flashcards.len() != num_flashcards {
                return Err(CoreError::Generation(format!(
                    "expected {num_flashcards} flashcards, got {}",
                    set.flashcards.len()
                )));
            }
            if set.flashcards.iter().any(|c| c.front.trim().is_empty() || c.back.trim().is_empty()) {
                return Err(CoreError::Generation("flashcard front/back must not be empty".into()));
            }
            Ok(())
        })
        .await
    }

    /// Produces a difficulty-stratified `QuestionBank` with an
    /// approximately even `⌈n/3⌉` split across low/medium/hard, every
    /// item multiple-choice.
    pub async fn competitive_bank(
        &self,
        context: &[RetrievedChunk],
        num_questions: usize,
        source: BankSource,
    ) -> Result<QuestionBank> {
        let per_difficulty = num_questions.div_ceil(3);
        let prompt = format!(
            "Generate a bank of exactly {num_questions} multiple_choice questions split roughly \
             evenly across difficulty levels low, medium, hard (about {per_difficulty} of each). \
             Every option must be prefixed \"A) \"/\"B) \"/\"C) \"/\"D) \" and correct_answer must \
             be one of those letters.\n\nRespond with ONLY JSON of the shape {{\"questions\": \
             [{{\"question\", \"difficulty\", \"options\", \"correct_answer\", \"hint\", \
             \"explanation\"}}]}}.\n\nContext:\n{}",
            context_block(context)
        );

        #[derive(Debug, Deserialize, JsonSchema)]
        struct BankDraftItem {
            question: String,
            difficulty: String,
            options: Vec<String>,
            correct_answer: String,
            hint: String,
            explanation: String,
        }

        #[derive(Debug, Deserialize, JsonSchema)]
        struct BankDraft {
            questions: Vec<BankDraftItem>,
        }

        let draft: BankDraft = generate_validated(self.completer.as_ref(), &prompt, move |draft: &BankDraft| {
            if draft.questions.len() != num_questions {
                return Err(CoreError::Generation(format!(
                    "expected {num_questions} bank questions, got {}",
                    draft.questions.len()
                )));
            }
            for item in &draft.questions {
                if !matches!(item.difficulty.as_str(), "low" | "medium" | "hard") {
                    return Err(CoreError::Generation(format!("unknown difficulty {}", item.difficulty)));
                }
                validate_multiple_choice_shape(&item.options, &item.correct_answer)?;
            }
            if num_questions >= 3 {
                let present: HashSet<&str> = draft.questions.iter().map(|q| q.difficulty.as_str()).collect();
                for required in ["low", "medium", "hard"] {
                    if !present.contains(required) {
                        return Err(CoreError::Generation(format!(
                            "bank is missing any {required} difficulty question"
                        )));
                    }
                }
            }
            Ok(())
        })
        .await?;

        let items = draft
            .questions
            .into_iter()
            .map(|item| BankQuestion {
                question_id: Uuid::new_v4().to_string(),
                difficulty: match item.difficulty.as_str() {
                    "low" => Difficulty::Low,
                    "hard" => Difficulty::Hard,
                    _ => Difficulty::Medium,
                },
                question: item.question,
                options: item.options,
                correct_answer: item.correct_answer,
                hint: item.hint,
                explanation: item.explanation,
            })
            .collect();

        Ok(QuestionBank {
            quiz_id: Uuid::new_v4().to_string(),
            source,
            items,
        })
    }
}
