//! Question classification, prompt construction, grounded QA with
//! out-of-document fallback, and schema-validated structured content
//! generation.

pub mod bank;
pub mod classify;
pub mod content_generators;
pub mod error;
pub mod prompting;
pub mod qa;
pub mod schema_validate;

pub use bank::{BankQuestion, BankSource, Difficulty, QuestionBank};
pub use classify::{classify, QuestionType};
pub use content_generators::{
    ContentGenerators, GeneratedFlashcard, GeneratedFlashcardSet, GeneratedQuiz, GeneratedQuizItem,
    GeneratedSummary, ShortAnswerEvaluation, SummaryLength, MULTIPLE_CHOICE, SHORT_ANSWER,
};
pub use prompting::{build_fallback_prompt, build_prompt, is_from_document, post_process};
pub use qa::{QaAnswer, QaService, Source};
