//! Endpoint handlers: each one validates its input, calls exactly
//! one service operation, and maps the result into a response DTO.
//! Status-code mapping for failures lives entirely in [`crate::error`].

use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use studyforge_core::CoreError;
use studyforge_generation::BankSource;
use studyforge_rag::IngestFile;

use crate::context::SharedContext;
use crate::dto::*;
use crate::error::ApiError;

/// A broad, non-question-specific query used to pull representative
/// context for whole-document generation (summary, flashcards, quiz,
/// competitive bank) where there is no user question to embed.
const OVERVIEW_QUERY: &str = "the main topics, concepts, and facts covered in this document";
const OVERVIEW_K: usize = 20;

pub fn router(context: SharedContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/documents/list", get(list_documents))
        .route("/chat", post(chat))
        .route("/quiz", post(quiz))
        .route("/quiz/evaluate-answer", post(evaluate_answer))
        .route("/summary", post(summary))
        .route("/flashcards", post(flashcards))
        .route("/competitive-quiz/generate-bank", post(generate_bank))
        .route("/competitive-quiz/start", post(start_session))
        .route("/competitive-quiz/answer", post(answer_session))
        .layer(CorsLayer::permissive())
        .with_state(context)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn upload(State(ctx): State<SharedContext>, mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoreError::BadInput(format!("malformed multipart body: {e}")))?
    {
        let filename = field.file_name().map(str::to_string).unwrap_or_else(|| "upload.pdf".into());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CoreError::BadInput(format!("failed to read uploaded file: {e}")))?;
        let extracted = studyforge_pdf::extract(&bytes).map_err(|e| CoreError::BadInput(e.to_string()))?;
        files.push(IngestFile {
            filename,
            pages: extracted.pages,
        });
    }

    if files.is_empty() {
        return Err(CoreError::BadInput("no PDF files were provided".into()).into());
    }

    let manifest = ctx.ingestion.ingest(files).await?;
    Ok(Json(UploadResponse {
        document_id: manifest.document_id,
        filename: manifest.filenames.join(", "),
        page_count: manifest.page_count_total,
        chunks_created: manifest.chunk_count,
    }))
}

async fn list_documents(State(ctx): State<SharedContext>) -> Result<Json<DocumentListResponse>, ApiError> {
    let documents = ctx
        .ingestion
        .list_documents()
        .await?
        .into_iter()
        .map(|d| DocumentEntry {
            document_id: d.document_id,
            filename: d.filename,
            vector_count: d.vector_count,
        })
        .collect();
    Ok(Json(DocumentListResponse { documents }))
}

async fn chat(State(ctx): State<SharedContext>, Json(body): Json<ChatRequest>) -> Result<Json<ChatResponse>, ApiError> {
    if body.question.trim().is_empty() {
        return Err(CoreError::BadInput("question must not be empty".into()).into());
    }
    let answer = ctx.qa.answer(&body.document_id, &body.question).await?;
    Ok(Json(ChatResponse {
        answer: answer.answer,
        sources: answer
            .sources
            .into_iter()
            .map(|s| ChatSource {
                filename: s.filename,
                page_number: s.page_number,
                text: s.text,
            })
            .collect(),
        from_document: answer.from_document,
        filename: body.filename,
    }))
}

const QUESTION_TYPES: [&str; 2] = ["multiple_choice", "short_answer"];

async fn quiz(State(ctx): State<SharedContext>, Json(body): Json<QuizRequest>) -> Result<Json<QuizResponse>, ApiError> {
    if !(5..=50).contains(&body.num_questions) {
        return Err(CoreError::BadInput("num_questions must be between 5 and 50".into()).into());
    }
    if body.question_types.is_empty() || body.question_types.iter().any(|t| !QUESTION_TYPES.contains(&t.as_str())) {
        return Err(CoreError::BadInput(
            "question_types must be a non-empty subset of multiple_choice, short_answer".into(),
        )
        .into());
    }

    let context = ctx.retrieval.retrieve(&body.document_id, OVERVIEW_QUERY, OVERVIEW_K).await?;
    let generated = ctx.generators.quiz(&context, body.num_questions, &body.question_types).await?;
    Ok(Json(QuizResponse { quiz: generated }))
}

async fn evaluate_answer(
    State(ctx): State<SharedContext>,
    Json(body): Json<EvaluateAnswerRequest>,
) -> Result<Json<EvaluateAnswerResponse>, ApiError> {
    let eval = ctx
        .generators
        .evaluate_short_answer(&body.question, &body.user_answer, &body.correct_answer)
        .await?;
    Ok(Json(eval.into()))
}

fn parse_summary_length(raw: &str) -> Result<studyforge_generation::SummaryLength, ApiError> {
    match raw {
        "short" => Ok(studyforge_generation::SummaryLength::Short),
        "medium" => Ok(studyforge_generation::SummaryLength::Medium),
        "long" => Ok(studyforge_generation::SummaryLength::Long),
        other => Err(CoreError::BadInput(format!("length must be short, medium, or long; got {other}")).into()),
    }
}

async fn summary(State(ctx): State<SharedContext>, Json(body): Json<SummaryRequest>) -> Result<Json<SummaryResponse>, ApiError> {
    let length = parse_summary_length(&body.length)?;
    let context = ctx.retrieval.retrieve(&body.document_id, OVERVIEW_QUERY, OVERVIEW_K).await?;
    let generated = ctx.generators.summary(&context, length).await?;
    Ok(Json(SummaryResponse { summary: generated }))
}

async fn flashcards(
    State(ctx): State<SharedContext>,
    Json(body): Json<FlashcardsRequest>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    if body.num_flashcards == 0 {
        return Err(CoreError::BadInput("num_flashcards must be at least 1".into()).into());
    }
    let context = ctx.retrieval.retrieve(&body.document_id, OVERVIEW_QUERY, OVERVIEW_K).await?;
    let generated = ctx.generators.flashcards(&context, body.num_flashcards).await?;
    Ok(Json(FlashcardsResponse { flashcards: generated }))
}

/// Builds a single synthetic context entry carrying `topic` so
/// topic-only bank generation (no backing document) can still ground
/// its prompt in something concrete.
fn topic_context(topic: &str) -> Vec<studyforge_rag::RetrievedChunk> {
    use studyforge_rag::{Chunk, ChunkMetadata, RetrievedChunk};
    vec![RetrievedChunk {
        chunk: Chunk {
            chunk_id: "topic#0".to_string(),
            text: topic.to_string(),
            embedding: Vec::new(),
            metadata: ChunkMetadata {
                filename: "topic".to_string(),
                page_number: 1,
                chunk_index: 0,
                char_start: None,
                char_end: None,
            },
        },
        similarity: 1.0,
    }]
}

async fn generate_bank(
    State(ctx): State<SharedContext>,
    Json(body): Json<GenerateBankRequest>,
) -> Result<Json<GenerateBankResponse>, ApiError> {
    if !(3..=100).contains(&body.num_questions) {
        return Err(CoreError::BadInput("num_questions must be between 3 and 100".into()).into());
    }

    let (context, source) = match (&body.document_id, &body.topic) {
        (Some(document_id), _) => {
            let context = ctx.retrieval.retrieve(document_id, OVERVIEW_QUERY, 30).await?;
            (context, BankSource::Document(document_id.clone()))
        }
        (None, Some(topic)) => (topic_context(topic), BankSource::Topic(topic.clone())),
        (None, None) => {
            return Err(CoreError::BadInput("either document_id or topic must be provided".into()).into());
        }
    };

    let bank = ctx.quiz.generate_bank(&context, body.num_questions, source).await?;
    Ok(Json(GenerateBankResponse {
        quiz_id: bank.quiz_id,
        question_bank: bank.items,
    }))
}

async fn start_session(
    State(ctx): State<SharedContext>,
    Json(body): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    if !(5..=10).contains(&body.num_questions) {
        return Err(CoreError::BadInput("num_questions must be between 5 and 10".into()).into());
    }
    let (session_id, prompt) = ctx.quiz.start(&body.quiz_id, body.num_questions)?;
    Ok(Json(StartSessionResponse {
        session_id,
        current_difficulty: prompt.difficulty,
        question: QuestionView {
            question_id: prompt.question_id,
            difficulty: prompt.difficulty,
            question: prompt.question,
            options: prompt.options,
            hint: prompt.hint,
        },
    }))
}

fn parse_letter_answer(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if matches!(c.to_ascii_uppercase(), 'A'..='D') => Ok(c.to_ascii_uppercase().to_string()),
        _ => Err(CoreError::BadInput("answer must be a single letter A-D".into()).into()),
    }
}

async fn answer_session(
    State(ctx): State<SharedContext>,
    Json(body): Json<AnswerSessionRequest>,
) -> Result<Json<AnswerSessionResponse>, ApiError> {
    let letter = parse_letter_answer(&body.answer)?;
    let outcome = ctx.quiz.answer(&body.session_id, &body.question_id, &letter)?;
    Ok(Json(AnswerSessionResponse {
        is_correct: outcome.is_correct,
        correct_answer: outcome.correct_answer,
        explanation: outcome.explanation,
        reward: outcome.reward,
        stats: outcome.stats.into(),
        is_complete: outcome.session_complete,
        next_question: outcome.next_question.map(|q| QuestionView {
            question_id: q.question_id,
            difficulty: q.difficulty,
            question: q.question,
            options: q.options,
            hint: q.hint,
        }),
        next_difficulty: outcome.next_difficulty,
    }))
}

