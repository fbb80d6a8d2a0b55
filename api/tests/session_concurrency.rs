//! End-to-end wiring test driven through the HTTP layer with
//! `tower::ServiceExt::oneshot`, following `oxidize-pdf-api`'s own
//! in-process request-building test style.
//!
//! This covers the generate-bank -> start -> answer happy path. The
//! single-session exclusive-lock rejection is covered more directly —
//! and deterministically, rather than racing two real HTTP tasks
//! against timing — by `studyforge_quiz::engine`'s
//! `concurrent_answer_calls_reject_the_loser_without_mutating_state` unit
//! test, which holds the session lock itself before calling `answer`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use studyforge_api::{app, AppConfig, CoreContext};
use studyforge_core::{Completer, Embedding, EmbeddingModel, Result};
use tower::ServiceExt;

struct NullEmbedder;

#[async_trait]
impl EmbeddingModel for NullEmbedder {
    fn dim(&self) -> usize {
        8
    }

    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Ok(vec![0.0; 8])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|_| vec![0.0; 8]).collect())
    }
}

const BANK_JSON: &str = r#"{"questions": [
    {"question": "Low one", "difficulty": "low", "options": ["A) a","B) b","C) c","D) d"], "correct_answer": "A", "hint": "h", "explanation": "e"},
    {"question": "Medium one", "difficulty": "medium", "options": ["A) a","B) b","C) c","D) d"], "correct_answer": "B", "hint": "h", "explanation": "e"},
    {"question": "Hard one", "difficulty": "hard", "options": ["A) a","B) b","C) c","D) d"], "correct_answer": "C", "hint": "h", "explanation": "e"},
    {"question": "Low two", "difficulty": "low", "options": ["A) a","B) b","C) c","D) d"], "correct_answer": "A", "hint": "h", "explanation": "e"},
    {"question": "Medium two", "difficulty": "medium", "options": ["A) a","B) b","C) c","D) d"], "correct_answer": "C", "hint": "h", "explanation": "e"},
    {"question": "Hard two", "difficulty": "hard", "options": ["A) a","B) b","C) c","D) d"], "correct_answer": "D", "hint": "h", "explanation": "e"}
]}"#;

struct ScriptedCompleter;

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(BANK_JSON.to_string())
    }
}

fn test_context() -> Arc<CoreContext> {
    let embedder: Arc<dyn EmbeddingModel> = Arc::new(NullEmbedder);
    let completer: Arc<dyn Completer> = Arc::new(ScriptedCompleter);
    Arc::new(CoreContext::new(embedder, completer, AppConfig::from_env()))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check_reports_ok() {
    let router = app(test_context());
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn generate_bank_start_and_answer_round_trip() {
    let context = test_context();

    let router = app(context.clone());
    let response = router
        .oneshot(json_request(
            "POST",
            "/competitive-quiz/generate-bank",
            json!({"num_questions": 6, "topic": "cell biology"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let quiz_id = body["quiz_id"].as_str().unwrap().to_string();
    assert_eq!(body["question_bank"].as_array().unwrap().len(), 6);

    let router = app(context.clone());
    let response = router
        .oneshot(json_request(
            "POST",
            "/competitive-quiz/start",
            json!({"quiz_id": quiz_id, "num_questions": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    let question_id = body["question"]["question_id"].as_str().unwrap().to_string();
    assert_eq!(body["current_difficulty"], "medium");

    let router = app(context.clone());
    let response = router
        .oneshot(json_request(
            "POST",
            "/competitive-quiz/answer",
            json!({"session_id": session_id, "question_id": question_id, "answer": "B"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_correct"], true);
    assert_eq!(body["stats"]["questions_answered"], 1);
}

#[tokio::test]
async fn malformed_answer_letter_is_rejected_as_bad_input() {
    let context = test_context();
    let router = app(context.clone());
    let response = router
        .oneshot(json_request(
            "POST",
            "/competitive-quiz/answer",
            json!({"session_id": "missing", "question_id": "missing", "answer": "not-a-letter"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let context = test_context();
    let router = app(context.clone());
    let response = router
        .oneshot(json_request(
            "POST",
            "/competitive-quiz/answer",
            json!({"session_id": "does-not-exist", "question_id": "q1", "answer": "A"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

