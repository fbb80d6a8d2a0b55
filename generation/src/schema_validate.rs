//! Schema-validated structured generation with one repair retry.
//!
//! A completion is accepted only if it deserializes into the target type
//! *and* passes the caller's domain invariants. `schemars`-derived types
//! describe the expected shape to the model (embedded in the prompt); the
//! actual check at the Rust boundary is "does this deserialize and hold
//! its invariants", not a separate runtime JSON-schema engine.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use studyforge_core::Completer;

use crate::error::{CoreError, Result};

/// Renders the JSON schema for `T` as a string suitable for embedding in
/// a generation prompt so the model knows the exact shape expected.
#[must_use]
pub fn schema_hint<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Calls `completer` with `prompt`, parses the JSON response into `T`, and
/// checks it with `validate`. On parse or validation failure, retries once
/// with an explicit repair instruction appended; a second failure yields
/// [`CoreError::Generation`].
pub async fn generate_validated<T, F>(
    completer: &dyn Completer,
    prompt: &str,
    validate: F,
) -> Result<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<()>,
{
    let raw = completer.complete(prompt).await?;
    if let Some(value) = try_parse_and_validate(&raw, &validate) {
        return value;
    }

    let repair_prompt = format!(
        "{prompt}\n\nYour previous response did not conform to the required JSON shape or failed \
         validation. Respond again with ONLY valid JSON matching the required shape, no \
         commentary, no markdown code fences."
    );
    let repaired = completer.complete(&repair_prompt).await?;
    match try_parse_and_validate(&repaired, &validate) {
        Some(value) => value,
        None => Err(CoreError::Generation(
            "model output failed schema validation twice in a row".into(),
        )),
    }
}

fn try_parse_and_validate<T, F>(raw: &str, validate: &F) -> Option<Result<T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<()>,
{
    let cleaned = strip_code_fences(raw);
    let parsed: T = serde_json::from_str(&cleaned).ok()?;
    match validate(&parsed) {
        Ok(()) => Some(Ok(parsed)),
        Err(_) => None,
    }
}

/// Models sometimes wrap JSON in ` ```json ... ``` ` fences despite
/// instructions; strip them before parsing.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.trim_end_matches("```").trim().to_string()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.trim_end_matches("```").trim().to_string()
    } else {
        trimmed.to_string()
    }
}
