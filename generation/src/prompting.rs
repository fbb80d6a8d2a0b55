//! Dynamic prompt construction, completion post-processing, and the
//! out-of-document fallback signal.

use studyforge_rag::RetrievedChunk;

use crate::classify::QuestionType;

/// Builds the four-section grounded-answer prompt: role, type-specific
/// formatting instructions, the retrieved context (each chunk marked with
/// its source), and the question itself.
#[must_use]
pub fn build_prompt(question_type: QuestionType, context: &[RetrievedChunk], question: &str) -> String {
    let role = "You are a study assistant. Answer strictly using the supplied context below; do not invent facts that are not present in it.";

    let formatting = match question_type {
        QuestionType::List => {
            "Format your answer as a bulleted list of distinct items drawn from the context."
        }
        QuestionType::Definition => {
            "Give a concise one-sentence definition first, then elaborate with supporting detail from the context."
        }
        QuestionType::Comparison => {
            "Present the comparison as paired points, contrasting each side directly."
        }
        QuestionType::How => "Explain the process as an ordered sequence of steps.",
        QuestionType::Why => "Explain the causal chain that leads to the outcome described.",
        QuestionType::What | QuestionType::General => {
            "Give a brief answer first, then add supporting detail."
        }
    };

    let context_block = context
        .iter()
        .map(|c| {
            format!(
                "[Source: {}, p. {}]\n{}",
                c.chunk.metadata.filename, c.chunk.metadata.page_number, c.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{role}\n\n{formatting}\n\n{context_block}\n\n{question}")
}

/// Builds the fallback prompt used when grounding fails: the model is
/// told to answer from general knowledge but must open with an explicit
/// disclaimer that the material isn't in the uploaded document.
#[must_use]
pub fn build_fallback_prompt(question: &str) -> String {
    format!(
        "You are a study assistant. The uploaded document does not contain information relevant to \
         this question. Open your answer with a single sentence explicitly stating that the \
         information is not available in the uploaded materials, then answer from your general \
         knowledge.\n\nQuestion: {question}"
    )
}

const BOILERPLATE_PREFIXES: &[&str] = &[
    "based on the provided context,",
    "based on the context provided,",
    "according to the context,",
    "according to the provided context,",
    "i'm sorry, but",
    "i apologize, but",
];

/// Applies the completion post-processing pipeline: strips leading
/// boilerplate, removes stray literal `**`, collapses long blank-line
/// runs, and capitalizes the first character.
#[must_use]
pub fn post_process(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    let lowered = text.to_lowercase();
    for prefix in BOILERPLATE_PREFIXES {
        if lowered.starts_with(prefix) {
            text = text[prefix.len()..].trim_start().to_string();
            break;
        }
    }

    text = strip_stray_bold_markers(&text);
    text = collapse_blank_lines(&text);
    capitalize_first(&text)
}

/// Removes `**` runs that do not pair up as proper Markdown bold markers,
/// leaving headings (`#`) and list markers (`-`, `*`) untouched.
fn strip_stray_bold_markers(text: &str) -> String {
    let count = text.matches("**").count();
    if count % 2 == 0 {
        text.to_string()
    } else {
        text.replace("**", "")
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 2 {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }
    out.trim_end_matches('\n').to_string()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const OUT_OF_DOCUMENT_PHRASES: &[&str] = &[
    "not available in the provided",
    "does not contain",
    "no information about",
    "not mentioned in",
    "not found in",
    "i'm sorry",
];

/// Computes `from_document`: false if either the pre-signal (weak or
/// empty retrieval) or the post-signal (a disclaiming phrase in the
/// answer) fires.
#[must_use]
pub fn is_from_document(context: &[RetrievedChunk], answer: &str, similarity_threshold: f32) -> bool {
    let pre_signal_weak = context.is_empty() || context.iter().all(|c| c.similarity < similarity_threshold);
    if pre_signal_weak {
        return false;
    }

    let lowered = answer.to_lowercase();
    !OUT_OF_DOCUMENT_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyforge_rag::{Chunk, ChunkMetadata};

    fn retrieved(similarity: f32, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: Chunk {
                chunk_id: "c1".into(),
                text: text.into(),
                embedding: vec![],
                metadata: ChunkMetadata {
                    filename: "doc.pdf".into(),
                    page_number: 1,
                    chunk_index: 0,
                    char_start: None,
                    char_end: None,
                },
            },
            similarity,
        }
    }

    #[test]
    fn prompt_includes_source_markers_and_question() {
        let prompt = build_prompt(
            QuestionType::Definition,
            &[retrieved(0.9, "Photosynthesis converts light into chemical energy.")],
            "What is photosynthesis?",
        );
        assert!(prompt.contains("[Source: doc.pdf, p. 1]"));
        assert!(prompt.contains("What is photosynthesis?"));
    }

    #[test]
    fn post_process_strips_boilerplate_and_capitalizes() {
        let raw = "Based on the provided context, photosynthesis produces glucose.";
        let processed = post_process(raw);
        assert_eq!(processed, "Photosynthesis produces glucose.");
    }

    #[test]
    fn post_process_collapses_long_blank_runs() {
        let raw = "first\n\n\n\n\nsecond";
        assert_eq!(post_process(raw), "First\n\n\nsecond");
    }

    #[test]
    fn post_process_removes_unpaired_bold_markers() {
        let raw = "this has a stray ** marker";
        assert_eq!(post_process(raw), "This has a stray  marker");
    }

    #[test]
    fn post_process_keeps_paired_bold_markers() {
        let raw = "this is **bold** text";
        assert_eq!(post_process(raw), "This is **bold** text");
    }

    #[test]
    fn from_document_false_when_all_similarities_below_threshold() {
        let context = vec![retrieved(0.1, "some text long enough to pass quality floor check")];
        assert!(!is_from_document(&context, "a normal answer", 0.3));
    }

    #[test]
    fn from_document_false_when_context_empty() {
        assert!(!is_from_document(&[], "a normal answer", 0.3));
    }

    #[test]
    fn from_document_false_on_disclaiming_phrase() {
        let context = vec![retrieved(0.9, "some text long enough to pass quality floor check")];
        assert!(!is_from_document(
            &context,
            "This information is not mentioned in the uploaded materials.",
            0.3
        ));
    }

    #[test]
    fn from_document_true_when_grounded_and_no_disclaimer() {
        let context = vec![retrieved(0.9, "some text long enough to pass quality floor check")];
        assert!(is_from_document(&context, "Photosynthesis produces glucose.", 0.3));
    }
}
