//! Question-type classification by priority-ordered pattern matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// The seven closed question-type tags, used to pick a prompt's
/// formatting instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    List,
    Definition,
    Comparison,
    How,
    Why,
    What,
    General,
}

impl QuestionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Definition => "definition",
            Self::Comparison => "comparison",
            Self::How => "how",
            Self::Why => "why",
            Self::What => "what",
            Self::General => "general",
        }
    }
}

/// Lowercases and strips diacritics so matching is accent-insensitive
/// (e.g. "différence" matches the same rules as "difference").
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Classifies a raw user question into one of the seven tags, first match
/// wins in priority order.
#[must_use]
pub fn classify(question: &str) -> QuestionType {
    let folded = fold(question);
    let trimmed = folded.trim();

    if trimmed.contains("what are")
        || trimmed.starts_with("list ")
        || trimmed.contains("list ")
        || trimmed.contains("name ")
        || trimmed.contains("enumerate")
    {
        return QuestionType::List;
    }

    if trimmed.contains("difference between")
        || trimmed.contains("compare")
        || trimmed.contains("contrast")
        || trimmed.contains(" vs")
    {
        return QuestionType::Comparison;
    }

    if trimmed.contains("what is") || trimmed.contains("define") || trimmed.contains("explain what") {
        return QuestionType::Definition;
    }

    if trimmed.starts_with("how") {
        return QuestionType::How;
    }

    if trimmed.starts_with("why") || trimmed.contains("what causes") {
        return QuestionType::Why;
    }

    if trimmed.starts_with("what") {
        return QuestionType::What;
    }

    QuestionType::General
}
