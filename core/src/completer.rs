//! Text completion provider boundary.
//!
//! A completer turns a prompt into free-form text. It is the seam every
//! generation and QA routine in `studyforge-generation`/`studyforge-quiz`
//! calls through — none of them know or care whether the concrete
//! implementation talks to a hosted model, a local one, or (in tests) a
//! canned responder.

use async_trait::async_trait;

use crate::error::Result;

/// Produces free-form text completions from a prompt.
///
/// Implementations should apply their own upstream timeout internally or
/// leave that to the caller via `tokio::time::timeout`; either is fine as
/// long as a hung upstream eventually surfaces as
/// [`CoreError::UpstreamTimeout`](crate::error::CoreError::UpstreamTimeout).
#[async_trait]
pub trait Completer: Send + Sync {
    /// Completes `prompt`, returning the model's raw text response.
    async fn complete(&self, prompt: &str) -> Result<String>;
}


#[cfg(test)]
mod tests {
    use super::test_support::{EchoCompleter, ScriptedCompleter};
    use super::*;

    #[tokio::test]
    async fn echo_completer_ignores_prompt() {
        let c = EchoCompleter {
            response: "fixed".into(),
        };
        assert_eq!(c.complete("anything").await.unwrap(), "fixed");
        assert_eq!(c.complete("anything else").await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn scripted_completer_drains_in_order() {
        let c = ScriptedCompleter::new(vec!["first".into(), "second".into()]);
        assert_eq!(c.complete("p").await.unwrap(), "first");
        assert_eq!(c.complete("p").await.unwrap(), "second");
        assert!(c.complete("p").await.is_err());
    }
}
