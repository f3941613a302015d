//! LLM client layer.
//!
//! Every pipeline stage talks to the model through the [`LanguageModel`]
//! trait so tests can substitute scripted replies for the real client.

pub mod client;

pub use client::{ClientConfig, OpenAiClient};

use async_trait::async_trait;
use thiserror::Error;

/// System prompt shared by every analysis and quality-control call.
pub const REVIEWER_SYSTEM_PROMPT: &str =
    "You are an expert academic reviewer. Provide detailed analysis in JSON format.";

/// Errors from the model capability.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to API at {0}")]
    Connect(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to send request: {0}")]
    Transport(String),

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// A chat-completion capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends one system + user exchange and returns the assistant text.
    ///
    /// With `json_reply` set the model is constrained to emit a single
    /// JSON object; without it the reply is free text.
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        json_reply: bool,
    ) -> Result<String, LlmError>;
}

/// Extracts the outermost JSON object from a model reply.
///
/// Models occasionally wrap the object in prose or code fences; taking
/// the span from the first `{` to the last `}` recovers it.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_plain() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_extract_json_object_fenced() {
        let reply = "Here is the analysis:\n```json\n{\"score\": 4}\n```\nDone.";
        assert_eq!(extract_json_object(reply), Some("{\"score\": 4}"));
    }

    #[test]
    fn test_extract_json_object_nested() {
        let reply = r#"prefix {"outer": {"inner": 2}} suffix"#;
        assert_eq!(extract_json_object(reply), Some(r#"{"outer": {"inner": 2}}"#));
    }

    #[test]
    fn test_extract_json_object_missing() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
        assert_eq!(extract_json_object(""), None);
    }
}
