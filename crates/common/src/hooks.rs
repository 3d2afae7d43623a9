//! Hook input payload.
//!
//! The host assistant runs each hook as a child process and writes one JSON
//! object to its stdin. Only `prompt` matters for skill activation; every
//! other field is accepted and carried along untouched.

use std::path::PathBuf;

use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use crate::error::Result;

// ── HookEvent ───────────────────────────────────────────────────────────────

/// Lifecycle events the host assistant fires hooks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    SessionStart,
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    Stop,
    /// Any event this crate does not know about.
    #[serde(other)]
    Other,
}

// ── HookInput ───────────────────────────────────────────────────────────────

/// The JSON object read from stdin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub hook_event_name: Option<HookEvent>,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Fields this crate does not interpret (`transcript_path`, …).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HookInput {
    /// Parse the raw stdin contents. Blank input is an empty payload, not an
    /// error.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Build a payload carrying only a prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            hook_event_name: Some(HookEvent::UserPromptSubmit),
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// The prompt with surrounding whitespace removed, or `None` when absent
    /// or blank.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("")]
    #[case("   \n")]
    #[case("{}")]
    #[case(r#"{"session_id":"abc"}"#)]
    #[case(r#"{"prompt":"   "}"#)]
    fn payload_without_prompt(#[case] raw: &str) {
        let input = HookInput::parse(raw).unwrap();
        assert!(input.prompt().is_none());
    }

    #[test]
    fn parses_full_payload_and_keeps_unknown_fields() {
        let raw = r#"{
            "session_id": "s-1",
            "transcript_path": "/tmp/t.jsonl",
            "cwd": "/work/project",
            "hook_event_name": "UserPromptSubmit",
            "prompt": "  fix the borrow checker error  "
        }"#;
        let input = HookInput::parse(raw).unwrap();
        assert_eq!(input.session_id.as_deref(), Some("s-1"));
        assert_eq!(input.cwd, Some(PathBuf::from("/work/project")));
        assert_eq!(input.hook_event_name, Some(HookEvent::UserPromptSubmit));
        assert_eq!(input.prompt(), Some("fix the borrow checker error"));
        assert_eq!(input.extra["transcript_path"], "/tmp/t.jsonl");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(HookInput::parse("{not json").is_err());
    }
}
