//! Conversation turns as seen by memory blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Annotation key carrying the conversation session identifier.
pub const SESSION_ID_KEY: &str = "session_id";
/// Annotation key correlating a tool result with its tool call.
pub const TOOL_CALL_ID_KEY: &str = "tool_call_id";
/// Annotation key carrying the raw tool call list of an assistant turn.
pub const TOOL_CALLS_KEY: &str = "tool_calls";

/// Chat message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One content segment of a turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    Text {
        text: String,
    },
    Image {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Plain text of this segment, if it is a text segment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }
}

/// One conversational message.
///
/// Memory blocks only read turns during ingest and store derived strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    #[serde(default)]
    pub segments: Vec<ContentSegment>,
    /// Side-channel annotations (tool call descriptors, session ids, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Value>,
}

impl Turn {
    /// Create an empty turn with the given role
    pub fn new(role: Role) -> Self {
        Self {
            role,
            segments: Vec::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Create a user turn with a single text segment
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User).with_text(text)
    }

    /// Create an assistant turn with a single text segment
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant).with_text(text)
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_segment(ContentSegment::text(text))
    }

    pub fn with_segment(mut self, segment: ContentSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: Value) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }

    /// Iterate over the plain text segments, skipping other kinds.
    pub fn text_segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(ContentSegment::as_text)
    }

    /// Plain text segments joined with newlines.
    pub fn text(&self) -> String {
        self.text_segments().collect::<Vec<_>>().join("\n")
    }
}
