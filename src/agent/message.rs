//! Chat transcripts exchanged between the pipeline stages and a backend.
//!
//! A stage builds one [`ChatRequest`] per attempt with
//! [`ChatRequest::for_brain`], so a request retried on the fallback backend
//! carries that backend's model. During Stage-1 the tool loop grows the
//! transcript one tool round at a time and sums token usage across rounds.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::router::Brain;
use super::tool::{ToolCall, ToolDefinition, ToolResult};

/// Speaker of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Stage instructions.
    System,
    /// The trip request or bundle.
    User,
    /// Model output, possibly tool calls.
    Assistant,
    /// A gateway envelope answering one tool call.
    Tool,
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker.
    pub role: Role,
    /// Text; empty for an assistant turn that only calls tools.
    pub content: String,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Call answered by a `Tool` entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Stage instructions.
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::text(Role::System, content)
    }

    /// A user turn.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::text(Role::User, content)
    }

    /// An assistant turn consisting only of tool calls.
    #[must_use]
    pub const fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    /// The envelope returned for one tool call.
    #[must_use]
    pub fn tool_result(result: &ToolResult) -> Self {
        Self {
            role: Role::Tool,
            content: result.content.clone(),
            tool_calls: Vec::new(),
            tool_call_id: Some(result.tool_call_id.clone()),
        }
    }
}

/// A completion request for one backend.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model of the brain serving the request.
    pub model: String,
    /// Transcript so far.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Completion token limit.
    pub max_tokens: Option<u32>,
    /// Ask for a single JSON object.
    pub json_mode: bool,
    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    /// Starts a two-message transcript addressed to `brain`'s model.
    #[must_use]
    pub fn for_brain(brain: &Brain, system: &str, user: &str) -> Self {
        Self::for_model(&brain.model, vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    /// Starts a request for `model` with an existing transcript.
    #[must_use]
    pub fn for_model(model: &str, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.to_string(),
            messages,
            temperature: None,
            max_tokens: None,
            json_mode: false,
            tools: Vec::new(),
        }
    }

    /// Sets temperature and token limit.
    #[must_use]
    pub const fn sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = Some(temperature);
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Requests JSON-object output.
    #[must_use]
    pub const fn json_mode(mut self, on: bool) -> Self {
        self.json_mode = on;
        self
    }

    /// Offers `tools` to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Appends one tool round: the assistant's calls, then each result in
    /// call order.
    pub fn push_tool_round(&mut self, calls: Vec<ToolCall>, results: &[ToolResult]) {
        self.messages.push(ChatMessage::tool_calls(calls));
        self.messages
            .extend(results.iter().map(ChatMessage::tool_result));
    }

    /// Tool envelopes returned so far, oldest first.
    pub fn tool_outputs(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .map(|m| m.content.as_str())
    }
}

/// Token counts reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub prompt_tokens: u32,
    /// Completion tokens.
    pub completion_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(rhs.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(rhs.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
    }
}

/// A backend reply.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text.
    pub content: String,
    /// Usage for this reply, or for the whole tool loop when returned by it.
    pub usage: TokenUsage,
    /// Tool calls requested instead of (or alongside) text.
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped (`"stop"`, `"length"`, `"tool_calls"`).
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Returns `true` when the model wants tool results before answering.
    #[must_use]
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Returns `true` when the reply was cut off by the token limit.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}
