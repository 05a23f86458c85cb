//! Agent trait definition.
//!
//! Both pipeline stages implement this trait. An agent owns its prompt and
//! sampling settings; the [`Brain`] it runs on is picked per call by the
//! router, so the same agent can be retried on another backend.

use async_trait::async_trait;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::router::Brain;
use super::tool::ToolDefinition;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
    /// Whether the output was cut off by the token limit.
    pub truncated: bool,
}

impl From<ChatResponse> for AgentResponse {
    fn from(response: ChatResponse) -> Self {
        let truncated = response.truncated();
        Self {
            truncated,
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        }
    }
}

/// Trait implemented by the pipeline agents.
///
/// Agents that call tools override [`Agent::tools`] and are run through
/// [`execute_with_tools`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        4096
    }

    /// Tool definitions available to this agent.
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Maximum tool-calling loop iterations before aborting.
    fn max_tool_iterations(&self) -> usize {
        6
    }

    /// Builds the initial request for `brain`.
    fn request(&self, brain: &Brain, user_msg: &str, tools: Vec<ToolDefinition>) -> ChatRequest {
        ChatRequest::for_brain(brain, self.system_prompt(), user_msg)
            .sampling(self.temperature(), self.max_tokens())
            .json_mode(self.json_mode())
            .with_tools(tools)
    }

    /// Executes the agent on `brain` with the given user message (no tools).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or response parsing errors.
    async fn execute(&self, brain: &Brain, user_msg: &str) -> Result<AgentResponse, AgentError> {
        let request = self.request(brain, user_msg, Vec::new());
        let response = brain.provider.chat(&request).await?;
        Ok(response.into())
    }
}

/// Executes an agent with tool-calling support.
///
/// If the agent's [`Agent::tools`] returns definitions, builds a tool-enabled
/// request and runs the agentic loop. Otherwise falls through to
/// [`Agent::execute`].
///
/// # Errors
///
/// Returns [`AgentError`] on API failures, tool execution errors,
/// or if the tool loop exceeds the agent's max iterations.
pub async fn execute_with_tools(
    agent: &dyn Agent,
    brain: &Brain,
    user_msg: &str,
    executor: &ToolExecutor<'_>,
) -> Result<AgentResponse, AgentError> {
    let tool_defs = agent.tools();

    if tool_defs.is_empty() {
        return agent.execute(brain, user_msg).await;
    }

    let mut request = agent.request(brain, user_msg, tool_defs);
    let response = super::agentic_loop::agentic_loop(
        brain.provider.as_ref(),
        &mut request,
        executor,
        agent.max_tool_iterations(),
    )
    .await?;

    Ok(response.into())
}
