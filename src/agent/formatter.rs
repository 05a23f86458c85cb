//! Stage-2 presentation formatter.
//!
//! Turns a [`Stage1Bundle`] into the itinerary JSON contract. Runs on the
//! `fast` backend in JSON mode with no tools; everything it needs is
//! embedded in the user message.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::AgentConfig;
use super::prompt::build_formatter_prompt;
use super::router::{BackendId, BrainRouter};
use super::traits::Agent;
use crate::core::{Stage1Bundle, TripCriteria};
use crate::error::AgentError;

/// Agent that renders the itinerary JSON.
pub struct PresentationFormatter {
    system_prompt: String,
    max_tokens: u32,
}

impl PresentationFormatter {
    /// Creates a formatter with the given configuration and system prompt.
    #[must_use]
    pub const fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            system_prompt,
            max_tokens: config.formatter_max_tokens,
        }
    }

    /// Runs Stage-2 and returns the model's raw text.
    ///
    /// The text is not validated here; see
    /// [`assemble`](super::assembler::assemble).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Cancelled`] on cancellation, or the router's
    /// error when every backend attempt failed.
    pub async fn format(
        &self,
        router: &BrainRouter,
        bundle: &Stage1Bundle,
        criteria: &TripCriteria,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        let user_msg = build_formatter_prompt(bundle, criteria);
        let user_msg = user_msg.as_str();

        let text = router
            .invoke_with_fallback(
                BackendId::Fast,
                "stage2_format",
                |brain| {
                    Box::pin(async move {
                        let response = self.execute(brain, user_msg).await?;
                        if response.truncated {
                            warn!(
                                stage = "formatter",
                                backend = %brain.id,
                                max_tokens = self.max_tokens,
                                "formatter output hit the token limit"
                            );
                        }
                        debug!(
                            stage = "formatter",
                            backend = %brain.id,
                            completion_tokens = response.usage.completion_tokens,
                            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
                            "formatter finished"
                        );
                        Ok(response.content)
                    })
                },
                cancel,
            )
            .await?;
        Ok(text)
    }
}

#[async_trait]
impl Agent for PresentationFormatter {
    fn name(&self) -> &'static str {
        "formatter"
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        0.2
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::agent::provider::LlmProvider;
    use crate::agent::router::Brain;
    use crate::agent::router::tests::EchoProvider;
    use crate::core::BudgetTier;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records the last request it saw.
    struct RecordingProvider {
        seen: Mutex<Option<ChatRequest>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = Some(request.clone());
            }
            Ok(ChatResponse {
                content: r#"{"success": true}"#.to_string(),
                usage: TokenUsage::default(),
                tool_calls: Vec::new(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    fn criteria() -> TripCriteria {
        TripCriteria::new(
            "Luxor",
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap_or_default(),
            NaiveDate::from_ymd_opt(2026, 3, 13).unwrap_or_default(),
            2,
            Vec::new(),
            BudgetTier::MidRange,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn test_format_uses_fast_backend_in_json_mode() {
        let recorder = Arc::new(RecordingProvider {
            seen: Mutex::new(None),
        });
        let router = BrainRouter::new(
            Brain::new(BackendId::Default, Arc::new(EchoProvider::new()), "d"),
            Duration::from_secs(5),
        )
        .with_brain(Brain::new(BackendId::Fast, recorder.clone(), "fast-model"));
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let formatter = PresentationFormatter::new(&config, "format".to_string());

        let text = formatter
            .format(&router, &Stage1Bundle::default(), &criteria(), &CancellationToken::new())
            .await
            .unwrap_or_else(|e| panic!("format failed: {e}"));
        assert_eq!(text, r#"{"success": true}"#);

        let seen = recorder
            .seen
            .lock()
            .ok()
            .and_then(|s| s.clone())
            .unwrap_or_else(|| panic!("no request recorded"));
        assert_eq!(seen.model, "fast-model");
        assert!(seen.json_mode);
        assert!(seen.tools.is_empty());
        assert!(seen.messages[1].content.contains("exactly 4 days"));
    }
}
