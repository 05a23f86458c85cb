//! Backend wiring: provider selection and router construction.
//!
//! Every logical backend (`default`, `fast`, `smart`) shares one transport
//! and differs only in the model it asks for. [`create_router`] resolves the
//! transport from the configured provider name and registers all three.

use std::sync::Arc;

use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::agent::router::{BackendId, Brain, BrainRouter};
use crate::error::AgentError;

/// Creates the transport named by `config.provider`.
///
/// Only `"openai"` (any OpenAI-compatible endpoint) is built in.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config))),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}

/// Builds a router with every backend bound to `provider` and the model
/// configured for it.
#[must_use]
pub fn router_over(config: &AgentConfig, provider: &Arc<dyn LlmProvider>) -> BrainRouter {
    let mut router = BrainRouter::new(
        Brain::new(
            BackendId::Default,
            Arc::clone(provider),
            config.model_for(BackendId::Default),
        ),
        config.timeout,
    );
    for id in BackendId::ALL {
        if id == BackendId::Default {
            continue;
        }
        router = router.with_brain(Brain::new(id, Arc::clone(provider), config.model_for(id)));
    }
    debug!(
        provider = provider.name(),
        default = config.model_for(BackendId::Default),
        fast = config.model_for(BackendId::Fast),
        smart = config.model_for(BackendId::Smart),
        timeout_secs = config.timeout.as_secs(),
        "backends registered"
    );
    router
}

/// Resolves the provider and builds the three-backend router.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_router(config: &AgentConfig) -> Result<BrainRouter, AgentError> {
    let provider = create_provider(config)?;
    Ok(router_over(config, &provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::router::tests::EchoProvider;

    fn config(provider: &str) -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .provider(provider)
            .model(BackendId::Default, "general")
            .model(BackendId::Fast, "quick")
            .model(BackendId::Smart, "planner")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_router_binds_configured_models() {
        let provider: Arc<dyn LlmProvider> = Arc::new(EchoProvider::new());
        let router = router_over(&config("openai"), &provider);
        for (id, model) in [
            (BackendId::Default, "general"),
            (BackendId::Fast, "quick"),
            (BackendId::Smart, "planner"),
        ] {
            let brain = router.brain(id).unwrap_or_else(|e| unreachable!("{e}"));
            assert_eq!(brain.id, id);
            assert_eq!(brain.model, model);
        }
    }

    #[test]
    fn test_create_router_for_openai() {
        let router = create_router(&config("openai")).unwrap_or_else(|e| unreachable!("{e}"));
        let smart = router.brain(BackendId::Smart).unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(smart.provider.name(), "openai");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = create_router(&config("carrier-pigeon"));
        assert!(matches!(result, Err(AgentError::UnsupportedProvider { name }) if name == "carrier-pigeon"));
    }
}
