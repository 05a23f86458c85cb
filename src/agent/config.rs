//! Planner configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::agent::router::BackendId;
use crate::error::AgentError;

/// Default model for the `default` backend.
const DEFAULT_DEFAULT_MODEL: &str = "gpt-4o";
/// Default model for the `fast` backend.
const DEFAULT_FAST_MODEL: &str = "gpt-4o-mini";
/// Default model for the `smart` backend.
const DEFAULT_SMART_MODEL: &str = "gpt-4o";
/// Default Stage-1 max tokens.
const DEFAULT_COLLECTOR_MAX_TOKENS: u32 = 8192;
/// Default Stage-2 max tokens. Multi-day itineraries are long.
const DEFAULT_FORMATTER_MAX_TOKENS: u32 = 8192;
/// Default per-attempt timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 90;
/// Default maximum tool-calling loop iterations.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 6;
/// Default hotels fetched per trip.
pub const DEFAULT_HOTELS_TOP_K: usize = 5;
/// Default attractions fetched per trip.
pub const DEFAULT_ATTRACTIONS_TOP_K: usize = 10;
/// Default vehicles fetched per trip.
pub const DEFAULT_VEHICLES_TOP_K: usize = 3;

/// Configuration for the planning pipeline.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model behind the `default` backend (also the fallback target).
    pub default_model: String,
    /// Model behind the `fast` backend.
    pub fast_model: String,
    /// Model behind the `smart` backend.
    pub smart_model: String,
    /// Maximum tokens for Stage-1 responses.
    pub collector_max_tokens: u32,
    /// Maximum tokens for Stage-2 responses.
    pub formatter_max_tokens: u32,
    /// Per-attempt backend timeout.
    pub timeout: Duration,
    /// Maximum tool-calling loop iterations before aborting.
    pub max_tool_iterations: usize,
    /// Hotels requested from `fetch_hotels`.
    pub hotels_top_k: usize,
    /// Attractions requested from `fetch_attractions`.
    pub attractions_top_k: usize,
    /// Vehicles requested from `fetch_vehicles`.
    pub vehicles_top_k: usize,
    /// Directory containing prompt template files.
    ///
    /// Missing files fall back to the compiled-in prompts.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Model served by backend `id`.
    #[must_use]
    pub fn model_for(&self, id: BackendId) -> &str {
        match id {
            BackendId::Default => &self.default_model,
            BackendId::Fast => &self.fast_model,
            BackendId::Smart => &self.smart_model,
        }
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    default_model: Option<String>,
    fast_model: Option<String>,
    smart_model: Option<String>,
    collector_max_tokens: Option<u32>,
    formatter_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_tool_iterations: Option<usize>,
    hotels_top_k: Option<usize>,
    attractions_top_k: Option<usize>,
    vehicles_top_k: Option<usize>,
    prompt_dir: Option<PathBuf>,
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("TRIPFORGE_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("TRIPFORGE_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("TRIPFORGE_BASE_URL"))
                .ok();
        }
        if self.default_model.is_none() {
            self.default_model = std::env::var("TRIPFORGE_DEFAULT_MODEL").ok();
        }
        if self.fast_model.is_none() {
            self.fast_model = std::env::var("TRIPFORGE_FAST_MODEL").ok();
        }
        if self.smart_model.is_none() {
            self.smart_model = std::env::var("TRIPFORGE_SMART_MODEL").ok();
        }
        if self.timeout.is_none() {
            self.timeout = env_parsed("TRIPFORGE_TIMEOUT_SECS").map(Duration::from_secs);
        }
        if self.max_tool_iterations.is_none() {
            self.max_tool_iterations = env_parsed("TRIPFORGE_MAX_TOOL_ITERATIONS");
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("TRIPFORGE_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the `default` backend model.
    #[must_use]
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Sets the `fast` backend model.
    #[must_use]
    pub fn fast_model(mut self, model: impl Into<String>) -> Self {
        self.fast_model = Some(model.into());
        self
    }

    /// Sets the `smart` backend model.
    #[must_use]
    pub fn smart_model(mut self, model: impl Into<String>) -> Self {
        self.smart_model = Some(model.into());
        self
    }

    /// Sets the model for backend `id`.
    #[must_use]
    pub fn model(self, id: BackendId, model: impl Into<String>) -> Self {
        match id {
            BackendId::Default => self.default_model(model),
            BackendId::Fast => self.fast_model(model),
            BackendId::Smart => self.smart_model(model),
        }
    }

    /// Sets the Stage-1 max tokens.
    #[must_use]
    pub const fn collector_max_tokens(mut self, n: u32) -> Self {
        self.collector_max_tokens = Some(n);
        self
    }

    /// Sets the Stage-2 max tokens.
    #[must_use]
    pub const fn formatter_max_tokens(mut self, n: u32) -> Self {
        self.formatter_max_tokens = Some(n);
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum tool-calling loop iterations.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the per-kind fetch limits.
    #[must_use]
    pub const fn top_k(mut self, hotels: usize, attractions: usize, vehicles: usize) -> Self {
        self.hotels_top_k = Some(hotels);
        self.attractions_top_k = Some(attractions);
        self.vehicles_top_k = Some(vehicles);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            default_model: self
                .default_model
                .unwrap_or_else(|| DEFAULT_DEFAULT_MODEL.to_string()),
            fast_model: self
                .fast_model
                .unwrap_or_else(|| DEFAULT_FAST_MODEL.to_string()),
            smart_model: self
                .smart_model
                .unwrap_or_else(|| DEFAULT_SMART_MODEL.to_string()),
            collector_max_tokens: self
                .collector_max_tokens
                .unwrap_or(DEFAULT_COLLECTOR_MAX_TOKENS),
            formatter_max_tokens: self
                .formatter_max_tokens
                .unwrap_or(DEFAULT_FORMATTER_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS)
                .max(1),
            hotels_top_k: self.hotels_top_k.unwrap_or(DEFAULT_HOTELS_TOP_K).max(1),
            attractions_top_k: self
                .attractions_top_k
                .unwrap_or(DEFAULT_ATTRACTIONS_TOP_K)
                .max(1),
            vehicles_top_k: self.vehicles_top_k.unwrap_or(DEFAULT_VEHICLES_TOP_K).max(1),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.fast_model, DEFAULT_FAST_MODEL);
        assert_eq!(config.hotels_top_k, 5);
        assert_eq!(config.attractions_top_k, 10);
        assert_eq!(config.vehicles_top_k, 3);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_builder_model_by_backend() {
        let config = AgentConfig::builder()
            .api_key("key")
            .model(BackendId::Default, "general")
            .model(BackendId::Fast, "quick")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.default_model, "general");
        assert_eq!(config.fast_model, "quick");
        assert_eq!(config.smart_model, DEFAULT_SMART_MODEL);
    }

    #[test]
    fn test_builder_missing_api_key() {
        assert!(matches!(
            AgentConfig::builder().build(),
            Err(AgentError::ApiKeyMissing)
        ));
        assert!(AgentConfig::builder().api_key("  ").build().is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .smart_model("reasoner")
            .top_k(2, 0, 1)
            .max_tool_iterations(0)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.smart_model, "reasoner");
        assert_eq!(config.model_for(BackendId::Smart), "reasoner");
        assert_eq!(config.model_for(BackendId::Fast), DEFAULT_FAST_MODEL);
        assert_eq!(config.hotels_top_k, 2);
        assert_eq!(config.attractions_top_k, 1);
        assert_eq!(config.max_tool_iterations, 1);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
