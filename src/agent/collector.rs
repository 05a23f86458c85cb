//! Stage-1 data collector.
//!
//! Runs a tool-calling agent on the `smart` backend that fetches hotels,
//! attractions and vehicles for the trip and echoes the raw results. The
//! echoed JSON is parsed into a [`Stage1Bundle`]; any category the model
//! dropped or mangled is recovered from the executor's fetch transcript.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::AgentConfig;
use super::executor::ToolExecutor;
use super::normalizer::json_payload;
use super::prompt::{FetchLimits, build_collector_prompt};
use super::router::{BackendId, BrainRouter};
use super::tool::{ToolDefinition, ToolSet};
use super::traits::{Agent, execute_with_tools};
use crate::core::bundle::{attractions_from_result, hotels_from_result, vehicles_from_result};
use crate::core::{EntityKind, Stage1Bundle, TripCriteria};
use crate::error::AgentError;
use crate::tools::ToolGateway;

/// Keys under which the model may return each category.
const fn result_keys(kind: EntityKind) -> [&'static str; 2] {
    match kind {
        EntityKind::Hotel => ["hotels", "fetch_hotels"],
        EntityKind::Attraction => ["attractions", "fetch_attractions"],
        EntityKind::Vehicle => ["vehicles", "fetch_vehicles"],
    }
}

/// Agent that gathers catalog data through the fetch tools.
pub struct DataCollector {
    system_prompt: String,
    max_tokens: u32,
    max_tool_iterations: usize,
    limits: FetchLimits,
}

impl DataCollector {
    /// Creates a collector with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            system_prompt,
            max_tokens: config.collector_max_tokens,
            max_tool_iterations: config.max_tool_iterations,
            limits: FetchLimits {
                hotels: config.hotels_top_k,
                attractions: config.attractions_top_k,
                vehicles: config.vehicles_top_k,
            },
        }
    }

    /// Runs Stage-1 for `criteria` on the `smart` backend.
    ///
    /// Each backend attempt gets a fresh executor, so a retry rebuilds the
    /// bundle from scratch. An empty result is not an error: the returned
    /// bundle has `success == false` and the no-data reason.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Cancelled`] on cancellation, or the router's
    /// error when every backend attempt failed.
    pub async fn collect(
        &self,
        router: &BrainRouter,
        gateway: &ToolGateway,
        criteria: &TripCriteria,
        cancel: &CancellationToken,
    ) -> Result<Stage1Bundle, AgentError> {
        let user_msg = build_collector_prompt(criteria, self.limits);
        let user_msg = user_msg.as_str();
        let limits = self.limits;

        let bundle = router
            .invoke_with_fallback(
                BackendId::Smart,
                "stage1_collect",
                |brain| {
                    Box::pin(async move {
                        let executor = ToolExecutor::new(gateway).with_top_k(
                            limits.hotels,
                            limits.attractions,
                            limits.vehicles,
                        );
                        let response = execute_with_tools(self, brain, user_msg, &executor).await?;
                        debug!(
                            stage = "collector",
                            backend = %brain.id,
                            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
                            fetches = executor.transcript().len(),
                            "collector finished"
                        );
                        Ok(bundle_from_output(&response.content, &executor))
                    })
                },
                cancel,
            )
            .await?;

        if bundle.success {
            info!(
                stage = "collector",
                destination = criteria.destination(),
                hotels = bundle.hotels.len(),
                attractions = bundle.attractions.len(),
                vehicles = bundle.vehicles.len(),
                "stage 1 complete"
            );
        } else {
            warn!(
                stage = "collector",
                destination = criteria.destination(),
                reason = bundle.failure_reason.as_deref().unwrap_or_default(),
                "stage 1 returned no data"
            );
        }
        Ok(bundle)
    }
}

/// Parses the collector's final text as a JSON object, tolerating code fences.
#[must_use]
pub fn parse_collector_output(content: &str) -> Option<Value> {
    serde_json::from_str::<Value>(json_payload(content))
        .ok()
        .filter(Value::is_object)
}

/// Builds the bundle from the model's echo, backfilling from the transcript.
///
/// A category counts as missing when its key is absent, null, failed or
/// yields no usable entities.
#[must_use]
pub fn bundle_from_output(content: &str, executor: &ToolExecutor<'_>) -> Stage1Bundle {
    let parsed = parse_collector_output(content);
    if parsed.is_none() && !content.trim().is_empty() {
        debug!(stage = "collector", "final text is not a JSON object, using transcript");
    }

    let echoed = |kind: EntityKind| -> Option<&Value> {
        let obj = parsed.as_ref()?.as_object()?;
        result_keys(kind).iter().find_map(|k| obj.get(*k))
    };
    let recorded = |kind: EntityKind| executor.last_fetch(kind).map(|e| e.to_value());

    let mut hotels = hotels_from_result(echoed(EntityKind::Hotel));
    if hotels.is_empty() {
        hotels = hotels_from_result(recorded(EntityKind::Hotel).as_ref());
    }
    let mut attractions = attractions_from_result(echoed(EntityKind::Attraction));
    if attractions.is_empty() {
        attractions = attractions_from_result(recorded(EntityKind::Attraction).as_ref());
    }
    let mut vehicles = vehicles_from_result(echoed(EntityKind::Vehicle));
    if vehicles.is_empty() {
        vehicles = vehicles_from_result(recorded(EntityKind::Vehicle).as_ref());
    }

    Stage1Bundle::from_lists(hotels, attractions, vehicles)
}

#[async_trait]
impl Agent for DataCollector {
    fn name(&self) -> &'static str {
        "collector"
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        ToolSet::collector_tools().definitions().to_vec()
    }

    fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }
}
