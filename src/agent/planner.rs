//! Top-level trip planner.
//!
//! Runs the two-stage pipeline and converts every failure into a degraded
//! plan:
//!
//! ```text
//! TripCriteria ─► DataCollector (smart) ─► Stage1Bundle
//!                      │ err / no data           │
//!                      ▼                         ▼
//!                 static_plan       PresentationFormatter (fast) ─► text
//!                                                │ err            │
//!                                                ▼                ▼
//!                                           bundle_plan ◄─ err ─ assemble ─► ItineraryPlan
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::assembler::assemble;
use super::client::create_router;
use super::collector::DataCollector;
use super::config::AgentConfig;
use super::fallback::{bundle_plan, invalid_request_plan, static_plan};
use super::formatter::PresentationFormatter;
use super::prompt::PromptSet;
use super::router::BrainRouter;
use crate::core::{ItineraryPlan, TripCriteria};
use crate::error::AgentError;
use crate::tools::ToolGateway;

/// Message used when the caller cancels a request.
const CANCELLED_MESSAGE: &str = "trip planning was cancelled";

/// Entry point of the planning engine.
pub struct TripPlanner {
    router: BrainRouter,
    gateway: Arc<ToolGateway>,
    collector: DataCollector,
    formatter: PresentationFormatter,
}

impl TripPlanner {
    /// Assembles a planner from its parts.
    #[must_use]
    pub fn new(
        config: &AgentConfig,
        router: BrainRouter,
        gateway: Arc<ToolGateway>,
        prompts: PromptSet,
    ) -> Self {
        Self {
            router,
            gateway,
            collector: DataCollector::new(config, prompts.collector),
            formatter: PresentationFormatter::new(config, prompts.formatter),
        }
    }

    /// Builds a planner with the configured provider behind every backend.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for unknown providers.
    pub fn from_config(config: &AgentConfig, gateway: Arc<ToolGateway>) -> Result<Self, AgentError> {
        let router = create_router(config)?;
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self::new(config, router, gateway, prompts))
    }

    /// Runs both stages for validated `criteria`.
    ///
    /// Stage failures degrade to fallback plans; the returned plan always
    /// conforms to the itinerary contract.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Cancelled`] if `cancel` fires. No other error
    /// escapes.
    pub async fn plan(
        &self,
        criteria: &TripCriteria,
        cancel: &CancellationToken,
    ) -> Result<ItineraryPlan, AgentError> {
        let destination = criteria.destination();

        let bundle = match self
            .collector
            .collect(&self.router, &self.gateway, criteria, cancel)
            .await
        {
            Ok(bundle) => bundle,
            Err(AgentError::Cancelled) => return Err(AgentError::Cancelled),
            Err(e) => {
                warn!(
                    stage = "collector",
                    destination,
                    kind = e.failure_kind(),
                    error = %e,
                    "data collection failed, returning static plan"
                );
                return Ok(static_plan(criteria, &format!("data collection failed: {e}")));
            }
        };

        if !bundle.success {
            let reason = bundle
                .failure_reason
                .as_deref()
                .unwrap_or(crate::core::NO_DATA_REASON);
            return Ok(static_plan(
                criteria,
                &format!("no travel data found for {destination}: {reason}"),
            ));
        }

        let raw = match self
            .formatter
            .format(&self.router, &bundle, criteria, cancel)
            .await
        {
            Ok(raw) => raw,
            Err(AgentError::Cancelled) => return Err(AgentError::Cancelled),
            Err(e) => {
                warn!(
                    stage = "formatter",
                    destination,
                    kind = e.failure_kind(),
                    error = %e,
                    "formatting failed, returning bundle plan"
                );
                return Ok(bundle_plan(
                    &bundle,
                    criteria,
                    &format!("itinerary formatting failed: {e}"),
                ));
            }
        };

        match assemble(&raw, &bundle, criteria) {
            Ok(plan) => {
                info!(
                    destination,
                    days = plan.itinerary.len(),
                    total = plan.estimated_costs.total,
                    "trip plan ready"
                );
                Ok(plan)
            }
            Err(e) => {
                warn!(
                    stage = "assembler",
                    destination,
                    error = %e,
                    "formatter output unusable, returning bundle plan"
                );
                Ok(bundle_plan(
                    &bundle,
                    criteria,
                    "the itinerary could not be formatted; showing a basic plan built from available options",
                ))
            }
        }
    }

    /// Plans a trip from raw request fields. Never fails.
    ///
    /// `criteria` is free text such as `"mid-range, history, food"`; see
    /// [`TripCriteria::from_free_text`].
    pub async fn generate_trip_plan(
        &self,
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        travelers: u32,
        criteria: &str,
    ) -> ItineraryPlan {
        self.generate_trip_plan_with_cancel(
            destination,
            start_date,
            end_date,
            travelers,
            criteria,
            &CancellationToken::new(),
        )
        .await
    }

    /// Like [`TripPlanner::generate_trip_plan`], with a cancellation signal.
    ///
    /// A cancelled request yields a static plan labeled as cancelled.
    pub async fn generate_trip_plan_with_cancel(
        &self,
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        travelers: u32,
        criteria: &str,
        cancel: &CancellationToken,
    ) -> ItineraryPlan {
        let criteria =
            match TripCriteria::from_free_text(destination, start_date, end_date, travelers, criteria) {
                Ok(c) => c,
                Err(e) => {
                    warn!(destination, error = %e, "rejected trip request");
                    return invalid_request_plan(
                        destination,
                        &start_date.to_string(),
                        &end_date.to_string(),
                        travelers,
                        &e.to_string(),
                    );
                }
            };

        match self.plan(&criteria, cancel).await {
            Ok(plan) => plan,
            Err(e) => {
                info!(destination, error = %e, "trip planning stopped");
                static_plan(&criteria, CANCELLED_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::collector::tests::ScriptedCollector;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::agent::provider::LlmProvider;
    use crate::agent::router::tests::{EchoProvider, FailingProvider};
    use crate::agent::router::{BackendId, Brain};
    use crate::tools::demo_gateway;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Returns the same text on every call.
    struct FixedProvider {
        content: String,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(content: impl Into<String>) -> Self {
            Self {
                content: content.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChatResponse {
                content: self.content.clone(),
                usage: TokenUsage::default(),
                tool_calls: Vec::new(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    fn config() -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn planner(default: Arc<dyn LlmProvider>, fast: Arc<dyn LlmProvider>, smart: Arc<dyn LlmProvider>) -> TripPlanner {
        let router = BrainRouter::new(Brain::new(BackendId::Default, default, "d"), Duration::from_secs(5))
            .with_brain(Brain::new(BackendId::Fast, fast, "f"))
            .with_brain(Brain::new(BackendId::Smart, smart, "s"));
        TripPlanner::new(&config(), router, Arc::new(demo_gateway()), PromptSet::defaults())
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap_or_default()
    }

    /// Formatter reply with zero totals, (0,0) coordinates and two days.
    fn weak_formatter_reply() -> String {
        json!({
            "trip_overview": {"destination": "Luxor", "duration_days": 3},
            "estimated_costs": {"accommodation": 0, "vehicle": 0, "activities": 0, "total": 0, "currency": "USD"},
            "lodging_recommendations": [],
            "itinerary": [
                {"day": 1, "title": "East Bank", "activities": [
                    {"time": "09:00", "name": "Karnak Temple", "latitude": 0, "longitude": 0, "price": 20}
                ], "meals": ["Hotel buffet", "Sofra", "1886 Restaurant"]},
                {"day": 2, "title": "West Bank", "activities": [
                    {"time": "08:00", "name": "Made-up Balloon Ride", "latitude": 0, "longitude": 0}
                ], "meals": {"breakfast": "", "lunch": "", "dinner": ""}}
            ],
            "travel_tips": ["Bring a hat"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_luxor_end_to_end() {
        let default = Arc::new(FailingProvider::new("unused", None));
        let planner = planner(
            default.clone(),
            Arc::new(FixedProvider::new(weak_formatter_reply())),
            Arc::new(ScriptedCollector::echoing()),
        );

        let plan = planner
            .generate_trip_plan("Luxor", date(10), date(12), 2, "mid-range, history")
            .await;

        assert!(plan.success, "unexpected failure: {:?}", plan.error_message);
        assert_eq!(plan.itinerary.len(), 3);
        assert!(plan.estimated_costs.total > 0.0);
        assert!(!plan.lodging_recommendations.is_empty());
        assert!(plan.coordinates_valid());
        assert!(plan.activities().all(|a| a.name != "Made-up Balloon Ride"));
        assert_eq!(plan.itinerary[0].meals.lunch, "Sofra");
        assert_eq!(plan.itinerary[2].date, "2026-03-12");
        assert_eq!(default.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_data_returns_static_plan() {
        let echo: Arc<dyn LlmProvider> = Arc::new(EchoProvider::new());
        let fast = Arc::new(FixedProvider::new("{}"));
        let planner = planner(Arc::clone(&echo), fast.clone(), Arc::clone(&echo));

        let plan = planner
            .generate_trip_plan("Atlantis", date(10), date(12), 2, "")
            .await;

        assert!(!plan.success);
        assert!(plan.error_message.as_deref().is_some_and(|m| !m.is_empty()));
        assert!(plan.itinerary.is_empty());
        assert!(!plan.travel_tips.is_empty());
        assert_eq!(fast.calls.load(Ordering::SeqCst), 0);

        let json = serde_json::to_value(&plan).unwrap_or_default();
        assert_eq!(json["itinerary"], json!([]));
    }

    #[tokio::test]
    async fn test_collector_backends_exhausted_skips_formatter() {
        let default = Arc::new(FailingProvider::new("default unavailable", Some(503)));
        let smart = Arc::new(FailingProvider::new("smart timed out", None));
        let fast = Arc::new(FixedProvider::new(weak_formatter_reply()));
        let planner = planner(default.clone(), fast.clone(), smart.clone());

        let plan = planner
            .generate_trip_plan("Luxor", date(10), date(12), 2, "mid-range")
            .await;

        assert!(!plan.success);
        let message = plan.error_message.unwrap_or_default();
        assert!(message.contains("smart timed out"));
        assert!(message.contains("default unavailable"));
        assert!(plan.itinerary.is_empty());
        assert_eq!(smart.calls.load(Ordering::SeqCst), 1);
        assert_eq!(default.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fast.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_formatter_garbage_returns_bundle_plan() {
        let planner = planner(
            Arc::new(FixedProvider::new("still not json")),
            Arc::new(FixedProvider::new("Sorry, here is a poem instead.")),
            Arc::new(ScriptedCollector::echoing()),
        );

        let plan = planner
            .generate_trip_plan("Luxor", date(10), date(12), 2, "mid-range")
            .await;

        assert!(!plan.success);
        assert_eq!(plan.itinerary.len(), 3);
        assert!(plan.estimated_costs.total > 0.0);
        assert!(plan.coordinates_valid());
    }

    #[tokio::test]
    async fn test_formatter_backends_exhausted_returns_bundle_plan() {
        let planner = planner(
            Arc::new(FailingProvider::new("default down", Some(500))),
            Arc::new(FailingProvider::new("fast rate limited", Some(429))),
            Arc::new(ScriptedCollector::echoing()),
        );
        let criteria = TripCriteria::from_free_text("Luxor", date(10), date(11), 2, "")
            .unwrap_or_else(|_| unreachable!());

        let plan = planner
            .plan(&criteria, &CancellationToken::new())
            .await
            .unwrap_or_else(|e| panic!("plan failed: {e}"));

        assert!(!plan.success);
        let message = plan.error_message.unwrap_or_default();
        assert!(message.contains("fast rate limited"));
        assert!(message.contains("default down"));
        assert_eq!(plan.itinerary.len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_propagates_from_plan() {
        let smart = Arc::new(ScriptedCollector::echoing());
        let planner = planner(
            Arc::new(EchoProvider::new()),
            Arc::new(EchoProvider::new()),
            smart.clone(),
        );
        let criteria = TripCriteria::from_free_text("Luxor", date(10), date(12), 2, "")
            .unwrap_or_else(|_| unreachable!());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = planner.plan(&criteria, &cancel).await;
        assert!(matches!(result, Err(AgentError::Cancelled)));

        let plan = planner
            .generate_trip_plan_with_cancel("Luxor", date(10), date(12), 2, "", &cancel)
            .await;
        assert!(!plan.success);
        assert_eq!(plan.error_message.as_deref(), Some(CANCELLED_MESSAGE));
    }

    #[tokio::test]
    async fn test_long_trip_gets_every_day() {
        let planner = planner(
            Arc::new(FailingProvider::new("unused", None)),
            Arc::new(FixedProvider::new(weak_formatter_reply())),
            Arc::new(ScriptedCollector::echoing()),
        );
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap_or_default();

        let plan = planner.generate_trip_plan("Luxor", start, end, 2, "mid-range").await;

        assert!(plan.success, "unexpected failure: {:?}", plan.error_message);
        assert_eq!(plan.itinerary.len(), 36);
        assert_eq!(plan.trip_overview.duration_days, 36);
        assert_eq!(plan.itinerary[35].date, "2026-02-05");
        assert!(plan.coordinates_valid());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_itinerary_length_matches_trip_days(offset in 0u64..365, days in 1u64..90) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap_or_else(|_| unreachable!());
            let planner = planner(
                Arc::new(FailingProvider::new("unused", None)),
                Arc::new(FixedProvider::new(weak_formatter_reply())),
                Arc::new(ScriptedCollector::echoing()),
            );
            let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default() + chrono::Days::new(offset);
            let end = start + chrono::Days::new(days - 1);

            let plan = rt.block_on(planner.generate_trip_plan("Luxor", start, end, 2, "mid-range"));

            prop_assert_eq!(u64::try_from(plan.itinerary.len()).unwrap_or(u64::MAX), days);
            prop_assert!(plan.coordinates_valid());
        }
    }

    #[tokio::test]
    async fn test_invalid_request_never_errors() {
        let echo: Arc<dyn LlmProvider> = Arc::new(EchoProvider::new());
        let planner = planner(Arc::clone(&echo), Arc::clone(&echo), echo);

        let plan = planner
            .generate_trip_plan("Luxor", date(12), date(10), 2, "")
            .await;
        assert!(!plan.success);
        assert!(plan.error_message.is_some());
        assert!(plan.itinerary.is_empty());
    }
}
