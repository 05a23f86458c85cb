//! Tool Gateway: narrow, read-only catalog functions for model backends.
//!
//! Every function returns a [`ToolEnvelope`]. Failures (refused queries,
//! storage errors, empty results) are reported inside the envelope and
//! never raised, so a model always receives a well-formed answer.

pub mod alternatives;
pub mod query_guard;

use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

pub use alternatives::AlternativeDestinations;
pub use query_guard::QueryGuard;

use crate::core::{BudgetTier, EntityKind, FetchedEntity};
use crate::search::{DEFAULT_MIN_SCORE, Embedder, VectorIndex, create_embedder};
use crate::storage::TravelCatalog;

/// Default row cap for catalog reads.
pub const DEFAULT_MAX_ROWS: usize = 100;
/// Upper bound on any requested `top_k`.
pub const MAX_TOP_K: usize = 50;

/// Immutable gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Tables a query may reference.
    pub allowed_tables: Vec<String>,
    /// Maximum rows read per call.
    pub max_rows: usize,
    /// Upper bound on `top_k` arguments.
    pub max_top_k: usize,
    /// Suggestions for empty fetch results.
    pub alternatives: AlternativeDestinations,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            allowed_tables: ["Hotels", "Attractions", "Vehicles", "Availability"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_rows: DEFAULT_MAX_ROWS,
            max_top_k: MAX_TOP_K,
            alternatives: AlternativeDestinations::default(),
        }
    }
}

/// Uniform JSON reply of every tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEnvelope {
    /// Whether the call produced usable data.
    pub success: bool,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Nearby destinations to try when nothing matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_suggestion: Option<String>,
}

impl ToolEnvelope {
    /// Successful reply carrying `data`.
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            alternative_suggestion: None,
        }
    }

    /// Failed reply.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            alternative_suggestion: None,
        }
    }

    /// Failed reply for an empty result, with a suggestion.
    #[must_use]
    pub fn empty(error: impl Into<String>, suggestion: String) -> Self {
        Self {
            alternative_suggestion: Some(suggestion),
            ..Self::failure(error)
        }
    }

    /// Serializes the envelope for a tool message.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"envelope serialization failed: {e}"}}"#)
        })
    }

    /// The envelope as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Arguments shared by the entity fetch tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Destination city.
    pub destination: String,
    /// Budget tier; caps prices per kind.
    pub budget: BudgetTier,
    /// Party size; vehicles must seat everyone when capacity is known.
    pub travelers: u32,
    /// Free-text interests; matching attractions rank first.
    pub interests: Option<String>,
    /// Maximum entities to return.
    pub top_k: usize,
}

impl FetchRequest {
    /// Request with default tier, one traveller and no interests.
    #[must_use]
    pub fn new(destination: impl Into<String>, top_k: usize) -> Self {
        Self {
            destination: destination.into(),
            budget: BudgetTier::default(),
            travelers: 1,
            interests: None,
            top_k,
        }
    }
}

fn matches_interests(entity: &FetchedEntity, interests: &[String]) -> bool {
    let core = entity.core();
    let mut haystack = core.name.to_lowercase();
    if let Some(d) = &core.description {
        haystack.push(' ');
        haystack.push_str(&d.to_lowercase());
    }
    if let FetchedEntity::Attraction(a) = entity
        && let Some(c) = &a.category
    {
        haystack.push(' ');
        haystack.push_str(&c.to_lowercase());
    }
    interests.iter().any(|i| haystack.contains(i.as_str()))
}

/// Read-only tool functions over a [`TravelCatalog`].
pub struct ToolGateway {
    catalog: Arc<dyn TravelCatalog>,
    guard: QueryGuard,
    config: GatewayConfig,
    embedder: Box<dyn Embedder>,
    index: OnceLock<VectorIndex>,
}

impl std::fmt::Debug for ToolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGateway")
            .field("config", &self.config)
            .field("index_built", &self.index.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ToolGateway {
    /// Creates a gateway over `catalog` with the default embedder.
    #[must_use]
    pub fn new(catalog: Arc<dyn TravelCatalog>, config: GatewayConfig) -> Self {
        Self {
            guard: QueryGuard::new(&config.allowed_tables),
            catalog,
            config,
            embedder: create_embedder(),
            index: OnceLock::new(),
        }
    }

    /// Gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fetches usable entities of `kind` for a destination.
    ///
    /// Drops entities with unset coordinates, non-positive prices, prices
    /// above the tier cap, and vehicles too small for the party. An empty
    /// result is a failure carrying an alternative-destination suggestion.
    #[must_use]
    pub fn fetch(&self, kind: EntityKind, request: &FetchRequest) -> ToolEnvelope {
        let destination = request.destination.trim();
        if destination.is_empty() {
            return ToolEnvelope::failure("destination is required");
        }

        let rows = match self
            .catalog
            .entities_at(kind, destination, self.config.max_rows)
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!(tool = "fetch", %kind, destination, error = %e, "catalog lookup failed");
                return ToolEnvelope::failure(format!("{kind} lookup failed: {e}"));
            }
        };

        let cap = request.budget.max_price(kind);
        let mut entities: Vec<FetchedEntity> = rows
            .iter()
            .filter_map(|row| FetchedEntity::from_value(kind, row))
            .filter(|e| e.core().is_usable())
            .filter(|e| cap.is_none_or(|max| e.core().price <= max))
            .filter(|e| match e {
                FetchedEntity::Vehicle(v) => v.capacity.is_none_or(|c| c >= request.travelers),
                _ => true,
            })
            .collect();

        let interests: Vec<String> = request
            .interests
            .as_deref()
            .unwrap_or_default()
            .split([',', ';'])
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !interests.is_empty() {
            // Stable: catalog order is kept within each group.
            entities.sort_by_key(|e| !matches_interests(e, &interests));
        }

        entities.truncate(request.top_k.clamp(1, self.config.max_top_k));
        debug!(tool = "fetch", %kind, destination, found = entities.len(), "fetch complete");

        if entities.is_empty() {
            return ToolEnvelope::empty(
                format!(
                    "no {} with valid price and location in {destination} for the {} tier",
                    kind.plural(),
                    request.budget
                ),
                self.config.alternatives.suggestion(kind, destination),
            );
        }

        let data: Vec<Value> = entities
            .iter()
            .filter_map(|e| match e {
                FetchedEntity::Hotel(h) => serde_json::to_value(h).ok(),
                FetchedEntity::Attraction(a) => serde_json::to_value(a).ok(),
                FetchedEntity::Vehicle(v) => serde_json::to_value(v).ok(),
            })
            .collect();
        ToolEnvelope::ok(Value::Array(data))
    }

    /// Fetches hotels.
    #[must_use]
    pub fn fetch_hotels(&self, request: &FetchRequest) -> ToolEnvelope {
        self.fetch(EntityKind::Hotel, request)
    }

    /// Fetches attractions.
    #[must_use]
    pub fn fetch_attractions(&self, request: &FetchRequest) -> ToolEnvelope {
        self.fetch(EntityKind::Attraction, request)
    }

    /// Fetches vehicles.
    #[must_use]
    pub fn fetch_vehicles(&self, request: &FetchRequest) -> ToolEnvelope {
        self.fetch(EntityKind::Vehicle, request)
    }

    /// Runs a validated read-only query.
    #[must_use]
    pub fn query_database(&self, sql: &str) -> ToolEnvelope {
        let statement = match self.guard.validate(sql) {
            Ok(s) => s,
            Err(e) => {
                warn!(tool = "query_database", error = %e, "query refused");
                return ToolEnvelope::failure(e.to_string());
            }
        };

        match self.catalog.run_read_only(&statement, self.config.max_rows) {
            Ok(result) => ToolEnvelope::ok(json!({
                "columns": result.columns,
                "row_count": result.rows.len(),
                "truncated": result.truncated,
                "rows": result.rows,
            })),
            Err(e) => {
                warn!(tool = "query_database", error = %e, "query failed");
                ToolEnvelope::failure(e.to_string())
            }
        }
    }

    /// Price statistics per entity kind at a destination.
    #[must_use]
    pub fn get_price_ranges(&self, destination: &str) -> ToolEnvelope {
        match self.catalog.price_ranges(destination) {
            Ok(ranges) if ranges.is_empty() => ToolEnvelope::empty(
                format!("no priced entities in {}", destination.trim()),
                self.config
                    .alternatives
                    .suggestion(EntityKind::Hotel, destination),
            ),
            Ok(ranges) => ToolEnvelope::ok(json!(ranges)),
            Err(e) => {
                warn!(tool = "get_price_ranges", destination, error = %e, "price lookup failed");
                ToolEnvelope::failure(e.to_string())
            }
        }
    }

    /// Availability of one entity over an inclusive date range.
    #[must_use]
    pub fn check_availability(
        &self,
        kind: EntityKind,
        entity_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ToolEnvelope {
        if end < start {
            return ToolEnvelope::failure("end date is before start date");
        }
        match self.catalog.availability(kind, entity_id, start, end) {
            Ok(Some(avail)) => ToolEnvelope::ok(json!(avail)),
            Ok(None) => ToolEnvelope::failure(format!("{kind} {entity_id} not found")),
            Err(e) => {
                warn!(tool = "check_availability", %kind, entity_id, error = %e, "availability lookup failed");
                ToolEnvelope::failure(e.to_string())
            }
        }
    }

    /// Free-text similarity search across the catalog.
    #[must_use]
    pub fn semantic_search(
        &self,
        query: &str,
        kind: Option<EntityKind>,
        top_k: usize,
    ) -> ToolEnvelope {
        if query.trim().is_empty() {
            return ToolEnvelope::failure("query is required");
        }
        let index = match self.index() {
            Ok(index) => index,
            Err(e) => {
                warn!(tool = "semantic_search", error = %e, "index build failed");
                return ToolEnvelope::failure(format!("search index unavailable: {e}"));
            }
        };

        let hits = index.search(
            self.embedder.as_ref(),
            query,
            kind,
            top_k.clamp(1, self.config.max_top_k),
            DEFAULT_MIN_SCORE,
        );
        if hits.is_empty() {
            return ToolEnvelope::failure(format!("no matches for '{}'", query.trim()));
        }
        ToolEnvelope::ok(json!(hits))
    }

    /// Returns the search index, building it on first use.
    fn index(&self) -> Result<&VectorIndex, crate::error::StorageError> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = VectorIndex::build(self.catalog.as_ref(), self.embedder.as_ref())?;
        debug!(entries = built.len(), "search index built");
        Ok(self.index.get_or_init(|| built))
    }
}

/// Gateway over a seeded in-memory demo catalog, for tests.
#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) fn demo_gateway() -> ToolGateway {
    let catalog = crate::storage::SqliteCatalog::in_memory().unwrap_or_else(|e| panic!("{e}"));
    catalog.init().unwrap_or_else(|e| panic!("{e}"));
    catalog.seed_demo().unwrap_or_else(|e| panic!("{e}"));
    ToolGateway::new(Arc::new(catalog), GatewayConfig::default())
}
