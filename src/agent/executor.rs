//! Tool executor that dispatches tool calls to the [`ToolGateway`].
//!
//! Parses model-supplied arguments, calls the matching gateway function
//! and hands back the gateway envelope as the tool message content. Every
//! successful fetch is also recorded in a per-request transcript so the
//! collector can recover data the model failed to echo back.

use std::sync::Mutex;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::agent::config::{DEFAULT_ATTRACTIONS_TOP_K, DEFAULT_HOTELS_TOP_K, DEFAULT_VEHICLES_TOP_K};
use crate::core::{BudgetTier, EntityKind};
use crate::error::AgentError;
use crate::tools::{FetchRequest, ToolEnvelope, ToolGateway};

use super::tool::{ToolCall, ToolResult};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;
/// Default `top_k` for `semantic_search`.
const DEFAULT_SEARCH_TOP_K: usize = 5;

/// A successful fetch recorded during one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRecord {
    /// Kind fetched.
    pub kind: EntityKind,
    /// Envelope returned to the model.
    pub envelope: ToolEnvelope,
}

/// Executes tool calls against a gateway.
///
/// One executor serves one request; its transcript is discarded with it.
pub struct ToolExecutor<'a> {
    gateway: &'a ToolGateway,
    top_k: [usize; 3],
    transcript: Mutex<Vec<FetchRecord>>,
}

impl std::fmt::Debug for ToolExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutor")
            .field("top_k", &self.top_k)
            .field("recorded", &self.transcript().len())
            .finish_non_exhaustive()
    }
}

fn invalid_args(name: &str, e: &serde_json::Error) -> AgentError {
    AgentError::ToolExecution {
        name: name.to_string(),
        message: format!("invalid arguments: {e}"),
    }
}

fn parse_date(name: &str, field: &str, value: &str) -> Result<NaiveDate, AgentError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| AgentError::ToolExecution {
        name: name.to_string(),
        message: format!("invalid {field} '{value}': {e}"),
    })
}

fn parse_kind(name: &str, value: &str) -> Result<EntityKind, AgentError> {
    EntityKind::parse(value).ok_or_else(|| AgentError::ToolExecution {
        name: name.to_string(),
        message: format!("unknown kind '{value}' (expected hotel, attraction or vehicle)"),
    })
}

impl<'a> ToolExecutor<'a> {
    /// Creates a new executor over `gateway` with the default fetch limits.
    #[must_use]
    pub const fn new(gateway: &'a ToolGateway) -> Self {
        Self {
            gateway,
            top_k: [
                DEFAULT_HOTELS_TOP_K,
                DEFAULT_ATTRACTIONS_TOP_K,
                DEFAULT_VEHICLES_TOP_K,
            ],
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the fetch limits used when the model omits `top_k`.
    #[must_use]
    pub const fn with_top_k(mut self, hotels: usize, attractions: usize, vehicles: usize) -> Self {
        self.top_k = [hotels, attractions, vehicles];
        self
    }

    const fn default_top_k(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Hotel => self.top_k[0],
            EntityKind::Attraction => self.top_k[1],
            EntityKind::Vehicle => self.top_k[2],
        }
    }

    /// Successful fetches so far, in call order.
    #[must_use]
    pub fn transcript(&self) -> Vec<FetchRecord> {
        self.transcript
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Most recent successful fetch of `kind`.
    #[must_use]
    pub fn last_fetch(&self, kind: EntityKind) -> Option<ToolEnvelope> {
        self.transcript
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|r| r.kind == kind)
            .map(|r| r.envelope.clone())
    }

    fn record(&self, kind: EntityKind, envelope: &ToolEnvelope) {
        if envelope.success
            && let Ok(mut transcript) = self.transcript.lock()
        {
            transcript.push(FetchRecord {
                kind,
                envelope: envelope.clone(),
            });
        }
    }

    /// Dispatches a tool call and wraps the outcome for the model.
    ///
    /// Validates raw argument size before dispatch. Argument and dispatch
    /// errors are still returned as a failure envelope so the model can
    /// correct itself.
    #[must_use]
    pub fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return ToolResult {
                tool_call_id: call.id.clone(),
                content: ToolEnvelope::failure(format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ))
                .to_json_string(),
                is_error: true,
            };
        }

        match self.dispatch(&call.name, &call.arguments) {
            Ok(envelope) => ToolResult {
                tool_call_id: call.id.clone(),
                content: envelope.to_json_string(),
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: ToolEnvelope::failure(e.to_string()).to_json_string(),
                is_error: true,
            },
        }
    }

    /// Runs the named tool with JSON-encoded arguments.
    ///
    /// An empty argument string is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] for unknown tools or arguments
    /// that do not match the tool's schema. Gateway-level refusals are not
    /// errors; they come back as a failed envelope.
    pub fn dispatch(&self, name: &str, arguments: &str) -> Result<ToolEnvelope, AgentError> {
        let args = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        debug!(tool = name, "dispatching tool call");

        match name {
            "fetch_hotels" => self.tool_fetch(name, EntityKind::Hotel, args),
            "fetch_attractions" => self.tool_fetch(name, EntityKind::Attraction, args),
            "fetch_vehicles" => self.tool_fetch(name, EntityKind::Vehicle, args),
            "query_database" => self.tool_query_database(name, args),
            "get_price_ranges" => self.tool_get_price_ranges(name, args),
            "check_availability" => self.tool_check_availability(name, args),
            "semantic_search" => self.tool_semantic_search(name, args),
            other => Err(AgentError::ToolExecution {
                name: other.to_string(),
                message: "unknown tool".to_string(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Tool implementations
    // -----------------------------------------------------------------------

    fn tool_fetch(&self, name: &str, kind: EntityKind, args: &str) -> Result<ToolEnvelope, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            destination: String,
            budget: Option<String>,
            travelers: Option<u32>,
            interests: Option<String>,
            top_k: Option<usize>,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| invalid_args(name, &e))?;

        let request = FetchRequest {
            destination: args.destination,
            budget: args
                .budget
                .as_deref()
                .and_then(BudgetTier::parse)
                .unwrap_or_default(),
            travelers: args.travelers.unwrap_or(1).max(1),
            interests: args.interests.filter(|s| !s.trim().is_empty()),
            top_k: args.top_k.unwrap_or_else(|| self.default_top_k(kind)),
        };

        let envelope = self.gateway.fetch(kind, &request);
        self.record(kind, &envelope);
        Ok(envelope)
    }

    fn tool_query_database(&self, name: &str, args: &str) -> Result<ToolEnvelope, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            sql: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| invalid_args(name, &e))?;
        Ok(self.gateway.query_database(&args.sql))
    }

    fn tool_get_price_ranges(&self, name: &str, args: &str) -> Result<ToolEnvelope, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            destination: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| invalid_args(name, &e))?;
        Ok(self.gateway.get_price_ranges(&args.destination))
    }

    fn tool_check_availability(&self, name: &str, args: &str) -> Result<ToolEnvelope, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            kind: String,
            entity_id: i64,
            start_date: String,
            end_date: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| invalid_args(name, &e))?;

        let kind = parse_kind(name, &args.kind)?;
        let start = parse_date(name, "start_date", &args.start_date)?;
        let end = parse_date(name, "end_date", &args.end_date)?;
        Ok(self
            .gateway
            .check_availability(kind, args.entity_id, start, end))
    }

    fn tool_semantic_search(&self, name: &str, args: &str) -> Result<ToolEnvelope, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
            kind: Option<String>,
            top_k: Option<usize>,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| invalid_args(name, &e))?;

        let kind = args
            .kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| parse_kind(name, k))
            .transpose()?;
        Ok(self.gateway.semantic_search(
            &args.query,
            kind,
            args.top_k.unwrap_or(DEFAULT_SEARCH_TOP_K),
        ))
    }
}
