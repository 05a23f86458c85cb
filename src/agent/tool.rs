//! Tool type definitions for function-calling.
//!
//! Provider-agnostic types for tool definitions, calls and results, plus the
//! JSON-schema definitions of the gateway tools exposed to backends.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match dispatch table in executor).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content: a gateway envelope as JSON text.
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// A set of tool definitions scoped to a pipeline stage.
///
/// - Stage-1 collector: the three fetch tools
/// - Interactive use (`tripforge tool`): every gateway tool
/// - Stage-2 formatter: none (receives the bundle in its prompt)
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Names of the tools in this set.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Tool set for the Stage-1 collector: `fetch_hotels`,
    /// `fetch_attractions`, `fetch_vehicles`.
    #[must_use]
    pub fn collector_tools() -> Self {
        Self {
            definitions: vec![def_fetch_hotels(), def_fetch_attractions(), def_fetch_vehicles()],
        }
    }

    /// Every gateway tool.
    #[must_use]
    pub fn gateway_tools() -> Self {
        Self {
            definitions: vec![
                def_fetch_hotels(),
                def_fetch_attractions(),
                def_fetch_vehicles(),
                def_query_database(),
                def_get_price_ranges(),
                def_check_availability(),
                def_semantic_search(),
            ],
        }
    }

    /// Empty tool set (no tools available).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tool schema definitions
// ---------------------------------------------------------------------------

/// Shared parameter schema of the three fetch tools.
fn fetch_parameters(top_k_default: usize) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "destination": {
                "type": "string",
                "description": "City to search, e.g. \"Luxor\"."
            },
            "budget": {
                "type": "string",
                "enum": ["budget", "mid-range", "luxury"],
                "description": "Budget tier; caps the price per item. Default: mid-range."
            },
            "travelers": {
                "type": "integer",
                "minimum": 1,
                "description": "Party size. Vehicles must seat everyone."
            },
            "interests": {
                "type": "string",
                "description": "Free-text interests used to rank results, e.g. \"history, food\"."
            },
            "top_k": {
                "type": "integer",
                "minimum": 1,
                "maximum": 50,
                "description": format!("Maximum results to return (default: {top_k_default}).")
            }
        },
        "required": ["destination"],
        "additionalProperties": false
    })
}

/// Defines the `fetch_hotels` tool.
fn def_fetch_hotels() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_hotels".to_string(),
        description: "Fetch hotels in a destination within a budget tier. Returns \
                      {success, data, error, alternative_suggestion}; data holds hotels with \
                      id, name, price, rating, images, latitude, longitude, features."
            .to_string(),
        parameters: fetch_parameters(5),
    }
}

/// Defines the `fetch_attractions` tool.
fn def_fetch_attractions() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_attractions".to_string(),
        description: "Fetch attractions in a destination within a budget tier, ranked by \
                      interest match. Same envelope as fetch_hotels; attractions also carry \
                      category and duration_hours."
            .to_string(),
        parameters: fetch_parameters(10),
    }
}

/// Defines the `fetch_vehicles` tool.
fn def_fetch_vehicles() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_vehicles".to_string(),
        description: "Fetch rental vehicles in a destination that seat the whole party and fit \
                      the budget tier. Vehicles carry capacity and vehicle_type."
            .to_string(),
        parameters: fetch_parameters(3),
    }
}

/// Defines the `query_database` tool.
fn def_query_database() -> ToolDefinition {
    ToolDefinition {
        name: "query_database".to_string(),
        description: "Run one read-only SELECT (or WITH ... SELECT) against the travel catalog. \
                      Allowed tables: Hotels, Attractions, Vehicles, Availability. Mutating \
                      statements, comments and multiple statements are refused."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "The SQL query."
                }
            },
            "required": ["sql"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `get_price_ranges` tool.
fn def_get_price_ranges() -> ToolDefinition {
    ToolDefinition {
        name: "get_price_ranges".to_string(),
        description: "Min, max and average price per entity kind in a destination.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "City name."
                }
            },
            "required": ["destination"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `check_availability` tool.
fn def_check_availability() -> ToolDefinition {
    ToolDefinition {
        name: "check_availability".to_string(),
        description: "Check whether a hotel, attraction or vehicle is available on every date \
                      of a range. Returns the unavailable dates."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["hotel", "attraction", "vehicle"],
                    "description": "Entity kind."
                },
                "entity_id": {
                    "type": "integer",
                    "description": "Catalog id of the entity."
                },
                "start_date": {
                    "type": "string",
                    "description": "First date, YYYY-MM-DD."
                },
                "end_date": {
                    "type": "string",
                    "description": "Last date, YYYY-MM-DD (inclusive)."
                }
            },
            "required": ["kind", "entity_id", "start_date", "end_date"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `semantic_search` tool.
fn def_semantic_search() -> ToolDefinition {
    ToolDefinition {
        name: "semantic_search".to_string(),
        description: "Free-text similarity search over all catalog entities, e.g. \
                      \"sunset boat ride\". Optionally restricted to one kind."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for."
                },
                "kind": {
                    "type": "string",
                    "enum": ["hotel", "attraction", "vehicle"],
                    "description": "Restrict results to one kind."
                },
                "top_k": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "description": "Maximum results (default: 5)."
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_tools() {
        let tools = ToolSet::collector_tools();
        assert_eq!(tools.len(), 3);
        assert_eq!(
            tools.names(),
            ["fetch_hotels", "fetch_attractions", "fetch_vehicles"]
        );
    }

    #[test]
    fn test_gateway_tools_have_object_schemas() {
        let tools = ToolSet::gateway_tools();
        assert_eq!(tools.len(), 7);
        for def in tools.definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(def.parameters["required"].is_array(), "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }

    #[test]
    fn test_fetch_schema_mentions_default_top_k() {
        let hotels = def_fetch_hotels();
        let text = hotels.parameters["properties"]["top_k"]["description"]
            .as_str()
            .unwrap_or_default();
        assert!(text.contains("default: 5"));
    }

    #[test]
    fn test_none_toolset() {
        let tools = ToolSet::none();
        assert!(tools.is_empty());
        assert_eq!(tools.len(), 0);
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = def_query_database();
        let json = serde_json::to_string(&def).unwrap_or_default();
        assert!(json.contains("query_database"));
        assert!(json.contains("sql"));
    }
}
