//! Trip-planning pipeline over interchangeable LLM backends.
//!
//! Two agents run strictly in sequence behind a [`BrainRouter`] that falls
//! back to the `default` backend when a stage's preferred backend fails.
//!
//! # Architecture
//!
//! ```text
//! TripPlanner::generate_trip_plan
//!   ├── DataCollector (smart) ── tool loop ──► ToolGateway fetches
//!   │     └── Stage1Bundle (verbatim entities)
//!   ├── PresentationFormatter (fast) ──► itinerary JSON text
//!   ├── normalize ─► parse ─► repair ─► reconcile
//!   └── ItineraryPlan (or a labeled fallback plan)
//! ```

pub mod agentic_loop;
pub mod assembler;
pub mod budget;
pub mod client;
pub mod collector;
pub mod config;
pub mod executor;
pub mod fallback;
pub mod formatter;
pub mod message;
pub mod normalizer;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod router;
pub mod tool;
pub mod traits;

// Re-export key types
pub use collector::DataCollector;
pub use config::AgentConfig;
pub use executor::ToolExecutor;
pub use formatter::PresentationFormatter;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use normalizer::normalize;
pub use planner::TripPlanner;
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use router::{BackendId, Brain, BrainRouter};
pub use tool::{ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use traits::{Agent, execute_with_tools};
