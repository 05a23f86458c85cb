//! # tripforge
//!
//! AI trip-planning orchestration engine.
//!
//! Turns a loose request ("plan a trip to Luxor for three days") into a
//! structured, UI-ready itinerary by coordinating interchangeable LLM
//! backends, a set of read-only catalog tools and a two-stage pipeline
//! (data gathering, then presentation formatting) with automatic failover
//! and output repair.
//!
//! ## Architecture
//!
//! - **core**: domain types (criteria, fetched entities, bundle, itinerary)
//! - **storage**: the travel catalog behind a trait, `SQLite` implementation
//! - **search**: feature-hashing embedder and in-memory vector index
//! - **tools**: the read-only tool gateway exposed to model backends
//! - **agent**: LLM providers, brain router and the planning pipeline
//! - **cli**: command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use tripforge::agent::{AgentConfig, TripPlanner};
//! use tripforge::storage::SqliteCatalog;
//! use tripforge::tools::{GatewayConfig, ToolGateway};
//!
//! # async fn run() -> tripforge::Result<()> {
//! let catalog = SqliteCatalog::open(std::path::Path::new(".tripforge/catalog.db"))?;
//! let gateway = Arc::new(ToolGateway::new(Arc::new(catalog), GatewayConfig::default()));
//! let planner = TripPlanner::from_config(&AgentConfig::from_env()?, gateway)?;
//!
//! let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap_or_default();
//! let end = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap_or_default();
//! let plan = planner
//!     .generate_trip_plan("Luxor", start, end, 2, "mid-range, history")
//!     .await;
//! assert_eq!(plan.itinerary.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod search;
pub mod storage;
pub mod tools;

pub use crate::core::{ItineraryPlan, Stage1Bundle, TripCriteria};
pub use crate::error::{AgentError, CommandError, Error, Result, StorageError};
