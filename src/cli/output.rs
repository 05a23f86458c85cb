//! Output formatting for CLI commands.

use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::agent::tool::ToolDefinition;
use crate::core::{EntityKind, ItineraryPlan};
use crate::tools::ToolEnvelope;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognised is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON with a trailing newline.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"serialization failed: {e}"}}"#)
        });
        out.push('\n');
        out
    }
}

/// Formats a plan. Text mode prints a readable summary.
#[must_use]
pub fn format_plan(plan: &ItineraryPlan, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(plan),
        OutputFormat::Text => plan_text(plan),
    }
}

fn plan_text(plan: &ItineraryPlan) -> String {
    let overview = &plan.trip_overview;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} to {}, {} day(s), {} traveler(s))",
        overview.destination,
        overview.start_date,
        overview.end_date,
        overview.duration_days,
        overview.travelers
    );
    if let Some(message) = &plan.error_message {
        let _ = writeln!(out, "Warning: {message}");
    }
    if !overview.summary.is_empty() {
        let _ = writeln!(out, "{}", overview.summary);
    }

    let costs = &plan.estimated_costs;
    let _ = writeln!(
        out,
        "\nEstimated cost: {:.2} {} ({:.2}/day)",
        costs.total, costs.currency, costs.per_day
    );
    let _ = writeln!(
        out,
        "  lodging {:.2} | vehicle {:.2} | activities {:.2}",
        costs.accommodation, costs.vehicle, costs.activities
    );

    if !plan.lodging_recommendations.is_empty() {
        out.push_str("\nLodging:\n");
        for rec in &plan.lodging_recommendations {
            let _ = writeln!(out, "  - {} ({:.2}/night)", rec.name, rec.price_per_night);
        }
    }
    if let Some(vehicle) = &plan.vehicle_recommendation {
        let _ = writeln!(
            out,
            "\nVehicle: {} ({:.2}/day)",
            vehicle.name, vehicle.price_per_day
        );
    }

    for day in &plan.itinerary {
        let _ = writeln!(out, "\nDay {} ({}): {}", day.day, day.date, day.title);
        for activity in &day.activities {
            let _ = writeln!(
                out,
                "  {} {} [{:.2}]",
                activity.time, activity.name, activity.price
            );
        }
    }

    if !plan.travel_tips.is_empty() {
        out.push_str("\nTips:\n");
        for tip in &plan.travel_tips {
            let _ = writeln!(out, "  - {tip}");
        }
    }
    out
}

/// Formats a tool envelope. Envelopes are always JSON.
#[must_use]
pub fn format_envelope(envelope: &ToolEnvelope, _format: OutputFormat) -> String {
    OutputFormat::Json.to_json(envelope)
}

/// Formats the tool list.
#[must_use]
pub fn format_tool_list(tools: &[ToolDefinition], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let names: Vec<serde_json::Value> = tools
                .iter()
                .map(|t| serde_json::json!({"name": t.name, "description": t.description}))
                .collect();
            format.to_json(&names)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for tool in tools {
                let _ = writeln!(out, "{:<20} {}", tool.name, tool.description);
            }
            out
        }
    }
}

/// Formats catalog row counts.
#[must_use]
pub fn format_status(db_path: &std::path::Path, counts: &[(EntityKind, i64)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let mut map = serde_json::Map::new();
            for (kind, n) in counts {
                map.insert(kind.table().to_lowercase(), serde_json::json!(n));
            }
            format.to_json(&serde_json::json!({
                "path": db_path.to_string_lossy(),
                "counts": map,
            }))
        }
        OutputFormat::Text => {
            let mut out = format!("Catalog: {}\n", db_path.display());
            for (kind, n) in counts {
                let _ = writeln!(out, "  {:<12} {n}", kind.table());
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DayPlan, TripOverview};

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse(" JSON "), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_plan_text_lists_days() {
        let plan = ItineraryPlan {
            trip_overview: TripOverview {
                destination: "Luxor".to_string(),
                duration_days: 1,
                ..TripOverview::default()
            },
            itinerary: vec![DayPlan {
                day: 1,
                date: "2026-03-10".to_string(),
                title: "Temples".to_string(),
                ..DayPlan::default()
            }],
            ..ItineraryPlan::default()
        };
        let text = format_plan(&plan, OutputFormat::Text);
        assert!(text.starts_with("Luxor"));
        assert!(text.contains("Day 1 (2026-03-10): Temples"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_plan_json_is_camel_case() {
        let json = format_plan(&ItineraryPlan::default(), OutputFormat::Json);
        assert!(json.contains("\"tripOverview\""));
        assert!(json.ends_with('\n'));
    }
}
