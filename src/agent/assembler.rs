//! Plan assembly: formatter text to a contract-conforming [`ItineraryPlan`].
//!
//! The formatter's text is normalized, parsed leniently and then repaired
//! against the Stage-1 bundle it was generated from:
//!
//! 1. activities with a zero latitude or longitude are backfilled by name
//!    or dropped
//! 2. the itinerary is padded or truncated to the trip length
//! 3. lodging, vehicle and image lists are restored from the bundle
//! 4. the overview is filled from the criteria
//! 5. costs are reconciled

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use super::budget::{DEFAULT_CURRENCY, reconcile};
use super::normalizer::{json_payload, normalize_tree};
use crate::core::{
    Activity, Attraction, DayPlan, Hotel, ItineraryPlan, LodgingRecommendation, Stage1Bundle,
    TripCriteria, TripOverview, Vehicle, VehicleRecommendation, has_coordinates, is_mappable,
};
use crate::error::AgentError;

/// Start times for generated activities, one per slot.
pub const TIME_SLOTS: [&str; 3] = ["09:00", "13:00", "16:00"];

/// Lodging options copied from the bundle when the model gave none.
const MAX_LODGING: usize = 3;

/// Message attached when the model marks its own plan as failed but gives
/// no reason.
const UNEXPLAINED_FAILURE: &str = "the itinerary formatter reported a failure without a reason";

/// Visit length assumed when an attraction has none.
const DEFAULT_VISIT_HOURS: f64 = 2.0;

/// Parses formatter output and repairs it against `bundle` and `criteria`.
///
/// # Errors
///
/// Returns [`AgentError::ResponseParse`] when the text does not contain a
/// JSON object after normalization.
pub fn assemble(
    raw: &str,
    bundle: &Stage1Bundle,
    criteria: &TripCriteria,
) -> Result<ItineraryPlan, AgentError> {
    let plan = parse_plan(raw)?;
    Ok(repair(plan, bundle, criteria))
}

/// Normalizes `raw` and deserializes it as an itinerary.
///
/// # Errors
///
/// Returns [`AgentError::ResponseParse`] when no JSON object is found.
pub fn parse_plan(raw: &str) -> Result<ItineraryPlan, AgentError> {
    let value: Value = serde_json::from_str(json_payload(raw))
        .map(normalize_tree)
        .map_err(|e| AgentError::ResponseParse {
            message: format!("formatter output is not JSON: {e}"),
            content: truncate_for_error(raw),
        })?;
    if !value.is_object() {
        return Err(AgentError::ResponseParse {
            message: "formatter output is not a JSON object".to_string(),
            content: truncate_for_error(raw),
        });
    }
    serde_json::from_value(value).map_err(|e| AgentError::ResponseParse {
        message: format!("formatter output does not match the itinerary shape: {e}"),
        content: truncate_for_error(raw),
    })
}

fn truncate_for_error(raw: &str) -> String {
    raw.chars().take(500).collect()
}

/// Applies every repair step and cost reconciliation.
#[must_use]
pub fn repair(mut plan: ItineraryPlan, bundle: &Stage1Bundle, criteria: &TripCriteria) -> ItineraryPlan {
    let dropped = repair_coordinates(&mut plan, bundle);
    if dropped > 0 {
        warn!(
            stage = "assembler",
            destination = criteria.destination(),
            dropped,
            "dropped activities without coordinates"
        );
    }
    fit_days(&mut plan, bundle, criteria);
    restore_recommendations(&mut plan, bundle, criteria);
    fill_overview(&mut plan.trip_overview, criteria);
    if plan.travel_tips.is_empty() {
        plan.travel_tips = default_tips(criteria);
    }
    if plan.estimated_costs.currency.trim().is_empty() {
        plan.estimated_costs.currency = DEFAULT_CURRENCY.to_string();
    }
    if !plan.success
        && plan
            .error_message
            .as_deref()
            .is_none_or(|m| m.trim().is_empty())
    {
        warn!(
            stage = "assembler",
            destination = criteria.destination(),
            "formatter marked the plan failed without a message"
        );
        plan.error_message = Some(UNEXPLAINED_FAILURE.to_string());
    }
    if reconcile(&mut plan, bundle, criteria.trip_days()) {
        debug!(
            stage = "assembler",
            destination = criteria.destination(),
            total = plan.estimated_costs.total,
            "model total was zero, recomputed from bundle"
        );
    }
    plan
}

/// Backfills activities with a zero coordinate from a same-name attraction,
/// dropping the rest.
///
/// Also restores emptied image lists. Returns the number of dropped activities.
fn repair_coordinates(plan: &mut ItineraryPlan, bundle: &Stage1Bundle) -> usize {
    let mut dropped = 0;
    for day in &mut plan.itinerary {
        let before = day.activities.len();
        day.activities.retain_mut(|activity| {
            let source = bundle.attraction_named(&activity.name);
            if let Some(source) = source
                && activity.images.is_empty()
            {
                activity.images.clone_from(&source.core.images);
            }
            if is_mappable(activity.latitude, activity.longitude) {
                return true;
            }
            match source {
                Some(a) if is_mappable(a.core.latitude, a.core.longitude) => {
                    activity.latitude = a.core.latitude;
                    activity.longitude = a.core.longitude;
                    true
                }
                _ => false,
            }
        });
        dropped += before - day.activities.len();
    }
    dropped
}

/// Pads or truncates the itinerary to exactly the trip length.
///
/// New days are filled with attractions not yet scheduled. Days are
/// renumbered from 1 and dated from the trip start.
fn fit_days(plan: &mut ItineraryPlan, bundle: &Stage1Bundle, criteria: &TripCriteria) {
    let days = usize::try_from(criteria.trip_days()).unwrap_or(usize::MAX);
    let original = plan.itinerary.len();
    plan.itinerary.truncate(days);

    let scheduled: HashSet<String> = plan.activities().map(|a| a.name.to_lowercase()).collect();
    let mut unused = bundle
        .mappable_attractions()
        .filter(|a| !scheduled.contains(&a.core.name.to_lowercase()));

    while plan.itinerary.len() < days {
        let activities = TIME_SLOTS
            .iter()
            .zip(unused.by_ref())
            .map(|(time, a)| activity_from_attraction(a, time))
            .collect();
        plan.itinerary.push(DayPlan {
            activities,
            ..DayPlan::default()
        });
    }

    if original != days {
        debug!(
            stage = "assembler",
            from = original,
            to = days,
            "itinerary resized to trip length"
        );
    }
    number_days(&mut plan.itinerary, criteria);
}

/// Sets day numbers, dates and blank titles.
pub(crate) fn number_days(itinerary: &mut [DayPlan], criteria: &TripCriteria) {
    for (day, plan) in (1u32..).zip(itinerary.iter_mut()) {
        plan.day = day;
        plan.date = criteria.date_of_day(day).to_string();
        if plan.title.trim().is_empty() {
            plan.title = day_title(plan, criteria.destination());
        }
    }
}

fn day_title(day: &DayPlan, destination: &str) -> String {
    match day.activities.first() {
        Some(first) => format!("{destination}: {}", first.name),
        None => format!("Free day in {destination}"),
    }
}

fn restore_recommendations(plan: &mut ItineraryPlan, bundle: &Stage1Bundle, criteria: &TripCriteria) {
    if plan.lodging_recommendations.is_empty() {
        plan.lodging_recommendations = bundle
            .hotels
            .iter()
            .take(MAX_LODGING)
            .map(|h| lodging_from_hotel(h, criteria))
            .collect();
    } else {
        for rec in &mut plan.lodging_recommendations {
            let Some(hotel) = bundle.hotel_matching(&rec.id, &rec.name) else {
                continue;
            };
            if rec.images.is_empty() {
                rec.images.clone_from(&hotel.core.images);
            }
            if !has_coordinates(rec.latitude, rec.longitude) {
                rec.latitude = hotel.core.latitude;
                rec.longitude = hotel.core.longitude;
            }
            if rec.price_per_night <= 0.0 {
                rec.price_per_night = hotel.core.price;
            }
        }
    }

    match plan.vehicle_recommendation.as_mut() {
        None => {
            plan.vehicle_recommendation = bundle
                .vehicles
                .first()
                .map(|v| vehicle_from_bundle(v, criteria));
        }
        Some(rec) => {
            if let Some(vehicle) = bundle.vehicle_matching(&rec.id, &rec.name) {
                if rec.images.is_empty() {
                    rec.images.clone_from(&vehicle.core.images);
                }
                if rec.price_per_day <= 0.0 {
                    rec.price_per_day = vehicle.core.price;
                }
            }
        }
    }
}

/// Fills blank overview fields from the criteria.
pub(crate) fn fill_overview(overview: &mut TripOverview, criteria: &TripCriteria) {
    if overview.destination.trim().is_empty() {
        overview.destination = criteria.destination().to_string();
    }
    overview.start_date = criteria.start_date().to_string();
    overview.end_date = criteria.end_date().to_string();
    overview.duration_days = criteria.trip_days();
    if overview.travelers == 0 {
        overview.travelers = criteria.travelers();
    }
    if overview.budget_tier.trim().is_empty() {
        overview.budget_tier = criteria.budget().as_str().to_string();
    }
    if overview.summary.trim().is_empty() {
        let interests = criteria.interests_text();
        overview.summary = if interests.is_empty() {
            format!(
                "{}-day {} trip to {} for {} traveler(s).",
                criteria.trip_days(),
                criteria.budget(),
                criteria.destination(),
                criteria.travelers()
            )
        } else {
            format!(
                "{}-day {} trip to {} for {} traveler(s), focused on {interests}.",
                criteria.trip_days(),
                criteria.budget(),
                criteria.destination(),
                criteria.travelers()
            )
        };
    }
}

/// Builds a scheduled activity from a bundle attraction.
pub(crate) fn activity_from_attraction(attraction: &Attraction, time: &str) -> Activity {
    Activity {
        time: time.to_string(),
        name: attraction.core.name.clone(),
        description: attraction.core.description.clone().unwrap_or_default(),
        duration_hours: attraction.duration_hours.unwrap_or(DEFAULT_VISIT_HOURS),
        price: attraction.core.price,
        latitude: attraction.core.latitude,
        longitude: attraction.core.longitude,
        activity_type: attraction
            .category
            .clone()
            .unwrap_or_else(|| "sightseeing".to_string()),
        images: attraction.core.images.clone(),
    }
}

/// Builds a lodging recommendation from a bundle hotel.
pub(crate) fn lodging_from_hotel(hotel: &Hotel, criteria: &TripCriteria) -> LodgingRecommendation {
    LodgingRecommendation {
        id: hotel.core.id.clone(),
        name: hotel.core.name.clone(),
        price_per_night: hotel.core.price,
        rating: hotel.core.rating,
        latitude: hotel.core.latitude,
        longitude: hotel.core.longitude,
        images: hotel.core.images.clone(),
        amenities: hotel.core.features.clone(),
        reason: format!("Fits a {} budget in {}", criteria.budget(), criteria.destination()),
    }
}

/// Builds a vehicle recommendation from a bundle vehicle.
pub(crate) fn vehicle_from_bundle(vehicle: &Vehicle, criteria: &TripCriteria) -> VehicleRecommendation {
    VehicleRecommendation {
        id: vehicle.core.id.clone(),
        name: vehicle.core.name.clone(),
        price_per_day: vehicle.core.price,
        capacity: vehicle.capacity.unwrap_or_default(),
        vehicle_type: vehicle.vehicle_type.clone().unwrap_or_default(),
        images: vehicle.core.images.clone(),
        features: vehicle.core.features.clone(),
        reason: format!("Seats {} traveler(s)", criteria.travelers()),
    }
}

/// Generic advice used when the model gave none.
pub(crate) fn default_tips(criteria: &TripCriteria) -> Vec<String> {
    vec![
        format!(
            "Book lodging in {} ahead of {} to lock in prices.",
            criteria.destination(),
            criteria.start_date()
        ),
        "Carry some cash for small vendors and tips.".to_string(),
        "Start sightseeing early to avoid midday heat and crowds.".to_string(),
    ]
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::core::{BudgetTier, EntityCore};
    use chrono::NaiveDate;
    use serde_json::json;

    fn core(id: &str, name: &str, price: f64, lat: f64) -> EntityCore {
        EntityCore {
            id: id.to_string(),
            name: name.to_string(),
            price,
            rating: Some(4.5),
            images: vec![format!("https://img.example.com/{id}.jpg")],
            latitude: lat,
            longitude: 32.6,
            features: vec!["wifi".to_string()],
            description: Some(format!("About {name}")),
        }
    }

    fn bundle() -> Stage1Bundle {
        Stage1Bundle::from_lists(
            vec![
                Hotel {
                    core: core("h1", "Winter Palace", 180.0, 25.69),
                    address: None,
                },
                Hotel {
                    core: core("h2", "Nile Inn", 90.0, 25.70),
                    address: None,
                },
            ],
            ["Karnak Temple", "Luxor Temple", "Valley of the Kings", "Colossi of Memnon", "Luxor Museum"]
                .iter()
                .enumerate()
                .map(|(i, name)| Attraction {
                    core: core(&format!("a{i}"), name, 20.0, 25.7),
                    category: Some("history".to_string()),
                    duration_hours: None,
                })
                .collect(),
            vec![Vehicle {
                core: core("v1", "Toyota Corolla", 40.0, 25.69),
                capacity: Some(4),
                vehicle_type: Some("sedan".to_string()),
            }],
        )
    }

    fn criteria(days: u32) -> TripCriteria {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap_or_default();
        TripCriteria::new(
            "Luxor",
            start,
            start + chrono::Days::new(u64::from(days - 1)),
            2,
            vec!["history".to_string()],
            BudgetTier::MidRange,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_assemble_snake_case_output() {
        let raw = json!({
            "trip_overview": {"destination": "Luxor"},
            "estimated_costs": {"total": 0},
            "itinerary": [
                {"day": 1, "title": "East Bank", "activities": [
                    {"time": "09:00", "name": "Karnak Temple", "latitude": 25.7188, "longitude": 32.6573}
                ], "meals": ["Hotel buffet", "Koshary", "Sofra"]}
            ],
            "travel_tips": ["Hire a felucca at sunset"]
        })
        .to_string();
        let plan = assemble(&format!("```json\n{raw}\n```"), &bundle(), &criteria(3))
            .unwrap_or_else(|e| panic!("assemble failed: {e}"));

        assert_eq!(plan.itinerary.len(), 3);
        assert_eq!(plan.itinerary[0].meals.lunch, "Koshary");
        assert_eq!(plan.itinerary[2].date, "2026-03-12");
        assert_eq!(plan.lodging_recommendations.len(), 2);
        assert!(plan.vehicle_recommendation.is_some());
        assert!(plan.estimated_costs.total > 0.0);
        assert_eq!(plan.travel_tips, vec!["Hire a felucca at sunset".to_string()]);
        assert!(plan.coordinates_valid());
    }

    #[test]
    fn test_zero_coordinates_backfilled_or_dropped() {
        let mut plan = ItineraryPlan {
            itinerary: vec![DayPlan {
                day: 1,
                activities: vec![
                    Activity {
                        name: "karnak temple".to_string(),
                        ..Activity::default()
                    },
                    Activity {
                        name: "Invented Bazaar".to_string(),
                        ..Activity::default()
                    },
                ],
                ..DayPlan::default()
            }],
            ..ItineraryPlan::default()
        };
        let dropped = repair_coordinates(&mut plan, &bundle());
        assert_eq!(dropped, 1);
        let kept = &plan.itinerary[0].activities;
        assert_eq!(kept.len(), 1);
        assert!((kept[0].latitude - 25.7).abs() < f64::EPSILON);
        assert_eq!(kept[0].images.len(), 1);
    }

    #[test]
    fn test_single_zero_coordinate_is_not_mappable() {
        let raw = json!({
            "itinerary": [{"day": 1, "activities": [
                {"time": "09:00", "name": "Equator Cafe", "latitude": 0, "longitude": 32.6},
                {"time": "13:00", "name": "Luxor Temple", "latitude": 25.7, "longitude": 0}
            ]}]
        })
        .to_string();
        let plan = assemble(&raw, &bundle(), &criteria(1)).unwrap_or_else(|e| panic!("{e}"));

        let names: Vec<&str> = plan.activities().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Luxor Temple"]);
        let temple = &plan.itinerary[0].activities[0];
        assert!((temple.longitude - 32.6).abs() < f64::EPSILON);
        assert!(plan.coordinates_valid());
    }

    #[test]
    fn test_padding_skips_attractions_with_a_zero_coordinate() {
        let mut b = bundle();
        b.attractions[1].core.longitude = 0.0;
        let plan = repair(ItineraryPlan::default(), &b, &criteria(2));
        assert!(plan.activities().all(|a| a.name != "Luxor Temple"));
        assert!(plan.coordinates_valid());
    }

    #[test]
    fn test_model_failure_gets_a_message() {
        let plan = assemble(r#"{"success": false}"#, &bundle(), &criteria(2))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(!plan.success);
        assert_eq!(plan.error_message.as_deref(), Some(UNEXPLAINED_FAILURE));

        let plan = assemble(
            r#"{"success": false, "errorMessage": "no rooms left"}"#,
            &bundle(),
            &criteria(2),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(plan.error_message.as_deref(), Some("no rooms left"));
    }

    #[test]
    fn test_padding_uses_unscheduled_attractions() {
        let plan = ItineraryPlan {
            itinerary: vec![DayPlan {
                activities: vec![activity_from_attraction(&bundle().attractions[0], "09:00")],
                ..DayPlan::default()
            }],
            ..ItineraryPlan::default()
        };
        let plan = repair(plan, &bundle(), &criteria(3));
        assert_eq!(plan.itinerary.len(), 3);
        let names: Vec<&str> = plan.activities().map(|a| a.name.as_str()).collect();
        assert_eq!(names.iter().filter(|n| **n == "Karnak Temple").count(), 1);
        assert_eq!(names.len(), 5);
        assert_eq!(plan.itinerary[2].title, "Luxor: Luxor Museum");
        assert_eq!(
            plan.itinerary.iter().map(|d| d.day).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_long_itinerary_truncated() {
        let plan = ItineraryPlan {
            itinerary: vec![DayPlan::default(); 5],
            ..ItineraryPlan::default()
        };
        let plan = repair(plan, &bundle(), &criteria(2));
        assert_eq!(plan.itinerary.len(), 2);
        assert_eq!(plan.trip_overview.duration_days, 2);
    }

    #[test]
    fn test_recommendation_images_restored() {
        let plan = ItineraryPlan {
            lodging_recommendations: vec![LodgingRecommendation {
                id: "h2".to_string(),
                name: "Nile Inn".to_string(),
                ..LodgingRecommendation::default()
            }],
            vehicle_recommendation: Some(VehicleRecommendation {
                name: "toyota corolla".to_string(),
                ..VehicleRecommendation::default()
            }),
            ..ItineraryPlan::default()
        };
        let plan = repair(plan, &bundle(), &criteria(2));
        let lodging = &plan.lodging_recommendations[0];
        assert_eq!(lodging.images, vec!["https://img.example.com/h2.jpg".to_string()]);
        assert!((lodging.price_per_night - 90.0).abs() < f64::EPSILON);
        let vehicle = plan
            .vehicle_recommendation
            .unwrap_or_else(|| panic!("vehicle missing"));
        assert_eq!(vehicle.images.len(), 1);
    }

    #[test]
    fn test_positive_model_total_kept() {
        let raw = r#"{"estimatedCosts": {"total": 1234.5, "currency": "EGP"}}"#;
        let plan = assemble(raw, &bundle(), &criteria(2)).unwrap_or_else(|e| panic!("{e}"));
        assert!((plan.estimated_costs.total - 1234.5).abs() < f64::EPSILON);
        assert_eq!(plan.estimated_costs.currency, "EGP");
    }

    #[test]
    fn test_unparseable_output_is_error() {
        let result = assemble("I cannot help with that.", &bundle(), &criteria(2));
        assert!(matches!(result, Err(AgentError::ResponseParse { .. })));
        assert!(parse_plan("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_overview_filled_from_criteria() {
        let plan = repair(ItineraryPlan::default(), &bundle(), &criteria(3));
        let overview = &plan.trip_overview;
        assert_eq!(overview.destination, "Luxor");
        assert_eq!(overview.start_date, "2026-03-10");
        assert_eq!(overview.end_date, "2026-03-12");
        assert_eq!(overview.travelers, 2);
        assert_eq!(overview.budget_tier, "mid-range");
        assert!(overview.summary.contains("history"));
    }
}
