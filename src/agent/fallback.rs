//! Degraded plans returned instead of errors.
//!
//! [`static_plan`] covers the case where there is no data at all, and
//! [`bundle_plan`] the case where Stage-1 produced entities but Stage-2 could
//! not turn them into a usable itinerary. Rejected requests get
//! [`invalid_request_plan`]. Every plan here sets `success: false` and
//! carries a human-readable `errorMessage`.

use super::assembler::{
    TIME_SLOTS, activity_from_attraction, default_tips, fill_overview, lodging_from_hotel,
    number_days, vehicle_from_bundle,
};
use super::budget::{DEFAULT_CURRENCY, reconcile};
use crate::core::{DayPlan, EstimatedCosts, ItineraryPlan, Stage1Bundle, TripCriteria, TripOverview};

fn retry_tips(criteria: &TripCriteria) -> Vec<String> {
    vec![
        format!(
            "Try again in a few minutes; planning for {} could not be completed.",
            criteria.destination()
        ),
        "Try a nearby or larger destination, or a different budget tier.".to_string(),
        "Shorter date ranges and fewer interests are easier to plan.".to_string(),
    ]
}

/// A plan with no itinerary, for when no catalog data is available.
#[must_use]
pub fn static_plan(criteria: &TripCriteria, message: &str) -> ItineraryPlan {
    let mut plan = ItineraryPlan {
        success: false,
        error_message: Some(message.to_string()),
        estimated_costs: EstimatedCosts {
            currency: DEFAULT_CURRENCY.to_string(),
            ..EstimatedCosts::default()
        },
        travel_tips: retry_tips(criteria),
        ..ItineraryPlan::default()
    };
    fill_overview(&mut plan.trip_overview, criteria);
    plan.trip_overview.summary = format!("No plan could be generated for {}.", criteria.destination());
    plan
}

/// A plan for a request whose criteria could not be validated.
///
/// The overview echoes the raw request fields.
#[must_use]
pub fn invalid_request_plan(
    destination: &str,
    start_date: &str,
    end_date: &str,
    travelers: u32,
    message: &str,
) -> ItineraryPlan {
    ItineraryPlan {
        success: false,
        error_message: Some(message.to_string()),
        trip_overview: TripOverview {
            destination: destination.trim().to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            travelers,
            summary: "The trip request is invalid.".to_string(),
            ..TripOverview::default()
        },
        estimated_costs: EstimatedCosts {
            currency: DEFAULT_CURRENCY.to_string(),
            ..EstimatedCosts::default()
        },
        travel_tips: vec![
            "Check that the destination is set and the end date is not before the start date."
                .to_string(),
            "Trips need at least one traveler.".to_string(),
        ],
        ..ItineraryPlan::default()
    }
}

/// A deterministic plan built straight from the bundle.
///
/// Attractions are laid out in bundle order, up to one per time slot per
/// day; days past the last attraction are left free. The itinerary always
/// has the full trip length and costs are reconciled from the bundle.
#[must_use]
pub fn bundle_plan(bundle: &Stage1Bundle, criteria: &TripCriteria, message: &str) -> ItineraryPlan {
    let days = usize::try_from(criteria.trip_days()).unwrap_or(usize::MAX);
    let mut attractions = bundle.mappable_attractions();
    let mut itinerary: Vec<DayPlan> = (0..days)
        .map(|_| DayPlan {
            activities: TIME_SLOTS
                .iter()
                .zip(attractions.by_ref())
                .map(|(time, a)| activity_from_attraction(a, time))
                .collect(),
            ..DayPlan::default()
        })
        .collect();
    number_days(&mut itinerary, criteria);

    let mut plan = ItineraryPlan {
        success: false,
        error_message: Some(message.to_string()),
        lodging_recommendations: bundle
            .hotels
            .first()
            .map(|h| lodging_from_hotel(h, criteria))
            .into_iter()
            .collect(),
        vehicle_recommendation: bundle.vehicles.first().map(|v| vehicle_from_bundle(v, criteria)),
        itinerary,
        estimated_costs: EstimatedCosts {
            currency: DEFAULT_CURRENCY.to_string(),
            ..EstimatedCosts::default()
        },
        travel_tips: default_tips(criteria),
        ..ItineraryPlan::default()
    };
    fill_overview(&mut plan.trip_overview, criteria);
    reconcile(&mut plan, bundle, criteria.trip_days());
    plan
}
