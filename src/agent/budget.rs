//! Budget reconciliation.
//!
//! Weak model output often reports a zero grand total. When it does, the
//! cost breakdown is recomputed from the fetched entity prices so callers
//! never see a degenerate plan.

use tracing::debug;

use crate::core::{EstimatedCosts, ItineraryPlan, Stage1Bundle};

/// Currency assumed when the model gave none.
pub const DEFAULT_CURRENCY: &str = "USD";

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Recomputes costs from `bundle` when the plan's total is zero or missing.
///
/// - accommodation = first hotel's nightly price × (`trip_days` − 1)
/// - vehicle = first vehicle's daily price × `trip_days`
/// - activities = sum of every bundle attraction price
/// - per day = total ÷ max(1, `trip_days`)
///
/// The first hotel and vehicle come from the bundle, or from the plan's own
/// recommendations when the bundle has none. Plans with a positive total
/// are left untouched, so applying this twice changes nothing.
///
/// Returns `true` when the costs were rewritten.
pub fn reconcile(plan: &mut ItineraryPlan, bundle: &Stage1Bundle, trip_days: u32) -> bool {
    let total = plan.estimated_costs.total;
    if total.is_finite() && total > 0.0 {
        return false;
    }

    let days = trip_days.max(1);
    let nights = trip_days.saturating_sub(1);

    let nightly = bundle
        .hotels
        .first()
        .map(|h| h.core.price)
        .or_else(|| plan.lodging_recommendations.first().map(|l| l.price_per_night))
        .unwrap_or_default();
    let daily = bundle
        .vehicles
        .first()
        .map(|v| v.core.price)
        .or_else(|| plan.vehicle_recommendation.as_ref().map(|v| v.price_per_day))
        .unwrap_or_default();

    let accommodation = round2(nightly * f64::from(nights));
    let vehicle = round2(daily * f64::from(days));
    let activities = round2(bundle.attractions.iter().map(|a| a.core.price).sum());
    let total = round2(accommodation + vehicle + activities);

    let currency = if plan.estimated_costs.currency.trim().is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        plan.estimated_costs.currency.clone()
    };

    plan.estimated_costs = EstimatedCosts {
        accommodation,
        vehicle,
        activities,
        total,
        per_day: round2(total / f64::from(days)),
        currency,
    };
    debug!(total, accommodation, vehicle, activities, "costs reconciled from bundle");
    true
}
