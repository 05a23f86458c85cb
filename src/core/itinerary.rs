//! The external itinerary contract returned to callers.
//!
//! Every key serializes in lower camel case. Deserialization is lenient:
//! missing fields default, nulls become defaults, and numeric fields accept
//! numbers or numeric strings, since the input is model-produced JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::entity::{coerce_coordinate, coerce_price, is_mappable};

fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(coerce_price(&Value::deserialize(d)?))
}

fn lenient_coordinate<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(coerce_coordinate(&Value::deserialize(d)?))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = coerce_price(&Value::deserialize(d)?).min(f64::from(u32::MAX)) as u32;
    Ok(count)
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_rating<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(if value.is_null() {
        None
    } else {
        Some(coerce_coordinate(&value))
    })
}

const fn default_true() -> bool {
    true
}

/// A complete, UI-ready trip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPlan {
    /// `false` for degraded fallback plans.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Human-readable failure description for degraded plans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Trip summary.
    #[serde(default, deserialize_with = "null_default")]
    pub trip_overview: TripOverview,
    /// Cost breakdown.
    #[serde(default, deserialize_with = "null_default")]
    pub estimated_costs: EstimatedCosts,
    /// Recommended lodging, best first.
    #[serde(default, deserialize_with = "null_default")]
    pub lodging_recommendations: Vec<LodgingRecommendation>,
    /// Recommended vehicle.
    #[serde(default)]
    pub vehicle_recommendation: Option<VehicleRecommendation>,
    /// One entry per trip day.
    #[serde(default, deserialize_with = "null_default")]
    pub itinerary: Vec<DayPlan>,
    /// Practical advice.
    #[serde(default, deserialize_with = "null_default")]
    pub travel_tips: Vec<String>,
}

impl Default for ItineraryPlan {
    fn default() -> Self {
        Self {
            success: true,
            error_message: None,
            trip_overview: TripOverview::default(),
            estimated_costs: EstimatedCosts::default(),
            lodging_recommendations: Vec::new(),
            vehicle_recommendation: None,
            itinerary: Vec::new(),
            travel_tips: Vec::new(),
        }
    }
}

impl ItineraryPlan {
    /// Iterates every activity across all days.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.itinerary.iter().flat_map(|d| d.activities.iter())
    }

    /// Returns `true` when every activity has a non-zero latitude and
    /// longitude.
    #[must_use]
    pub fn coordinates_valid(&self) -> bool {
        self.activities().all(|a| is_mappable(a.latitude, a.longitude))
    }
}

/// Headline trip facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripOverview {
    /// Destination name.
    #[serde(deserialize_with = "lenient_text")]
    pub destination: String,
    /// ISO start date.
    #[serde(deserialize_with = "lenient_text")]
    pub start_date: String,
    /// ISO end date.
    #[serde(deserialize_with = "lenient_text")]
    pub end_date: String,
    /// Trip length in days.
    #[serde(deserialize_with = "lenient_count")]
    pub duration_days: u32,
    /// Number of travellers.
    #[serde(deserialize_with = "lenient_count")]
    pub travelers: u32,
    /// Budget tier keyword.
    #[serde(deserialize_with = "lenient_text")]
    pub budget_tier: String,
    /// One-paragraph summary.
    #[serde(deserialize_with = "lenient_text")]
    pub summary: String,
}

/// Cost breakdown for the whole trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatedCosts {
    /// Lodging for all nights.
    #[serde(deserialize_with = "lenient_amount")]
    pub accommodation: f64,
    /// Vehicle for all days.
    #[serde(deserialize_with = "lenient_amount")]
    pub vehicle: f64,
    /// All activity tickets.
    #[serde(deserialize_with = "lenient_amount")]
    pub activities: f64,
    /// Grand total.
    #[serde(deserialize_with = "lenient_amount")]
    pub total: f64,
    /// Grand total divided by trip days.
    #[serde(deserialize_with = "lenient_amount")]
    pub per_day: f64,
    /// Currency code.
    #[serde(deserialize_with = "lenient_text")]
    pub currency: String,
}

/// A recommended place to stay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LodgingRecommendation {
    /// Catalog id.
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    /// Nightly price.
    #[serde(deserialize_with = "lenient_amount")]
    pub price_per_night: f64,
    /// Rating.
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
    /// Latitude.
    #[serde(deserialize_with = "lenient_coordinate")]
    pub latitude: f64,
    /// Longitude.
    #[serde(deserialize_with = "lenient_coordinate")]
    pub longitude: f64,
    /// Image URLs.
    #[serde(deserialize_with = "null_default")]
    pub images: Vec<String>,
    /// Amenities.
    #[serde(deserialize_with = "null_default")]
    pub amenities: Vec<String>,
    /// Why this option was chosen.
    #[serde(deserialize_with = "lenient_text")]
    pub reason: String,
}

/// A recommended rental vehicle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleRecommendation {
    /// Catalog id.
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    /// Daily price.
    #[serde(deserialize_with = "lenient_amount")]
    pub price_per_day: f64,
    /// Seats.
    #[serde(deserialize_with = "lenient_count")]
    pub capacity: u32,
    /// Vehicle class.
    #[serde(deserialize_with = "lenient_text")]
    pub vehicle_type: String,
    /// Image URLs.
    #[serde(deserialize_with = "null_default")]
    pub images: Vec<String>,
    /// Features.
    #[serde(deserialize_with = "null_default")]
    pub features: Vec<String>,
    /// Why this option was chosen.
    #[serde(deserialize_with = "lenient_text")]
    pub reason: String,
}

/// One day of the itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayPlan {
    /// 1-based day number.
    #[serde(deserialize_with = "lenient_count")]
    pub day: u32,
    /// ISO date.
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    /// Day headline.
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    /// Scheduled activities.
    #[serde(deserialize_with = "null_default")]
    pub activities: Vec<Activity>,
    /// Meal suggestions.
    #[serde(deserialize_with = "null_default")]
    pub meals: Meals,
}

/// A scheduled activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    /// Start time, e.g. `09:00`.
    #[serde(deserialize_with = "lenient_text")]
    pub time: String,
    /// Activity name.
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    /// Description.
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    /// Expected duration.
    #[serde(deserialize_with = "lenient_amount")]
    pub duration_hours: f64,
    /// Ticket price.
    #[serde(deserialize_with = "lenient_amount")]
    pub price: f64,
    /// Latitude.
    #[serde(deserialize_with = "lenient_coordinate")]
    pub latitude: f64,
    /// Longitude.
    #[serde(deserialize_with = "lenient_coordinate")]
    pub longitude: f64,
    /// Category, e.g. `sightseeing`.
    #[serde(deserialize_with = "lenient_text")]
    pub activity_type: String,
    /// Image URLs.
    #[serde(deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Meal suggestions for a day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meals {
    /// Breakfast suggestion.
    #[serde(deserialize_with = "lenient_text")]
    pub breakfast: String,
    /// Lunch suggestion.
    #[serde(deserialize_with = "lenient_text")]
    pub lunch: String,
    /// Dinner suggestion.
    #[serde(deserialize_with = "lenient_text")]
    pub dinner: String,
}
