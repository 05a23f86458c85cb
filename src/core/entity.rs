//! Fetched catalog entities and the shared coercion routines.
//!
//! Tool output arrives as loosely-typed JSON: prices may be numbers,
//! currency-formatted strings or null, coordinates may be strings, image
//! lists may be arrays or comma-joined strings. Everything is funnelled
//! through [`coerce_price`] / [`coerce_coordinate`] so budget math and
//! coordinate checks agree everywhere in the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Lodging, priced per night.
    Hotel,
    /// Sight or activity, priced per ticket.
    Attraction,
    /// Rental vehicle, priced per day.
    Vehicle,
}

impl EntityKind {
    /// All kinds in bundle order.
    pub const ALL: [Self; 3] = [Self::Hotel, Self::Attraction, Self::Vehicle];

    /// Catalog table holding this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Hotel => "Hotels",
            Self::Attraction => "Attractions",
            Self::Vehicle => "Vehicles",
        }
    }

    /// Plural key used in bundle JSON.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Hotel => "hotels",
            Self::Attraction => "attractions",
            Self::Vehicle => "vehicles",
        }
    }

    /// Parses a kind from singular or plural names.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hotel" | "hotels" | "lodging" => Some(Self::Hotel),
            "attraction" | "attractions" | "activity" | "activities" => Some(Self::Attraction),
            "vehicle" | "vehicles" | "car" | "cars" => Some(Self::Vehicle),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hotel => "hotel",
            Self::Attraction => "attraction",
            Self::Vehicle => "vehicle",
        })
    }
}

/// Coerces a heterogeneous price value to a non-negative number.
///
/// Numbers pass through (negatives clamp to zero). Strings keep only digits
/// and `.` before parsing, so `"$1,250.50"` becomes `1250.5`. Anything that
/// does not parse, including null, yields `0.0`.
#[must_use]
pub fn coerce_price(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0),
        Value::String(s) => coerce_price_str(s),
        _ => 0.0,
    }
}

/// String form of [`coerce_price`].
#[must_use]
pub fn coerce_price_str(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Coerces a coordinate value (number or numeric string) to `f64`.
///
/// Unparseable values yield `0.0`, which downstream treats as unset.
#[must_use]
pub fn coerce_coordinate(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Returns `true` when a coordinate pair is usable (not both exactly zero).
#[must_use]
#[allow(clippy::float_cmp)]
pub fn has_coordinates(latitude: f64, longitude: f64) -> bool {
    !(latitude == 0.0 && longitude == 0.0)
}

/// Returns `true` when both coordinates are non-zero, the rule for anything
/// placed on a plan's map.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_mappable(latitude: f64, longitude: f64) -> bool {
    latitude != 0.0 && longitude != 0.0
}

/// Returns the first present, non-null field among `keys`.
fn field<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn text(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn number(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    field(obj, keys).map(coerce_coordinate).filter(|v| *v != 0.0)
}

fn string_list(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match field(obj, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split([',', '|'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seat_count(raw: f64) -> u32 {
    raw.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Fields common to every entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCore {
    /// Catalog identifier (stringified).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Coerced price (per night, per day or per ticket by kind).
    pub price: f64,
    /// Rating, typically 0–5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Amenities (hotels) or features (attractions, vehicles).
    #[serde(default)]
    pub features: Vec<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntityCore {
    fn from_map(obj: &serde_json::Map<String, Value>) -> Option<Self> {
        let name = text(obj, &["name", "title", "display_name", "displayName"])?;
        let id = text(obj, &["id", "entity_id", "entityId"]).unwrap_or_else(|| name.clone());
        let price = field(
            obj,
            &[
                "price",
                "price_per_night",
                "pricePerNight",
                "price_per_day",
                "pricePerDay",
                "ticket_price",
                "ticketPrice",
            ],
        )
        .map_or(0.0, coerce_price);
        let latitude = field(obj, &["latitude", "lat"]).map_or(0.0, coerce_coordinate);
        let longitude =
            field(obj, &["longitude", "lng", "lon"]).map_or(0.0, coerce_coordinate);

        Some(Self {
            id,
            name,
            price,
            rating: number(obj, &["rating", "stars"]),
            images: string_list(obj, &["images", "image_urls", "imageUrls", "image"]),
            latitude,
            longitude,
            features: string_list(obj, &["features", "amenities"]),
            description: text(obj, &["description", "summary"]),
        })
    }

    /// Returns `true` when the entity satisfies the fetch invariants:
    /// coordinates are set and the price is positive.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        has_coordinates(self.latitude, self.longitude) && self.price > 0.0
    }
}

/// A lodging option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    /// Common fields; `price` is per night.
    #[serde(flatten)]
    pub core: EntityCore,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A sight or activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    /// Common fields; `price` is per ticket.
    #[serde(flatten)]
    pub core: EntityCore,
    /// Category such as `history` or `nature`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Typical visit duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
}

/// A rental vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Common fields; `price` is per day.
    #[serde(flatten)]
    pub core: EntityCore,
    /// Seats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Vehicle class such as `sedan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

/// A fetched entity of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FetchedEntity {
    /// Lodging.
    Hotel(Hotel),
    /// Sight or activity.
    Attraction(Attraction),
    /// Rental vehicle.
    Vehicle(Vehicle),
}

impl FetchedEntity {
    /// Builds an entity of `kind` from a loosely-typed JSON object.
    ///
    /// Returns `None` for non-objects and objects without a name. Does not
    /// apply the usability filter; see [`EntityCore::is_usable`].
    #[must_use]
    pub fn from_value(kind: EntityKind, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let core = EntityCore::from_map(obj)?;
        Some(match kind {
            EntityKind::Hotel => Self::Hotel(Hotel {
                core,
                address: text(obj, &["address", "location"]),
            }),
            EntityKind::Attraction => Self::Attraction(Attraction {
                core,
                category: text(obj, &["category", "type", "activity_type"]),
                duration_hours: number(obj, &["duration_hours", "durationHours", "duration"]),
            }),
            EntityKind::Vehicle => Self::Vehicle(Vehicle {
                core,
                capacity: number(obj, &["capacity", "seats"]).map(seat_count),
                vehicle_type: text(obj, &["vehicle_type", "vehicleType", "type"]),
            }),
        })
    }

    /// Common fields.
    #[must_use]
    pub const fn core(&self) -> &EntityCore {
        match self {
            Self::Hotel(h) => &h.core,
            Self::Attraction(a) => &a.core,
            Self::Vehicle(v) => &v.core,
        }
    }
}
