//! The Stage-1 result handed to Stage-2.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Attraction, EntityKind, FetchedEntity, Hotel, Vehicle, is_mappable};

/// Failure reason reported when every fetch came back empty.
pub const NO_DATA_REASON: &str = "no data returned from any tool";

/// Verbatim entities gathered by the data-collection stage.
///
/// Created fresh per request and consumed once by the formatter; retries
/// build a new bundle rather than mutating an old one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage1Bundle {
    /// Lodging options, in tool order.
    pub hotels: Vec<Hotel>,
    /// Attractions, in tool order.
    pub attractions: Vec<Attraction>,
    /// Vehicles, in tool order.
    pub vehicles: Vec<Vehicle>,
    /// Whether at least one list is non-empty.
    pub success: bool,
    /// Why the bundle is unsuccessful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Stage1Bundle {
    /// Builds a bundle from the three lists and derives `success`.
    #[must_use]
    pub fn from_lists(hotels: Vec<Hotel>, attractions: Vec<Attraction>, vehicles: Vec<Vehicle>) -> Self {
        let mut bundle = Self {
            hotels,
            attractions,
            vehicles,
            ..Self::default()
        };
        bundle.success = !bundle.is_empty();
        if !bundle.success {
            bundle.failure_reason = Some(NO_DATA_REASON.to_string());
        }
        bundle
    }

    /// Total entity count across the three lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hotels.len() + self.attractions.len() + self.vehicles.len()
    }

    /// Returns `true` when all three lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attractions whose latitude and longitude are both non-zero, in tool
    /// order. Only these are scheduled into a plan.
    pub fn mappable_attractions(&self) -> impl Iterator<Item = &Attraction> {
        self.attractions
            .iter()
            .filter(|a| is_mappable(a.core.latitude, a.core.longitude))
    }

    /// Finds an attraction by case-insensitive name.
    #[must_use]
    pub fn attraction_named(&self, name: &str) -> Option<&Attraction> {
        let needle = name.trim().to_lowercase();
        self.attractions
            .iter()
            .find(|a| a.core.name.to_lowercase() == needle)
    }

    /// Finds a hotel by id, falling back to case-insensitive name.
    #[must_use]
    pub fn hotel_matching(&self, id: &str, name: &str) -> Option<&Hotel> {
        self.hotels
            .iter()
            .find(|h| !id.is_empty() && h.core.id == id)
            .or_else(|| {
                let needle = name.trim().to_lowercase();
                self.hotels.iter().find(|h| h.core.name.to_lowercase() == needle)
            })
    }

    /// Finds a vehicle by id, falling back to case-insensitive name.
    #[must_use]
    pub fn vehicle_matching(&self, id: &str, name: &str) -> Option<&Vehicle> {
        self.vehicles
            .iter()
            .find(|v| !id.is_empty() && v.core.id == id)
            .or_else(|| {
                let needle = name.trim().to_lowercase();
                self.vehicles.iter().find(|v| v.core.name.to_lowercase() == needle)
            })
    }
}

/// Extracts usable entities of `kind` from a tool result.
///
/// Accepts a bare array, a `{ success, data }` envelope, or null. Absent,
/// null or failed results yield an empty list. Entities with unset
/// coordinates or non-positive prices are dropped.
#[must_use]
pub fn entities_from_result(kind: EntityKind, value: Option<&Value>) -> Vec<FetchedEntity> {
    let items = match value {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Object(obj)) => match obj.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| FetchedEntity::from_value(kind, item))
        .filter(|e| e.core().is_usable())
        .collect()
}

/// Typed variant of [`entities_from_result`] for hotels.
#[must_use]
pub fn hotels_from_result(value: Option<&Value>) -> Vec<Hotel> {
    entities_from_result(EntityKind::Hotel, value)
        .into_iter()
        .filter_map(|e| match e {
            FetchedEntity::Hotel(h) => Some(h),
            _ => None,
        })
        .collect()
}

/// Typed variant of [`entities_from_result`] for attractions.
#[must_use]
pub fn attractions_from_result(value: Option<&Value>) -> Vec<Attraction> {
    entities_from_result(EntityKind::Attraction, value)
        .into_iter()
        .filter_map(|e| match e {
            FetchedEntity::Attraction(a) => Some(a),
            _ => None,
        })
        .collect()
}

/// Typed variant of [`entities_from_result`] for vehicles.
#[must_use]
pub fn vehicles_from_result(value: Option<&Value>) -> Vec<Vehicle> {
    entities_from_result(EntityKind::Vehicle, value)
        .into_iter()
        .filter_map(|e| match e {
            FetchedEntity::Vehicle(v) => Some(v),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_bundle_is_failure() {
        let bundle = Stage1Bundle::from_lists(Vec::new(), Vec::new(), Vec::new());
        assert!(!bundle.success);
        assert_eq!(bundle.failure_reason.as_deref(), Some(NO_DATA_REASON));
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_envelope_and_bare_array_accepted() {
        let envelope = json!({
            "success": true,
            "data": [{"name": "Karnak", "price": 20, "latitude": 25.72, "longitude": 32.65}]
        });
        let bare = json!([{"name": "Karnak", "price": 20, "latitude": 25.72, "longitude": 32.65}]);
        assert_eq!(attractions_from_result(Some(&envelope)).len(), 1);
        assert_eq!(attractions_from_result(Some(&bare)).len(), 1);
    }

    #[test]
    fn test_null_and_failed_results_are_empty() {
        assert!(hotels_from_result(None).is_empty());
        assert!(hotels_from_result(Some(&Value::Null)).is_empty());
        let failed = json!({"success": false, "error": "nothing", "alternative_suggestion": "Aswan"});
        assert!(hotels_from_result(Some(&failed)).is_empty());
    }

    #[test]
    fn test_unusable_entities_dropped() {
        let list = json!([
            {"name": "A", "price": 20, "latitude": 0, "longitude": 0},
            {"name": "B", "price": "n/a", "latitude": 1, "longitude": 1},
            {"name": "C", "price": "$15", "latitude": 1, "longitude": 1}
        ]);
        let vehicles = vehicles_from_result(Some(&list));
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].core.name, "C");
    }

    #[test]
    fn test_lookup_helpers() {
        let hotels = hotels_from_result(Some(&json!([
            {"id": 3, "name": "Winter Palace", "price": 180, "latitude": 25.7, "longitude": 32.6}
        ])));
        let bundle = Stage1Bundle::from_lists(hotels, Vec::new(), Vec::new());
        assert!(bundle.success);
        assert!(bundle.hotel_matching("3", "").is_some());
        assert!(bundle.hotel_matching("", "winter palace").is_some());
        assert!(bundle.hotel_matching("9", "Other").is_none());
    }
}
