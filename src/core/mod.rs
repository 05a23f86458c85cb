//! Core domain types for trip planning.
//!
//! These types have no LLM or database dependencies: request criteria,
//! fetched catalog entities, the Stage-1 bundle and the itinerary contract.

pub mod bundle;
pub mod criteria;
pub mod entity;
pub mod itinerary;

pub use bundle::{NO_DATA_REASON, Stage1Bundle};
pub use criteria::{BudgetTier, TripCriteria};
pub use entity::{
    Attraction, EntityCore, EntityKind, FetchedEntity, Hotel, Vehicle, coerce_coordinate,
    coerce_price, has_coordinates, is_mappable,
};
pub use itinerary::{
    Activity, DayPlan, EstimatedCosts, ItineraryPlan, LodgingRecommendation, Meals, TripOverview,
    VehicleRecommendation,
};
