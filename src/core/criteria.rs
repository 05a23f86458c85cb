//! Trip criteria: the immutable per-request input to the planner.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use crate::error::AgentError;

/// Price tier requested by the traveller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    /// Cheapest options.
    Budget,
    /// Balanced price and comfort.
    #[default]
    MidRange,
    /// No price ceiling.
    Luxury,
}

impl BudgetTier {
    /// Parses a tier keyword, accepting common synonyms.
    ///
    /// Returns `None` when the word is not a tier keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "budget" | "cheap" | "low" | "economy" | "low-cost" => Some(Self::Budget),
            "mid-range" | "midrange" | "mid" | "moderate" | "medium" | "standard" => {
                Some(Self::MidRange)
            }
            "luxury" | "high" | "premium" | "high-end" => Some(Self::Luxury),
            _ => None,
        }
    }

    /// Upper price bound for an entity kind in this tier.
    ///
    /// Hotels are priced per night, vehicles per day, attractions per ticket.
    #[must_use]
    pub const fn max_price(self, kind: EntityKind) -> Option<f64> {
        match (self, kind) {
            (Self::Budget, EntityKind::Hotel) => Some(80.0),
            (Self::Budget, EntityKind::Vehicle) => Some(50.0),
            (Self::Budget, EntityKind::Attraction) => Some(30.0),
            (Self::MidRange, EntityKind::Hotel) => Some(200.0),
            (Self::MidRange, EntityKind::Vehicle) => Some(120.0),
            (Self::MidRange, EntityKind::Attraction) => Some(80.0),
            (Self::Luxury, _) => None,
        }
    }

    /// Canonical keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::MidRange => "mid-range",
            Self::Luxury => "luxury",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated trip request.
///
/// Construct with [`TripCriteria::new`]; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCriteria {
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    travelers: u32,
    interests: BTreeSet<String>,
    budget: BudgetTier,
}

impl TripCriteria {
    /// Validates and builds criteria.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidCriteria`] when the destination is blank,
    /// the end date precedes the start date, or there are no travellers.
    pub fn new(
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        travelers: u32,
        interests: impl IntoIterator<Item = String>,
        budget: BudgetTier,
    ) -> Result<Self, AgentError> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(AgentError::InvalidCriteria {
                message: "destination cannot be empty".to_string(),
            });
        }
        if end_date < start_date {
            return Err(AgentError::InvalidCriteria {
                message: format!("end date {end_date} is before start date {start_date}"),
            });
        }
        if travelers == 0 {
            return Err(AgentError::InvalidCriteria {
                message: "at least one traveler is required".to_string(),
            });
        }

        let interests = interests
            .into_iter()
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();

        Ok(Self {
            destination: destination.to_string(),
            start_date,
            end_date,
            travelers,
            interests,
            budget,
        })
    }

    /// Builds criteria from a free-text criteria string such as
    /// `"mid-range, history, food"`.
    ///
    /// The first token that names a budget tier sets the tier (default
    /// mid-range); every other comma-separated token becomes an interest tag.
    ///
    /// # Errors
    ///
    /// Same as [`TripCriteria::new`].
    pub fn from_free_text(
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        travelers: u32,
        criteria: &str,
    ) -> Result<Self, AgentError> {
        let mut budget = None;
        let mut interests = Vec::new();
        for token in criteria.split([',', ';']) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match BudgetTier::parse(token) {
                Some(tier) if budget.is_none() => budget = Some(tier),
                Some(_) => {}
                None => interests.push(token.to_string()),
            }
        }
        Self::new(
            destination,
            start_date,
            end_date,
            travelers,
            interests,
            budget.unwrap_or_default(),
        )
    }

    /// Destination city or region.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// First day of the trip.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the trip (inclusive).
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Number of travellers (at least one).
    #[must_use]
    pub const fn travelers(&self) -> u32 {
        self.travelers
    }

    /// Interest tags, lowercased and deduplicated.
    #[must_use]
    pub const fn interests(&self) -> &BTreeSet<String> {
        &self.interests
    }

    /// Requested budget tier.
    #[must_use]
    pub const fn budget(&self) -> BudgetTier {
        self.budget
    }

    /// Trip length in days, counting both ends.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn trip_days(&self) -> u32 {
        ((self.end_date - self.start_date).num_days() + 1) as u32
    }

    /// Nights of lodging needed (`trip_days - 1`).
    #[must_use]
    pub fn nights(&self) -> u32 {
        self.trip_days().saturating_sub(1)
    }

    /// Calendar date for a 1-based day number.
    #[must_use]
    pub fn date_of_day(&self, day: u32) -> NaiveDate {
        self.start_date + chrono::Days::new(u64::from(day.saturating_sub(1)))
    }

    /// Interests joined as free text for search-style tool arguments.
    #[must_use]
    pub fn interests_text(&self) -> String {
        self.interests
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_trip_days_inclusive() {
        let c = TripCriteria::new(
            "Luxor",
            date("2026-03-01"),
            date("2026-03-03"),
            2,
            Vec::new(),
            BudgetTier::MidRange,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(c.trip_days(), 3);
        assert_eq!(c.nights(), 2);
        assert_eq!(c.date_of_day(3), date("2026-03-03"));
    }

    #[test]
    fn test_same_day_trip() {
        let c = TripCriteria::new(
            "Cairo",
            date("2026-03-01"),
            date("2026-03-01"),
            1,
            Vec::new(),
            BudgetTier::Budget,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(c.trip_days(), 1);
        assert_eq!(c.nights(), 0);
    }

    #[test]
    fn test_rejects_reversed_dates() {
        let result = TripCriteria::new(
            "Luxor",
            date("2026-03-05"),
            date("2026-03-01"),
            2,
            Vec::new(),
            BudgetTier::MidRange,
        );
        assert!(matches!(result, Err(AgentError::InvalidCriteria { .. })));
    }

    #[test]
    fn test_rejects_zero_travelers_and_blank_destination() {
        let d = date("2026-03-01");
        assert!(TripCriteria::new("Luxor", d, d, 0, Vec::new(), BudgetTier::Budget).is_err());
        assert!(TripCriteria::new("  ", d, d, 1, Vec::new(), BudgetTier::Budget).is_err());
    }

    #[test]
    fn test_long_trip_is_valid() {
        let c = TripCriteria::new(
            "Luxor",
            date("2026-01-01"),
            date("2026-02-05"),
            2,
            Vec::new(),
            BudgetTier::MidRange,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(c.trip_days(), 36);
        assert_eq!(c.date_of_day(36), date("2026-02-05"));
    }

    #[test]
    fn test_from_free_text_splits_tier_and_interests() {
        let c = TripCriteria::from_free_text(
            "Luxor",
            date("2026-03-01"),
            date("2026-03-03"),
            2,
            "History, luxury, Food, history",
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(c.budget(), BudgetTier::Luxury);
        assert_eq!(c.interests().len(), 2);
        assert_eq!(c.interests_text(), "food, history");
    }

    #[test]
    fn test_from_free_text_defaults_to_mid_range() {
        let c = TripCriteria::from_free_text(
            "Luxor",
            date("2026-03-01"),
            date("2026-03-01"),
            1,
            "",
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(c.budget(), BudgetTier::MidRange);
        assert!(c.interests().is_empty());
    }

    #[test_case("budget", Some(BudgetTier::Budget))]
    #[test_case("Mid-Range", Some(BudgetTier::MidRange))]
    #[test_case("mid_range", Some(BudgetTier::MidRange))]
    #[test_case("premium", Some(BudgetTier::Luxury))]
    #[test_case("museums", None)]
    fn test_budget_tier_parse(input: &str, expected: Option<BudgetTier>) {
        assert_eq!(BudgetTier::parse(input), expected);
    }

    #[test]
    fn test_tier_price_caps() {
        assert_eq!(BudgetTier::Budget.max_price(EntityKind::Hotel), Some(80.0));
        assert!(BudgetTier::Luxury.max_price(EntityKind::Vehicle).is_none());
    }
}
