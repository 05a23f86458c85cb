//! Travel catalog storage.
//!
//! The planning engine consumes the catalog only through [`TravelCatalog`]:
//! entity lookup by destination, read-only query execution, price
//! aggregation and availability. [`SqliteCatalog`] is the bundled
//! implementation.

mod seed;
mod sqlite;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

pub use sqlite::SqliteCatalog;

use crate::core::EntityKind;
use crate::error::StorageError;

/// Rows returned by a read-only query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRows {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// One JSON object per row, keyed by column name.
    pub rows: Vec<Map<String, Value>>,
    /// Whether rows were dropped to honour the row cap.
    pub truncated: bool,
}

/// Price statistics for one entity kind at a destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    /// Entity kind.
    pub kind: EntityKind,
    /// Cheapest priced entity.
    pub min: f64,
    /// Most expensive priced entity.
    pub max: f64,
    /// Mean over priced entities.
    pub average: f64,
    /// Entities with a positive price.
    pub count: usize,
}

impl PriceRange {
    /// Builds statistics from coerced prices, ignoring non-positive values.
    ///
    /// Returns `None` when no price is positive.
    #[must_use]
    pub fn from_prices(kind: EntityKind, prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        let priced: Vec<f64> = prices.into_iter().filter(|p| *p > 0.0).collect();
        if priced.is_empty() {
            return None;
        }
        let min = priced.iter().copied().fold(f64::INFINITY, f64::min);
        let max = priced.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let average = priced.iter().sum::<f64>() / priced.len() as f64;
        Some(Self {
            kind,
            min,
            max,
            average,
            count: priced.len(),
        })
    }
}

/// Availability of one entity over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity id.
    pub entity_id: i64,
    /// Entity name.
    pub name: String,
    /// `true` when no date in the range is sold out.
    pub available: bool,
    /// Sold-out dates within the range, ISO formatted.
    pub unavailable_dates: Vec<String>,
}

/// Read-only access to the travel catalog.
///
/// Implementations must be safe to share across requests; each call
/// acquires and releases whatever connection it needs.
pub trait TravelCatalog: Send + Sync {
    /// Returns raw catalog rows of `kind` located at `destination`
    /// (case-insensitive), best rated first, at most `limit` rows.
    ///
    /// Rows are returned verbatim; price columns may hold numbers,
    /// currency-formatted strings or null.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on database failures.
    fn entities_at(
        &self,
        kind: EntityKind,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StorageError>;

    /// Returns every row of `kind`, for building search indexes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on database failures.
    fn all_entities(&self, kind: EntityKind) -> Result<Vec<Value>, StorageError>;

    /// Executes a query the caller has already validated as read-only.
    ///
    /// Implementations must still refuse statements the engine does not
    /// consider read-only.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QueryRejected`] for mutating statements and
    /// [`StorageError::Database`] for SQL errors.
    fn run_read_only(&self, sql: &str, max_rows: usize) -> Result<QueryRows, StorageError>;

    /// Price statistics per entity kind at `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on database failures.
    fn price_ranges(&self, destination: &str) -> Result<Vec<PriceRange>, StorageError>;

    /// Availability of an entity between two dates (inclusive).
    ///
    /// Returns `Ok(None)` when the entity does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on database failures.
    fn availability(
        &self,
        kind: EntityKind,
        entity_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Availability>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_ignores_unpriced() {
        let range = PriceRange::from_prices(EntityKind::Hotel, [0.0, 100.0, 50.0, 150.0])
            .unwrap_or_else(|| unreachable!());
        assert!((range.min - 50.0).abs() < f64::EPSILON);
        assert!((range.max - 150.0).abs() < f64::EPSILON);
        assert!((range.average - 100.0).abs() < f64::EPSILON);
        assert_eq!(range.count, 3);
    }

    #[test]
    fn test_price_range_empty() {
        assert!(PriceRange::from_prices(EntityKind::Vehicle, [0.0]).is_none());
    }
}
