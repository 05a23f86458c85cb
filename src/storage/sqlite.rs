//! `SQLite` implementation of [`TravelCatalog`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, params};
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::seed::DEMO_CATALOG_SQL;
use super::{Availability, PriceRange, QueryRows, TravelCatalog};
use crate::core::{EntityKind, coerce_price};
use crate::error::StorageError;

/// Catalog schema. Price columns carry no type affinity so that rows keep
/// whatever shape the upstream data feed delivered.
const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS Hotels (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    address TEXT,
    price_per_night,
    rating REAL,
    latitude REAL,
    longitude REAL,
    amenities TEXT,
    images TEXT,
    description TEXT
);
CREATE TABLE IF NOT EXISTS Attractions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    category TEXT,
    ticket_price,
    rating REAL,
    latitude REAL,
    longitude REAL,
    duration_hours REAL,
    images TEXT,
    description TEXT
);
CREATE TABLE IF NOT EXISTS Vehicles (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    vehicle_type TEXT,
    price_per_day,
    capacity INTEGER,
    rating REAL,
    latitude REAL,
    longitude REAL,
    features TEXT,
    images TEXT
);
CREATE TABLE IF NOT EXISTS Availability (
    entity_kind TEXT NOT NULL,
    entity_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    units_available INTEGER NOT NULL,
    PRIMARY KEY (entity_kind, entity_id, date)
);
CREATE INDEX IF NOT EXISTS idx_hotels_city ON Hotels(city COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_attractions_city ON Attractions(city COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_vehicles_city ON Vehicles(city COLLATE NOCASE);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS Availability;
DROP TABLE IF EXISTS Vehicles;
DROP TABLE IF EXISTS Attractions;
DROP TABLE IF EXISTS Hotels;
";

/// Price column for each entity table.
const fn price_column(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Hotel => "price_per_night",
        EntityKind::Attraction => "ticket_price",
        EntityKind::Vehicle => "price_per_day",
    }
}

/// Converts one column of a row to JSON.
fn column_value(row: &Row<'_>, idx: usize) -> Result<Value, rusqlite::Error> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    })
}

fn row_to_map(row: &Row<'_>, columns: &[String]) -> Result<Map<String, Value>, rusqlite::Error> {
    let mut map = Map::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        map.insert(name.clone(), column_value(row, idx)?);
    }
    Ok(map)
}

/// `SQLite`-backed travel catalog.
///
/// The connection sits behind a mutex; every trait method takes the lock
/// for the duration of one call only, so the guard is released on every
/// return path.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCatalog").finish_non_exhaustive()
    }
}

impl SqliteCatalog {
    /// Opens (or creates) a catalog database file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Serialization(format!(
                    "cannot create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if `SQLite` cannot allocate it.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    /// Acquires the connection for one operation.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Creates the schema if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on DDL failure.
    pub fn init(&self) -> Result<(), StorageError> {
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Drops every catalog table.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on DDL failure.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.conn()?.execute_batch(DROP_SQL)?;
        Ok(())
    }

    /// Returns `true` when the catalog tables exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the schema cannot be inspected.
    pub fn is_initialized(&self) -> Result<bool, StorageError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('Hotels', 'Attractions', 'Vehicles', 'Availability')",
            [],
            |row| row.get(0),
        )?;
        Ok(count == 4)
    }

    /// Loads the bundled demo catalog (Egyptian destinations).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotInitialized`] before [`SqliteCatalog::init`],
    /// or [`StorageError::Database`] on insert failure.
    pub fn seed_demo(&self) -> Result<(), StorageError> {
        if !self.is_initialized()? {
            return Err(StorageError::NotInitialized);
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(DEMO_CATALOG_SQL)?;
        tx.commit()?;
        Ok(())
    }

    /// Row counts per entity table.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on database failure.
    pub fn counts(&self) -> Result<Vec<(EntityKind, i64)>, StorageError> {
        let conn = self.conn()?;
        EntityKind::ALL
            .iter()
            .map(|kind| {
                let n: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", kind.table()),
                    [],
                    |row| row.get(0),
                )?;
                Ok((*kind, n))
            })
            .collect()
    }

    fn select_rows(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
        max_rows: usize,
    ) -> Result<QueryRows, StorageError> {
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        let mut truncated = false;
        while let Some(row) = rows.next()? {
            if out.len() >= max_rows {
                truncated = true;
                break;
            }
            out.push(row_to_map(row, &columns)?);
        }

        Ok(QueryRows {
            columns,
            rows: out,
            truncated,
        })
    }
}

impl TravelCatalog for SqliteCatalog {
    fn entities_at(
        &self,
        kind: EntityKind,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StorageError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT * FROM {} WHERE city = ?1 COLLATE NOCASE ORDER BY rating DESC, id",
            kind.table()
        );
        let rows = Self::select_rows(&conn, &sql, params![destination.trim()], limit)?;
        debug!(%kind, destination, rows = rows.rows.len(), "catalog lookup");
        Ok(rows.rows.into_iter().map(Value::Object).collect())
    }

    fn all_entities(&self, kind: EntityKind) -> Result<Vec<Value>, StorageError> {
        let conn = self.conn()?;
        let sql = format!("SELECT * FROM {} ORDER BY id", kind.table());
        let rows = Self::select_rows(&conn, &sql, [], usize::MAX)?;
        Ok(rows.rows.into_iter().map(Value::Object).collect())
    }

    fn run_read_only(&self, sql: &str, max_rows: usize) -> Result<QueryRows, StorageError> {
        let conn = self.conn()?;
        let stmt = conn.prepare(sql)?;
        if !stmt.readonly() {
            return Err(StorageError::QueryRejected(
                "statement is not read-only".to_string(),
            ));
        }
        drop(stmt);
        Self::select_rows(&conn, sql, [], max_rows)
    }

    fn price_ranges(&self, destination: &str) -> Result<Vec<PriceRange>, StorageError> {
        let conn = self.conn()?;
        let mut ranges = Vec::new();
        for kind in EntityKind::ALL {
            let sql = format!(
                "SELECT {} FROM {} WHERE city = ?1 COLLATE NOCASE",
                price_column(kind),
                kind.table()
            );
            let rows = Self::select_rows(&conn, &sql, params![destination.trim()], usize::MAX)?;
            let prices = rows
                .rows
                .iter()
                .filter_map(|r| r.get(price_column(kind)))
                .map(coerce_price);
            if let Some(range) = PriceRange::from_prices(kind, prices) {
                ranges.push(range);
            }
        }
        Ok(ranges)
    }

    fn availability(
        &self,
        kind: EntityKind,
        entity_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Availability>, StorageError> {
        let conn = self.conn()?;

        let name: Option<String> = {
            let mut stmt =
                conn.prepare(&format!("SELECT name FROM {} WHERE id = ?1", kind.table()))?;
            let mut rows = stmt.query(params![entity_id])?;
            match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            }
        };
        let Some(name) = name else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT date FROM Availability \
             WHERE entity_kind = ?1 AND entity_id = ?2 AND units_available <= 0 \
             AND date >= ?3 AND date <= ?4 ORDER BY date",
        )?;
        let unavailable_dates = stmt
            .query_map(
                params![
                    kind.to_string(),
                    entity_id,
                    start.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string()
                ],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Availability {
            kind,
            entity_id,
            name,
            available: unavailable_dates.is_empty(),
            unavailable_dates,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn seeded() -> SqliteCatalog {
        let catalog =
            SqliteCatalog::in_memory().unwrap_or_else(|e| panic!("in_memory failed: {e}"));
        catalog
            .init()
            .unwrap_or_else(|e| panic!("init failed: {e}"));
        catalog
            .seed_demo()
            .unwrap_or_else(|e| panic!("seed failed: {e}"));
        catalog
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_init_is_idempotent() {
        let catalog = SqliteCatalog::in_memory().unwrap_or_else(|e| panic!("{e}"));
        assert!(!catalog.is_initialized().unwrap_or(true));
        catalog.init().unwrap_or_else(|e| panic!("{e}"));
        catalog.init().unwrap_or_else(|e| panic!("{e}"));
        assert!(catalog.is_initialized().unwrap_or(false));
    }

    #[test]
    fn test_seed_requires_init() {
        let catalog = SqliteCatalog::in_memory().unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            catalog.seed_demo(),
            Err(StorageError::NotInitialized)
        ));
    }

    #[test]
    fn test_entities_at_is_case_insensitive() {
        let catalog = seeded();
        let hotels = catalog
            .entities_at(EntityKind::Hotel, "luxor", 50)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(!hotels.is_empty());
        assert!(hotels.iter().all(|h| h["city"] == "Luxor"));
    }

    #[test]
    fn test_entities_at_respects_limit() {
        let catalog = seeded();
        let attractions = catalog
            .entities_at(EntityKind::Attraction, "Luxor", 2)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(attractions.len(), 2);
    }

    #[test]
    fn test_mixed_price_types_preserved() {
        let catalog = seeded();
        let hotels = catalog
            .entities_at(EntityKind::Hotel, "Luxor", 50)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(hotels.iter().any(|h| h["price_per_night"].is_string()));
        assert!(hotels.iter().any(|h| h["price_per_night"].is_number()));
    }

    #[test]
    fn test_run_read_only_caps_rows() {
        let catalog = seeded();
        let rows = catalog
            .run_read_only("SELECT name FROM Attractions", 3)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(rows.rows.len(), 3);
        assert!(rows.truncated);
        assert_eq!(rows.columns, vec!["name".to_string()]);
    }

    #[test]
    fn test_run_read_only_refuses_writes() {
        let catalog = seeded();
        let result = catalog.run_read_only("DELETE FROM Hotels", 10);
        assert!(matches!(result, Err(StorageError::QueryRejected(_))));
        let still_there = catalog
            .entities_at(EntityKind::Hotel, "Luxor", 50)
            .unwrap_or_default();
        assert!(!still_there.is_empty());
    }

    #[test]
    fn test_price_ranges() {
        let catalog = seeded();
        let ranges = catalog
            .price_ranges("Luxor")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(|r| r.min <= r.max && r.count > 0));
        assert!(catalog.price_ranges("Atlantis").unwrap_or_default().is_empty());
    }

    #[test]
    fn test_availability() {
        let catalog = seeded();
        let avail = catalog
            .availability(EntityKind::Hotel, 1, date("2026-12-20"), date("2026-12-26"))
            .unwrap_or_else(|e| panic!("{e}"))
            .unwrap_or_else(|| panic!("hotel 1 missing"));
        assert!(!avail.available);
        assert!(avail.unavailable_dates.contains(&"2026-12-24".to_string()));

        let free = catalog
            .availability(EntityKind::Hotel, 1, date("2026-03-01"), date("2026-03-03"))
            .unwrap_or_else(|e| panic!("{e}"))
            .unwrap_or_else(|| panic!("hotel 1 missing"));
        assert!(free.available);

        let missing = catalog
            .availability(EntityKind::Hotel, 9_999, date("2026-03-01"), date("2026-03-03"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(missing.is_none());
    }

    #[test]
    fn test_reset_drops_tables() {
        let catalog = seeded();
        catalog.reset().unwrap_or_else(|e| panic!("{e}"));
        assert!(!catalog.is_initialized().unwrap_or(true));
    }

    #[test]
    fn test_catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteCatalog>();
    }
}
