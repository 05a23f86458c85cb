//! Nearby-destination suggestions for empty fetch results.

use std::collections::BTreeMap;

use crate::core::EntityKind;

/// Immutable lookup of destinations to nearby alternatives.
///
/// Keys are matched case-insensitively. Built once and handed to the
/// gateway at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeDestinations {
    table: BTreeMap<String, Vec<String>>,
}

impl AlternativeDestinations {
    /// Builds a table from `(destination, alternatives)` pairs.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(k, v)| {
                    (
                        k.into().to_lowercase(),
                        v.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Nearby alternatives for `destination`, if known.
    #[must_use]
    pub fn alternatives_for(&self, destination: &str) -> Option<&[String]> {
        self.table
            .get(&destination.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Human-readable suggestion for an empty `kind` lookup at `destination`.
    #[must_use]
    pub fn suggestion(&self, kind: EntityKind, destination: &str) -> String {
        let destination = destination.trim();
        match self.alternatives_for(destination) {
            Some(alts) if !alts.is_empty() => format!(
                "No {} found in {destination}. Try nearby: {}.",
                kind.plural(),
                alts.join(", ")
            ),
            _ => format!(
                "No {} found in {destination}. Try a nearby major city or a higher budget tier.",
                kind.plural()
            ),
        }
    }
}

impl Default for AlternativeDestinations {
    fn default() -> Self {
        Self::new([
            ("Luxor", vec!["Aswan", "Cairo", "Hurghada"]),
            ("Aswan", vec!["Luxor", "Abu Simbel", "Cairo"]),
            ("Cairo", vec!["Giza", "Alexandria", "Luxor"]),
            ("Giza", vec!["Cairo", "Alexandria", "Fayoum"]),
            ("Alexandria", vec!["Cairo", "El Alamein", "Giza"]),
            ("Hurghada", vec!["El Gouna", "Sharm El Sheikh", "Luxor"]),
            ("Sharm El Sheikh", vec!["Dahab", "Hurghada", "Cairo"]),
            ("Dahab", vec!["Sharm El Sheikh", "Nuweiba", "Hurghada"]),
            ("Siwa", vec!["Marsa Matruh", "Alexandria", "Cairo"]),
        ])
    }
}
