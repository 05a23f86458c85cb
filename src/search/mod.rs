//! Free-text similarity search over catalog entities.
//!
//! An [`Embedder`] turns text into a fixed-size unit vector; a
//! [`VectorIndex`] holds one vector per catalog entity and ranks them by
//! cosine similarity against a query vector.

use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;
use serde_json::Value;

use crate::core::EntityKind;
use crate::error::StorageError;
use crate::storage::TravelCatalog;

/// Default embedding dimensions.
pub const DEFAULT_DIMENSIONS: usize = 256;

/// Minimum similarity for a hit to be reported.
pub const DEFAULT_MIN_SCORE: f32 = 0.05;

/// Converts text to embedding vectors.
pub trait Embedder: Send + Sync {
    /// Output vector length.
    fn dimensions(&self) -> usize;

    /// Embeds one text. The result is L2-normalised, or all zeros for
    /// text without tokens.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic feature-hashing embedder.
///
/// Hashes lowercased word unigrams and bigrams into signed buckets. Needs
/// no model download and always produces the same vector for the same text.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Creates an embedder with `dimensions` buckets (minimum 8).
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let h = hasher.finish();
        #[allow(clippy::cast_possible_truncation)]
        let idx = (h % self.dimensions as u64) as usize;
        let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
        (idx, sign)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .collect()
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        let tokens = tokenize(text);

        for token in &tokens {
            let (idx, sign) = self.bucket(token);
            vector[idx] += sign;
        }
        for pair in tokens.windows(2) {
            let (idx, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            vector[idx] += sign * 0.5;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// Creates the default embedder.
#[must_use]
pub fn create_embedder() -> Box<dyn Embedder> {
    Box::new(HashEmbedder::default())
}

/// Cosine similarity of two equal-length vectors; zero for degenerate input.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Entity kind.
    pub kind: EntityKind,
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// City the entity is located in.
    pub city: String,
    /// Cosine similarity to the query.
    pub score: f32,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    kind: EntityKind,
    id: String,
    name: String,
    city: String,
    vector: Vec<f32>,
}

fn text_field(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Text indexed for an entity row.
fn document_text(row: &Value) -> String {
    [
        "name",
        "city",
        "category",
        "vehicle_type",
        "description",
        "amenities",
        "features",
    ]
    .iter()
    .map(|k| text_field(row, k).replace('|', " "))
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// In-memory cosine-similarity index over catalog entities.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embeds every entity in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the catalog cannot be read.
    pub fn build(catalog: &dyn TravelCatalog, embedder: &dyn Embedder) -> Result<Self, StorageError> {
        let mut index = Self::default();
        for kind in EntityKind::ALL {
            for row in catalog.all_entities(kind)? {
                index.insert(kind, &row, embedder);
            }
        }
        Ok(index)
    }

    /// Adds one entity row.
    pub fn insert(&mut self, kind: EntityKind, row: &Value, embedder: &dyn Embedder) {
        let name = text_field(row, "name");
        if name.is_empty() {
            return;
        }
        self.entries.push(IndexEntry {
            kind,
            id: text_field(row, "id"),
            city: text_field(row, "city"),
            vector: embedder.embed(&document_text(row)),
            name,
        });
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the `top_k` entities most similar to `query`, optionally
    /// restricted to one kind, dropping hits below `min_score`.
    #[must_use]
    pub fn search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        kind: Option<EntityKind>,
        top_k: usize,
        min_score: f32,
    ) -> Vec<SearchHit> {
        let query_vec = embedder.embed(query);
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .map(|e| SearchHit {
                kind: e.kind,
                id: e.id.clone(),
                name: e.name.clone(),
                city: e.city.clone(),
                score: cosine_similarity(&query_vec, &e.vector),
            })
            .filter(|h| h.score >= min_score)
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        hits
    }
}
