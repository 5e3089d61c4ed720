use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Geo types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Axis-aligned lat/lng bounding box. Invariant: `north >= south` and
/// `east >= west`; boxes violating it are rejected at the load boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegionBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl RegionBounds {
    pub fn is_valid(&self) -> bool {
        self.north >= self.south && self.east >= self.west
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    /// Raw area as the span product, in square degrees.
    pub fn area(&self) -> f64 {
        self.lat_span() * self.lng_span()
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }
}

/// Cached geometry for a location key. `Unresolved` is an explicit negative
/// entry (geocoding was attempted upstream and failed) and is distinct from
/// the key being absent from the cache altogether.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Point(GeoPoint),
    Region(RegionBounds),
    Unresolved,
}

// --- Messages ---

/// A geotagged text record. Immutable once loaded; the `id` is assigned at
/// load time and is the sole identity used for deduplication downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub cleaned_text: Option<String>,
    pub channel: String,
    pub date: DateTime<Utc>,
    /// Raw location mentions as they appeared in the source. Duplicates
    /// across messages are expected and not deduplicated at this layer.
    pub locations: Vec<String>,
}

// --- Region entities ---

pub type RegionId = u64;

/// Message count at which a region entity becomes `Medium` / `High`.
pub const TIER_MEDIUM_MIN: usize = 5;
pub const TIER_HIGH_MIN: usize = 10;

/// Ordered low < medium < high.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTier {
    Low,
    Medium,
    High,
}

impl ActivityTier {
    /// Derive the tier from a message count. Callers recompute on every
    /// mutation; the tier is never cached independently of the count.
    pub fn from_count(count: usize) -> Self {
        if count >= TIER_HIGH_MIN {
            ActivityTier::High
        } else if count >= TIER_MEDIUM_MIN {
            ActivityTier::Medium
        } else {
            ActivityTier::Low
        }
    }
}

impl std::fmt::Display for ActivityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityTier::Low => write!(f, "low"),
            ActivityTier::Medium => write!(f, "medium"),
            ActivityTier::High => write!(f, "high"),
        }
    }
}

/// A deduplicated region shape with every message that resolved to its exact
/// bounds. Identity is the (name, bounds) tuple, compared by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntity {
    pub id: RegionId,
    pub name: String,
    pub bounds: RegionBounds,
    pub center: GeoPoint,
    /// Directly-associated messages in insertion order.
    pub message_ids: Vec<Uuid>,
    pub tier: ActivityTier,
}
