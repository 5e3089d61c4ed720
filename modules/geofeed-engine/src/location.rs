//! Location key normalization and geometry resolution.
//!
//! Raw location mentions are free text; the only join between a mention and
//! cached geometry is the normalized key. Cache keys and query keys go
//! through the same `normalize` so case/whitespace variance never causes a
//! spurious miss.

use std::collections::HashMap;

use geofeed_common::{GeoPoint, Geometry, RegionBounds};

/// Canonical lookup key for a location name: trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey(String);

impl LocationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a raw location mention into a lookup key.
///
/// Returns `None` when the input is empty after trimming; callers skip such
/// entries (logging a warning at the call site) rather than treating them as
/// errors. Idempotent: normalizing an already-normalized key changes nothing.
pub fn normalize(raw: &str) -> Option<LocationKey> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(LocationKey(trimmed.to_lowercase()))
}

/// Outcome of a cache lookup.
///
/// `Unresolved` (geocoding was attempted upstream and failed) is expected
/// data, not an error, and is distinct from `NotFound` (key never seen).
/// Both omit the location from placement without affecting the message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Point(GeoPoint),
    Region(RegionBounds),
    Unresolved,
    NotFound,
}

/// Precomputed mapping from location keys to geometry, loaded once per
/// dataset refresh and immutable afterwards.
#[derive(Debug, Default)]
pub struct LocationCache {
    entries: HashMap<LocationKey, Geometry>,
}

impl LocationCache {
    pub fn insert(&mut self, key: LocationKey, geometry: Geometry) {
        self.entries.insert(key, geometry);
    }

    pub fn resolve(&self, key: &LocationKey) -> Resolution {
        match self.entries.get(key) {
            Some(Geometry::Point(p)) => Resolution::Point(*p),
            Some(Geometry::Region(b)) => Resolution::Region(*b),
            Some(Geometry::Unresolved) => Resolution::Unresolved,
            None => Resolution::NotFound,
        }
    }

    /// Resolve a raw, un-normalized mention. Empty mentions resolve to
    /// `NotFound`.
    pub fn resolve_raw(&self, raw: &str) -> Resolution {
        match normalize(raw) {
            Some(key) => self.resolve(&key),
            None => Resolution::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
