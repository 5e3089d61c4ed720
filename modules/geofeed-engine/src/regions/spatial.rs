//! Containment and overlap predicates plus the composite region query.

use std::collections::HashSet;

use geofeed_common::{GeoPoint, Message, RegionBounds};
use uuid::Uuid;

use crate::location::{LocationCache, Resolution};

/// Closed-interval containment on both axes: points on an edge are inside.
pub fn point_in_region(p: &GeoPoint, r: &RegionBounds) -> bool {
    r.south <= p.lat && p.lat <= r.north && r.west <= p.lng && p.lng <= r.east
}

/// True unless the boxes are strictly separated on either axis. Touching
/// edges count as overlapping.
pub fn regions_overlap(a: &RegionBounds, b: &RegionBounds) -> bool {
    !(a.south > b.north || a.north < b.south || a.west > b.east || a.east < b.west)
}

/// All messages with at least one location whose geometry falls inside
/// (point) or overlaps (region) `bounds`, most recent first; ties keep the
/// original relative order. Each message appears at most once regardless of
/// how many of its locations hit.
///
/// Linear scan over messages × locations by design: datasets are thousands
/// of records, not millions, and a spatial index would not pay for itself.
/// Re-run on demand rather than cached.
pub fn find_messages_in_region<'a>(
    bounds: &RegionBounds,
    messages: &'a [Message],
    cache: &LocationCache,
) -> Vec<&'a Message> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut hits: Vec<&Message> = Vec::new();

    for message in messages {
        let inside = message.locations.iter().any(|raw| match cache.resolve_raw(raw) {
            Resolution::Point(p) => point_in_region(&p, bounds),
            Resolution::Region(r) => regions_overlap(&r, bounds),
            Resolution::Unresolved | Resolution::NotFound => false,
        });
        if inside && seen.insert(message.id) {
            hits.push(message);
        }
    }

    // Vec::sort_by is stable, so equal timestamps keep source order.
    hits.sort_by(|a, b| b.date.cmp(&a.date));
    hits
}
