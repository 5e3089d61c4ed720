//! Wire-format deserialization for the message source and location cache.
//!
//! Both sources are loaded in one shot per dataset refresh and are immutable
//! afterwards. Per-entry problems (non-string location mentions, unparseable
//! dates, inverted bounds) are skipped with a warning and never abort the
//! load; only an unreadable document surfaces an error, leaving the core
//! empty so every query answers empty rather than failing.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use geofeed_common::{GeoFeedError, GeoPoint, Geometry, Message, RegionBounds};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::location::{normalize, LocationCache};

#[derive(Debug, Deserialize)]
struct RawMessage {
    text: String,
    #[serde(default)]
    cleaned_text: Option<String>,
    channel: String,
    date: String,
    /// Mentions are expected to be strings but the source does not guarantee
    /// it; non-string entries are tolerated and skipped.
    #[serde(default)]
    locations: Vec<Value>,
}

/// One cache entry: a coordinate, a bounding box, or JSON `null` meaning
/// "geocoding was attempted upstream and failed".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGeometry {
    Point {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
    Bounds {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },
}

/// Deserialize the bulk message source, assigning each record a stable id.
/// Identity lives on the record from load time onward; nothing downstream
/// reconstructs it from rendered output.
pub fn load_messages(json: &str) -> Result<Vec<Message>, GeoFeedError> {
    let raw: Vec<RawMessage> = serde_json::from_str(json)
        .map_err(|e| GeoFeedError::Load(format!("message source is not a record array: {e}")))?;

    let mut messages = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let Some(date) = parse_date(&record.date) else {
            warn!(index, date = %record.date, "skipping record with unparseable date");
            continue;
        };
        let locations = record
            .locations
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s),
                other => {
                    warn!(index, entry = %other, "skipping non-string location entry");
                    None
                }
            })
            .collect();
        messages.push(Message {
            id: Uuid::new_v4(),
            text: record.text,
            cleaned_text: record.cleaned_text,
            channel: record.channel,
            date,
            locations,
        });
    }
    debug!(count = messages.len(), "message source loaded");
    Ok(messages)
}

/// Deserialize the precomputed location cache, normalizing keys with the
/// same function used at query time.
pub fn load_location_cache(json: &str) -> Result<LocationCache, GeoFeedError> {
    let raw: HashMap<String, Option<RawGeometry>> = serde_json::from_str(json)
        .map_err(|e| GeoFeedError::Load(format!("location cache is not a JSON object: {e}")))?;

    let mut cache = LocationCache::default();
    for (name, entry) in raw {
        let Some(key) = normalize(&name) else {
            warn!(name = %name, "skipping cache entry with blank key");
            continue;
        };
        let geometry = match entry {
            None => Geometry::Unresolved,
            Some(RawGeometry::Point { lat, lng }) => Geometry::Point(GeoPoint { lat, lng }),
            Some(RawGeometry::Bounds { north, south, east, west }) => {
                let bounds = RegionBounds { north, south, east, west };
                if !bounds.is_valid() {
                    warn!(name = %name, ?bounds, "skipping cache entry with inverted bounds");
                    continue;
                }
                Geometry::Region(bounds)
            }
        };
        cache.insert(key, geometry);
    }
    debug!(count = cache.len(), "location cache loaded");
    Ok(cache)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
