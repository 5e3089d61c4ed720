//! Region deduplication and aggregation.
//!
//! Many messages mention the same place; their cached bounds are identical
//! because they come from one deterministic geocoding pass. The aggregator
//! folds those mentions into a single region entity per (name, bounds) tuple
//! and keeps the entity's message list and activity tier current.

use geofeed_common::{ActivityTier, Message, RegionBounds, RegionEntity, RegionId};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::location::{normalize, LocationCache, Resolution};

/// Aggregation context for one rebuild pass.
///
/// Owned by the caller of the rebuild; discarded and replaced wholesale on
/// every filter change rather than patched incrementally. There is exactly
/// one logical writer (the rebuild pass), which runs to completion before
/// any reader is invoked again.
#[derive(Debug, Default)]
pub struct RegionAggregator {
    regions: Vec<RegionEntity>,
    next_id: RegionId,
    revision: u64,
}

impl RegionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a message into the entity whose (name, bounds) tuple matches,
    /// or create a new entity. Names compare by normalized key, so case and
    /// whitespace variants of one place land in one entity; the first-seen
    /// raw form becomes the display name.
    ///
    /// Bounds equality is exact floating-point equality on all four values,
    /// no tolerance: bounds are sourced from a shared deterministic cache,
    /// never recomputed independently, so bit-identical values are
    /// guaranteed. Returns `None` for blank names or bounds violating the
    /// box invariant — malformed input never becomes an entity.
    pub fn ingest(
        &mut self,
        message_id: Uuid,
        name: &str,
        bounds: RegionBounds,
    ) -> Option<RegionId> {
        let Some(key) = normalize(name) else {
            warn!("skipping region with blank name");
            return None;
        };
        if !bounds.is_valid() {
            warn!(name, ?bounds, "skipping region with inverted bounds");
            return None;
        }

        if let Some(entity) = self
            .regions
            .iter_mut()
            .find(|r| normalize(&r.name).as_ref() == Some(&key) && bounds_equal(&r.bounds, &bounds))
        {
            entity.message_ids.push(message_id);
            entity.tier = ActivityTier::from_count(entity.message_ids.len());
            self.revision += 1;
            return Some(entity.id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.regions.push(RegionEntity {
            id,
            name: name.to_string(),
            bounds,
            center: bounds.center(),
            message_ids: vec![message_id],
            tier: ActivityTier::from_count(1),
        });
        self.revision += 1;
        Some(id)
    }

    /// Clear all entities and identity counters. Must precede any full
    /// re-aggregation pass; otherwise entities accumulate across repeated
    /// filter operations.
    pub fn reset_all(&mut self) {
        self.regions.clear();
        self.next_id = 0;
        self.revision += 1;
    }

    pub fn regions(&self) -> &[RegionEntity] {
        &self.regions
    }

    pub fn get(&self, id: RegionId) -> Option<&RegionEntity> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Bumped on every mutation. The rendering collaborator polls this to
    /// learn a display-state refresh is due; the aggregator itself holds no
    /// rendering state.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn bounds_equal(a: &RegionBounds, b: &RegionBounds) -> bool {
    a.north == b.north && a.south == b.south && a.east == b.east && a.west == b.west
}

/// Full re-aggregation pass: clear the aggregator, then re-ingest every
/// message whose locations resolve to region geometry.
///
/// Point geometry is the marker collaborator's business; `Unresolved` and
/// `NotFound` mentions are expected data and simply skipped. Blank mentions
/// are skipped with a warning.
pub fn rebuild(agg: &mut RegionAggregator, messages: &[Message], cache: &LocationCache) {
    agg.reset_all();
    for message in messages {
        for raw in &message.locations {
            let Some(key) = normalize(raw) else {
                warn!(message_id = %message.id, "skipping blank location mention");
                continue;
            };
            if let Resolution::Region(bounds) = cache.resolve(&key) {
                agg.ingest(message.id, raw.trim(), bounds);
            }
        }
    }
    debug!(
        regions = agg.regions().len(),
        revision = agg.revision(),
        "region rebuild complete"
    );
}
