//! Viewport-dependent culling and paint ordering for region shapes.
//!
//! A wide view should not be cluttered by sub-degree regions, and a zoomed-in
//! view should not be dominated by a huge region when smaller ones are nested
//! inside it. The planner is a pure function of (viewport, zoom, shapes); it
//! is recomputed on every viewport/zoom change and whenever the shape set
//! changes, never cached across changes.

use geofeed_common::{RegionBounds, RegionEntity, RegionId};

// Empirically tuned display cutoffs, not derived values.
const MIN_SPAN_WIDE: f64 = 0.1; // zoom < 9
const MIN_SPAN_MID: f64 = 0.05; // 9 <= zoom < 11
const MIN_SPAN_CLOSE: f64 = 0.01; // 11 <= zoom < 13
const MAX_RELATIVE_AREA_CLOSE: f64 = 0.6; // 11 < zoom <= 13
const MAX_RELATIVE_AREA_STREET: f64 = 0.4; // zoom > 13

/// Current map view. Lower zoom means more zoomed out.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub bounds: RegionBounds,
    pub zoom: f64,
}

/// Which rendering layer a visible shape belongs to. Small shapes paint in
/// front so a region nested inside a larger one stays clickable and legible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Front,
    Back,
}

/// Planner verdict for one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub id: RegionId,
    pub visible: bool,
    /// Position in the paint sequence among visible shapes; rank 0 paints
    /// first (bottom), the highest rank paints last (top). `None` if hidden.
    pub rank: Option<usize>,
    pub layer: Option<Layer>,
}

/// Classify every region as shown/hidden for this viewport and assign paint
/// order. Output is index-aligned with `regions`.
pub fn plan(viewport: &Viewport, regions: &[RegionEntity]) -> Vec<Placement> {
    let vp_lat_span = viewport.bounds.lat_span();
    let vp_lng_span = viewport.bounds.lng_span();

    // Ascending raw area, smallest first.
    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.sort_by(|&a, &b| regions[a].bounds.area().total_cmp(&regions[b].bounds.area()));

    let visible: Vec<usize> = order
        .into_iter()
        .filter(|&i| {
            let b = &regions[i].bounds;
            visible_at(viewport.zoom, b, relative_area(b, vp_lat_span, vp_lng_span))
        })
        .collect();

    let mut placements: Vec<Placement> = regions
        .iter()
        .map(|r| Placement { id: r.id, visible: false, rank: None, layer: None })
        .collect();

    // Smaller half of the visible set goes to the front layer; the paint
    // sequence runs largest-to-smallest so the smallest shape lands topmost.
    let front_cutoff = visible.len().div_ceil(2);
    let n = visible.len();
    for (pos, &idx) in visible.iter().enumerate() {
        placements[idx] = Placement {
            id: regions[idx].id,
            visible: true,
            rank: Some(n - 1 - pos),
            layer: Some(if pos < front_cutoff { Layer::Front } else { Layer::Back }),
        };
    }

    placements
}

/// Shape area as a fraction of the viewport's area.
fn relative_area(bounds: &RegionBounds, vp_lat_span: f64, vp_lng_span: f64) -> f64 {
    if vp_lat_span <= 0.0 || vp_lng_span <= 0.0 {
        return f64::INFINITY;
    }
    (bounds.lat_span() / vp_lat_span) * (bounds.lng_span() / vp_lng_span)
}

fn visible_at(zoom: f64, bounds: &RegionBounds, relative_area: f64) -> bool {
    let min_span = if zoom < 9.0 {
        Some(MIN_SPAN_WIDE)
    } else if zoom < 11.0 {
        Some(MIN_SPAN_MID)
    } else if zoom < 13.0 {
        Some(MIN_SPAN_CLOSE)
    } else {
        None
    };
    if let Some(min) = min_span {
        if bounds.lat_span() < min || bounds.lng_span() < min {
            return false;
        }
    }

    if zoom > 13.0 && relative_area > MAX_RELATIVE_AREA_STREET {
        return false;
    }
    if zoom > 11.0 && zoom <= 13.0 && relative_area > MAX_RELATIVE_AREA_CLOSE {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofeed_common::{ActivityTier, RegionEntity};

    fn entity(id: RegionId, north: f64, south: f64, east: f64, west: f64) -> RegionEntity {
        let bounds = RegionBounds { north, south, east, west };
        RegionEntity {
            id,
            name: format!("region-{id}"),
            bounds,
            center: bounds.center(),
            message_ids: Vec::new(),
            tier: ActivityTier::Low,
        }
    }

    fn viewport(zoom: f64) -> Viewport {
        // 2 x 2 degree viewport
        Viewport {
            bounds: RegionBounds { north: 33.0, south: 31.0, east: 36.0, west: 34.0 },
            zoom,
        }
    }

    #[test]
    fn wide_view_hides_sub_degree_spans() {
        // 0.05 degree spans fall under the 0.1 cutoff at zoom < 9.
        let regions = vec![entity(0, 31.55, 31.5, 34.55, 34.5)];
        let plan = plan(&viewport(8.0), &regions);
        assert!(!plan[0].visible);
        assert_eq!(plan[0].rank, None);
    }

    #[test]
    fn wide_view_shows_degree_scale_spans() {
        let regions = vec![entity(0, 32.5, 31.5, 35.5, 34.5)];
        let plan = plan(&viewport(8.0), &regions);
        assert!(plan[0].visible);
    }

    #[test]
    fn mid_zoom_uses_smaller_cutoff() {
        // 0.07 spans: hidden at zoom 8 (cutoff 0.1), shown at zoom 10 (0.05).
        let regions = vec![entity(0, 31.57, 31.5, 34.57, 34.5)];
        assert!(!plan(&viewport(8.0), &regions)[0].visible);
        assert!(plan(&viewport(10.0), &regions)[0].visible);
    }

    #[test]
    fn close_zoom_uses_finest_cutoff() {
        // 0.02 spans: hidden at zoom 10, shown at zoom 12.
        let regions = vec![entity(0, 31.52, 31.5, 34.52, 34.5)];
        assert!(!plan(&viewport(10.0), &regions)[0].visible);
        assert!(plan(&viewport(12.0), &regions)[0].visible);
    }

    #[test]
    fn street_zoom_hides_dominant_shapes() {
        // Shape covers half the viewport area: relative_area = 0.5 > 0.4.
        let regions = vec![entity(0, 33.0, 31.0, 35.0, 34.0)];
        assert!(!plan(&viewport(14.0), &regions)[0].visible);
        // The 0.6 cap at zoom <= 13 lets the same shape through.
        assert!(plan(&viewport(12.0), &regions)[0].visible);
    }

    #[test]
    fn close_zoom_cap_at_point_six() {
        // relative_area = 0.7 exceeds the 0.6 cap for 11 < zoom <= 13.
        let regions = vec![entity(0, 32.4, 31.0, 36.0, 34.0)];
        assert!(!plan(&viewport(12.0), &regions)[0].visible);
        // At zoom 11 exactly, no relative-area cap applies.
        assert!(plan(&viewport(11.0), &regions)[0].visible);
    }

    #[test]
    fn smaller_half_paints_in_front_and_on_top() {
        let regions = vec![
            entity(0, 33.0, 31.5, 35.5, 34.0), // large
            entity(1, 31.8, 31.5, 34.8, 34.5), // small, nested scale
            entity(2, 32.5, 31.5, 35.0, 34.0), // medium
            entity(3, 31.7, 31.5, 34.7, 34.5), // smallest
        ];
        let plan = plan(&viewport(8.0), &regions);
        assert!(plan.iter().all(|p| p.visible));

        // Smallest two of four are the front layer.
        assert_eq!(plan[3].layer, Some(Layer::Front));
        assert_eq!(plan[1].layer, Some(Layer::Front));
        assert_eq!(plan[2].layer, Some(Layer::Back));
        assert_eq!(plan[0].layer, Some(Layer::Back));

        // Paint sequence runs largest (rank 0, bottom) to smallest (top).
        assert_eq!(plan[0].rank, Some(0));
        assert_eq!(plan[2].rank, Some(1));
        assert_eq!(plan[1].rank, Some(2));
        assert_eq!(plan[3].rank, Some(3));
    }

    #[test]
    fn single_visible_shape_is_front() {
        let regions = vec![entity(0, 32.5, 31.5, 35.5, 34.5)];
        let plan = plan(&viewport(8.0), &regions);
        assert_eq!(plan[0].layer, Some(Layer::Front));
        assert_eq!(plan[0].rank, Some(0));
    }

    #[test]
    fn hidden_shapes_get_no_rank_or_layer() {
        let regions = vec![
            entity(0, 32.5, 31.5, 35.5, 34.5),   // visible at zoom 8
            entity(1, 31.51, 31.5, 34.51, 34.5), // hidden at zoom 8
        ];
        let plan = plan(&viewport(8.0), &regions);
        assert!(plan[0].visible);
        assert!(!plan[1].visible);
        assert_eq!(plan[1].rank, None);
        assert_eq!(plan[1].layer, None);
        // Ranks are assigned only among visible shapes.
        assert_eq!(plan[0].rank, Some(0));
    }

    #[test]
    fn empty_shape_set_plans_empty() {
        assert!(plan(&viewport(8.0), &[]).is_empty());
    }
}
