pub mod dataset;
pub mod location;
pub mod regions;
pub mod search;
pub mod viewport;

pub use location::{normalize, LocationCache, LocationKey, Resolution};
pub use regions::aggregate::{rebuild, RegionAggregator};
pub use regions::spatial::{find_messages_in_region, point_in_region, regions_overlap};
pub use search::matches;
pub use viewport::{plan, Layer, Placement, Viewport};
