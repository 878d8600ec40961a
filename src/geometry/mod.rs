pub mod footprint;
pub mod obstruction;
pub mod outline;
pub mod panel;
pub mod point;
pub mod polygon;

pub use footprint::Footprint;
pub use obstruction::Obstruction;
pub use outline::{BuildingOutline, OutlineDimensions};
pub use panel::{EastWestSpec, Facing, PanelSpec, SystemMode};
pub use point::{GeoBounds, GeoPoint};
pub use polygon::Polygon;
