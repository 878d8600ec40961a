pub mod config;
pub mod error;
pub mod export;
pub mod geodesy;
pub mod geometry;
pub mod grid;
pub mod math;
pub mod operations;

pub use config::{LayoutConfig, ValidatedConfig};
pub use error::{LayoutError, Result};
pub use export::ExportPayload;
pub use geodesy::{GeodesyProvider, SphericalGeodesy};
pub use geometry::{BuildingOutline, GeoPoint, Obstruction, PanelSpec, Polygon, SystemMode};
pub use grid::{CanonicalGrid, CellState};
