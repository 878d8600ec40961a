mod data;
mod manager;
mod placement;

pub use data::{Array, ArrayId, ArrayPanel, ArrayState, Direction, Extents, PanelState, MAX_EXTENT};
pub use manager::ArrayManager;
pub use placement::PanelPlacement;
