mod builder;
mod panel_grid;

pub use builder::{PanelGridBuilder, SAFETY_MARGIN};
pub use panel_grid::{GridPanel, PanelGrid, SelectionMode};
