use serde::Serialize;

use crate::config::{SystemKind, ValidatedConfig};
use crate::error::{LayoutError, Result};
use crate::geodesy::GeodesyProvider;
use crate::geometry::{BuildingOutline, SystemMode};
use crate::grid::CanonicalGrid;
use crate::operations::grid::PanelGrid;
use crate::operations::reconcile::ReconciliationResult;

/// Roof clearance reported when the configuration does not set one.
pub const DEFAULT_ROOF_CLEARANCE: &str = "3.2";

/// Layout document handed to structural analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub layout: CanonicalGrid,
    /// Feet, rounded.
    pub building_width: f64,
    /// Feet, rounded.
    pub building_length: f64,
    /// Square feet, rounded.
    pub building_area: f64,
    pub panel_width: f64,
    pub panel_length: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub is_clockwise: bool,
    pub roof_clearance: String,
    pub system: SystemKind,
}

impl ExportPayload {
    /// Payload for a reconciled set of arrays.
    #[must_use]
    pub fn from_reconciliation(
        result: &ReconciliationResult,
        outline: &BuildingOutline,
        config: &ValidatedConfig,
        geodesy: &impl GeodesyProvider,
    ) -> Self {
        Self::build(result.grid.clone(), outline, config, geodesy)
    }

    /// Payload for a whole-building panel grid. Rows that never touch the
    /// roof are dropped.
    #[must_use]
    pub fn from_panel_grid(
        grid: &PanelGrid,
        outline: &BuildingOutline,
        config: &ValidatedConfig,
        geodesy: &impl GeodesyProvider,
    ) -> Self {
        Self::build(grid.layout(), outline, config, geodesy)
    }

    fn build(
        layout: CanonicalGrid,
        outline: &BuildingOutline,
        config: &ValidatedConfig,
        geodesy: &impl GeodesyProvider,
    ) -> Self {
        let dims = outline.dimensions(geodesy);
        let first = outline.polygon().points().first().copied().unwrap_or_default();
        let system = match config.mode {
            SystemMode::NorthSouth => SystemKind::NorthSouth,
            SystemMode::EastWest(_) => SystemKind::EastWest,
        };
        Self {
            layout,
            building_width: dims.width_feet().round(),
            building_length: dims.length_feet().round(),
            building_area: dims.area_square_feet().round(),
            panel_width: config.spec.width(),
            panel_length: config.spec.length(),
            latitude: first.lat,
            longitude: first.lng,
            is_clockwise: outline.is_clockwise(),
            roof_clearance: config
                .roof_clearance
                .map_or_else(|| DEFAULT_ROOF_CLEARANCE.to_owned(), |c| c.to_string()),
            system,
        }
    }

    /// Serializes the payload to JSON.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::Export` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(LayoutError::Export)
    }
}
