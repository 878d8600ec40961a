//! Engine configuration.
//!
//! [`LayoutConfig`] is the raw document as a caller supplies it (JSON, any
//! length unit). [`LayoutConfig::validate`] checks it and converts everything
//! to meters, producing the [`ValidatedConfig`] the engine consumes.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::geometry::panel::non_negative;
use crate::geometry::{EastWestSpec, PanelSpec, SystemMode};
use crate::math::FEET_TO_METERS;

/// Racking system as written in configuration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemKind {
    #[default]
    NorthSouth,
    EastWest,
}

/// Unit of every length in a [`LayoutConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Meters,
    Feet,
}

impl LengthUnit {
    #[must_use]
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            Self::Meters => value,
            Self::Feet => value * FEET_TO_METERS,
        }
    }
}

/// Raw layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub panel_width: f64,
    pub panel_length: f64,
    #[serde(default)]
    pub spacing_ew: f64,
    #[serde(default)]
    pub spacing_ns: f64,
    #[serde(default)]
    pub building_setback: f64,
    #[serde(default)]
    pub obstruction_setback: f64,
    #[serde(default)]
    pub system: SystemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ridge_gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valley_gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof_clearance: Option<f64>,
    #[serde(default)]
    pub unit: LengthUnit,
}

/// Configuration checked and converted to meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedConfig {
    pub spec: PanelSpec,
    pub building_setback: f64,
    pub obstruction_setback: f64,
    pub mode: SystemMode,
    /// Exported verbatim when set.
    pub roof_clearance: Option<f64>,
}

impl LayoutConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or missing panel dimensions.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e).into())
    }

    /// Checks every value and converts to meters.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NonPositive` for a non-positive panel dimension
    /// - `ConfigError::Negative` for a negative spacing, setback or gap
    /// - `ConfigError::MissingEastWest` for east-west mode without a ridge gap
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let m = |v: f64| self.unit.to_meters(v);

        let spec = PanelSpec::new(
            m(self.panel_width),
            m(self.panel_length),
            m(self.spacing_ew),
            m(self.spacing_ns),
        )?;
        non_negative("building setback", self.building_setback)?;
        non_negative("obstruction setback", self.obstruction_setback)?;

        let roof_clearance = self.roof_clearance.map(m);
        if let Some(clearance) = roof_clearance {
            non_negative("roof clearance", clearance)?;
        }

        let mode = match self.system {
            SystemKind::NorthSouth => SystemMode::NorthSouth,
            SystemKind::EastWest => {
                let ridge_gap = self.ridge_gap.ok_or(ConfigError::MissingEastWest("a ridge gap"))?;
                let valley_gap = self.valley_gap.unwrap_or(0.0);
                non_negative("ridge gap", ridge_gap)?;
                non_negative("valley gap", valley_gap)?;
                SystemMode::EastWest(EastWestSpec {
                    ridge_gap: m(ridge_gap),
                    valley_gap: m(valley_gap),
                    roof_clearance: roof_clearance.unwrap_or(0.0),
                })
            }
        };

        let validated = ValidatedConfig {
            spec,
            building_setback: m(self.building_setback),
            obstruction_setback: m(self.obstruction_setback),
            mode,
            roof_clearance,
        };
        tracing::debug!(?validated, "configuration validated");
        Ok(validated)
    }
}
