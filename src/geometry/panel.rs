use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Module footprint and the gaps between neighbouring modules, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    width: f64,
    length: f64,
    spacing_ew: f64,
    spacing_ns: f64,
}

impl PanelSpec {
    /// Creates a new panel spec.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NonPositive` if `width` or `length` is not positive,
    /// or `ConfigError::Negative` if a spacing is negative.
    pub fn new(width: f64, length: f64, spacing_ew: f64, spacing_ns: f64) -> Result<Self> {
        positive("panel width", width)?;
        positive("panel length", length)?;
        non_negative("east-west spacing", spacing_ew)?;
        non_negative("north-south spacing", spacing_ns)?;
        Ok(Self {
            width,
            length,
            spacing_ew,
            spacing_ns,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn spacing_ew(&self) -> f64 {
        self.spacing_ew
    }

    #[must_use]
    pub fn spacing_ns(&self) -> f64 {
        self.spacing_ns
    }

    /// Panel width plus east-west spacing.
    #[must_use]
    pub fn unit_width(&self) -> f64 {
        self.width + self.spacing_ew
    }

    /// Panel length plus north-south spacing.
    #[must_use]
    pub fn unit_length(&self) -> f64 {
        self.length + self.spacing_ns
    }

    /// Grid pitch `(across, down)` for a racking system.
    ///
    /// An east-west unit stacks two panels and the ridge gap, and the valley
    /// gap takes the place of the north-south spacing.
    #[must_use]
    pub fn pitch(&self, mode: &SystemMode) -> (f64, f64) {
        match mode {
            SystemMode::NorthSouth => (self.unit_width(), self.unit_length()),
            SystemMode::EastWest(ew) => (
                self.unit_width(),
                self.length * 2.0 + ew.ridge_gap + ew.valley_gap,
            ),
        }
    }
}

/// Racking parameters specific to ridge-mounted east-west pairs, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EastWestSpec {
    pub ridge_gap: f64,
    pub valley_gap: f64,
    pub roof_clearance: f64,
}

/// Racking system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SystemMode {
    /// One panel per grid unit, all tilted the same way.
    #[default]
    NorthSouth,
    /// Each grid unit is an east-facing and a west-facing panel sharing a ridge.
    EastWest(EastWestSpec),
}

impl SystemMode {
    #[must_use]
    pub fn is_east_west(&self) -> bool {
        matches!(self, Self::EastWest(_))
    }
}

/// Which half of an east-west pair a panel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    East,
    West,
}

pub(crate) fn positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { parameter, value }.into())
    }
}

pub(crate) fn non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { parameter, value }.into())
    }
}
