use serde::{Deserialize, Serialize};

use crate::algo::{ClipBoundary, IsochroneRequest};
use crate::{CoordinateSystem, Error, Minutes, WalkingSpeed};

/// Options controlling how region networks are merged into one graph
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GraphBuildOptions {
    pub coordinate_system: CoordinateSystem,
    /// Coordinate distance under which nodes of different regions are merged.
    /// Defaults to [`CoordinateSystem::default_tolerance`].
    pub coalesce_tolerance: Option<f64>,
}

impl GraphBuildOptions {
    pub fn geographic() -> Self {
        Self {
            coordinate_system: CoordinateSystem::Geographic,
            coalesce_tolerance: None,
        }
    }

    pub fn planar() -> Self {
        Self {
            coordinate_system: CoordinateSystem::Planar,
            coalesce_tolerance: None,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.coalesce_tolerance
            .unwrap_or_else(|| self.coordinate_system.default_tolerance())
    }
}

/// Isochrone computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkshedConfig {
    /// Walking speed in meters per minute
    pub speed_m_per_min: f64,
    /// Time budgets in minutes, one isochrone per budget and point
    pub budgets_minutes: Vec<Minutes>,
    pub coordinate_system: CoordinateSystem,
    pub coalesce_tolerance: Option<f64>,
    /// Points farther than this from any street node are not computed
    pub max_snap_distance_m: Option<f64>,
}

impl Default for WalkshedConfig {
    fn default() -> Self {
        Self {
            speed_m_per_min: WalkingSpeed::default().meters_per_minute(),
            budgets_minutes: vec![5.0, 10.0, 20.0],
            coordinate_system: CoordinateSystem::Geographic,
            coalesce_tolerance: None,
            max_snap_distance_m: None,
        }
    }
}

impl WalkshedConfig {
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), Error> {
        WalkingSpeed::from_meters_per_minute(self.speed_m_per_min)?;
        validate_budgets(&self.budgets_minutes)?;

        if let Some(tolerance) = self.coalesce_tolerance
            && !(tolerance.is_finite() && tolerance >= 0.0)
        {
            return Err(Error::InvalidData(format!(
                "coalesce_tolerance must be a non-negative number, got {tolerance}"
            )));
        }
        if let Some(limit) = self.max_snap_distance_m
            && !(limit.is_finite() && limit >= 0.0)
        {
            return Err(Error::InvalidData(format!(
                "max_snap_distance_m must be a non-negative number, got {limit}"
            )));
        }
        Ok(())
    }

    pub fn speed(&self) -> Result<WalkingSpeed, Error> {
        WalkingSpeed::from_meters_per_minute(self.speed_m_per_min)
    }

    pub fn build_options(&self) -> GraphBuildOptions {
        GraphBuildOptions {
            coordinate_system: self.coordinate_system,
            coalesce_tolerance: self.coalesce_tolerance,
        }
    }

    pub fn request(&self, clip: Option<ClipBoundary>) -> Result<IsochroneRequest, Error> {
        self.validate()?;
        Ok(IsochroneRequest {
            budgets: self.budgets_minutes.clone(),
            speed: self.speed()?,
            clip,
            max_snap_distance: self.max_snap_distance_m,
        })
    }
}

pub(crate) fn validate_budgets(budgets: &[Minutes]) -> Result<(), Error> {
    if budgets.is_empty() {
        return Err(Error::InvalidData(
            "At least one time budget is required".to_string(),
        ));
    }
    budgets.iter().try_for_each(|&budget| validate_budget(budget))
}

pub(crate) fn validate_budget(budget: Minutes) -> Result<(), Error> {
    if budget.is_finite() && budget >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidBudget(budget))
    }
}
