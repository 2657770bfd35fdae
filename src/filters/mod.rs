//! Temporal filtering of head orientation estimates.
//!
//! Raw per-frame quaternions are noisy; the filters here blend each new
//! estimate into a persistent orientation so the avatar's head does not
//! jitter.

/// Spherical-interpolation smoother with a fixed per-frame blend factor
pub mod slerp;

use crate::{
    constants::{SMOOTHING_ALPHA_MAX, SMOOTHING_ALPHA_MIN},
    Error, Result,
};
use nalgebra::UnitQuaternion;

pub use slerp::{slerp_shortest, smooth, SlerpFilter, SmoothedOrientation};

/// Trait for all orientation filters
pub trait OrientationFilter: Send + Sync {
    /// Feed one raw estimate and return the filtered orientation
    fn apply(&mut self, raw: &UnitQuaternion<f64>) -> UnitQuaternion<f64>;

    /// Current filtered orientation without consuming a new estimate
    fn current(&self) -> UnitQuaternion<f64>;

    /// Reset filter state to the neutral orientation
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// Pass-through filter, useful for inspecting the raw estimator output
#[derive(Debug, Clone)]
pub struct NoFilter {
    last: UnitQuaternion<f64>,
}

impl NoFilter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: UnitQuaternion::identity(),
        }
    }
}

impl Default for NoFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationFilter for NoFilter {
    fn apply(&mut self, raw: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        self.last = *raw;
        self.last
    }

    fn current(&self) -> UnitQuaternion<f64> {
        self.last
    }

    fn reset(&mut self) {
        self.last = UnitQuaternion::identity();
    }

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create an orientation filter by type name
///
/// # Errors
///
/// Returns an error if the name is unknown or `alpha` is outside (0, 1]
pub fn create_filter(filter_type: &str, alpha: f64) -> Result<Box<dyn OrientationFilter>> {
    match filter_type.to_lowercase().as_str() {
        "none" | "nofilter" => Ok(Box::new(NoFilter::new())),
        "slerp" => {
            if alpha <= SMOOTHING_ALPHA_MIN || alpha > SMOOTHING_ALPHA_MAX || alpha.is_nan() {
                return Err(Error::FilterError(format!(
                    "Slerp alpha must be in (0, 1], got {alpha}"
                )));
            }
            Ok(Box::new(SlerpFilter::new(alpha)))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {filter_type}"))),
    }
}
