use super::OrientationFilter;
use crate::constants::{SLERP_PARALLEL_EPSILON, SMOOTHING_ALPHA};
use nalgebra::{Quaternion, UnitQuaternion};

/// Persistent smoothed head orientation, carried from frame to frame.
///
/// Starts at the identity rotation. The blend is applied once per frame
/// with a fixed factor, independent of the frame duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedOrientation {
    quaternion: UnitQuaternion<f64>,
}

impl SmoothedOrientation {
    /// Neutral orientation
    #[must_use]
    pub fn identity() -> Self {
        Self {
            quaternion: UnitQuaternion::identity(),
        }
    }

    /// Start from an arbitrary orientation
    #[must_use]
    pub fn from_quaternion(quaternion: UnitQuaternion<f64>) -> Self {
        Self { quaternion }
    }

    #[must_use]
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }
}

impl Default for SmoothedOrientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Spherical linear interpolation along the shortest arc.
///
/// Nearly parallel inputs fall back to a normalized linear blend. The
/// result is always re-normalized.
#[must_use]
pub fn slerp_shortest(from: &UnitQuaternion<f64>, to: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    if from == to {
        return *from;
    }

    let mut cos_theta = from.coords.dot(&to.coords);
    let target = if cos_theta < 0.0 {
        cos_theta = -cos_theta;
        -to.coords
    } else {
        to.coords
    };

    let blended = if cos_theta > 1.0 - SLERP_PARALLEL_EPSILON {
        from.coords * (1.0 - t) + target * t
    } else {
        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let weight_from = ((1.0 - t) * theta).sin() / sin_theta;
        let weight_to = (t * theta).sin() / sin_theta;
        from.coords * weight_from + target * weight_to
    };

    UnitQuaternion::new_normalize(Quaternion::from(blended))
}

/// One smoothing step: `slerp(state, raw, alpha)`
#[must_use]
pub fn smooth(state: SmoothedOrientation, raw: &UnitQuaternion<f64>, alpha: f64) -> SmoothedOrientation {
    SmoothedOrientation {
        quaternion: slerp_shortest(&state.quaternion, raw, alpha),
    }
}

/// Slerp smoothing filter
#[derive(Debug, Clone)]
pub struct SlerpFilter {
    alpha: f64,
    state: SmoothedOrientation,
}

impl SlerpFilter {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self {
            alpha,
            state: SmoothedOrientation::identity(),
        }
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn state(&self) -> SmoothedOrientation {
        self.state
    }
}

impl Default for SlerpFilter {
    fn default() -> Self {
        Self::new(SMOOTHING_ALPHA)
    }
}

impl OrientationFilter for SlerpFilter {
    fn apply(&mut self, raw: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        self.state = smooth(self.state, raw, self.alpha);
        self.state.quaternion()
    }

    fn current(&self) -> UnitQuaternion<f64> {
        self.state.quaternion()
    }

    fn reset(&mut self) {
        self.state = SmoothedOrientation::identity();
    }

    fn name(&self) -> &str {
        "SlerpFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_slerp_endpoints() {
        let a = UnitQuaternion::identity();
        let b = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);

        assert_relative_eq!(slerp_shortest(&a, &b, 0.0).angle_to(&a), 0.0, epsilon = 1e-6);
        assert_relative_eq!(slerp_shortest(&a, &b, 1.0).angle_to(&b), 0.0, epsilon = 1e-6);
        assert_relative_eq!(slerp_shortest(&a, &b, 0.5).angle(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_slerp_takes_shortest_arc() {
        let a = UnitQuaternion::identity();
        let b = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.8);
        // Same rotation, opposite hemisphere
        let b_negated = UnitQuaternion::new_unchecked(-b.into_inner());

        let direct = slerp_shortest(&a, &b, 0.25);
        let flipped = slerp_shortest(&a, &b_negated, 0.25);

        assert_relative_eq!(direct.angle_to(&flipped), 0.0, epsilon = 1e-6);
        assert_relative_eq!(flipped.angle(), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_slerp_nearly_parallel_does_not_panic() {
        let a = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3);
        let b = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3 + 1e-9);

        let result = slerp_shortest(&a, &b, 0.1);
        assert_relative_eq!(result.norm(), 1.0, epsilon = 1e-12);
        assert!(result.angle_to(&a) < 1e-6);
    }

    #[test]
    fn test_smoothing_step() {
        let raw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);
        let state = smooth(SmoothedOrientation::identity(), &raw, 0.1);

        assert_relative_eq!(state.quaternion().angle(), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_filter_reset() {
        let mut filter = SlerpFilter::default();
        assert_eq!(filter.alpha(), SMOOTHING_ALPHA);

        filter.apply(&UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5));
        assert!(filter.current().angle() > 0.0);

        filter.reset();
        assert_eq!(filter.current(), UnitQuaternion::identity());
    }

    #[test]
    #[should_panic(expected = "Alpha must be in (0, 1]")]
    fn test_zero_alpha() {
        let _ = SlerpFilter::new(0.0);
    }
}
