//! Rotation extraction from the pose solver's output.
//!
//! The solver reports an axis-angle rotation vector; it is turned into a
//! 3×3 matrix and from there directly into a unit quaternion. Euler angles
//! are computed alongside for diagnostics only and never converted back.

use crate::constants::SINGULARITY_THRESHOLD;
use log::debug;
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// Euler decomposition of a rotation matrix, in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    /// Rotation about the X axis
    pub pitch: f64,
    /// Rotation about the Y axis
    pub yaw: f64,
    /// Rotation about the Z axis
    pub roll: f64,
}

impl EulerAngles {
    /// Angles converted to degrees as `[pitch, yaw, roll]`
    #[must_use]
    pub fn to_degrees(&self) -> [f64; 3] {
        [self.pitch.to_degrees(), self.yaw.to_degrees(), self.roll.to_degrees()]
    }
}

/// Result of decomposing one solver rotation
#[derive(Debug, Clone, Copy)]
pub struct ExtractedRotation {
    /// Diagnostic Euler angles
    pub euler: EulerAngles,
    /// Whether the gimbal-lock branch was taken
    pub singular: bool,
    /// The same rotation as a unit quaternion
    pub quaternion: UnitQuaternion<f64>,
}

/// Convert an axis-angle rotation vector (Rodrigues form) into a rotation matrix
#[must_use]
pub fn rotation_vector_to_matrix(rotation_vector: &Vector3<f64>) -> Matrix3<f64> {
    Rotation3::new(*rotation_vector).into_inner()
}

/// Decompose a rotation matrix into Euler angles.
///
/// Returns the angles and whether the singular branch was used. In the
/// singular case roll is pinned to exactly zero.
#[must_use]
pub fn rotation_matrix_to_euler(r: &Matrix3<f64>) -> (EulerAngles, bool) {
    let sy = (r[(0, 0)] * r[(0, 0)] + r[(1, 0)] * r[(1, 0)]).sqrt();
    let singular = sy < SINGULARITY_THRESHOLD;

    let angles = if singular {
        EulerAngles {
            pitch: (-r[(1, 2)]).atan2(r[(1, 1)]),
            yaw: (-r[(2, 0)]).atan2(sy),
            roll: 0.0,
        }
    } else {
        EulerAngles {
            pitch: r[(2, 1)].atan2(r[(2, 2)]),
            yaw: (-r[(2, 0)]).atan2(sy),
            roll: r[(1, 0)].atan2(r[(0, 0)]),
        }
    };

    (angles, singular)
}

/// Convert a rotation matrix straight into a unit quaternion.
///
/// The matrix is trusted to be orthonormal.
#[must_use]
pub fn rotation_matrix_to_quaternion(r: &Matrix3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*r))
}

/// Extract the head orientation from a solver rotation matrix
#[must_use]
pub fn extract_rotation(r: &Matrix3<f64>) -> ExtractedRotation {
    let (euler, singular) = rotation_matrix_to_euler(r);
    let [pitch, yaw, roll] = euler.to_degrees();
    debug!(
        "Head pose Euler (deg): pitch={:.2} yaw={:.2} roll={:.2}{}",
        pitch,
        yaw,
        roll,
        if singular { " (singular)" } else { "" }
    );

    ExtractedRotation {
        euler,
        singular,
        quaternion: rotation_matrix_to_quaternion(r),
    }
}
