//! Property tests for rotation extraction over arbitrary rotations


use approx::{assert_relative_eq, relative_eq};
use avatar_head_rig::rotation::{extract_rotation, rotation_matrix_to_euler, rotation_vector_to_matrix};
use nalgebra::{Rotation3, Vector3};
use proptest::prelude::*;
use std::f64::consts::{FRAC_PI_2, PI};
use test_helpers::rotation;

#[test]
fn test_gimbal_lock_pins_roll() {
    for angle in [FRAC_PI_2, -FRAC_PI_2] {
        let r = Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner();
        let extracted = extract_rotation(&r);

        assert!(extracted.singular);
        assert_eq!(extracted.euler.roll, 0.0);
        assert_relative_eq!(extracted.euler.yaw, angle, epsilon = 1e-9);
        assert_relative_eq!(extracted.quaternion.to_rotation_matrix().into_inner(), r, epsilon = 1e-9);
    }
}

proptest! {
    #[test]
    fn prop_quaternion_round_trips_matrix(rot in rotation(PI)) {
        let r = rot.into_inner();
        let back = extract_rotation(&r).quaternion.to_rotation_matrix().into_inner();
        prop_assert!(relative_eq!(back, r, epsilon = 1e-9), "{back} != {r}");
    }

    #[test]
    fn prop_euler_angles_rebuild_regular_matrices(rot in rotation(PI)) {
        let r = rot.into_inner();
        let (euler, singular) = rotation_matrix_to_euler(&r);
        prop_assume!(!singular);

        // R = Rz(roll) * Ry(yaw) * Rx(pitch)
        let rebuilt = Rotation3::from_axis_angle(&Vector3::z_axis(), euler.roll)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), euler.yaw)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), euler.pitch);
        prop_assert!(relative_eq!(rebuilt.into_inner(), r, epsilon = 1e-9));
    }

    #[test]
    fn prop_rotation_vector_matches_axis_angle(expected in rotation(3.0)) {
        let r = rotation_vector_to_matrix(&expected.scaled_axis());
        prop_assert!(relative_eq!(r, expected.into_inner(), epsilon = 1e-8));
    }

    #[test]
    fn prop_euler_angles_are_finite(rot in rotation(PI)) {
        let (euler, _) = rotation_matrix_to_euler(&rot.into_inner());
        prop_assert!(euler.to_degrees().iter().all(|a| a.is_finite()));
    }
}
