//! Integration tests for the per-frame head rig pipeline


use approx::assert_relative_eq;
use avatar_head_rig::{
    compositor::{base_orientation, PoseCompositor},
    config::Config,
    filters::{OrientationFilter, SlerpFilter},
    model_points::FaceRect,
    pipeline::{AvatarRig, FrameController},
    pivot::RigPivot,
    pose_estimation::{solve_face, HeadPose, HeadPoseEstimator},
    regions::RegionPartition,
    scene::SceneGraph,
    Error,
};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use proptest::prelude::*;
use test_helpers::{avatar_document, ConstantSolver, SyntheticDetector, SyntheticFrame};

fn avatar_rig() -> AvatarRig {
    let scene = SceneGraph::from_gltf_json(&avatar_document()).unwrap();
    AvatarRig::from_scene(&scene, &Config::default().rig)
}

fn controller(rotation_vector: Vector3<f64>) -> FrameController<SyntheticDetector, ConstantSolver> {
    let config = Config::default();
    let estimator = HeadPoseEstimator::new(SyntheticDetector, ConstantSolver::new(rotation_vector));
    FrameController::new(estimator, config.create_filter().unwrap(), avatar_rig())
}

fn face_frame() -> SyntheticFrame {
    SyntheticFrame::with_face(FaceRect::new(220, 140, 200, 200))
}

#[test]
fn test_tracked_frames_converge_on_estimate() {
    let rotation_vector = Vector3::new(0.2, -0.3, 0.05);
    let expected = UnitQuaternion::from_scaled_axis(rotation_vector);
    let mut controller = controller(rotation_vector);

    let mut distance = controller.smoothed().angle_to(&expected);
    for _ in 0..100 {
        let output = controller.tick(&face_frame());
        assert!(output.pose.is_tracked());

        let next = output.smoothed.angle_to(&expected);
        assert!(next < distance);
        distance = next;
    }
    assert!(distance < 1e-4);
}

#[test]
fn test_head_rotates_about_pivot() {
    let mut controller = controller(Vector3::new(0.0, 0.6, 0.0));
    for _ in 0..10 {
        controller.tick(&face_frame());
    }
    let output = controller.tick(&face_frame());
    let rig = controller.rig();

    // Vertices pass through the base orientation before rotating about the pivot
    let pivot = Point3::from(rig.pivot().position);
    let base_preimage = base_orientation().transform_point(&pivot);
    let moved = output.transforms.head.transform_point(&base_preimage);
    assert_relative_eq!(moved, pivot, epsilon = 1e-5);

    assert_eq!(output.transforms.body, base_orientation());
    assert_ne!(output.transforms.head, base_orientation());
}

#[test]
fn test_face_lost_drifts_back_to_neutral() {
    let mut controller = controller(Vector3::new(-0.4, 0.1, 0.0));
    for _ in 0..30 {
        controller.tick(&face_frame());
    }

    let mut previous = controller.smoothed().angle();
    for _ in 0..60 {
        let output = controller.tick(&SyntheticFrame::empty());
        assert!(matches!(output.pose, HeadPose::NoFace));
        let angle = output.smoothed.angle();
        assert!(angle < previous);
        previous = angle;
    }
    assert_eq!(controller.frame_count(), 90);
}

#[test]
fn test_degraded_estimator_holds_neutral_pose() {
    let load: avatar_head_rig::Result<SyntheticDetector> =
        Err(Error::DetectorError("cascade not found".to_string()));
    let estimator = HeadPoseEstimator::from_detector_result(load, ConstantSolver::new(Vector3::new(0.5, 0.0, 0.0)));
    assert!(estimator.is_degraded());

    let mut controller = FrameController::new(estimator, Box::new(SlerpFilter::default()), avatar_rig());
    for _ in 0..10 {
        let output = controller.tick(&face_frame());
        assert!(matches!(output.pose, HeadPose::Degraded));
        assert_eq!(output.smoothed, UnitQuaternion::identity());
        assert_eq!(output.transforms.head, base_orientation());
    }
}

proptest! {
    #[test]
    fn prop_compositor_identity_for_any_pivot(
        x in -2.0..2.0_f32,
        y in -2.0..2.0_f32,
        z in -2.0..2.0_f32
    ) {
        let pivot = RigPivot {
            position: Vector3::new(x, y + 1.5, z),
            joint: Some(0),
        };

        let transforms = PoseCompositor::new(&pivot).compose(&UnitQuaternion::identity());
        prop_assert_eq!(transforms.head, base_orientation());
        prop_assert_eq!(transforms.body, base_orientation());
    }
}

#[test]
fn test_tick_with_external_pose() {
    let mut controller = controller(Vector3::zeros());
    let mut solver = ConstantSolver::new(Vector3::new(0.0, 0.0, 0.7));
    let tracked = solve_face(&mut solver, FaceRect::new(0, 0, 100, 100), 320, 240).unwrap();
    let mut filter = SlerpFilter::default();

    for _ in 0..5 {
        let output = controller.tick_with_pose(HeadPose::Tracked(tracked));
        assert_eq!(output.smoothed, filter.apply(&tracked.extracted.quaternion));
    }
    assert_eq!(controller.frame_count(), 5);
}

#[test]
fn test_every_mesh_drawn_once_per_frame() {
    struct Collect(Vec<usize>);

    impl avatar_head_rig::pipeline::Renderer for Collect {
        fn render(
            &mut self,
            partition: &RegionPartition,
            transforms: &avatar_head_rig::compositor::RigTransforms,
        ) -> avatar_head_rig::Result<()> {
            self.0.extend(partition.draw_batches(transforms).map(|(index, _)| index));
            Ok(())
        }
    }

    let mut controller = controller(Vector3::new(0.1, 0.0, 0.0));
    let mut renderer = Collect(Vec::new());
    for _ in 0..3 {
        let output = controller.tick(&face_frame());
        controller.render(&mut renderer, &output).unwrap();
    }

    assert_eq!(renderer.0, vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);
}
