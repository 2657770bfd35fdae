//! Frame-loop controller.
//!
//! One tick runs detection, pose estimation, smoothing and transform
//! composition strictly in that order. The smoothed orientation lives in the
//! controller's filter and is the only state carried between ticks.

use crate::{
    compositor::{PoseCompositor, RigTransforms},
    config::RigConfig,
    filters::OrientationFilter,
    pivot::{resolve_pivot, RigPivot},
    pose_estimation::{FaceDetector, HeadPose, HeadPoseEstimator, PoseSolver},
    regions::{classify_meshes, RegionPartition},
    scene::SceneGraph,
    Result,
};
use log::{debug, warn};
use nalgebra::UnitQuaternion;

/// Load-time rig data: head pivot, mesh partition and compositor
#[derive(Debug, Clone)]
pub struct AvatarRig {
    pivot: RigPivot,
    partition: RegionPartition,
    compositor: PoseCompositor,
}

impl AvatarRig {
    /// Resolve the pivot and classify meshes once after the scene is loaded
    #[must_use]
    pub fn from_scene(graph: &SceneGraph, rig: &RigConfig) -> Self {
        let pivot = resolve_pivot(graph, &rig.head_joint);
        let partition = classify_meshes(graph.meshes(), &rig.head_keywords);

        Self {
            pivot,
            partition,
            compositor: PoseCompositor::new(&pivot),
        }
    }

    #[must_use]
    pub fn pivot(&self) -> &RigPivot {
        &self.pivot
    }

    #[must_use]
    pub fn partition(&self) -> &RegionPartition {
        &self.partition
    }

    #[must_use]
    pub fn compositor(&self) -> &PoseCompositor {
        &self.compositor
    }
}

/// Consumer of the per-frame transforms
pub trait Renderer {
    /// Draw every mesh with the transform of its region
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails
    fn render(&mut self, partition: &RegionPartition, transforms: &RigTransforms) -> Result<()>;
}

/// Everything one tick produced
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput {
    pub pose: HeadPose,
    pub smoothed: UnitQuaternion<f64>,
    pub transforms: RigTransforms,
}

/// Drives the per-frame pipeline
pub struct FrameController<D, S> {
    estimator: HeadPoseEstimator<D, S>,
    filter: Box<dyn OrientationFilter>,
    rig: AvatarRig,
    frame_count: u64,
}

impl<D: FaceDetector, S: PoseSolver> FrameController<D, S> {
    pub fn new(estimator: HeadPoseEstimator<D, S>, filter: Box<dyn OrientationFilter>, rig: AvatarRig) -> Self {
        Self {
            estimator,
            filter,
            rig,
            frame_count: 0,
        }
    }

    #[must_use]
    pub fn rig(&self) -> &AvatarRig {
        &self.rig
    }

    /// Current smoothed orientation
    #[must_use]
    pub fn smoothed(&self) -> UnitQuaternion<f64> {
        self.filter.current()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Process one frame. Estimation failures are logged and treated as a
    /// frame without a face.
    pub fn tick(&mut self, frame: &D::Frame) -> FrameOutput {
        let pose = match self.estimator.estimate(frame) {
            Ok(pose) => pose,
            Err(e) => {
                warn!("Head pose estimation failed on frame {}: {e}", self.frame_count);
                HeadPose::NoFace
            }
        };
        self.tick_with_pose(pose)
    }

    /// Advance the smoother and recompose transforms from an already
    /// estimated pose
    pub fn tick_with_pose(&mut self, pose: HeadPose) -> FrameOutput {
        let smoothed = self.filter.apply(&pose.quaternion());
        let transforms = self.rig.compositor().compose(&smoothed);
        self.frame_count += 1;

        debug!(
            "Frame {}: tracked={} smoothed angle={:.2}°",
            self.frame_count,
            pose.is_tracked(),
            smoothed.angle().to_degrees()
        );

        FrameOutput {
            pose,
            smoothed,
            transforms,
        }
    }

    /// Hand one frame's transforms to the renderer
    ///
    /// # Errors
    ///
    /// Returns the renderer's error
    pub fn render<R: Renderer>(&self, renderer: &mut R, output: &FrameOutput) -> Result<()> {
        renderer.render(self.rig.partition(), &output.transforms)
    }
}
