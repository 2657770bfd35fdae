//! Per-frame head pose estimation.
//!
//! Face detection and the PnP solve are external collaborators reached
//! through the [`FaceDetector`] and [`PoseSolver`] traits. The estimator
//! takes the first detected face, builds the six model/image point
//! correspondences, solves for the camera pose and extracts the head
//! orientation as a quaternion.

use crate::{
    model_points::{CameraIntrinsics, Correspondences, FaceRect},
    rotation::{extract_rotation, rotation_vector_to_matrix, ExtractedRotation},
    Result,
};
use log::{debug, info, warn};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Anything with pixel dimensions that a detector can consume
pub trait Frame {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
}

/// Face rectangle detector
pub trait FaceDetector {
    type Frame: Frame;

    /// Detect zero or more faces, strongest candidates first
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying detector fails on this frame
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<FaceRect>>;
}

/// Output of the PnP solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSolution {
    /// Axis-angle rotation (Rodrigues vector)
    pub rotation_vector: Vector3<f64>,
    pub translation_vector: Vector3<f64>,
}

/// Perspective-n-Point solver
pub trait PoseSolver {
    /// Solve for the camera pose from 6 correspondences and pinhole intrinsics
    /// with zero distortion
    ///
    /// # Errors
    ///
    /// Returns an error if the solver fails to converge
    fn solve(&mut self, correspondences: &Correspondences, intrinsics: &CameraIntrinsics) -> Result<PoseSolution>;
}

/// A successfully tracked head
#[derive(Debug, Clone, Copy)]
pub struct TrackedPose {
    pub rect: FaceRect,
    pub solution: PoseSolution,
    pub rotation: Matrix3<f64>,
    pub extracted: ExtractedRotation,
}

/// Estimator output for one frame
#[derive(Debug, Clone, Copy)]
pub enum HeadPose {
    /// A face was found and solved
    Tracked(TrackedPose),
    /// No face in this frame
    NoFace,
    /// The detector is unavailable; every frame reports the neutral pose
    Degraded,
}

impl HeadPose {
    /// Raw orientation for the smoother; identity unless tracked
    #[must_use]
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        match self {
            Self::Tracked(pose) => pose.extracted.quaternion,
            Self::NoFace | Self::Degraded => UnitQuaternion::identity(),
        }
    }

    #[must_use]
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }
}

/// Solve the head pose for one face rectangle in a frame of the given size
///
/// # Errors
///
/// Returns an error if the solver fails
pub fn solve_face<S: PoseSolver>(solver: &mut S, rect: FaceRect, width: i32, height: i32) -> Result<TrackedPose> {
    let correspondences = Correspondences::from_face(&rect);
    let intrinsics = CameraIntrinsics::for_frame(width, height);
    let solution = solver.solve(&correspondences, &intrinsics)?;
    let rotation = rotation_vector_to_matrix(&solution.rotation_vector);

    Ok(TrackedPose {
        rect,
        solution,
        rotation,
        extracted: extract_rotation(&rotation),
    })
}

/// Head pose estimator combining a detector and a solver
pub struct HeadPoseEstimator<D, S> {
    detector: Option<D>,
    solver: S,
}

impl<D: FaceDetector, S: PoseSolver> HeadPoseEstimator<D, S> {
    /// Create an estimator with a working detector
    pub fn new(detector: D, solver: S) -> Self {
        Self {
            detector: Some(detector),
            solver,
        }
    }

    /// Create an estimator from a detector load attempt. A failed load puts
    /// the estimator in degraded mode instead of failing.
    pub fn from_detector_result(detector: Result<D>, solver: S) -> Self {
        match detector {
            Ok(detector) => {
                info!("Face detector loaded");
                Self::new(detector, solver)
            }
            Err(e) => {
                warn!("Face detector unavailable ({e}); head pose fixed at neutral");
                Self::degraded(solver)
            }
        }
    }

    /// Estimator without a detector
    pub fn degraded(solver: S) -> Self {
        Self { detector: None, solver }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.detector.is_none()
    }

    /// Estimate the head pose in one frame
    ///
    /// # Errors
    ///
    /// Returns an error if detection or the pose solve fails
    pub fn estimate(&mut self, frame: &D::Frame) -> Result<HeadPose> {
        let Some(detector) = self.detector.as_mut() else {
            debug!("Detector unavailable, reporting neutral pose");
            return Ok(HeadPose::Degraded);
        };

        let faces = detector.detect(frame)?;
        let Some(&rect) = faces.first() else {
            debug!("No face detected");
            return Ok(HeadPose::NoFace);
        };
        debug!(
            "Using face 0 of {}: {}x{} at ({}, {})",
            faces.len(),
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );

        let pose = solve_face(&mut self.solver, rect, frame.width(), frame.height())?;
        Ok(HeadPose::Tracked(pose))
    }
}
