//! Model-point construction for the pose solver.
//!
//! A detected face rectangle is turned into six image points placed at fixed
//! fractions of the rectangle, paired positionally with six canonical 3D
//! facial landmarks. Camera intrinsics follow a pinhole model with focal
//! length equal to the frame width and no lens distortion.

use crate::constants::{
    CAMERA_CENTER_FACTOR, CANONICAL_MODEL_POINTS, DISTORTION_COEFFICIENT_COUNT, FACE_RECT_FRACTIONS,
    NUM_MODEL_POINTS,
};
use nalgebra::{Matrix3, Point2, Point3};

/// Axis-aligned face rectangle in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceRect {
    #[must_use]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Point at fractional offsets `(fx, fy)` inside the rectangle
    #[must_use]
    pub fn point_at(&self, fx: f64, fy: f64) -> Point2<f64> {
        Point2::new(
            f64::from(self.x) + f64::from(self.width) * fx,
            f64::from(self.y) + f64::from(self.height) * fy,
        )
    }
}

/// Six image points derived from a face rectangle: nose tip, chin, eye
/// corners, mouth corners
#[must_use]
pub fn image_points(rect: &FaceRect) -> [Point2<f64>; NUM_MODEL_POINTS] {
    FACE_RECT_FRACTIONS.map(|[fx, fy]| rect.point_at(fx, fy))
}

/// The canonical 3D facial landmark model, in millimeters
#[must_use]
pub fn model_points() -> [Point3<f64>; NUM_MODEL_POINTS] {
    CANONICAL_MODEL_POINTS.map(|[x, y, z]| Point3::new(x, y, z))
}

/// Positionally paired 3D model points and 2D image points
#[derive(Debug, Clone, PartialEq)]
pub struct Correspondences {
    pub model: [Point3<f64>; NUM_MODEL_POINTS],
    pub image: [Point2<f64>; NUM_MODEL_POINTS],
}

impl Correspondences {
    /// Build the solver input for one detected face
    #[must_use]
    pub fn from_face(rect: &FaceRect) -> Self {
        Self {
            model: model_points(),
            image: image_points(rect),
        }
    }

    /// Iterate `(model, image)` pairs in solver order
    pub fn pairs(&self) -> impl Iterator<Item = (&Point3<f64>, &Point2<f64>)> {
        self.model.iter().zip(self.image.iter())
    }
}

/// Pinhole camera intrinsics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub focal_length: f64,
    pub center: (f64, f64),
}

impl CameraIntrinsics {
    /// Intrinsics for a frame: focal length is the frame width, the principal
    /// point is the integer-halved frame size
    #[must_use]
    pub fn for_frame(width: i32, height: i32) -> Self {
        Self {
            focal_length: f64::from(width),
            center: (
                f64::from(width / CAMERA_CENTER_FACTOR),
                f64::from(height / CAMERA_CENTER_FACTOR),
            ),
        }
    }

    /// 3×3 camera matrix
    #[must_use]
    pub fn camera_matrix(&self) -> Matrix3<f64> {
        let f = self.focal_length;
        Matrix3::new(
            f, 0.0, self.center.0,
            0.0, f, self.center.1,
            0.0, 0.0, 1.0,
        )
    }

    /// Lens distortion coefficients (always zero)
    #[must_use]
    pub fn distortion(&self) -> [f64; DISTORTION_COEFFICIENT_COUNT] {
        [0.0; DISTORTION_COEFFICIENT_COUNT]
    }
}
