//! Composition of the per-frame rig transforms.
//!
//! The head transform rotates the head-region meshes about the rig pivot:
//! `translate(+pivot) * rotate(inverse(q)) * translate(-pivot) * base`.
//! The inverse turns the solver's camera-relative rotation into the mirror
//! motion the viewer expects. The body transform is the base orientation.

use crate::pivot::RigPivot;
use nalgebra::{Matrix4, UnitQuaternion, Vector3, Vector4};

/// Model orientation correction: 180° about +Y so the avatar faces the camera
#[must_use]
pub fn base_orientation() -> Matrix4<f32> {
    Matrix4::from_diagonal(&Vector4::new(-1.0, 1.0, -1.0, 1.0))
}

/// The two transforms consumed by the renderer each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigTransforms {
    /// Applied to head-region meshes
    pub head: Matrix4<f32>,
    /// Applied to body-region meshes
    pub body: Matrix4<f32>,
}

/// Builds rig transforms around a fixed pivot
#[derive(Debug, Clone, Copy)]
pub struct PoseCompositor {
    pivot: Vector3<f32>,
    base: Matrix4<f32>,
}

impl PoseCompositor {
    /// Compositor with the standard 180° base orientation
    #[must_use]
    pub fn new(pivot: &RigPivot) -> Self {
        Self::with_base(pivot.position, base_orientation())
    }

    #[must_use]
    pub fn with_base(pivot: Vector3<f32>, base: Matrix4<f32>) -> Self {
        Self { pivot, base }
    }

    #[must_use]
    pub fn pivot(&self) -> Vector3<f32> {
        self.pivot
    }

    #[must_use]
    pub fn base(&self) -> Matrix4<f32> {
        self.base
    }

    /// Transforms for the current smoothed head orientation
    #[must_use]
    pub fn compose(&self, smoothed: &UnitQuaternion<f64>) -> RigTransforms {
        let rotation: Matrix4<f32> = smoothed.inverse().to_homogeneous().map(|v| v as f32);
        let to_pivot = Matrix4::new_translation(&self.pivot);
        let from_pivot = Matrix4::new_translation(&-self.pivot);

        RigTransforms {
            head: to_pivot * rotation * from_pivot * self.base,
            body: self.base,
        }
    }
}
