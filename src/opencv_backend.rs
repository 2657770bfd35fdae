//! `OpenCV` implementations of the detector and solver seams.
//!
//! Faces are found with a Haar cascade and the head pose is solved with
//! the iterative `solvePnP` method.

use crate::{
    constants::{DEFAULT_DETECTION_MIN_NEIGHBORS, DEFAULT_DETECTION_SCALE_FACTOR, DISTORTION_COEFFICIENT_COUNT},
    model_points::{CameraIntrinsics, Correspondences, FaceRect},
    pose_estimation::{FaceDetector, Frame, PoseSolution, PoseSolver},
    utils::safe_cast::usize_to_i32,
    Error, Result,
};
use log::info;
use nalgebra::Vector3;
use opencv::{
    calib3d,
    core::{Mat, Point2d, Point3d, Rect, Size, Vector, CV_64F},
    objdetect::CascadeClassifier,
    prelude::*,
};
use std::path::Path;

impl Frame for Mat {
    fn width(&self) -> i32 {
        self.cols()
    }

    fn height(&self) -> i32 {
        self.rows()
    }
}

/// Haar cascade face detector
pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
}

impl CascadeFaceDetector {
    /// Load a cascade classifier from an XML file
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8 or the cascade cannot be loaded
    pub fn new<P: AsRef<Path>>(cascade_path: P, scale_factor: f64, min_neighbors: i32) -> Result<Self> {
        let path = cascade_path.as_ref();
        info!("Loading face cascade: {}", path.display());

        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 cascade path: {}", path.display())))?;
        let classifier = CascadeClassifier::new(path_str)?;
        if classifier.empty()? {
            return Err(Error::DetectorError(format!(
                "Failed to load face cascade: {}",
                path.display()
            )));
        }

        Ok(Self {
            classifier,
            scale_factor,
            min_neighbors,
        })
    }

    /// Load a cascade with the default detection parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade cannot be loaded
    pub fn with_defaults<P: AsRef<Path>>(cascade_path: P) -> Result<Self> {
        Self::new(cascade_path, DEFAULT_DETECTION_SCALE_FACTOR, DEFAULT_DETECTION_MIN_NEIGHBORS)
    }
}

impl FaceDetector for CascadeFaceDetector {
    type Frame = Mat;

    fn detect(&mut self, frame: &Mat) -> Result<Vec<FaceRect>> {
        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            frame,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(0, 0),
            Size::new(0, 0),
        )?;

        Ok(faces
            .iter()
            .map(|r| FaceRect::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}

/// Iterative `solvePnP` solver
#[derive(Debug, Default)]
pub struct OpenCvPnpSolver;

impl OpenCvPnpSolver {
    fn camera_matrix(intrinsics: &CameraIntrinsics) -> Result<Mat> {
        let k = intrinsics.camera_matrix();
        let mut camera_matrix = Mat::zeros(3, 3, CV_64F)?.to_mat()?;
        for i in 0..3 {
            for j in 0..3 {
                *camera_matrix.at_2d_mut::<f64>(usize_to_i32(i)?, usize_to_i32(j)?)? = k[(i, j)];
            }
        }
        Ok(camera_matrix)
    }
}

impl PoseSolver for OpenCvPnpSolver {
    fn solve(&mut self, correspondences: &Correspondences, intrinsics: &CameraIntrinsics) -> Result<PoseSolution> {
        let object_points: Vector<Point3d> = correspondences
            .model
            .iter()
            .map(|p| Point3d::new(p.x, p.y, p.z))
            .collect();
        let image_points: Vector<Point2d> = correspondences
            .image
            .iter()
            .map(|p| Point2d::new(p.x, p.y))
            .collect();

        let camera_matrix = Self::camera_matrix(intrinsics)?;
        let dist_coeffs = Mat::zeros(usize_to_i32(DISTORTION_COEFFICIENT_COUNT)?, 1, CV_64F)?.to_mat()?;

        let mut rvec = Mat::default();
        let mut tvec = Mat::default();
        let converged = calib3d::solve_pnp(
            &object_points,
            &image_points,
            &camera_matrix,
            &dist_coeffs,
            &mut rvec,
            &mut tvec,
            false,
            calib3d::SOLVEPNP_ITERATIVE,
        )?;
        if !converged {
            return Err(Error::SolverError("solvePnP did not find a solution".to_string()));
        }

        Ok(PoseSolution {
            rotation_vector: Vector3::new(
                *rvec.at_2d::<f64>(0, 0)?,
                *rvec.at_2d::<f64>(1, 0)?,
                *rvec.at_2d::<f64>(2, 0)?,
            ),
            translation_vector: Vector3::new(
                *tvec.at_2d::<f64>(0, 0)?,
                *tvec.at_2d::<f64>(1, 0)?,
                *tvec.at_2d::<f64>(2, 0)?,
            ),
        })
    }
}
