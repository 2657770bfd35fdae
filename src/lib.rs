//! Webcam-driven head rig for 3D avatars.
//!
//! This library estimates a viewer's head orientation from webcam frames and
//! rotates the head region of a rigged avatar to match, using:
//! - A Haar cascade face detector and iterative `solvePnP` (behind the
//!   `opencv` feature)
//! - A fixed six-point facial model derived from the face rectangle
//! - Shortest-arc slerp smoothing of the orientation between frames
//! - A glTF/VRM scene reader that locates the head joint pivot
//!
//! The per-frame pipeline consists of:
//! 1. Face detection, keeping the first face found
//! 2. Pose estimation from six model/image point correspondences
//! 3. Rotation extraction to Euler angles and a quaternion
//! 4. Smoothing toward the new estimate (or toward neutral when no face is seen)
//! 5. Composition of the head transform about the rig pivot
//!
//! # Examples
//!
//! ## Rigging a scene
//!
//! ```
//! use avatar_head_rig::{
//!     config::RigConfig,
//!     pipeline::AvatarRig,
//!     scene::{MeshEntry, SceneGraph, SceneNode},
//! };
//! use nalgebra::Vector3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let nodes = vec![
//!     SceneNode::with_translation("Hips", Vector3::new(0.0, 1.0, 0.0)).with_children([1]),
//!     SceneNode::with_translation("J_Bip_C_Head", Vector3::new(0.0, 0.5, 0.0)),
//! ];
//! let meshes = vec![MeshEntry::named("Body"), MeshEntry::named("Hair_Front")];
//! let scene = SceneGraph::new(nodes, meshes)?;
//!
//! let rig = AvatarRig::from_scene(&scene, &RigConfig::default());
//! assert_eq!(rig.pivot().position, Vector3::new(0.0, 1.5, 0.0));
//! assert_eq!(rig.partition().head, vec![1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Smoothing and composing
//!
//! ```
//! use avatar_head_rig::{
//!     compositor::{base_orientation, PoseCompositor},
//!     filters::{OrientationFilter, SlerpFilter},
//!     pivot::RigPivot,
//! };
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let mut filter = SlerpFilter::new(0.1);
//! let compositor = PoseCompositor::new(&RigPivot::degenerate());
//!
//! let raw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.4);
//! let smoothed = filter.apply(&raw);
//! assert!((smoothed.angle() - 0.04).abs() < 1e-9);
//!
//! let transforms = compositor.compose(&smoothed);
//! assert_eq!(transforms.body, base_orientation());
//! ```
//!
//! ## Webcam loop
//!
//! ```ignore
//! use avatar_head_rig::{
//!     config::Config,
//!     opencv_backend::{CascadeFaceDetector, OpenCvPnpSolver},
//!     pipeline::{AvatarRig, FrameController},
//!     pose_estimation::HeadPoseEstimator,
//!     scene::load_scene,
//! };
//! use opencv::{core::Mat, prelude::*, videoio};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let scene = load_scene(&config.assets.scene)?;
//! let rig = AvatarRig::from_scene(&scene, &config.rig);
//!
//! let detector = CascadeFaceDetector::with_defaults(&config.assets.face_cascade);
//! let estimator = HeadPoseEstimator::from_detector_result(detector, OpenCvPnpSolver);
//! let mut controller = FrameController::new(estimator, config.create_filter()?, rig);
//!
//! let mut cap = videoio::VideoCapture::new(0, videoio::CAP_ANY)?;
//! let mut frame = Mat::default();
//! while cap.read(&mut frame)? {
//!     let output = controller.tick(&frame);
//!     println!("head transform: {:?}", output.transforms.head);
//! }
//! # Ok(())
//! # }
//! ```

/// Composition of head and body transforms about the rig pivot
pub mod compositor;

/// Configuration management
pub mod config;

/// Constants used throughout the library
pub mod constants;

/// Error types and result handling
pub mod error;

/// Temporal smoothing of head orientation
pub mod filters;

/// Facial model points, face-rectangle image points and camera intrinsics
pub mod model_points;

/// Orbit/pan/zoom viewer camera
pub mod orbit_camera;

/// `OpenCV` face detector and `PnP` solver
#[cfg(feature = "opencv")]
pub mod opencv_backend;

/// Per-frame controller tying estimation, smoothing and composition together
pub mod pipeline;

/// Head joint pivot resolution
pub mod pivot;

/// Head pose estimation from detected faces
pub mod pose_estimation;

/// Head/body mesh classification
pub mod regions;

/// Rotation vector, matrix, Euler angle and quaternion conversions
pub mod rotation;

/// glTF/VRM scene graph loading
pub mod scene;

/// Utility functions
pub mod utils;

pub use error::{Error, Result};
