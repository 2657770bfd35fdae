//! Configuration management for the avatar head rig

use crate::{
    constants::{
        DEFAULT_CAMERA_DISTANCE, DEFAULT_CAMERA_TARGET, DEFAULT_DETECTION_MIN_NEIGHBORS,
        DEFAULT_DETECTION_SCALE_FACTOR, DEFAULT_FACE_CASCADE_PATH, DEFAULT_FAR_PLANE, DEFAULT_FOV_DEGREES,
        DEFAULT_NEAR_PLANE, DEFAULT_SCENE_PATH, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, HEAD_JOINT_NAME,
        HEAD_REGION_KEYWORDS, MAX_CAMERA_DISTANCE, MIN_CAMERA_DISTANCE, SMOOTHING_ALPHA, SMOOTHING_ALPHA_MAX,
        SMOOTHING_ALPHA_MIN,
    },
    filters::OrientationFilter,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Asset file locations
    pub assets: AssetConfig,

    /// Face detection parameters
    pub detection: DetectionConfig,

    /// Head orientation smoothing
    pub smoothing: SmoothingConfig,

    /// Rig joint and mesh region settings
    pub rig: RigConfig,

    /// Viewer camera
    pub camera: CameraConfig,
}

/// Asset file paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Haar cascade XML used by the face detector
    pub face_cascade: PathBuf,

    /// Avatar model (`.vrm`, `.glb` or `.gltf`)
    pub scene: PathBuf,
}

/// Face detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Image pyramid scale step (> 1.0)
    pub scale_factor: f64,

    /// Neighboring detections required to keep a candidate
    pub min_neighbors: i32,
}

/// Smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type (`slerp` or `none`)
    pub filter: String,

    /// Per-frame slerp blend factor in (0, 1]
    pub alpha: f64,
}

/// Rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Joint whose position is the head rotation pivot
    pub head_joint: String,

    /// Name fragments marking head-region meshes
    pub head_keywords: Vec<String>,
}

/// Orbit camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub window_width: u32,
    pub window_height: u32,

    /// Vertical field of view in degrees
    pub fov_degrees: f32,

    pub near: f32,
    pub far: f32,

    /// Initial distance from the orbit target
    pub distance: f32,

    /// Orbit target in model space
    pub target: [f32; 3],
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            face_cascade: PathBuf::from(DEFAULT_FACE_CASCADE_PATH),
            scene: PathBuf::from(DEFAULT_SCENE_PATH),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_DETECTION_SCALE_FACTOR,
            min_neighbors: DEFAULT_DETECTION_MIN_NEIGHBORS,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            filter: "slerp".to_string(),
            alpha: SMOOTHING_ALPHA,
        }
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            head_joint: HEAD_JOINT_NAME.to_string(),
            head_keywords: HEAD_REGION_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR_PLANE,
            far: DEFAULT_FAR_PLANE,
            distance: DEFAULT_CAMERA_DISTANCE,
            target: DEFAULT_CAMERA_TARGET,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the orientation filter described by the smoothing section
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown filter or an out-of-range alpha
    pub fn create_filter(&self) -> Result<Box<dyn OrientationFilter>> {
        crate::filters::create_filter(&self.smoothing.filter, self.smoothing.alpha)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let alpha = self.smoothing.alpha;
        if alpha.is_nan() || alpha <= SMOOTHING_ALPHA_MIN || alpha > SMOOTHING_ALPHA_MAX {
            return Err(Error::ConfigError(
                "Smoothing alpha must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.detection.scale_factor.is_nan() || self.detection.scale_factor <= 1.0 {
            return Err(Error::ConfigError(
                "Detection scale factor must be greater than 1.0".to_string(),
            ));
        }
        if self.detection.min_neighbors < 0 {
            return Err(Error::ConfigError(
                "Detection min_neighbors must be non-negative".to_string(),
            ));
        }

        if self.rig.head_joint.is_empty() {
            return Err(Error::ConfigError("Head joint name must not be empty".to_string()));
        }
        if self.rig.head_keywords.is_empty() || self.rig.head_keywords.iter().any(String::is_empty) {
            return Err(Error::ConfigError(
                "Head keywords must be a non-empty list of non-empty names".to_string(),
            ));
        }

        if self.camera.window_width == 0 || self.camera.window_height == 0 {
            return Err(Error::ConfigError("Window size must be greater than 0".to_string()));
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return Err(Error::ConfigError(
                "Camera planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if !(MIN_CAMERA_DISTANCE..=MAX_CAMERA_DISTANCE).contains(&self.camera.distance) {
            return Err(Error::ConfigError(format!(
                "Camera distance must be between {MIN_CAMERA_DISTANCE} and {MAX_CAMERA_DISTANCE}"
            )));
        }

        Ok(())
    }

    /// Check that the configured asset files exist
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the first missing file
    pub fn validate_assets(&self) -> Result<()> {
        if !self.assets.scene.exists() {
            return Err(Error::ConfigError(format!(
                "Scene file not found: {}",
                self.assets.scene.display()
            )));
        }
        if !self.assets.face_cascade.exists() {
            return Err(Error::ConfigError(format!(
                "Face cascade not found: {}",
                self.assets.face_cascade.display()
            )));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Avatar Head Rig Configuration

# Asset paths
assets:
  face_cascade: "assets/haarcascade_frontalface_default.xml"
  scene: "assets/model.vrm"

# Haar cascade parameters
detection:
  scale_factor: 1.1
  min_neighbors: 3

# Head orientation smoothing (slerp toward each new estimate once per frame)
smoothing:
  filter: "slerp"
  alpha: 0.1

# Rig layout
rig:
  head_joint: "J_Bip_C_Head"
  head_keywords: ["head", "hair", "face"]

# Viewer camera
camera:
  window_width: 800
  window_height: 600
  fov_degrees: 45.0
  near: 0.1
  far: 100.0
  distance: 3.0
  target: [0.0, 1.0, 0.0]
"#;
