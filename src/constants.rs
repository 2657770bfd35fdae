//! Constants used throughout the pipeline

/// Per-frame slerp blend factor for head orientation smoothing
pub const SMOOTHING_ALPHA: f64 = 0.1;

/// Smoothing factor bounds
pub const SMOOTHING_ALPHA_MIN: f64 = 0.0;
pub const SMOOTHING_ALPHA_MAX: f64 = 1.0;

/// Below this value of `sqrt(R00² + R10²)` the Euler decomposition is singular
pub const SINGULARITY_THRESHOLD: f64 = 1e-6;

/// Quaternions whose dot product is within this distance of ±1 are treated as parallel
pub const SLERP_PARALLEL_EPSILON: f64 = 1e-6;

/// Rig joint used as the head rotation pivot (VRM humanoid head bone)
pub const HEAD_JOINT_NAME: &str = "J_Bip_C_Head";

/// Lowercase name fragments that place a mesh in the head region
pub const HEAD_REGION_KEYWORDS: [&str; 3] = ["head", "hair", "face"];

/// Number of 2D/3D point correspondences handed to the pose solver
pub const NUM_MODEL_POINTS: usize = 6;

/// Canonical facial landmarks in millimeters: nose tip, chin, left eye corner,
/// right eye corner, left mouth corner, right mouth corner
pub const CANONICAL_MODEL_POINTS: [[f64; 3]; NUM_MODEL_POINTS] = [
    [0.0, 0.0, 0.0],
    [0.0, -63.6, -12.5],
    [-43.3, 32.7, -26.0],
    [43.3, 32.7, -26.0],
    [-28.9, -28.9, -24.1],
    [28.9, -28.9, -24.1],
];

/// Fractional (x, y) offsets inside the face rectangle, paired positionally
/// with `CANONICAL_MODEL_POINTS`
pub const FACE_RECT_FRACTIONS: [[f64; 2]; NUM_MODEL_POINTS] = [
    [0.5, 0.3],
    [0.5, 0.7],
    [0.2, 0.4],
    [0.8, 0.4],
    [0.3, 0.8],
    [0.7, 0.8],
];

/// Camera matrix center factor
pub const CAMERA_CENTER_FACTOR: i32 = 2;

/// Number of (all zero) lens distortion coefficients
pub const DISTORTION_COEFFICIENT_COUNT: usize = 4;

/// Haar cascade detection defaults
pub const DEFAULT_DETECTION_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_DETECTION_MIN_NEIGHBORS: i32 = 3;

/// Default asset locations
pub const DEFAULT_FACE_CASCADE_PATH: &str = "assets/haarcascade_frontalface_default.xml";
pub const DEFAULT_SCENE_PATH: &str = "assets/model.vrm";

/// Orbit camera defaults
pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;
pub const DEFAULT_FOV_DEGREES: f32 = 45.0;
pub const DEFAULT_NEAR_PLANE: f32 = 0.1;
pub const DEFAULT_FAR_PLANE: f32 = 100.0;
pub const DEFAULT_CAMERA_DISTANCE: f32 = 3.0;
pub const DEFAULT_CAMERA_TARGET: [f32; 3] = [0.0, 1.0, 0.0];

/// Orbit camera interaction limits
pub const ORBIT_DEGREES_PER_VIEWPORT: f32 = 180.0;
pub const ORBIT_PITCH_LIMIT_DEGREES: f32 = 89.0;
pub const ZOOM_STEP: f32 = 0.9;
pub const MIN_CAMERA_DISTANCE: f32 = 0.2;
pub const MAX_CAMERA_DISTANCE: f32 = 10.0;

/// GLB container constants
pub const GLB_MAGIC: &[u8; 4] = b"glTF";
pub const GLB_HEADER_LEN: usize = 12;
pub const GLB_CHUNK_HEADER_LEN: usize = 8;
pub const GLB_CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;
