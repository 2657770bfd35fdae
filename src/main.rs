//! Avatar head rig driven by webcam head pose tracking.

use anyhow::{bail, Context, Result};
use avatar_head_rig::{
    compositor::RigTransforms,
    config::Config,
    opencv_backend::{CascadeFaceDetector, OpenCvPnpSolver},
    orbit_camera::OrbitCamera,
    pipeline::{AvatarRig, FrameController, Renderer},
    pose_estimation::{HeadPose, HeadPoseEstimator},
    regions::RegionPartition,
    scene::load_scene,
};
use clap::Parser;
use log::{debug, info, warn};
use nalgebra::{Matrix4, Point3};
use opencv::{core::Mat, prelude::*, videoio};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Avatar model (.vrm, .glb or .gltf), overrides the config file
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Haar cascade XML, overrides the config file
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Smoothing filter (slerp, none), overrides the config file
    #[arg(short, long)]
    filter: Option<String>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,
}

/// Renderer that reports where the head pivot lands on screen
struct LogRenderer {
    view_projection: Matrix4<f32>,
    pivot: Point3<f32>,
    draws: usize,
}

impl LogRenderer {
    fn new(camera: &OrbitCamera, rig: &AvatarRig) -> Self {
        Self {
            view_projection: camera.projection_matrix() * camera.view_matrix(),
            pivot: Point3::from(rig.pivot().position),
            draws: 0,
        }
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, partition: &RegionPartition, transforms: &RigTransforms) -> avatar_head_rig::Result<()> {
        self.draws += partition.draw_batches(transforms).count();

        let pivot = self
            .view_projection
            .transform_point(&transforms.head.transform_point(&self.pivot));
        debug!("Head pivot in clip space: ({:.3}, {:.3}, {:.3})", pivot.x, pivot.y, pivot.z);
        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(scene) = &args.scene {
        config.assets.scene.clone_from(scene);
    }
    if let Some(cascade) = &args.cascade {
        config.assets.face_cascade.clone_from(cascade);
    }
    if let Some(filter) = &args.filter {
        config.smoothing.filter.clone_from(filter);
    }

    config.validate()?;
    config.validate_assets()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Avatar Head Rig");

    let config = load_config(&args)?;

    let scene = load_scene(&config.assets.scene)
        .with_context(|| format!("Failed to load scene {}", config.assets.scene.display()))?;
    let rig = AvatarRig::from_scene(&scene, &config.rig);
    if rig.pivot().is_degenerate() {
        warn!("Head rotates about the model origin");
    }

    let detector = CascadeFaceDetector::new(
        &config.assets.face_cascade,
        config.detection.scale_factor,
        config.detection.min_neighbors,
    );
    let estimator = HeadPoseEstimator::from_detector_result(detector, OpenCvPnpSolver);
    let filter = config.create_filter()?;
    info!("Using {} filter", filter.name());

    let camera = OrbitCamera::new(&config.camera);
    let mut renderer = LogRenderer::new(&camera, &rig);
    let mut controller = FrameController::new(estimator, filter, rig);

    let mut cap = videoio::VideoCapture::new(args.cam, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        bail!("Failed to open camera {}", args.cam);
    }
    info!("Camera {} opened", args.cam);

    let mut frame = Mat::default();
    let mut tracked = 0_u64;
    loop {
        if args.frames.is_some_and(|limit| controller.frame_count() >= limit) {
            break;
        }
        if !cap.read(&mut frame)? || frame.empty() {
            info!("Video stream ended");
            break;
        }

        let output = controller.tick(&frame);
        if let HeadPose::Tracked(pose) = output.pose {
            tracked += 1;
            let [pitch, yaw, roll] = pose.extracted.euler.to_degrees();
            debug!("Pitch: {pitch:.2}°, Yaw: {yaw:.2}°, Roll: {roll:.2}°");
        }
        controller.render(&mut renderer, &output)?;
    }

    info!(
        "Processed {} frames, {} with a tracked face, {} mesh draws",
        controller.frame_count(),
        tracked,
        renderer.draws
    );
    Ok(())
}
