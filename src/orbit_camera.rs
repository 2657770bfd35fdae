//! Orbit camera for viewing the avatar.
//!
//! Left-drag orbits around the target, right-drag pans in view space and
//! the scroll wheel zooms. Drag deltas are normalized by the viewport size.
//!
//! The input methods are meant to be fed from a windowing layer's events,
//! which this crate does not ship. The binary only reads the view and
//! projection matrices.

use crate::{
    config::CameraConfig,
    constants::{
        MAX_CAMERA_DISTANCE, MIN_CAMERA_DISTANCE, ORBIT_DEGREES_PER_VIEWPORT, ORBIT_PITCH_LIMIT_DEGREES, ZOOM_STEP,
    },
};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};

/// Mouse buttons the camera reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Other,
}

/// Orbit/pan/zoom camera
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    width: u32,
    height: u32,
    target: Point3<f32>,
    distance: f32,
    yaw: f32,
    pitch: f32,
    pan: Vector2<f32>,
    rotating: bool,
    panning: bool,
    last_cursor: (f64, f64),
    fov_degrees: f32,
    near: f32,
    far: f32,
}

impl OrbitCamera {
    #[must_use]
    pub fn new(config: &CameraConfig) -> Self {
        let [x, y, z] = config.target;
        Self {
            width: config.window_width.max(1),
            height: config.window_height.max(1),
            target: Point3::new(x, y, z),
            distance: config.distance.clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE),
            yaw: 0.0,
            pitch: 0.0,
            pan: Vector2::zeros(),
            rotating: false,
            panning: false,
            last_cursor: (0.0, 0.0),
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
        }
    }

    /// Viewport resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Button press or release at cursor position `(x, y)`
    pub fn mouse_button(&mut self, button: MouseButton, pressed: bool, x: f64, y: f64) {
        self.last_cursor = (x, y);
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right => self.panning = pressed,
            MouseButton::Other => {}
        }
    }

    /// Cursor motion
    #[allow(clippy::cast_possible_truncation)]
    pub fn mouse_move(&mut self, x: f64, y: f64) {
        let dx = ((x - self.last_cursor.0) / f64::from(self.width)) as f32;
        let dy = ((y - self.last_cursor.1) / f64::from(self.height)) as f32;
        self.last_cursor = (x, y);

        if self.rotating {
            self.yaw += dx * ORBIT_DEGREES_PER_VIEWPORT;
            self.pitch = (self.pitch + dy * ORBIT_DEGREES_PER_VIEWPORT)
                .clamp(-ORBIT_PITCH_LIMIT_DEGREES, ORBIT_PITCH_LIMIT_DEGREES);
        }
        if self.panning {
            self.pan += Vector2::new(dx, -dy) * self.distance;
        }
    }

    /// Scroll wheel zoom; positive offsets move closer
    #[allow(clippy::cast_possible_truncation)]
    pub fn scroll(&mut self, offset: f64) {
        self.distance = (self.distance * ZOOM_STEP.powf(offset as f32)).clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Orbit angles `(yaw, pitch)` in degrees
    #[must_use]
    pub fn angles(&self) -> (f32, f32) {
        (self.yaw, self.pitch)
    }

    /// Eye position in model space, before panning
    #[must_use]
    pub fn eye(&self) -> Point3<f32> {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let offset = Vector3::new(
            self.distance * pitch.cos() * yaw.sin(),
            self.distance * pitch.sin(),
            self.distance * pitch.cos() * yaw.cos(),
        );
        self.target + offset
    }

    /// View matrix: look at the target, then apply the view-space pan
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let look = Matrix4::look_at_rh(&self.eye(), &self.target, &Vector3::y());
        let pan = Matrix4::new_translation(&Vector3::new(-self.pan.x, -self.pan.y, 0.0));
        look * pan
    }

    /// Perspective projection for the current viewport
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let aspect = self.width as f32 / self.height as f32;
        Matrix4::new_perspective(aspect, self.fov_degrees.to_radians(), self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig::default())
    }

    #[test]
    fn test_default_eye_in_front_of_target() {
        let camera = camera();
        assert_relative_eq!(camera.eye(), Point3::new(0.0, 1.0, 3.0), epsilon = 1e-6);

        let target_in_view = camera.view_matrix().transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(target_in_view, Point3::new(0.0, 0.0, -3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_drag_orbits_only_while_pressed() {
        let mut camera = camera();
        camera.mouse_move(400.0, 0.0);
        assert_eq!(camera.angles(), (0.0, 0.0));

        camera.mouse_button(MouseButton::Left, true, 0.0, 0.0);
        camera.mouse_move(400.0, 0.0);
        assert_relative_eq!(camera.angles().0, 90.0, epsilon = 1e-4);

        camera.mouse_button(MouseButton::Left, false, 400.0, 0.0);
        camera.mouse_move(800.0, 0.0);
        assert_relative_eq!(camera.angles().0, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = camera();
        camera.mouse_button(MouseButton::Left, true, 0.0, 0.0);
        camera.mouse_move(0.0, 6000.0);
        assert_eq!(camera.angles().1, ORBIT_PITCH_LIMIT_DEGREES);
    }

    #[test]
    fn test_scroll_zoom_is_clamped() {
        let mut camera = camera();
        camera.scroll(1.0);
        assert_relative_eq!(camera.distance(), 2.7, epsilon = 1e-5);

        camera.scroll(100.0);
        assert_eq!(camera.distance(), MIN_CAMERA_DISTANCE);
        camera.scroll(-100.0);
        assert_eq!(camera.distance(), MAX_CAMERA_DISTANCE);
    }

    #[test]
    fn test_pan_shifts_view() {
        let mut camera = camera();
        camera.mouse_button(MouseButton::Right, true, 0.0, 0.0);
        camera.mouse_move(80.0, 0.0);

        // dx = 0.1 of the viewport at distance 3 → 0.3 units
        let origin = camera.view_matrix().transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(origin.x, -0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_projection_aspect() {
        let mut camera = camera();
        camera.resize(1000, 500);
        let projection = camera.projection_matrix();
        assert_relative_eq!(projection[(1, 1)] / projection[(0, 0)], 2.0, epsilon = 1e-5);
    }
}
