use glam::DVec3;
use std::f64::consts::FRAC_PI_2;
use winit::dpi::PhysicalPosition;
use winit::event::MouseScrollDelta;

/// Largest allowed |pitch|. Keeps forward away from world-up so the basis never degenerates.
pub const PITCH_LIMIT: f64 = FRAC_PI_2 - 0.01;

/// Closest the camera may get to the origin, in meters.
pub const MIN_DISTANCE: f64 = 1.0;

pub const DEFAULT_DISTANCE: f64 = 1.0e11;

/// Radians of orbit per pixel of mouse drag.
pub const PAN_SENSITIVITY: f64 = 0.002;

/// Meters of zoom per scroll line.
pub const ZOOM_SENSITIVITY: f64 = 25.0e9;

const WORLD_UP: DVec3 = DVec3::Y;

/// Orbit parameters of the camera. The camera always looks at the origin.
///
/// Yaw wraps freely, pitch is clamped to `±PITCH_LIMIT` and distance to at least `MIN_DISTANCE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    yaw: f64,
    pitch: f64,
    distance: f64,
}

impl CameraState {
    pub fn new(yaw: f64, pitch: f64, distance: f64) -> Self {
        Self {
            yaw,
            pitch: clamp_pitch(pitch),
            distance: clamp_distance(distance),
        }
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Applies an orbit delta in radians.
    pub fn rotate(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw += d_yaw;
        self.pitch = clamp_pitch(self.pitch + d_pitch);
    }

    /// Moves the camera toward the origin by `amount` meters (negative moves away).
    pub fn zoom(&mut self, amount: f64) {
        self.distance = clamp_distance(self.distance - amount);
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_DISTANCE)
    }
}

fn clamp_pitch(pitch: f64) -> f64 {
    if pitch.is_nan() {
        return 0.0;
    }
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

fn clamp_distance(distance: f64) -> f64 {
    if distance.is_nan() {
        return MIN_DISTANCE;
    }
    distance.max(MIN_DISTANCE)
}

/// Represents the projection of the scene onto the fixed-size output image.
///
/// The aspect ratio comes from the image resolution, not from the window, so it never changes during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub aspect: f64,
    /// Vertical field of view in radians.
    pub fovy: f64,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy_degrees: f64) -> Self {
        Self {
            aspect: width as f64 / height.max(1) as f64,
            fovy: fovy_degrees.to_radians(),
        }
    }

    pub fn tan_half_fov(&self) -> f64 {
        (self.fovy * 0.5).tan()
    }
}

/// World-space view frame derived from a `CameraState` for one frame.
///
/// `right`, `up` and `-forward` form a right-handed orthonormal basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub position: DVec3,
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
    pub tan_half_fov: f64,
    pub aspect: f64,
}

impl CameraBasis {
    /// World-space unit direction through a point in normalized device coordinates.
    ///
    /// `ndc_x` grows to the right and `ndc_y` grows upwards, both in `[-1, 1]`.
    pub fn ray_direction(&self, ndc_x: f64, ndc_y: f64) -> DVec3 {
        (self.forward
            + self.right * (ndc_x * self.tan_half_fov * self.aspect)
            + self.up * (ndc_y * self.tan_half_fov))
            .normalize()
    }
}

/// Derives the view basis for this frame.
pub fn derive_basis(state: &CameraState, projection: &Projection) -> CameraBasis {
    let (sin_pitch, cos_pitch) = state.pitch.sin_cos();
    let (sin_yaw, cos_yaw) = state.yaw.sin_cos();
    let forward = DVec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
    let right = forward.cross(WORLD_UP).normalize();
    let up = right.cross(forward).normalize();

    CameraBasis {
        position: -forward * state.distance,
        forward,
        right,
        up,
        tan_half_fov: projection.tan_half_fov(),
        aspect: projection.aspect,
    }
}

/// Translates pointer input into orbit deltas.
///
/// Deltas accumulate between frames and are applied all at once by `update_camera`,
/// so the camera never changes while a frame is being traced.
#[derive(Debug)]
pub struct CameraController {
    rotate_horizontal: f64,
    rotate_vertical: f64,
    scroll: f64,
    pan_sensitivity: f64,
    zoom_sensitivity: f64,
}

impl CameraController {
    pub fn new(pan_sensitivity: f64, zoom_sensitivity: f64) -> Self {
        Self {
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
            pan_sensitivity,
            zoom_sensitivity,
        }
    }

    /// Records a drag delta in pixels. Only call this while the orbit button is held.
    pub fn process_mouse(&mut self, mouse_dx: f64, mouse_dy: f64) {
        self.rotate_horizontal += mouse_dx;
        self.rotate_vertical += mouse_dy;
    }

    /// Records a wheel delta; positive values zoom in.
    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, scroll) => *scroll as f64,
            // I'm assuming a line is about 100 pixels
            MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => *scroll / 100.0,
        };
    }

    pub fn has_pending_input(&self) -> bool {
        self.rotate_horizontal != 0.0 || self.rotate_vertical != 0.0 || self.scroll != 0.0
    }

    /// Applies and clears all pending input.
    pub fn update_camera(&mut self, camera: &mut CameraState) {
        camera.rotate(
            self.rotate_horizontal * self.pan_sensitivity,
            self.rotate_vertical * self.pan_sensitivity,
        );
        camera.zoom(self.scroll * self.zoom_sensitivity);

        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(PAN_SENSITIVITY, ZOOM_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(basis: &CameraBasis) {
        assert_relative_eq!(basis.forward.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.right.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.up.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.forward.dot(basis.right), 0.0, epsilon = 1e-12);
        assert_relative_eq!(basis.forward.dot(basis.up), 0.0, epsilon = 1e-12);
        assert_relative_eq!(basis.right.dot(basis.up), 0.0, epsilon = 1e-12);
        let handed = basis.right.cross(basis.up);
        assert_relative_eq!(handed.dot(-basis.forward), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_basis_orthonormal_over_orbit() {
        let projection = Projection::new(640, 480, 60.0);
        for yaw_step in -8..=8 {
            for pitch_step in -10..=10 {
                let yaw = yaw_step as f64 * 0.9;
                let pitch = pitch_step as f64 / 10.0 * PITCH_LIMIT;
                let state = CameraState::new(yaw, pitch, 1e11);
                assert_orthonormal(&derive_basis(&state, &projection));
            }
        }
    }

    #[test]
    fn test_basis_default_looks_at_origin() {
        let basis = derive_basis(&CameraState::default(), &Projection::new(640, 480, 60.0));
        assert_relative_eq!(basis.forward.x, 1.0);
        assert_relative_eq!(basis.position.x, -1e11);
        assert_relative_eq!(basis.up.y, 1.0);
        assert_relative_eq!(basis.right.z, 1.0);
        assert_relative_eq!(basis.tan_half_fov, (30.0f64).to_radians().tan(), epsilon = 1e-12);
        assert_relative_eq!(basis.aspect, 640.0 / 480.0);
        // Camera sits at `distance` along -forward.
        assert_relative_eq!(basis.position.length(), 1e11);
    }

    #[test]
    fn test_ray_direction_center_is_forward() {
        let basis = derive_basis(&CameraState::new(0.7, 0.3, 5e10), &Projection::new(640, 480, 60.0));
        let direction = basis.ray_direction(0.0, 0.0);
        assert_relative_eq!(direction.distance(basis.forward), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ray_direction_corner_follows_fov() {
        let projection = Projection::new(200, 100, 60.0);
        let basis = derive_basis(&CameraState::default(), &projection);
        let direction = basis.ray_direction(0.0, 1.0);
        let angle = direction.angle_between(basis.forward);
        assert_relative_eq!(angle, 30.0f64.to_radians(), epsilon = 1e-9);
        // Right edge spans aspect * tan(fov / 2)
        let direction = basis.ray_direction(1.0, 0.0);
        let tangent = direction.dot(basis.right) / direction.dot(basis.forward);
        assert_relative_eq!(tangent, 2.0 * projection.tan_half_fov(), epsilon = 1e-9);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let state = CameraState::new(0.0, 10.0, 1e11);
        assert_eq!(state.pitch(), PITCH_LIMIT);
        let mut state = CameraState::default();
        state.rotate(0.0, -10.0);
        assert_eq!(state.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_distance_is_clamped() {
        let mut state = CameraState::default();
        state.zoom(2e11);
        assert_eq!(state.distance(), MIN_DISTANCE);
        assert_eq!(CameraState::new(0.0, 0.0, -5.0).distance(), MIN_DISTANCE);
    }

    #[test]
    fn test_yaw_wraps_without_clamp() {
        let mut state = CameraState::default();
        state.rotate(100.0, 0.0);
        assert_eq!(state.yaw(), 100.0);
    }

    #[test]
    fn test_controller_applies_and_clears_deltas() {
        let mut controller = CameraController::default();
        let mut state = CameraState::default();
        controller.process_mouse(10.0, -5.0);
        controller.process_mouse(10.0, 0.0);
        controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
        assert!(controller.has_pending_input());

        controller.update_camera(&mut state);
        assert_relative_eq!(state.yaw(), 20.0 * PAN_SENSITIVITY);
        assert_relative_eq!(state.pitch(), -5.0 * PAN_SENSITIVITY);
        assert_relative_eq!(state.distance(), DEFAULT_DISTANCE - ZOOM_SENSITIVITY);
        assert!(!controller.has_pending_input());

        // Nothing pending, nothing changes
        let before = state;
        controller.update_camera(&mut state);
        assert_eq!(state, before);
    }

    #[test]
    fn test_controller_pixel_scroll() {
        let mut controller = CameraController::default();
        let mut state = CameraState::default();
        controller.process_scroll(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -200.0)));
        controller.update_camera(&mut state);
        assert_relative_eq!(state.distance(), DEFAULT_DISTANCE + 2.0 * ZOOM_SENSITIVITY);
    }
}
