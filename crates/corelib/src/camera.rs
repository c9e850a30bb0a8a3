use std::f32::consts::{FRAC_PI_2, PI};

use crate::{Mat4, Vec3};

/// Radians of look rotation per pixel of cursor travel.
const CURSOR_SENSITIVITY: f32 = 0.005;
/// World units per second of held movement key.
const MOVE_SPEED: f32 = 2.5;

const FOV_Y_DEG: f32 = 70.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// Per-frame camera input, collected by the platform layer.
///
/// Movement axes are -1/0/+1; look deltas are in pixels of cursor travel
/// (positive = yaw left / pitch up, matching the grabbed-cursor convention).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    pub forward: f32,
    pub strafe: f32,
    pub vertical: f32,
    pub look_x: f32,
    pub look_y: f32,
}

/// First-person fly camera: position + yaw/pitch, perspective projection.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    /// Radians around +Y; -PI faces -Z.
    pub yaw: f32,
    /// Radians, clamped just inside +-PI/2.
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: -PI,
            pitch: 0.0,
            fov_y_rad: FOV_Y_DEG.to_radians(),
            z_near: Z_NEAR,
            z_far: Z_FAR,
            aspect,
        }
    }

    /// Unit view direction from yaw/pitch.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction(), Vec3::Y)
    }

    /// OpenGL-style projection (clip z in [-1, 1]).
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Advance the camera by one frame of input. Movement stays on the
    /// ground plane (vertical travel only through the vertical axis).
    pub fn apply_input(&mut self, input: &CameraInput, dt: f32) {
        self.yaw += CURSOR_SENSITIVITY * input.look_x;
        self.pitch = (self.pitch + CURSOR_SENSITIVITY * input.look_y)
            .clamp(-FRAC_PI_2 + 0.1, FRAC_PI_2 - 0.1);

        let forward = Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos());
        let right = Vec3::new(-self.yaw.cos(), 0.0, self.yaw.sin());
        let step = forward * input.forward + right * input.strafe + Vec3::Y * input.vertical;
        self.position += step * MOVE_SPEED * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proj_view_is_finite() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 4.0), 16.0 / 9.0);
        assert!(cam.proj_view().to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn forward_input_moves_along_view_heading() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0);
        cam.yaw = 0.0; // heading +Z
        cam.apply_input(
            &CameraInput {
                forward: 1.0,
                ..Default::default()
            },
            1.0,
        );
        assert!((cam.position.z - MOVE_SPEED).abs() < 1e-5);
        assert!(cam.position.x.abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0);
        cam.apply_input(
            &CameraInput {
                look_y: 1e6,
                ..Default::default()
            },
            0.016,
        );
        assert!((cam.pitch - (FRAC_PI_2 - 0.1)).abs() < 1e-6);
    }
}
