//! Perspective camera for the firework scene.

use crate::{Vec2, Vec3};
use glam::{Mat4, Vec4Swizzles};
use serde::{Deserialize, Serialize};

/// Fixed perspective camera looking at the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width over height, updated by [`set_viewport`](Self::set_viewport).
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Camera {
    /// Camera framing the tree from slightly above.
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 8.0),
            target: Vec3::new(0.0, 2.5, 0.0),
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Keep the aspect ratio in step with the window.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// OpenGL-convention projection (clip depth in `[-1, 1]`).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World point `distance` units from the eye along the ray through the
    /// pixel `screen` of a `viewport`-sized window.
    ///
    /// Returns `None` for an empty viewport.
    pub fn screen_point_at_distance(&self, screen: Vec2, viewport: Vec2, distance: f32) -> Option<Vec3> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }

        let ndc_x = (screen.x / viewport.x) * 2.0 - 1.0;
        let ndc_y = -(screen.y / viewport.y) * 2.0 + 1.0;

        let inverse = self.view_projection().inverse();
        let clip = inverse * glam::Vec4::new(ndc_x, ndc_y, 0.5, 1.0);
        if clip.w.abs() <= f32::EPSILON {
            return None;
        }
        let world = clip.xyz() / clip.w;

        let dir = (world - self.position).try_normalize()?;
        Some(self.position + dir * distance)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
