//! Camera component

use crate::editor::Inspector;
use crate::foundation::math::{utils::deg_to_rad, Mat4};
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentLoadContext, ComponentType, SceneError};
use nalgebra::{Orthographic3, Perspective3};
use serde::{Deserialize, Serialize};

/// Projection settings; the view comes from the owner's world transform
///
/// The camera looks down its local -Z axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Orthographic instead of perspective
    pub orthographic: bool,
    /// Visible height when orthographic
    pub ortho_height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
            orthographic: false,
            ortho_height: 10.0,
        }
    }
}

impl Camera {
    /// Perspective camera
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            near,
            far,
            ..Self::default()
        }
    }

    /// Orthographic camera showing `height` world units vertically
    pub fn orthographic(height: f32, near: f32, far: f32) -> Self {
        Self {
            near,
            far,
            orthographic: true,
            ortho_height: height,
            ..Self::default()
        }
    }

    /// Camera -> clip matrix for the given aspect ratio
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        let aspect = if aspect_ratio > f32::EPSILON { aspect_ratio } else { 1.0 };
        let near = self.near.max(1e-4);
        let far = self.far.max(near + 1e-3);

        if self.orthographic {
            let half_height = self.ortho_height.abs().max(1e-4) * 0.5;
            let half_width = half_height * aspect;
            Orthographic3::new(-half_width, half_width, -half_height, half_height, near, far).to_homogeneous()
        } else {
            let fov = deg_to_rad(self.fov_degrees.clamp(1.0, 179.0));
            Perspective3::new(aspect, fov, near, far).to_homogeneous()
        }
    }
}

impl Component for Camera {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.drag_float("FOV", &mut self.fov_degrees);
        ui.drag_float("Near", &mut self.near);
        ui.drag_float("Far", &mut self.far);
        ui.checkbox("Orthographic", &mut self.orthographic);
        if self.orthographic {
            ui.drag_float("Ortho Height", &mut self.ortho_height);
        }
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for Camera {
    const TYPE_NAME: &'static str = "Camera";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        from_payload(Self::TYPE_NAME, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let camera = Camera::default();
        assert_relative_eq!(camera.fov_degrees, 90.0);
        assert_relative_eq!(camera.near, 0.1);
        assert_relative_eq!(camera.far, 1000.0);
        assert!(!camera.orthographic);
    }

    #[test]
    fn test_perspective_projection_with_90_degree_fov() {
        let projection = Camera::default().projection(1.0);
        // cot(45°) == 1
        assert_relative_eq!(projection.m11, 1.0, epsilon = 1e-5);
        assert_relative_eq!(projection.m22, 1.0, epsilon = 1e-5);
        assert_relative_eq!(projection.m43, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_projection_scales_by_height() {
        let projection = Camera::orthographic(4.0, 0.1, 100.0).projection(2.0);
        assert_relative_eq!(projection.m22, 0.5, epsilon = 1e-5);
        assert_relative_eq!(projection.m11, 0.25, epsilon = 1e-5);
        assert_relative_eq!(projection.m44, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_aspect_does_not_panic() {
        let projection = Camera::default().projection(0.0);
        assert!(projection.iter().all(|v| v.is_finite()));
    }
}
