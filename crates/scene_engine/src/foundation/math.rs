//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the Euler-degree transform helpers used by
//! game objects. Rotations are stored as Euler angles in degrees and applied
//! X first, then Y, then Z (`R = Rz * Ry * Rx`).

pub use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Convert Euler angles in degrees (X, Y, Z) into a rotation quaternion
pub fn euler_degrees_to_quat(degrees: &Vec3) -> Quat {
    Quat::from_euler_angles(
        utils::deg_to_rad(degrees.x),
        utils::deg_to_rad(degrees.y),
        utils::deg_to_rad(degrees.z),
    )
}

/// Build a translation * rotation * scale matrix from a local transform
pub fn compose_trs(position: &Vec3, rotation_degrees: &Vec3, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * euler_degrees_to_quat(rotation_degrees).to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Extract the translation column of an affine matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Transform a point by an affine matrix
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Transform a direction (ignores translation)
pub fn transform_vector(matrix: &Mat4, vector: &Vec3) -> Vec3 {
    matrix.transform_vector(vector)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_trs() {
        let m = compose_trs(&Vec3::zeros(), &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(m, Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_about_z_maps_x_to_y() {
        let m = compose_trs(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 90.0), &Vec3::new(1.0, 1.0, 1.0));
        let rotated = transform_vector(&m, &Vec3::x());
        assert_relative_eq!(rotated, Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let m = compose_trs(
            &Vec3::new(5.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 90.0),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        let p = transform_point(&m, &Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vec3::new(5.0, 2.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(translation_of(&m), Vec3::new(5.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_degree_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI, epsilon = EPSILON);
        assert_relative_eq!(utils::rad_to_deg(constants::PI), 180.0, epsilon = 1e-3);
        assert_relative_eq!(utils::lerp(0.0, 10.0, 0.25), 2.5);
    }
}
