//! Placements of meshes in a scene.
//!
//! An [`Instance`] pairs a [`Transform`] with a mesh and an optional
//! material override. The driver rewrites transforms every frame.

use cgmath::{Matrix4, Rad, Vector3};

use crate::data_structures::{material::MaterialId, mesh::MeshId};

/// Stable index of an instance in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) usize);

/// Position, Euler rotation (radians, applied Y then X then Z) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn scaled(scale: f32) -> Self {
        Self {
            scale: Vector3::new(scale, scale, scale),
            ..Self::new()
        }
    }

    /// translate · rotate(Y·X·Z) · scale
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * euler_yxz(self.rotation.y, self.rotation.x, self.rotation.z)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotation about Y by `yaw`, then X by `pitch`, then Z by `roll`.
pub fn euler_yxz(yaw: f32, pitch: f32, roll: f32) -> Matrix4<f32> {
    Matrix4::from_angle_y(Rad(yaw))
        * Matrix4::from_angle_x(Rad(pitch))
        * Matrix4::from_angle_z(Rad(roll))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub transform: Transform,
    pub mesh: MeshId,
    /// Overrides the mesh's material when set.
    pub material: Option<MaterialId>,
}

impl Instance {
    pub fn new(mesh: MeshId) -> Self {
        Self {
            transform: Transform::new(),
            mesh,
            material: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector4, vec3};

    use super::*;

    fn close(a: Vector4<f32>, b: Vector4<f32>) -> bool {
        let d = a - b;
        [d.x, d.y, d.z, d.w].iter().all(|c| c.abs() < 1e-5)
    }

    #[test]
    fn scale_applies_before_rotation_and_translation() {
        let transform = Transform {
            position: vec3(10.0, 0.0, 0.0),
            rotation: vec3(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: vec3(2.0, 2.0, 2.0),
        };
        // x axis scaled to 2, turned a quarter about Y onto -z, then moved.
        let p = transform.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(close(p, Vector4::new(10.0, 0.0, -2.0, 1.0)), "{p:?}");
    }

    #[test]
    fn yaw_is_applied_last() {
        // Applying yaw first would leave +z on +x instead.
        let m = euler_yxz(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0);
        let p = m * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!(close(p, Vector4::new(0.0, -1.0, 0.0, 0.0)), "{p:?}");
    }
}
