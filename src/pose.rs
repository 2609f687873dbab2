//! Rigid transforms (position + orientation) used for world and relative poses.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid transform: a translation followed by a rotation.
///
/// Depending on context this is either a world pose or a pose relative to
/// some parent frame. [`Pose::compose`] chains them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in meters.
    pub position: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Applies `local` in this pose's frame: `self * local`.
    ///
    /// If `self` is the world pose of a frame and `local` is expressed
    /// relative to that frame, the result is `local` in world coordinates.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation * -self.position,
            rotation,
        }
    }

    /// Maps a point from this pose's local frame into the outer frame.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            // q and -q describe the same orientation
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl From<(Vec3, Quat)> for Pose {
    fn from((position, rotation): (Vec3, Quat)) -> Self {
        Self { position, rotation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn compose_applies_local_offset_in_parent_frame() {
        let parent = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2));
        let local = Pose::from_position(Vec3::X);
        let world = parent.compose(&local);
        // +X rotated 90deg about Z is +Y
        assert!(world.position.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn transform_point_matches_compose() {
        let pose = Pose::new(Vec3::new(0.0, 0.0, 2.0), Quat::from_rotation_x(FRAC_PI_2));
        let point = pose.transform_point(Vec3::Y);
        assert!(point.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-6));
        assert!(point.abs_diff_eq(pose.compose(&Pose::from_position(Vec3::Y)).position, 1e-6));
    }

    #[test]
    fn inverse_cancels() {
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.2, 0.4, -1.1);
        let pose = Pose::new(Vec3::new(0.3, -2.0, 5.0), rotation);
        let id = pose.compose(&pose.inverse());
        assert!(id.abs_diff_eq(&Pose::IDENTITY, 1e-5));
    }
}
