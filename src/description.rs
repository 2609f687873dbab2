use bevy_heavy::ComputeMassProperties3d;
use bevy_math::primitives::{Capsule3d, Cuboid, Cylinder, Sphere};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// The flat, engine-agnostic description of a robot model.
///
/// This is what a description-file parser (SDF, URDF, ...) hands over. Links
/// and joints refer to each other only by name; nothing here is resolved.
/// The model builder reads it and never mutates it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelDescription {
    /// Name of the model.
    #[serde(default)]
    pub name: String,

    /// All rigid bodies, in declaration order.
    #[serde(default)]
    pub links: Vec<LinkDescription>,

    /// All connections between links, in declaration order.
    #[serde(default)]
    pub joints: Vec<JointDescription>,
}

impl ModelDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reads a description from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_joint(mut self, joint: JointDescription) -> Self {
        self.joints.push(joint);
        self
    }
}

/// A single rigid body of the robot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkDescription {
    /// Unique name within the model.
    pub name: String,

    /// Collision shape of the link.
    pub shape: ShapePrimitive,

    /// Initial world pose of the link (rest pose).
    #[serde(default)]
    pub pose: Pose,

    /// Explicit inertial data. When absent, mass properties are derived from
    /// the shape and the factory's default density.
    #[serde(default)]
    pub inertial: Option<InertialDescription>,

    /// Whether the physics layer should apply gravity to this body.
    #[serde(default = "default_true")]
    pub gravity: bool,

    /// Whether this body collides with other bodies of the same model.
    #[serde(default)]
    pub self_collide: bool,
}

fn default_true() -> bool {
    true
}

impl LinkDescription {
    pub fn new(name: impl Into<String>, shape: ShapePrimitive) -> Self {
        Self {
            name: name.into(),
            shape,
            pose: Pose::IDENTITY,
            inertial: None,
            gravity: true,
            self_collide: false,
        }
    }

    pub fn at(mut self, pose: impl Into<Pose>) -> Self {
        self.pose = pose.into();
        self
    }

    pub fn with_inertial(mut self, inertial: InertialDescription) -> Self {
        self.inertial = Some(inertial);
        self
    }
}

/// Explicit mass properties as they appear in a description file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InertialDescription {
    /// Mass in kg.
    pub mass: f32,
    /// Principal moments of inertia (kg·m²). Derived from the shape when absent.
    #[serde(default)]
    pub principal_inertia: Option<Vec3>,
}

/// Supported geometric primitives for link collision shapes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapePrimitive {
    /// A box defined by half-extents (x, y, z).
    Box(Vec3),
    /// A cylinder defined by radius and height (aligned along Y axis).
    Cylinder { radius: f32, height: f32 },
    /// A sphere defined by radius.
    Sphere(f32),
    /// A capsule defined by radius and height (aligned along Y axis).
    Capsule { radius: f32, height: f32 },
}

/// A type-erased wrapper so we can call [`ComputeMassProperties3d`] on any variant.
#[derive(Clone, Copy, Debug)]
pub enum BevyPrimitive {
    Cuboid(Cuboid),
    Cylinder(Cylinder),
    Sphere(Sphere),
    Capsule(Capsule3d),
}

impl ComputeMassProperties3d for BevyPrimitive {
    fn mass(&self, density: f32) -> f32 {
        match self {
            Self::Cuboid(s) => s.mass(density),
            Self::Cylinder(s) => s.mass(density),
            Self::Sphere(s) => s.mass(density),
            Self::Capsule(s) => s.mass(density),
        }
    }

    fn unit_principal_angular_inertia(&self) -> Vec3 {
        match self {
            Self::Cuboid(s) => s.unit_principal_angular_inertia(),
            Self::Cylinder(s) => s.unit_principal_angular_inertia(),
            Self::Sphere(s) => s.unit_principal_angular_inertia(),
            Self::Capsule(s) => s.unit_principal_angular_inertia(),
        }
    }

    fn center_of_mass(&self) -> Vec3 {
        match self {
            Self::Cuboid(s) => s.center_of_mass(),
            Self::Cylinder(s) => s.center_of_mass(),
            Self::Sphere(s) => s.center_of_mass(),
            Self::Capsule(s) => s.center_of_mass(),
        }
    }
}

impl ShapePrimitive {
    /// Convert to the corresponding `bevy_math` primitive for mass-property computation.
    pub fn to_bevy_primitive(self) -> BevyPrimitive {
        match self {
            Self::Box(half_extents) => BevyPrimitive::Cuboid(Cuboid {
                half_size: half_extents,
            }),
            Self::Cylinder { radius, height } => {
                BevyPrimitive::Cylinder(Cylinder::new(radius, height))
            }
            Self::Sphere(r) => BevyPrimitive::Sphere(Sphere::new(r)),
            Self::Capsule { radius, height } => {
                BevyPrimitive::Capsule(Capsule3d::new(radius, height))
            }
        }
    }

    /// The smallest linear dimension of the shape, used for validation.
    ///
    /// A capsule's `height` is the length of its cylindrical segment and may be
    /// zero, so only its radius counts.
    pub fn min_dimension(&self) -> f32 {
        match *self {
            Self::Box(half_extents) => half_extents.min_element(),
            Self::Cylinder { radius, height } => radius.min(height),
            Self::Capsule { radius, .. } | Self::Sphere(radius) => radius,
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Box(half_extents) => half_extents.is_finite(),
            Self::Cylinder { radius, height } | Self::Capsule { radius, height } => {
                radius.is_finite() && height.is_finite()
            }
            Self::Sphere(r) => r.is_finite(),
        }
    }
}

/// A named connection between two links, as declared in the description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JointDescription {
    /// Unique name within the model.
    pub name: String,

    /// Name of the parent link (closer to the root).
    pub parent: String,

    /// Name of the child link.
    pub child: String,

    /// Pose of the joint relative to its reference frame.
    #[serde(default)]
    pub pose: Pose,

    /// Whether `pose` is expressed in the parent model frame, i.e. applied on
    /// top of the child's world pose.
    #[serde(default = "default_true")]
    pub use_parent_model_frame: bool,

    /// The type of mechanical connection.
    pub joint_type: JointType,

    /// The axis of rotation/translation.
    #[serde(default = "default_axis")]
    pub axis: Vec3,

    /// Physical limits of the joint.
    #[serde(default)]
    pub limits: Option<JointLimit>,
}

fn default_axis() -> Vec3 {
    Vec3::Z
}

impl JointDescription {
    pub fn new(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
        joint_type: JointType,
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            child: child.into(),
            pose: Pose::IDENTITY,
            use_parent_model_frame: true,
            joint_type,
            axis: Vec3::Z,
            limits: None,
        }
    }

    pub fn with_pose(mut self, pose: impl Into<Pose>) -> Self {
        self.pose = pose.into();
        self
    }

    pub fn with_axis(mut self, axis: Vec3) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_limits(mut self, limits: JointLimit) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn in_parent_model_frame(mut self, use_parent_model_frame: bool) -> Self {
        self.use_parent_model_frame = use_parent_model_frame;
        self
    }
}

/// Types of mechanical joints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointType {
    /// Fixed connection (welded).
    Fixed,
    /// Rotates around a single axis (e.g., knee, elbow).
    Hinge,
    /// Ball and socket (3 degrees of freedom).
    Ball,
    /// Slides along a single axis (linear actuator).
    Prismatic,
}

impl JointType {
    /// Whether the joint's motion is defined by [`JointDescription::axis`].
    pub fn uses_axis(self) -> bool {
        matches!(self, Self::Hinge | Self::Prismatic)
    }
}

/// Limits for a joint's motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    /// Minimum angle (radians) or distance (meters).
    pub min: f32,
    /// Maximum angle (radians) or distance (meters).
    pub max: f32,
    /// Maximum torque (Nm) or force (N) the joint motor can apply.
    pub effort: f32,
    /// Maximum velocity (rad/s or m/s).
    pub velocity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults() {
        let json = r#"{
            "name": "arm",
            "links": [{ "name": "base", "shape": { "Sphere": 0.5 } }],
            "joints": [{ "name": "j0", "parent": "base", "child": "tip", "joint_type": "Hinge" }]
        }"#;
        let desc = ModelDescription::from_json(json).unwrap();
        assert_eq!(desc.links[0].pose, Pose::IDENTITY);
        assert!(desc.links[0].gravity);
        assert!(desc.joints[0].use_parent_model_frame);
        assert_eq!(desc.joints[0].axis, Vec3::Z);
    }

    #[test]
    fn min_dimension_of_box_uses_smallest_half_extent() {
        let shape = ShapePrimitive::Box(Vec3::new(0.5, 0.1, 2.0));
        assert_eq!(shape.min_dimension(), 0.1);
    }

    #[test]
    fn capsule_without_segment_is_sphere_like() {
        let capsule = ShapePrimitive::Capsule {
            radius: 0.2,
            height: 0.0,
        };
        assert_eq!(capsule.min_dimension(), 0.2);

        let disc = ShapePrimitive::Cylinder {
            radius: 0.2,
            height: 0.0,
        };
        assert_eq!(disc.min_dimension(), 0.0);
    }
}
