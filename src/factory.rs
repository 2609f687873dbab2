//! Factories that turn single link/joint descriptions into built entities.
//!
//! Both factories validate first and only then ask the scene for a
//! component, so a rejected description leaves nothing behind. Neither
//! touches the [`Model`]; registering the result is the caller's decision.

use bevy_heavy::ComputeMassProperties3d as _;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::description::{JointDescription, JointLimit, LinkDescription};
use crate::error::CreationError;
use crate::joint::Joint;
use crate::link::Link;
use crate::model::Model;
use crate::scene::{BodySpec, ConstraintSpec, Scene};

/// Configuration shared by the link and joint factories.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Density (kg/m^3) used to derive mass when a link has no inertial data.
    /// Default: 1000 (water).
    pub default_density: f32,
    /// Smallest accepted shape dimension in meters.
    pub min_extent: f32,
    /// Swap joint limits given as `min > max` instead of rejecting the joint.
    pub swap_inverted_limits: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            default_density: 1000.0,
            min_extent: 1e-6,
            swap_inverted_limits: true,
        }
    }
}

/// Builds one [`Link`] (and its scene body) per [`LinkDescription`].
#[derive(Clone, Debug, Default)]
pub struct LinkFactory {
    config: FactoryConfig,
}

impl LinkFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Creates the link's body in `scene` and returns the unregistered link.
    pub fn load<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &Model,
        description: &LinkDescription,
    ) -> Result<Link, CreationError> {
        let spec = self.body_spec(description)?;
        let collision = scene.create_body(&spec)?;
        debug!(
            model = model.name(),
            link = %description.name,
            mass = spec.mass,
            %collision,
            "created link body"
        );
        Ok(Link::new(&description.name, model.name(), collision, spec.mass))
    }

    /// Validates the description and derives the body's mass properties.
    pub fn body_spec(&self, description: &LinkDescription) -> Result<BodySpec, CreationError> {
        let name = description.name.as_str();
        if name.is_empty() {
            return Err(CreationError::EmptyName { kind: "link" });
        }
        if !description.pose.is_finite() {
            return Err(CreationError::NonFinitePose { name: name.into() });
        }

        let shape = description.shape;
        if !shape.is_finite() {
            return Err(CreationError::invalid_shape(name, "dimensions must be finite"));
        }
        let min_dimension = shape.min_dimension();
        if min_dimension < self.config.min_extent {
            return Err(CreationError::invalid_shape(
                name,
                format!(
                    "smallest dimension {min_dimension} is below {}",
                    self.config.min_extent
                ),
            ));
        }

        let primitive = shape.to_bevy_primitive();
        let (mass, principal_inertia) = match description.inertial {
            Some(inertial) => {
                if !inertial.mass.is_finite() || inertial.mass <= 0.0 {
                    return Err(CreationError::invalid_inertial(
                        name,
                        format!("mass must be positive, got {}", inertial.mass),
                    ));
                }
                let inertia = match inertial.principal_inertia {
                    Some(inertia) if !inertia.is_finite() || inertia.min_element() < 0.0 => {
                        return Err(CreationError::invalid_inertial(
                            name,
                            "principal inertia must be finite and non-negative",
                        ));
                    }
                    Some(inertia) => inertia,
                    None => primitive.unit_principal_angular_inertia() * inertial.mass,
                };
                (inertial.mass, inertia)
            }
            None => {
                let mass = primitive.mass(self.config.default_density);
                if !mass.is_finite() || mass <= 0.0 {
                    return Err(CreationError::invalid_inertial(
                        name,
                        format!(
                            "mass derived from density {} must be positive, got {mass}",
                            self.config.default_density
                        ),
                    ));
                }
                (mass, primitive.unit_principal_angular_inertia() * mass)
            }
        };

        Ok(BodySpec {
            name: name.to_string(),
            shape,
            pose: description.pose,
            mass,
            principal_inertia,
            center_of_mass: primitive.center_of_mass(),
            gravity: description.gravity,
            self_collide: description.self_collide,
        })
    }
}

/// Builds one unresolved [`Joint`] (and its constraint) per [`JointDescription`].
#[derive(Clone, Debug, Default)]
pub struct JointFactory {
    config: FactoryConfig,
}

impl JointFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self { config }
    }

    /// Creates the joint's constraint in `scene` and returns the unregistered joint.
    ///
    /// Parent and child are recorded by name only; the constraint is neither
    /// positioned nor attached yet.
    pub fn load<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &Model,
        description: &JointDescription,
    ) -> Result<Joint, CreationError> {
        let spec = self.constraint_spec(description)?;
        let constraint = scene.create_constraint(&spec)?;
        debug!(
            model = model.name(),
            joint = %description.name,
            parent = %description.parent,
            child = %description.child,
            %constraint,
            "created joint constraint"
        );
        Ok(Joint::new(
            &description.name,
            &description.parent,
            &description.child,
            description.pose,
            description.use_parent_model_frame,
            spec.joint_type,
            spec.axis,
            spec.limits,
            constraint,
        ))
    }

    pub fn constraint_spec(
        &self,
        description: &JointDescription,
    ) -> Result<ConstraintSpec, CreationError> {
        let name = description.name.as_str();
        if name.is_empty() {
            return Err(CreationError::EmptyName { kind: "joint" });
        }
        if description.parent.is_empty() || description.child.is_empty() {
            return Err(CreationError::invalid_joint(
                name,
                "parent and child link names are required",
            ));
        }
        if description.parent == description.child {
            return Err(CreationError::invalid_joint(
                name,
                format!("link {} cannot be its own parent", description.parent),
            ));
        }
        if !description.pose.is_finite() {
            return Err(CreationError::NonFinitePose { name: name.into() });
        }

        let axis = if description.joint_type.uses_axis() {
            let axis = description.axis.normalize_or_zero();
            if axis == Vec3::ZERO {
                return Err(CreationError::invalid_joint(
                    name,
                    format!("{:?} joint needs a non-zero axis", description.joint_type),
                ));
            }
            axis
        } else {
            Vec3::ZERO
        };

        let limits = match description.limits {
            Some(limits) => Some(self.checked_limits(name, limits)?),
            None => None,
        };

        Ok(ConstraintSpec {
            name: name.to_string(),
            joint_type: description.joint_type,
            axis,
            limits,
        })
    }

    fn checked_limits(&self, joint: &str, limits: JointLimit) -> Result<JointLimit, CreationError> {
        if limits.min.is_nan() || limits.max.is_nan() {
            return Err(CreationError::invalid_joint(joint, "limits must not be NaN"));
        }
        if limits.min <= limits.max {
            return Ok(limits);
        }
        if !self.config.swap_inverted_limits {
            return Err(CreationError::invalid_joint(
                joint,
                format!("lower limit {} exceeds upper limit {}", limits.min, limits.max),
            ));
        }
        warn!(joint, min = limits.min, max = limits.max, "joint limits inverted, swapping");
        Ok(JointLimit {
            min: limits.max,
            max: limits.min,
            ..limits
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{InertialDescription, JointType, ShapePrimitive};
    use crate::scene_graph::SceneGraph;

    #[test]
    fn link_mass_from_density() {
        let factory = LinkFactory::default();
        let desc = LinkDescription::new("cube", ShapePrimitive::Box(Vec3::splat(0.5)));
        let spec = factory.body_spec(&desc).unwrap();
        // 1 m^3 of water
        assert!((spec.mass - 1000.0).abs() < 1e-2);
    }

    #[test]
    fn explicit_inertial_wins() {
        let factory = LinkFactory::default();
        let desc = LinkDescription::new("ball", ShapePrimitive::Sphere(0.1)).with_inertial(
            InertialDescription {
                mass: 2.0,
                principal_inertia: Some(Vec3::new(0.1, 0.2, 0.3)),
            },
        );
        let spec = factory.body_spec(&desc).unwrap();
        assert_eq!(spec.mass, 2.0);
        assert_eq!(spec.principal_inertia, Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn rejected_link_creates_no_body() {
        let factory = LinkFactory::default();
        let mut scene = SceneGraph::new();
        let model = Model::new("m");
        let desc = LinkDescription::new("flat", ShapePrimitive::Box(Vec3::new(1.0, 0.0, 1.0)));

        let err = factory.load(&mut scene, &model, &desc).unwrap_err();
        assert!(matches!(err, CreationError::InvalidShape { .. }));
        assert!(scene.is_empty());
    }

    #[test]
    fn negative_mass_rejected() {
        let factory = LinkFactory::default();
        let desc = LinkDescription::new("ghost", ShapePrimitive::Sphere(0.1)).with_inertial(
            InertialDescription {
                mass: -1.0,
                principal_inertia: None,
            },
        );
        assert!(matches!(
            factory.body_spec(&desc),
            Err(CreationError::InvalidInertial { .. })
        ));
    }

    #[test]
    fn unusable_default_density_rejected() {
        let desc = LinkDescription::new("ball", ShapePrimitive::Sphere(0.1));
        for density in [0.0, -1000.0, f32::NAN] {
            let factory = LinkFactory::new(FactoryConfig {
                default_density: density,
                ..Default::default()
            });
            assert!(matches!(
                factory.body_spec(&desc),
                Err(CreationError::InvalidInertial { .. })
            ));
            assert_eq!(factory.config().default_density.to_bits(), density.to_bits());
        }

        let mut scene = SceneGraph::new();
        let factory = LinkFactory::new(FactoryConfig {
            default_density: 0.0,
            ..Default::default()
        });
        assert!(factory.load(&mut scene, &Model::new("m"), &desc).is_err());
        assert!(scene.is_empty());
    }

    #[test]
    fn joint_axis_is_normalized() {
        let factory = JointFactory::default();
        let desc = JointDescription::new("j", "a", "b", JointType::Hinge)
            .with_axis(Vec3::new(0.0, 3.0, 0.0));
        let spec = factory.constraint_spec(&desc).unwrap();
        assert!(spec.axis.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn hinge_without_axis_rejected() {
        let factory = JointFactory::default();
        let desc = JointDescription::new("j", "a", "b", JointType::Hinge).with_axis(Vec3::ZERO);
        assert!(factory.constraint_spec(&desc).is_err());

        let fixed = JointDescription::new("f", "a", "b", JointType::Fixed).with_axis(Vec3::ZERO);
        assert!(factory.constraint_spec(&fixed).is_ok());
    }

    #[test]
    fn self_parented_joint_rejected() {
        let factory = JointFactory::default();
        let desc = JointDescription::new("loop", "a", "a", JointType::Fixed);
        assert!(matches!(
            factory.constraint_spec(&desc),
            Err(CreationError::InvalidJoint { .. })
        ));
    }

    #[test]
    fn inverted_limits_swapped_or_rejected() {
        let limits = JointLimit {
            min: 1.0,
            max: -1.0,
            effort: 10.0,
            velocity: 2.0,
        };
        let desc = JointDescription::new("j", "a", "b", JointType::Hinge).with_limits(limits);

        let swapped = JointFactory::default().constraint_spec(&desc).unwrap();
        assert_eq!(swapped.limits.map(|l| (l.min, l.max)), Some((-1.0, 1.0)));

        let strict = JointFactory::new(FactoryConfig {
            swap_inverted_limits: false,
            ..Default::default()
        });
        assert!(strict.constraint_spec(&desc).is_err());
    }

    #[test]
    fn joint_load_leaves_references_unresolved() {
        let mut scene = SceneGraph::new();
        let model = Model::new("m");
        let desc = JointDescription::new("j", "a", "b", JointType::Ball);
        let joint = JointFactory::default().load(&mut scene, &model, &desc).unwrap();

        assert_eq!(joint.parent_name(), "a");
        assert_eq!(joint.child_name(), "b");
        assert!(!joint.is_resolved());
        assert_eq!(scene.attach_parent(joint.constraint()).unwrap(), None);
        assert_eq!(scene.constraint_endpoints(joint.constraint()), None);
    }
}
