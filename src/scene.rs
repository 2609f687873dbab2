//! The contract the model builder needs from a scene/physics engine.
//!
//! The engine owns the actual rigid bodies and constraint solvers. The builder
//! only creates components, moves them around, attaches them to one another
//! and asks constraints to bind their two endpoint bodies. [`SceneGraph`]
//! is an in-memory implementation of this trait.
//!
//! [`SceneGraph`]: crate::scene_graph::SceneGraph

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::description::{JointLimit, JointType, ShapePrimitive};
use crate::error::SceneError;
use crate::pose::Pose;

/// Opaque handle to a body or constraint owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

/// How a component's transform is treated when it is attached to a new parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentRule {
    /// The component stays where it is in the world; its relative pose is recomputed.
    KeepWorldTransform,
    /// The relative pose is kept; the component moves with its new parent.
    KeepRelativeTransform,
}

/// Everything the scene needs to create a link's rigid body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodySpec {
    pub name: String,
    pub shape: ShapePrimitive,
    /// Initial world pose.
    pub pose: Pose,
    pub mass: f32,
    pub principal_inertia: Vec3,
    /// Center of mass in the body's local frame.
    pub center_of_mass: Vec3,
    pub gravity: bool,
    pub self_collide: bool,
}

/// Everything the scene needs to create a joint's constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintSpec {
    pub name: String,
    pub joint_type: JointType,
    /// Unit axis, or zero for joints without an axis.
    pub axis: Vec3,
    pub limits: Option<JointLimit>,
}

/// Scene/physics collaborator.
///
/// Poses follow a transform hierarchy: a component attached to a parent has
/// a relative pose in the parent's frame, and its world pose is the parent's
/// world pose composed with that relative pose.
pub trait Scene {
    /// Creates a rigid body posed at `spec.pose` with no attach parent.
    fn create_body(&mut self, spec: &BodySpec) -> Result<ComponentId, SceneError>;

    /// Creates a constraint at the world origin with no attach parent and no endpoints.
    fn create_constraint(&mut self, spec: &ConstraintSpec) -> Result<ComponentId, SceneError>;

    /// Attaches `component` beneath `target`, replacing any previous attach parent.
    fn attach_to_component(
        &mut self,
        component: ComponentId,
        target: ComponentId,
        rule: AttachmentRule,
    ) -> Result<(), SceneError>;

    /// The component's current attach parent, if any.
    fn attach_parent(&self, component: ComponentId) -> Result<Option<ComponentId>, SceneError>;

    fn world_pose(&self, component: ComponentId) -> Result<Pose, SceneError>;

    fn relative_pose(&self, component: ComponentId) -> Result<Pose, SceneError>;

    /// World-space location of the component.
    fn component_location(&self, component: ComponentId) -> Result<Vec3, SceneError> {
        self.world_pose(component).map(|pose| pose.position)
    }

    /// Moves the component so its world location is `location`, keeping its rotation.
    fn set_world_location(
        &mut self,
        component: ComponentId,
        location: Vec3,
    ) -> Result<(), SceneError>;

    /// Adds `delta` to the relative location (expressed in the attach parent's frame).
    fn add_relative_location(
        &mut self,
        component: ComponentId,
        delta: Vec3,
    ) -> Result<(), SceneError>;

    /// Pre-multiplies the relative rotation by `delta`.
    fn add_relative_rotation(
        &mut self,
        component: ComponentId,
        delta: Quat,
    ) -> Result<(), SceneError>;

    /// Binds a constraint to its two endpoint bodies for the solver.
    fn connect_to_components(
        &mut self,
        constraint: ComponentId,
        first: ComponentId,
        second: ComponentId,
    ) -> Result<(), SceneError>;
}
