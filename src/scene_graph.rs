//! In-memory transform hierarchy implementing [`Scene`].
//!
//! It does no dynamics. It tracks components, their attach parents and
//! relative poses, and the endpoints each constraint is bound to. That is
//! all the model builder can observe, which makes it a faithful stand-in for
//! an engine when checking how a model was wired.

use glam::{Quat, Vec3};

use crate::error::SceneError;
use crate::pose::Pose;
use crate::scene::{AttachmentRule, BodySpec, ComponentId, ConstraintSpec, Scene};

#[derive(Clone, Debug)]
enum ComponentKind {
    Body(BodySpec),
    Constraint {
        spec: ConstraintSpec,
        endpoints: Option<(ComponentId, ComponentId)>,
    },
}

#[derive(Clone, Debug)]
struct Component {
    kind: ComponentKind,
    parent: Option<ComponentId>,
    relative: Pose,
}

/// A scene that only keeps transforms and attachment edges.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    components: Vec<Component>,
    attachment_calls: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live components (bodies and constraints).
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// How many successful `attach_to_component` calls were made.
    pub fn attachment_calls(&self) -> usize {
        self.attachment_calls
    }

    /// Name the component was created with.
    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.components.get(id.0 as usize).map(|c| match &c.kind {
            ComponentKind::Body(spec) => spec.name.as_str(),
            ComponentKind::Constraint { spec, .. } => spec.name.as_str(),
        })
    }

    pub fn body_spec(&self, id: ComponentId) -> Option<&BodySpec> {
        match &self.components.get(id.0 as usize)?.kind {
            ComponentKind::Body(spec) => Some(spec),
            ComponentKind::Constraint { .. } => None,
        }
    }

    pub fn constraint_spec(&self, id: ComponentId) -> Option<&ConstraintSpec> {
        match &self.components.get(id.0 as usize)?.kind {
            ComponentKind::Constraint { spec, .. } => Some(spec),
            ComponentKind::Body(_) => None,
        }
    }

    /// The two bodies a constraint was connected to, if any.
    pub fn constraint_endpoints(&self, id: ComponentId) -> Option<(ComponentId, ComponentId)> {
        match &self.components.get(id.0 as usize)?.kind {
            ComponentKind::Constraint { endpoints, .. } => *endpoints,
            ComponentKind::Body(_) => None,
        }
    }

    /// Components directly attached beneath `id`.
    pub fn attached_children(&self, id: ComponentId) -> Vec<ComponentId> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parent == Some(id))
            .map(|(i, _)| ComponentId(i as u32))
            .collect()
    }

    fn get(&self, id: ComponentId) -> Result<&Component, SceneError> {
        self.components
            .get(id.0 as usize)
            .ok_or(SceneError::UnknownComponent(id))
    }

    fn get_mut(&mut self, id: ComponentId) -> Result<&mut Component, SceneError> {
        self.components
            .get_mut(id.0 as usize)
            .ok_or(SceneError::UnknownComponent(id))
    }

    fn insert(&mut self, kind: ComponentKind, relative: Pose) -> ComponentId {
        let id = ComponentId(self.components.len() as u32);
        self.components.push(Component {
            kind,
            parent: None,
            relative,
        });
        id
    }

    fn parent_world_pose(&self, id: ComponentId) -> Result<Pose, SceneError> {
        match self.get(id)?.parent {
            Some(parent) => self.world_pose(parent),
            None => Ok(Pose::IDENTITY),
        }
    }

    /// Whether `ancestor` appears on the attach-parent chain of `id` (or is `id`).
    fn is_ancestor_or_self(
        &self,
        ancestor: ComponentId,
        id: ComponentId,
    ) -> Result<bool, SceneError> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.get(current)?.parent;
        }
        Ok(false)
    }
}

impl Scene for SceneGraph {
    fn create_body(&mut self, spec: &BodySpec) -> Result<ComponentId, SceneError> {
        if !spec.pose.is_finite() {
            return Err(SceneError::Rejected {
                name: spec.name.clone(),
                reason: "pose is not finite".into(),
            });
        }
        Ok(self.insert(ComponentKind::Body(spec.clone()), spec.pose))
    }

    fn create_constraint(&mut self, spec: &ConstraintSpec) -> Result<ComponentId, SceneError> {
        Ok(self.insert(
            ComponentKind::Constraint {
                spec: spec.clone(),
                endpoints: None,
            },
            Pose::IDENTITY,
        ))
    }

    fn attach_to_component(
        &mut self,
        component: ComponentId,
        target: ComponentId,
        rule: AttachmentRule,
    ) -> Result<(), SceneError> {
        self.get(component)?;
        if self.is_ancestor_or_self(component, target)? {
            return Err(SceneError::AttachmentCycle { component, target });
        }

        let relative = match rule {
            AttachmentRule::KeepWorldTransform => {
                let world = self.world_pose(component)?;
                self.world_pose(target)?.inverse().compose(&world)
            }
            AttachmentRule::KeepRelativeTransform => self.get(component)?.relative,
        };

        let node = self.get_mut(component)?;
        node.parent = Some(target);
        node.relative = relative;
        self.attachment_calls += 1;
        Ok(())
    }

    fn attach_parent(&self, component: ComponentId) -> Result<Option<ComponentId>, SceneError> {
        Ok(self.get(component)?.parent)
    }

    fn world_pose(&self, component: ComponentId) -> Result<Pose, SceneError> {
        let node = self.get(component)?;
        Ok(self.parent_world_pose(component)?.compose(&node.relative))
    }

    fn relative_pose(&self, component: ComponentId) -> Result<Pose, SceneError> {
        Ok(self.get(component)?.relative)
    }

    fn set_world_location(
        &mut self,
        component: ComponentId,
        location: Vec3,
    ) -> Result<(), SceneError> {
        let world = Pose::new(location, self.world_pose(component)?.rotation);
        let relative = self.parent_world_pose(component)?.inverse().compose(&world);
        self.get_mut(component)?.relative = relative;
        Ok(())
    }

    fn add_relative_location(
        &mut self,
        component: ComponentId,
        delta: Vec3,
    ) -> Result<(), SceneError> {
        self.get_mut(component)?.relative.position += delta;
        Ok(())
    }

    fn add_relative_rotation(
        &mut self,
        component: ComponentId,
        delta: Quat,
    ) -> Result<(), SceneError> {
        let node = self.get_mut(component)?;
        node.relative.rotation = (delta * node.relative.rotation).normalize();
        Ok(())
    }

    fn connect_to_components(
        &mut self,
        constraint: ComponentId,
        first: ComponentId,
        second: ComponentId,
    ) -> Result<(), SceneError> {
        self.get(first)?;
        self.get(second)?;
        match &mut self.get_mut(constraint)?.kind {
            ComponentKind::Constraint { endpoints, .. } => {
                *endpoints = Some((first, second));
                Ok(())
            }
            ComponentKind::Body(_) => Err(SceneError::NotAConstraint(constraint)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{JointType, ShapePrimitive};
    use std::f32::consts::FRAC_PI_2;

    fn body(scene: &mut SceneGraph, name: &str, pose: Pose) -> ComponentId {
        scene
            .create_body(&BodySpec {
                name: name.into(),
                shape: ShapePrimitive::Sphere(0.1),
                pose,
                mass: 1.0,
                principal_inertia: Vec3::ONE,
                center_of_mass: Vec3::ZERO,
                gravity: true,
                self_collide: false,
            })
            .unwrap()
    }

    #[test]
    fn keep_world_transform_preserves_world_pose() {
        let mut scene = SceneGraph::new();
        let parent = body(
            &mut scene,
            "parent",
            Pose::new(Vec3::new(1.0, 2.0, 0.0), Quat::from_rotation_z(FRAC_PI_2)),
        );
        let child = body(&mut scene, "child", Pose::from_position(Vec3::new(3.0, 0.0, 0.0)));
        let before = scene.world_pose(child).unwrap();

        scene
            .attach_to_component(child, parent, AttachmentRule::KeepWorldTransform)
            .unwrap();

        assert!(scene.world_pose(child).unwrap().abs_diff_eq(&before, 1e-5));
        assert_eq!(scene.attach_parent(child).unwrap(), Some(parent));
    }

    #[test]
    fn keep_relative_transform_moves_with_parent() {
        let mut scene = SceneGraph::new();
        let parent = body(&mut scene, "parent", Pose::from_position(Vec3::new(0.0, 5.0, 0.0)));
        let child = body(&mut scene, "child", Pose::from_position(Vec3::X));

        scene
            .attach_to_component(child, parent, AttachmentRule::KeepRelativeTransform)
            .unwrap();

        let world = scene.world_pose(child).unwrap();
        assert!(world.position.abs_diff_eq(Vec3::new(1.0, 5.0, 0.0), 1e-6));
    }

    #[test]
    fn attaching_beneath_a_descendant_is_a_cycle() {
        let mut scene = SceneGraph::new();
        let a = body(&mut scene, "a", Pose::IDENTITY);
        let b = body(&mut scene, "b", Pose::IDENTITY);
        scene
            .attach_to_component(b, a, AttachmentRule::KeepWorldTransform)
            .unwrap();

        let err = scene
            .attach_to_component(a, b, AttachmentRule::KeepWorldTransform)
            .unwrap_err();
        assert_eq!(err, SceneError::AttachmentCycle { component: a, target: b });
        assert!(scene
            .attach_to_component(a, a, AttachmentRule::KeepWorldTransform)
            .is_err());
        assert_eq!(scene.attachment_calls(), 1);
    }

    #[test]
    fn relative_location_is_in_parent_frame() {
        let mut scene = SceneGraph::new();
        let parent = body(
            &mut scene,
            "parent",
            Pose::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2)),
        );
        let constraint = scene
            .create_constraint(&ConstraintSpec {
                name: "c".into(),
                joint_type: JointType::Fixed,
                axis: Vec3::ZERO,
                limits: None,
            })
            .unwrap();
        scene
            .attach_to_component(constraint, parent, AttachmentRule::KeepWorldTransform)
            .unwrap();
        scene.set_world_location(constraint, Vec3::ZERO).unwrap();
        scene.add_relative_location(constraint, Vec3::X).unwrap();

        let location = scene.component_location(constraint).unwrap();
        assert!(location.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn introspection() {
        let mut scene = SceneGraph::new();
        let a = body(&mut scene, "a", Pose::IDENTITY);
        let b = body(&mut scene, "b", Pose::from_position(Vec3::X));
        scene
            .attach_to_component(b, a, AttachmentRule::KeepWorldTransform)
            .unwrap();

        assert_eq!(scene.name(b), Some("b"));
        assert_eq!(scene.attached_children(a), vec![b]);
        assert!(scene.attached_children(b).is_empty());
        assert_eq!(scene.body_spec(a).map(|s| s.mass), Some(1.0));
        assert!(scene.constraint_spec(a).is_none());
    }

    #[test]
    fn connect_requires_constraint() {
        let mut scene = SceneGraph::new();
        let a = body(&mut scene, "a", Pose::IDENTITY);
        let b = body(&mut scene, "b", Pose::IDENTITY);
        assert_eq!(
            scene.connect_to_components(a, a, b),
            Err(SceneError::NotAConstraint(a))
        );
        assert_eq!(
            scene.connect_to_components(a, a, ComponentId(99)),
            Err(SceneError::UnknownComponent(ComponentId(99)))
        );
    }
}
