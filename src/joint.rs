//! Built joints.

use glam::Vec3;

use crate::description::{JointLimit, JointType};
use crate::error::ModelError;
use crate::model::LinkId;
use crate::pose::Pose;
use crate::scene::ComponentId;

/// A connection between two links of a built model.
///
/// Created by the [`JointFactory`](crate::factory::JointFactory) with only
/// the link names known. The tree builder resolves the names into link
/// handles exactly once; after that the joint does not change.
#[derive(Clone, Debug)]
pub struct Joint {
    name: String,
    parent_name: String,
    child_name: String,
    parent: Option<LinkId>,
    child: Option<LinkId>,
    pose: Pose,
    use_parent_model_frame: bool,
    joint_type: JointType,
    axis: Vec3,
    limits: Option<JointLimit>,
    constraint: ComponentId,
}

impl Joint {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: impl Into<String>,
        parent_name: impl Into<String>,
        child_name: impl Into<String>,
        pose: Pose,
        use_parent_model_frame: bool,
        joint_type: JointType,
        axis: Vec3,
        limits: Option<JointLimit>,
        constraint: ComponentId,
    ) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.into(),
            child_name: child_name.into(),
            parent: None,
            child: None,
            pose,
            use_parent_model_frame,
            joint_type,
            axis,
            limits,
            constraint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    pub fn child_name(&self) -> &str {
        &self.child_name
    }

    /// Resolved parent link; `None` until the tree builder has processed this joint.
    pub fn parent(&self) -> Option<LinkId> {
        self.parent
    }

    pub fn child(&self) -> Option<LinkId> {
        self.child
    }

    pub fn is_resolved(&self) -> bool {
        self.parent.is_some() && self.child.is_some()
    }

    /// Declared pose of the joint relative to its reference frame.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn uses_parent_model_frame(&self) -> bool {
        self.use_parent_model_frame
    }

    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn limits(&self) -> Option<JointLimit> {
        self.limits
    }

    pub fn constraint(&self) -> ComponentId {
        self.constraint
    }

    pub(crate) fn set_parent_child(
        &mut self,
        parent: LinkId,
        child: LinkId,
    ) -> Result<(), ModelError> {
        if self.is_resolved() {
            return Err(ModelError::JointAlreadyResolved(self.name.clone()));
        }
        self.parent = Some(parent);
        self.child = Some(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exactly_once() {
        let mut joint = Joint::new(
            "elbow",
            "upper",
            "lower",
            Pose::IDENTITY,
            true,
            JointType::Hinge,
            Vec3::Z,
            None,
            ComponentId(7),
        );
        assert!(!joint.is_resolved());

        joint.set_parent_child(LinkId(0), LinkId(1)).unwrap();
        assert_eq!(joint.parent(), Some(LinkId(0)));
        assert_eq!(joint.child(), Some(LinkId(1)));

        assert!(joint.set_parent_child(LinkId(1), LinkId(0)).is_err());
        assert_eq!(joint.parent(), Some(LinkId(0)));
    }
}
