//! Kinematic tree pass: resolves joint references and wires constraints.
//!
//! Runs after every link and joint has been registered on the [`Model`].
//! For each joint, in registration order:
//!
//! 1. resolve the parent and child names (a miss aborts the whole pass),
//! 2. bind the joint to both links,
//! 3. position the constraint ([`KinematicTreeBuilder::set_constraint_position`]),
//! 4. connect the constraint to both bodies,
//! 5. attach one body beneath the other ([`choose_attach_direction`]),
//! 6. record the joint on its parent link.
//!
//! Scene failures in steps 3-5 are logged and do not stop the pass.

use tracing::{debug, error, info, warn};

use crate::error::{SceneError, TreeError};
use crate::link::AttachmentState;
use crate::model::{JointId, LinkId, Model, TreeStatus};
use crate::pose::Pose;
use crate::scene::{AttachmentRule, ComponentId, Scene};

/// Which body hangs beneath which when a joint is wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachDirection {
    /// The child body is attached beneath the parent body.
    ChildToParent,
    /// The child is already anchored elsewhere, so the parent body is
    /// attached beneath the child body instead.
    ParentToChild,
    /// Both bodies are already anchored. The constraint alone closes the loop.
    LoopClosure,
}

/// Decides the attachment direction for a joint from the current states of
/// its two links.
pub fn choose_attach_direction(parent: AttachmentState, child: AttachmentState) -> AttachDirection {
    match (parent, child) {
        (_, AttachmentState::Unattached) => AttachDirection::ChildToParent,
        (AttachmentState::Unattached, AttachmentState::Attached { .. }) => {
            AttachDirection::ParentToChild
        }
        (AttachmentState::Attached { .. }, AttachmentState::Attached { .. }) => {
            AttachDirection::LoopClosure
        }
    }
}

/// Resolves and wires every joint of a populated model.
#[derive(Clone, Copy, Debug, Default)]
pub struct KinematicTreeBuilder;

impl KinematicTreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Runs the pass and records its outcome in [`Model::tree_status`].
    ///
    /// # Errors
    ///
    /// Returns the first unresolved link reference. Joints processed before
    /// it stay wired; it and every later joint stay unresolved.
    pub fn build<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &mut Model,
    ) -> Result<(), TreeError> {
        let joint_ids: Vec<JointId> = model.joints().map(|(id, _)| id).collect();
        for joint_id in joint_ids {
            if let Err(err) = self.wire_joint(scene, model, joint_id) {
                error!(
                    model = model.name(),
                    joint = err.joint(),
                    missing = err.missing_link(),
                    "{err}; aborting kinematic tree"
                );
                model.set_tree_status(TreeStatus::Aborted(err.clone()));
                return Err(err);
            }
        }
        info!(
            model = model.name(),
            links = model.link_count(),
            joints = model.joint_count(),
            "kinematic tree built"
        );
        model.set_tree_status(TreeStatus::Complete);
        Ok(())
    }

    fn wire_joint<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &mut Model,
        joint_id: JointId,
    ) -> Result<(), TreeError> {
        let Some(joint) = model.joint(joint_id) else {
            return Ok(());
        };
        let joint_name = joint.name().to_string();
        let parent = model.link_id(joint.parent_name()).ok_or_else(|| TreeError::MissingParent {
            joint: joint_name.clone(),
            link: joint.parent_name().to_string(),
        })?;
        let child = model.link_id(joint.child_name()).ok_or_else(|| TreeError::MissingChild {
            joint: joint_name.clone(),
            link: joint.child_name().to_string(),
        })?;

        if let Some(joint) = model.joint_mut(joint_id)
            && let Err(err) = joint.set_parent_child(parent, child)
        {
            warn!(joint = %joint_name, "{err}; skipping");
            return Ok(());
        }

        self.set_constraint_position(scene, model, joint_id);
        self.connect_constraint(scene, model, joint_id, parent, child);
        self.attach_bodies(scene, model, &joint_name, parent, child);

        if let Some(link) = model.link_mut(parent) {
            link.add_joint(&joint_name, joint_id);
        }
        Ok(())
    }

    /// Attaches the joint's constraint to the child body and poses it.
    ///
    /// With the parent model frame convention the constraint is snapped to
    /// the child's world location and orientation first, and the joint pose is
    /// then added as a relative offset in the child's frame, so its final world
    /// pose is the child's world pose composed with the joint pose. The snap
    /// must come first, or the offset would be applied to the constraint's
    /// previous pose.
    ///
    /// Without that convention only the attachment is made, keeping the
    /// relative transform; no pose is computed.
    pub fn set_constraint_position<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &Model,
        joint_id: JointId,
    ) {
        let Some(joint) = model.joint(joint_id) else {
            return;
        };
        let Some(child) = joint.child().and_then(|id| model.link(id)) else {
            return;
        };
        let constraint = joint.constraint();
        let body = child.collision();

        let result = if joint.uses_parent_model_frame() {
            snap_to_child(scene, constraint, body, joint.pose())
        } else {
            // TODO: place the constraint from an independent joint frame once the description
            // format carries one; for now it only follows the child body.
            warn!(
                joint = joint.name(),
                "joint pose not in parent model frame; attaching constraint without positioning it"
            );
            scene.attach_to_component(constraint, body, AttachmentRule::KeepRelativeTransform)
        };

        if let Err(err) = result {
            error!(joint = joint.name(), "failed to position constraint: {err}");
        }
    }

    fn connect_constraint<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &Model,
        joint_id: JointId,
        parent: LinkId,
        child: LinkId,
    ) {
        let (Some(joint), Some(parent), Some(child)) =
            (model.joint(joint_id), model.link(parent), model.link(child))
        else {
            return;
        };
        if let Err(err) =
            scene.connect_to_components(joint.constraint(), parent.collision(), child.collision())
        {
            error!(joint = joint.name(), "failed to connect constraint: {err}");
        }
    }

    fn attach_bodies<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        model: &mut Model,
        joint: &str,
        parent: LinkId,
        child: LinkId,
    ) {
        let (Some(parent_link), Some(child_link)) = (model.link(parent), model.link(child)) else {
            return;
        };
        let direction = choose_attach_direction(parent_link.attachment(), child_link.attachment());
        let (moving, anchor) = match direction {
            AttachDirection::ChildToParent => (child, parent),
            AttachDirection::ParentToChild => (parent, child),
            AttachDirection::LoopClosure => {
                debug!(
                    joint,
                    parent = parent_link.name(),
                    child = child_link.name(),
                    "both links already attached; constraint closes the loop"
                );
                return;
            }
        };

        let (Some(moving_link), Some(anchor_link)) = (model.link(moving), model.link(anchor)) else {
            return;
        };
        if let Err(err) = scene.attach_to_component(
            moving_link.collision(),
            anchor_link.collision(),
            AttachmentRule::KeepWorldTransform,
        ) {
            error!(
                joint,
                link = moving_link.name(),
                target = anchor_link.name(),
                "failed to attach link body: {err}"
            );
            return;
        }
        debug!(
            joint,
            link = moving_link.name(),
            target = anchor_link.name(),
            ?direction,
            "attached link body"
        );

        if let Some(link) = model.link_mut(moving)
            && let Err(err) = link.mark_attached(anchor)
        {
            warn!(joint, "{err}");
        }
    }
}

fn snap_to_child<S: Scene + ?Sized>(
    scene: &mut S,
    constraint: ComponentId,
    body: ComponentId,
    pose: Pose,
) -> Result<(), SceneError> {
    scene.attach_to_component(constraint, body, AttachmentRule::KeepWorldTransform)?;
    let location = scene.component_location(body)?;
    scene.set_world_location(constraint, location)?;
    // Align with the child's frame so the joint rotation composes onto the child's.
    let leftover = scene.relative_pose(constraint)?.rotation;
    scene.add_relative_rotation(constraint, leftover.inverse())?;
    scene.add_relative_location(constraint, pose.position)?;
    scene.add_relative_rotation(constraint, pose.rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_rule() {
        let free = AttachmentState::Unattached;
        let held = AttachmentState::Attached { to: LinkId(0) };

        assert_eq!(choose_attach_direction(free, free), AttachDirection::ChildToParent);
        assert_eq!(choose_attach_direction(held, free), AttachDirection::ChildToParent);
        assert_eq!(choose_attach_direction(free, held), AttachDirection::ParentToChild);
        assert_eq!(choose_attach_direction(held, held), AttachDirection::LoopClosure);
    }
}
