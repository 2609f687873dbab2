//! Built links and their attachment state.

use std::collections::HashMap;

use crate::error::ModelError;
use crate::model::{JointId, LinkId};
use crate::scene::ComponentId;

/// Whether a link's body has been physically attached beneath another link.
///
/// Transitions once, from `Unattached` to `Attached`, and never back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttachmentState {
    #[default]
    Unattached,
    Attached {
        /// The link this one hangs beneath.
        to: LinkId,
    },
}

/// A rigid body of a built model.
///
/// Owned by its [`Model`](crate::model::Model). The only mutations after
/// creation are recording owned joints and the single attachment transition.
#[derive(Clone, Debug)]
pub struct Link {
    name: String,
    model: String,
    collision: ComponentId,
    mass: f32,
    attachment: AttachmentState,
    joints: HashMap<String, JointId>,
}

impl Link {
    pub(crate) fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        collision: ComponentId,
        mass: f32,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            collision,
            mass,
            attachment: AttachmentState::Unattached,
            joints: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the model this link belongs to.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// The scene body standing for this link.
    pub fn collision(&self) -> ComponentId {
        self.collision
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn attachment(&self) -> AttachmentState {
        self.attachment
    }

    pub fn is_attached_to_parent(&self) -> bool {
        matches!(self.attachment, AttachmentState::Attached { .. })
    }

    /// The link this one is physically attached beneath, if any.
    pub fn attached_to(&self) -> Option<LinkId> {
        match self.attachment {
            AttachmentState::Attached { to } => Some(to),
            AttachmentState::Unattached => None,
        }
    }

    /// Joints whose parent is this link, keyed by joint name.
    pub fn joints(&self) -> &HashMap<String, JointId> {
        &self.joints
    }

    pub(crate) fn add_joint(&mut self, name: impl Into<String>, joint: JointId) {
        self.joints.insert(name.into(), joint);
    }

    pub(crate) fn mark_attached(&mut self, to: LinkId) -> Result<(), ModelError> {
        match self.attachment {
            AttachmentState::Unattached => {
                self.attachment = AttachmentState::Attached { to };
                Ok(())
            }
            AttachmentState::Attached { .. } => {
                Err(ModelError::AlreadyAttached(self.name.clone()))
            }
        }
    }
}
