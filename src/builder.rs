//! Driver that fills a [`Model`] from a [`ModelDescription`].
//!
//! The entry point is [`ModelBuilder::load`]. It runs three phases in order:
//! create every link, create every joint, then resolve and wire the tree.
//! Splitting creation from resolution means links and joints can appear in
//! any order in the description.
//!
//! # Failure policy
//!
//! - A link or joint that cannot be created is logged and skipped; the rest
//!   of the model still loads.
//! - A joint naming a link that does not exist aborts the tree pass. Joints
//!   already wired stay wired, the rest stay unresolved, and
//!   [`Model::tree_status`] records which reference was missing.
//!
//! Nothing is returned to the caller: a degraded build is visible in the logs
//! and by inspecting the model.

use tracing::{error, info};

use crate::description::ModelDescription;
use crate::factory::{FactoryConfig, JointFactory, LinkFactory};
use crate::model::Model;
use crate::scene::Scene;
use crate::tree::KinematicTreeBuilder;

/// Sequences the link factory, the joint factory and the tree pass.
#[derive(Clone, Debug, Default)]
pub struct ModelBuilder {
    link_factory: LinkFactory,
    joint_factory: JointFactory,
    tree_builder: KinematicTreeBuilder,
}

impl ModelBuilder {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            link_factory: LinkFactory::new(config.clone()),
            joint_factory: JointFactory::new(config),
            tree_builder: KinematicTreeBuilder::new(),
        }
    }

    /// Builds `description` into `model`, creating bodies and constraints in `scene`.
    ///
    /// Does nothing when `model` is `None`. Loading into a model that already
    /// holds links or joints is refused (logged) since names would collide.
    pub fn load<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        description: &ModelDescription,
        model: Option<&mut Model>,
    ) {
        let Some(model) = model else {
            return;
        };
        if !model.is_empty() {
            error!(
                model = model.name(),
                links = model.link_count(),
                joints = model.joint_count(),
                "model already loaded; refusing to load it again"
            );
            return;
        }

        self.load_links(scene, description, model);
        self.load_joints(scene, description, model);
        // Unresolved references are logged and recorded on the model by the tree pass.
        let _ = self.tree_builder.build(scene, model);

        info!(
            model = model.name(),
            links = model.link_count(),
            joints = model.joint_count(),
            status = ?model.tree_status(),
            "model loaded"
        );
    }

    fn load_links<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        description: &ModelDescription,
        model: &mut Model,
    ) {
        for link in &description.links {
            // Checked up front so a duplicate never leaves a body behind in the scene.
            if model.link_id(&link.name).is_some() {
                error!(link = %link.name, "creation of link failed: duplicate link name");
                continue;
            }
            let built = match self.link_factory.load(scene, model, link) {
                Ok(built) => built,
                Err(err) => {
                    error!(link = %link.name, "creation of link failed: {err}");
                    continue;
                }
            };
            // The first registered link becomes the base link.
            if let Err(err) = model.add_link(built) {
                error!(link = %link.name, "creation of link failed: {err}");
            }
        }
    }

    fn load_joints<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        description: &ModelDescription,
        model: &mut Model,
    ) {
        for joint in &description.joints {
            if model.joint_id(&joint.name).is_some() {
                error!(joint = %joint.name, "creation of joint failed: duplicate joint name");
                continue;
            }
            let built = match self.joint_factory.load(scene, model, joint) {
                Ok(built) => built,
                Err(err) => {
                    error!(joint = %joint.name, "creation of joint failed: {err}");
                    continue;
                }
            };
            if let Err(err) = model.add_joint(built) {
                error!(joint = %joint.name, "creation of joint failed: {err}");
            }
        }
    }
}
