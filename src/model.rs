//! The built model: sole owner of all links and joints.
//!
//! Links and joints live in insertion-ordered arenas and refer to each other
//! through [`LinkId`]/[`JointId`] handles, so there are no ownership cycles.

use std::collections::HashMap;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;
use tracing::warn;

use crate::error::{ModelError, TreeError};
use crate::joint::Joint;
use crate::link::Link;

/// Handle to a link inside its [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Link({})", self.0)
    }
}

/// Handle to a joint inside its [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub usize);

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Joint({})", self.0)
    }
}

/// Outcome of the last kinematic tree pass over a model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TreeStatus {
    /// No tree pass has run yet.
    #[default]
    NotBuilt,
    /// Every joint was resolved and wired.
    Complete,
    /// The pass stopped at an unresolved link reference. Joints before the
    /// failing one are wired; it and all later joints are unresolved.
    Aborted(TreeError),
}

/// A robot model: links, joints and the distinguished base link.
#[derive(Clone, Debug, Default)]
pub struct Model {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    link_by_name: HashMap<String, LinkId>,
    joint_by_name: HashMap<String, JointId>,
    base_link: Option<LinkId>,
    tree_status: TreeStatus,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while the model holds neither links nor joints.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.joints.is_empty()
    }

    /// Root of the kinematic tree: the first link registered.
    pub fn base_link(&self) -> Option<LinkId> {
        self.base_link
    }

    pub fn tree_status(&self) -> &TreeStatus {
        &self.tree_status
    }

    pub(crate) fn set_tree_status(&mut self, status: TreeStatus) {
        self.tree_status = status;
    }

    /// Registers a link. The first link ever registered becomes the base link.
    pub fn add_link(&mut self, link: Link) -> Result<LinkId, ModelError> {
        if self.link_by_name.contains_key(link.name()) {
            return Err(ModelError::DuplicateLink(link.name().to_string()));
        }
        let id = LinkId(self.links.len());
        self.link_by_name.insert(link.name().to_string(), id);
        self.links.push(link);
        if self.base_link.is_none() {
            self.base_link = Some(id);
        }
        Ok(id)
    }

    pub fn add_joint(&mut self, joint: Joint) -> Result<JointId, ModelError> {
        if self.joint_by_name.contains_key(joint.name()) {
            return Err(ModelError::DuplicateJoint(joint.name().to_string()));
        }
        let id = JointId(self.joints.len());
        self.joint_by_name.insert(joint.name().to_string(), id);
        self.joints.push(joint);
        Ok(id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub(crate) fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.get_mut(id.0)
    }

    pub fn link_id(&self, name: &str) -> Option<LinkId> {
        self.link_by_name.get(name).copied()
    }

    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.link_id(name).and_then(|id| self.link(id))
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    pub(crate) fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.0)
    }

    pub fn joint_id(&self, name: &str) -> Option<JointId> {
        self.joint_by_name.get(name).copied()
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joint_id(name).and_then(|id| self.joint(id))
    }

    /// Links in registration order.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter().enumerate().map(|(i, l)| (LinkId(i), l))
    }

    /// Joints in registration order.
    pub fn joints(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter().enumerate().map(|(i, j)| (JointId(i), j))
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Parent → child graph over resolved joints, weighted by joint.
    pub fn link_graph(&self) -> DiGraphMap<LinkId, JointId> {
        let mut graph = DiGraphMap::new();
        for (id, _) in self.links() {
            graph.add_node(id);
        }
        for (id, joint) in self.joints() {
            if let (Some(parent), Some(child)) = (joint.parent(), joint.child()) {
                graph.add_edge(parent, child, id);
            }
        }
        graph
    }

    /// Links reachable from the base link through resolved joints, in BFS
    /// order starting with the base link itself.
    pub fn reachable_from_base(&self) -> Vec<LinkId> {
        let Some(base) = self.base_link else {
            return Vec::new();
        };
        let graph = self.link_graph();
        let mut bfs = Bfs::new(&graph, base);
        let mut visited = Vec::new();
        while let Some(id) = bfs.next(&graph) {
            visited.push(id);
        }
        visited
    }

    /// Joint handles in the order given by `names`, e.g. a joint ordering
    /// fetched from a parameter service. Unknown names are skipped.
    pub fn ordered_joints<S: AsRef<str>>(&self, names: &[S]) -> Vec<JointId> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let id = self.joint_id(name);
                if id.is_none() {
                    warn!(model = %self.name, joint = name, "ordered joint not present in model");
                }
                id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ComponentId;

    fn link(name: &str) -> Link {
        Link::new(name, "m", ComponentId(0), 1.0)
    }

    #[test]
    fn first_link_becomes_base() {
        let mut model = Model::new("m");
        let a = model.add_link(link("a")).unwrap();
        model.add_link(link("b")).unwrap();
        assert_eq!(model.base_link(), Some(a));
    }

    #[test]
    fn duplicate_link_is_rejected_and_base_kept() {
        let mut model = Model::new("m");
        let a = model.add_link(link("a")).unwrap();
        assert_eq!(
            model.add_link(link("a")).unwrap_err(),
            ModelError::DuplicateLink("a".into())
        );
        assert_eq!(model.link_count(), 1);
        assert_eq!(model.base_link(), Some(a));
    }

    #[test]
    fn empty_model_reaches_nothing() {
        let model = Model::new("m");
        assert!(model.reachable_from_base().is_empty());
        assert_eq!(model.tree_status(), &TreeStatus::NotBuilt);
    }
}
