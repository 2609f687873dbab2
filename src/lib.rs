//! # kinematic-assembly
//!
//! Builds an articulated robot model from a flat, name-based description and
//! wires the constraints a physics engine needs to simulate it.
//!
//! A [`ModelDescription`] lists links and joints that refer to each other by
//! name. [`ModelBuilder::load`] turns it into a [`Model`] in two phases: every
//! link and joint is created first, then the [`KinematicTreeBuilder`]
//! resolves the names, positions each joint's constraint and attaches the
//! bodies to one another. The engine itself sits behind the [`Scene`] trait;
//! [`SceneGraph`] is an in-memory implementation.
//!
//! ```
//! use glam::Vec3;
//! use kinematic_assembly::{
//!     JointDescription, JointType, LinkDescription, Model, ModelBuilder, ModelDescription,
//!     Pose, SceneGraph, ShapePrimitive,
//! };
//!
//! let description = ModelDescription::new("arm")
//!     .with_link(LinkDescription::new("base", ShapePrimitive::Box(Vec3::splat(0.2))))
//!     .with_link(
//!         LinkDescription::new("forearm", ShapePrimitive::Capsule { radius: 0.05, height: 0.4 })
//!             .at(Pose::from_position(Vec3::new(0.0, 0.5, 0.0))),
//!     )
//!     .with_joint(JointDescription::new("elbow", "base", "forearm", JointType::Hinge));
//!
//! let mut scene = SceneGraph::new();
//! let mut model = Model::new("arm");
//! ModelBuilder::default().load(&mut scene, &description, Some(&mut model));
//!
//! assert_eq!(model.base_link(), model.link_id("base"));
//! assert!(model.link_by_name("forearm").unwrap().is_attached_to_parent());
//! ```

pub mod builder;
pub mod description;
pub mod error;
pub mod factory;
pub mod joint;
pub mod joint_config_client;
pub mod link;
pub mod model;
pub mod pose;
pub mod scene;
pub mod scene_graph;
pub mod tree;

pub use builder::*;
pub use description::*;
pub use error::*;
pub use factory::*;
pub use joint::*;
pub use joint_config_client::*;
pub use link::*;
pub use model::*;
pub use pose::*;
pub use scene::*;
pub use scene_graph::*;
pub use tree::*;
