//! Error types for model construction.

use thiserror::Error;

use crate::scene::ComponentId;

/// Errors reported by a [`Scene`](crate::scene::Scene) implementation.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    /// The handle does not refer to a live component.
    #[error("unknown scene component {0}")]
    UnknownComponent(ComponentId),

    /// Attaching would make a component its own ancestor.
    #[error("attaching {component} to {target} would create an attachment cycle")]
    AttachmentCycle {
        /// The component being attached.
        component: ComponentId,
        /// The requested attach parent.
        target: ComponentId,
    },

    /// The operation requires a constraint component.
    #[error("component {0} is not a constraint")]
    NotAConstraint(ComponentId),

    /// The scene refused to create a component.
    #[error("scene rejected {name}: {reason}")]
    Rejected {
        /// Name of the body or constraint.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A link or joint could not be built from its description.
///
/// These are recovered per item: the builder logs them and moves on.
#[derive(Debug, Error, PartialEq)]
pub enum CreationError {
    /// The description has an empty name.
    #[error("{kind} description has an empty name")]
    EmptyName {
        /// `"link"` or `"joint"`.
        kind: &'static str,
    },

    /// The collision shape is unusable.
    #[error("link {link}: invalid shape: {reason}")]
    InvalidShape {
        /// Link name.
        link: String,
        /// What is wrong with the shape.
        reason: String,
    },

    /// Mass or inertia is unusable.
    #[error("link {link}: invalid inertial: {reason}")]
    InvalidInertial {
        /// Link name.
        link: String,
        /// What is wrong with the inertial data.
        reason: String,
    },

    /// A pose contains NaN or infinite components.
    #[error("{name}: pose is not finite")]
    NonFinitePose {
        /// Link or joint name.
        name: String,
    },

    /// The joint is not connectable as declared.
    #[error("joint {joint}: {reason}")]
    InvalidJoint {
        /// Joint name.
        joint: String,
        /// What is wrong with the joint.
        reason: String,
    },

    /// The scene could not create the component.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl CreationError {
    pub fn invalid_shape(link: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            link: link.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_inertial(link: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInertial {
            link: link.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_joint(joint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidJoint {
            joint: joint.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by [`Model`](crate::model::Model) bookkeeping.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Duplicate link name.
    #[error("duplicate link name: {0}")]
    DuplicateLink(String),

    /// Duplicate joint name.
    #[error("duplicate joint name: {0}")]
    DuplicateJoint(String),

    /// `set_parent_child` was called on an already resolved joint.
    #[error("joint {0} is already resolved")]
    JointAlreadyResolved(String),

    /// The link already has an attach parent.
    #[error("link {0} is already attached to a parent")]
    AlreadyAttached(String),
}

/// Fatal failures of the kinematic tree pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A joint names a parent link that does not exist.
    #[error("joint {joint}: parent link {link} not found")]
    MissingParent {
        /// Joint being resolved.
        joint: String,
        /// The missing link name.
        link: String,
    },

    /// A joint names a child link that does not exist.
    #[error("joint {joint}: child link {link} not found")]
    MissingChild {
        /// Joint being resolved.
        joint: String,
        /// The missing link name.
        link: String,
    },
}

impl TreeError {
    /// Name of the link that failed to resolve.
    pub fn missing_link(&self) -> &str {
        match self {
            Self::MissingParent { link, .. } | Self::MissingChild { link, .. } => link,
        }
    }

    /// Name of the joint whose reference failed to resolve.
    pub fn joint(&self) -> &str {
        match self {
            Self::MissingParent { joint, .. } | Self::MissingChild { joint, .. } => joint,
        }
    }
}

/// Errors from the remote parameter service exchange.
#[derive(Debug, Error)]
pub enum ParamError {
    /// The transport could not deliver the request or receive a reply.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service reported failure.
    #[error("service {service} returned failure")]
    ServiceFailed {
        /// Service that was called.
        service: String,
    },

    /// The response did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The parameter value is not a JSON list of strings.
    #[error("parameter {key} is not a list of joint names: {source}")]
    InvalidValue {
        /// Parameter key.
        key: String,
        /// JSON decoding error.
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_error_names_missing_link() {
        let err = TreeError::MissingParent {
            joint: "elbow".into(),
            link: "upper_arm".into(),
        };
        assert_eq!(err.missing_link(), "upper_arm");
        assert!(err.to_string().contains("upper_arm"));
        assert!(err.to_string().contains("elbow"));
    }

    #[test]
    fn creation_error_display() {
        let err = CreationError::invalid_shape("base", "radius must be positive");
        assert!(err.to_string().contains("base"));
        assert!(err.to_string().contains("radius"));
    }
}
