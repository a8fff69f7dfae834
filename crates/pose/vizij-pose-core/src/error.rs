//! Error types for pose node setup and per-frame evaluation.

/// Configuration problems detected while binding a node. Node construction
/// aborts on any of these; a node never runs with partial bindings.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SetupError {
    /// Joint name not present in the skeleton
    #[error("joint not found: {name}")]
    UnknownJoint { name: String },

    /// Scene object name not present in the scene
    #[error("scene object not found: {name}")]
    UnknownSceneObject { name: String },

    #[error("duplicate joint name: {name}")]
    DuplicateJoint { name: String },

    #[error("duplicate scene object name: {name}")]
    DuplicateSceneObject { name: String },

    /// Parents must be declared before their children
    #[error("joint '{joint}' references parent '{parent}' which is not declared before it")]
    InvalidParent { joint: String, parent: String },

    /// Two-bone chain derivation walked off the top of the hierarchy
    #[error("joint '{joint}' has no {missing} joint for a two-bone chain")]
    MissingAncestor { joint: String, missing: String },

    #[error("joint '{descendant}' is not a descendant of '{ancestor}'")]
    NotDescendant {
        ancestor: String,
        descendant: String,
    },

    /// Handle built outside a binder that does not address anything in it
    #[error("{kind} handle {index} is not bound")]
    UnboundHandle { kind: &'static str, index: u32 },

    #[error("look-at axis must be non-zero and finite")]
    InvalidAxis,

    #[error("look-at angle limits must be finite, got [{min}, {max}]")]
    InvalidAngleLimits { min: f32, max: f32 },

    #[error("bone weight count {weights} does not match joint handle count {handles}")]
    WeightLengthMismatch { handles: usize, weights: usize },

    /// Mask entry (or one of its descendants) is outside the flattened table
    #[error("mask joint '{name}' is not part of the flattened joint table")]
    MaskJointNotInTable { name: String },

    #[error("mask covers {mask} joints but the mixer blends {mixer}")]
    MaskSizeMismatch { mask: usize, mixer: usize },

    #[error("pose config parse error: {0}")]
    Parse(String),
}

/// Problems a node detects while evaluating a frame. When one of these is
/// returned the stream has not been touched by the failing phase.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    #[error("input stream {slot} is not connected")]
    MissingInput { slot: usize },

    #[error("bone weight vector has {actual} entries, expected {expected}")]
    WeightCountMismatch { expected: usize, actual: usize },
}
