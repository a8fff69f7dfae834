//! Vizij Pose Core (engine-agnostic)
//!
//! Per-frame skeletal pose solvers: two-bone IK, single-joint look-at, and a
//! two-input pose mixer with hierarchical bone masking. Solvers are immutable
//! bound configurations evaluated against a host-provided [`PoseStream`];
//! [`Rig`] and [`PoseBuffer`] are a reference host for standalone use.

pub mod binding;
pub mod config;
pub mod error;
pub mod job;
pub mod look_at;
pub mod mask;
pub mod masked_mixer;
pub mod math;
pub mod mixer;
pub mod node;
pub mod rig;
pub mod scene;
pub mod skeleton;
pub mod stream;
pub mod two_bone_ik;

// Re-exports for consumers (hosts/adapters)
pub use binding::{Binder, SceneHandle, StreamHandle};
pub use config::{
    parse_node_config, parse_node_configs, Axis, AxisSpec, LookAtConfig, MaskEntry,
    MaskedMixerConfig, MixerConfig, NodeConfig, TwoBoneIkConfig,
};
pub use error::{FrameError, SetupError};
pub use job::{evaluate, PoseJob};
pub use look_at::{look_at_rotation, LookAt};
pub use mask::HierarchyMask;
pub use masked_mixer::MaskedMixer;
pub use mixer::{BoneWeights, Mixer};
pub use node::PoseNode;
pub use rig::{Rig, RigDef};
pub use scene::{Scene, SceneObjectDef};
pub use skeleton::{Joint, JointDef, JointIndex, JointTable, Skeleton};
pub use stream::{PoseBuffer, PoseStream};
pub use two_bone_ik::{triangle_angle, TwoBoneIk};
