//! Serializable node configurations.
//!
//! Joints and scene objects are referenced by name and resolved through a
//! [`Binder`](crate::binding::Binder) when the node is built. Out-of-range
//! values (reversed angle limits, weights outside `[0, 1]`) are normalized at
//! bind time instead of rejected.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Named local axes. Forward is +Z, up is +Y, right is +X.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Forward,
    Back,
    Up,
    Down,
    Left,
    Right,
}

impl Axis {
    pub fn vector(self) -> Vector3<f32> {
        match self {
            Axis::Forward => Vector3::new(0.0, 0.0, 1.0),
            Axis::Back => Vector3::new(0.0, 0.0, -1.0),
            Axis::Up => Vector3::new(0.0, 1.0, 0.0),
            Axis::Down => Vector3::new(0.0, -1.0, 0.0),
            Axis::Left => Vector3::new(-1.0, 0.0, 0.0),
            Axis::Right => Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Either a named axis or an explicit vector in the joint's local frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Named(Axis),
    Vector([f32; 3]),
}

impl Default for AxisSpec {
    fn default() -> Self {
        AxisSpec::Named(Axis::Forward)
    }
}

impl AxisSpec {
    pub fn vector(self) -> Vector3<f32> {
        match self {
            AxisSpec::Named(axis) => axis.vector(),
            AxisSpec::Vector(v) => Vector3::new(v[0], v[1], v[2]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookAtConfig {
    pub joint: String,
    pub target: String,
    #[serde(default)]
    pub axis: AxisSpec,
    /// Degrees
    #[serde(default = "default_min_angle")]
    pub min_angle: f32,
    /// Degrees
    #[serde(default = "default_max_angle")]
    pub max_angle: f32,
}

fn default_min_angle() -> f32 {
    -60.0
}

fn default_max_angle() -> f32 {
    60.0
}

/// Two-bone chain ending at `end`. `mid` defaults to the parent of `end`,
/// `top` to the parent of `mid`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwoBoneIkConfig {
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub mid: Option<String>,
    pub end: String,
    pub goal: String,
}

/// Blend of input streams 0 and 1 over every joint below `root`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixerConfig {
    pub root: String,
    #[serde(default)]
    pub weight: f32,
}

/// Sparse authoring weight applied to `joint` and its whole subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskEntry {
    pub joint: String,
    pub weight: f32,
}

impl MaskEntry {
    pub fn new(joint: &str, weight: f32) -> Self {
        Self {
            joint: joint.to_string(),
            weight,
        }
    }
}

/// Mixer whose per-joint weights start at zero and are driven by `mask`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskedMixerConfig {
    pub root: String,
    #[serde(default = "default_masked_weight")]
    pub weight: f32,
    #[serde(default)]
    pub mask: Vec<MaskEntry>,
}

fn default_masked_weight() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    LookAt(LookAtConfig),
    TwoBoneIk(TwoBoneIkConfig),
    Mixer(MixerConfig),
    MaskedMixer(MaskedMixerConfig),
}

/// Parse a single node configuration from JSON.
pub fn parse_node_config(json: &str) -> Result<NodeConfig, SetupError> {
    serde_json::from_str(json).map_err(|e| SetupError::Parse(e.to_string()))
}

/// Parse a list of node configurations from a JSON array.
pub fn parse_node_configs(json: &str) -> Result<Vec<NodeConfig>, SetupError> {
    serde_json::from_str(json).map_err(|e| SetupError::Parse(e.to_string()))
}
