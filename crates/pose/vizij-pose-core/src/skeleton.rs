//! Rigid joint hierarchy stored as a flat arena.
//!
//! Joints are addressed by [`JointIndex`]; parents always precede their
//! children in the arena, so a single forward pass visits the hierarchy
//! top-down. Subtrees are precomputed once at construction so per-frame code
//! never walks parent/child links.

use hashbrown::HashMap;
use nalgebra::{Isometry3, Translation3};
use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::math::{quat_xyzw, vec3};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointIndex(pub u32);

impl JointIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Authoring form of a joint: parent by name, rest pose relative to parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub position: [f32; 3],
    /// Quaternion (x, y, z, w)
    #[serde(default = "identity_xyzw")]
    pub rotation: [f32; 4],
}

fn identity_xyzw() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl JointDef {
    pub fn new(name: &str, parent: Option<&str>, position: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            position,
            rotation: identity_xyzw(),
        }
    }

    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Joint {
    pub name: String,
    pub parent: Option<JointIndex>,
    /// Rest transform relative to the parent joint.
    pub rest: Isometry3<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    joints: Vec<Joint>,
    children: Vec<Vec<JointIndex>>,
    /// Inclusive depth-first pre-order subtree of every joint.
    subtrees: Vec<Vec<JointIndex>>,
    by_name: HashMap<String, JointIndex>,
}

impl Skeleton {
    /// Build from authoring definitions. Fails on duplicate names or a parent
    /// that is unknown or declared after its child.
    pub fn from_defs(defs: &[JointDef]) -> Result<Self, SetupError> {
        let mut joints = Vec::with_capacity(defs.len());
        let mut by_name: HashMap<String, JointIndex> = HashMap::with_capacity(defs.len());

        for (i, def) in defs.iter().enumerate() {
            if by_name.contains_key(&def.name) {
                return Err(SetupError::DuplicateJoint {
                    name: def.name.clone(),
                });
            }
            let parent = match &def.parent {
                Some(parent) => Some(*by_name.get(parent).ok_or_else(|| {
                    SetupError::InvalidParent {
                        joint: def.name.clone(),
                        parent: parent.clone(),
                    }
                })?),
                None => None,
            };
            let rest = Isometry3::from_parts(
                Translation3::from(vec3(def.position)),
                quat_xyzw(def.rotation),
            );
            joints.push(Joint {
                name: def.name.clone(),
                parent,
                rest,
            });
            by_name.insert(def.name.clone(), JointIndex(i as u32));
        }

        let mut children = vec![Vec::new(); joints.len()];
        for (i, joint) in joints.iter().enumerate() {
            if let Some(p) = joint.parent {
                children[p.index()].push(JointIndex(i as u32));
            }
        }

        let mut skeleton = Skeleton {
            joints,
            children,
            subtrees: Vec::new(),
            by_name,
        };
        skeleton.subtrees = (0..skeleton.joints.len())
            .map(|i| skeleton.walk_subtree(JointIndex(i as u32)))
            .collect();
        Ok(skeleton)
    }

    fn walk_subtree(&self, root: JointIndex) -> Vec<JointIndex> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(j) = stack.pop() {
            out.push(j);
            // Reverse so the first child is visited first.
            stack.extend(self.children[j.index()].iter().rev().copied());
        }
        out
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: JointIndex) -> Option<&Joint> {
        self.joints.get(index.index())
    }

    pub fn name(&self, index: JointIndex) -> &str {
        &self.joints[index.index()].name
    }

    pub fn find(&self, name: &str) -> Option<JointIndex> {
        self.by_name.get(name).copied()
    }

    /// Like [`find`](Self::find) but reports a missing joint as a setup error.
    pub fn index_of(&self, name: &str) -> Result<JointIndex, SetupError> {
        self.find(name).ok_or_else(|| SetupError::UnknownJoint {
            name: name.to_string(),
        })
    }

    pub fn parent(&self, index: JointIndex) -> Option<JointIndex> {
        self.joints[index.index()].parent
    }

    pub fn children(&self, index: JointIndex) -> &[JointIndex] {
        &self.children[index.index()]
    }

    /// `index` and all of its descendants, depth-first pre-order.
    pub fn subtree(&self, index: JointIndex) -> &[JointIndex] {
        &self.subtrees[index.index()]
    }

    /// True when `descendant` lies strictly below `ancestor`.
    pub fn is_ancestor(&self, ancestor: JointIndex, descendant: JointIndex) -> bool {
        let mut cur = self.parent(descendant);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Flatten the hierarchy under `root` into a dense table, excluding the
    /// root itself.
    pub fn flatten(&self, root: JointIndex) -> JointTable {
        let joints: Vec<JointIndex> = self.subtree(root)[1..].to_vec();
        let slots = joints
            .iter()
            .enumerate()
            .map(|(slot, j)| (*j, slot))
            .collect();
        JointTable {
            root,
            joints,
            slots,
        }
    }
}

/// Dense index space over the joints below a root, in depth-first pre-order.
/// Slot `i` of a bone weight vector refers to `joints()[i]`.
#[derive(Clone, Debug)]
pub struct JointTable {
    root: JointIndex,
    joints: Vec<JointIndex>,
    slots: HashMap<JointIndex, usize>,
}

impl JointTable {
    pub fn root(&self) -> JointIndex {
        self.root
    }

    pub fn joints(&self) -> &[JointIndex] {
        &self.joints
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn slot_of(&self, joint: JointIndex) -> Option<usize> {
        self.slots.get(&joint).copied()
    }
}
