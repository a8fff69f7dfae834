//! Handles and the host binding contract.
//!
//! Handles are small integer keys resolved once at setup and reused every
//! frame. A [`StreamHandle`] addresses a joint inside a pose stream and may be
//! written; a [`SceneHandle`] addresses an external scene object and can only
//! be read (the [`PoseStream`](crate::stream::PoseStream) trait has no setter
//! taking one).

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::skeleton::{JointIndex, JointTable, Skeleton};

/// Read/write reference to a joint of the per-frame pose stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StreamHandle(pub u32);

/// Read-only reference to a scene object (goals, look-at targets).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SceneHandle(pub u32);

impl StreamHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn joint(self) -> JointIndex {
        JointIndex(self.0)
    }
}

impl From<JointIndex> for StreamHandle {
    fn from(j: JointIndex) -> Self {
        StreamHandle(j.0)
    }
}

impl SceneHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Setup-time binding surface a host provides to node constructors.
///
/// Hosts expose their rigid hierarchy as a [`Skeleton`] and resolve scene
/// objects themselves; stream joint binding and hierarchy flattening follow
/// from the skeleton.
pub trait Binder {
    fn skeleton(&self) -> &Skeleton;

    fn bind_scene_object(&self, name: &str) -> Result<SceneHandle, SetupError>;

    fn bind_stream_joint(&self, name: &str) -> Result<StreamHandle, SetupError> {
        self.skeleton().index_of(name).map(StreamHandle::from)
    }

    /// Number of scene objects a [`SceneHandle`] may address.
    fn scene_len(&self) -> usize;

    /// Reject a stream handle that does not address a joint of this skeleton.
    fn check_stream_handle(&self, handle: StreamHandle) -> Result<StreamHandle, SetupError> {
        if handle.index() < self.skeleton().len() {
            Ok(handle)
        } else {
            Err(SetupError::UnboundHandle {
                kind: "stream joint",
                index: handle.0,
            })
        }
    }

    fn check_scene_handle(&self, handle: SceneHandle) -> Result<SceneHandle, SetupError> {
        if handle.index() < self.scene_len() {
            Ok(handle)
        } else {
            Err(SetupError::UnboundHandle {
                kind: "scene object",
                index: handle.0,
            })
        }
    }

    fn flatten_hierarchy(&self, root: &str) -> Result<JointTable, SetupError> {
        let root = self.skeleton().index_of(root)?;
        Ok(self.skeleton().flatten(root))
    }
}
