//! Reference host: a skeleton plus its scene, loadable from JSON.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binding::{Binder, SceneHandle};
use crate::error::SetupError;
use crate::scene::{Scene, SceneObjectDef};
use crate::skeleton::{JointDef, Skeleton};
use crate::stream::PoseBuffer;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigDef {
    pub joints: Vec<JointDef>,
    #[serde(default)]
    pub scene: Vec<SceneObjectDef>,
}

#[derive(Clone, Debug)]
pub struct Rig {
    skeleton: Arc<Skeleton>,
    scene: Arc<Scene>,
}

impl Rig {
    pub fn new(skeleton: Skeleton, scene: Scene) -> Self {
        Self {
            skeleton: Arc::new(skeleton),
            scene: Arc::new(scene),
        }
    }

    pub fn from_def(def: &RigDef) -> Result<Self, SetupError> {
        Ok(Self::new(
            Skeleton::from_defs(&def.joints)?,
            Scene::from_defs(&def.scene)?,
        ))
    }

    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let def: RigDef =
            serde_json::from_str(json).map_err(|e| SetupError::Parse(e.to_string()))?;
        Self::from_def(&def)
    }

    pub fn skeleton_arc(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// Copy-on-write access; streams already handed out keep their snapshot.
    pub fn scene_mut(&mut self) -> &mut Scene {
        Arc::make_mut(&mut self.scene)
    }

    /// A stream at rest pose that sees the current scene.
    pub fn rest_stream(&self) -> PoseBuffer {
        PoseBuffer::from_rest(Arc::clone(&self.skeleton)).with_scene(Arc::clone(&self.scene))
    }
}

impl Binder for Rig {
    fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    fn bind_scene_object(&self, name: &str) -> Result<SceneHandle, SetupError> {
        self.scene
            .find(name)
            .ok_or_else(|| SetupError::UnknownSceneObject {
                name: name.to_string(),
            })
    }

    fn scene_len(&self) -> usize {
        self.scene.len()
    }
}
