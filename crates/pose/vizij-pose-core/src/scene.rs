//! Named scene objects outside the animated skeleton.

use hashbrown::HashMap;
use nalgebra::{Isometry3, Translation3};
use serde::{Deserialize, Serialize};

use crate::binding::SceneHandle;
use crate::error::SetupError;
use crate::math::{quat_xyzw, vec3};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectDef {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Quaternion (x, y, z, w)
    #[serde(default = "identity_xyzw")]
    pub rotation: [f32; 4],
}

fn identity_xyzw() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// Scene-space transforms keyed by name. The host moves objects between
/// frames; solvers only ever read them.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    names: Vec<String>,
    transforms: Vec<Isometry3<f32>>,
    by_name: HashMap<String, SceneHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs(defs: &[SceneObjectDef]) -> Result<Self, SetupError> {
        let mut scene = Scene::new();
        for def in defs {
            if scene.find(&def.name).is_some() {
                return Err(SetupError::DuplicateSceneObject {
                    name: def.name.clone(),
                });
            }
            scene.insert(
                &def.name,
                Isometry3::from_parts(
                    Translation3::from(vec3(def.position)),
                    quat_xyzw(def.rotation),
                ),
            );
        }
        Ok(scene)
    }

    /// Insert or replace an object; returns its handle.
    pub fn insert(&mut self, name: &str, transform: Isometry3<f32>) -> SceneHandle {
        if let Some(h) = self.find(name) {
            self.transforms[h.index()] = transform;
            return h;
        }
        let h = SceneHandle(self.transforms.len() as u32);
        self.names.push(name.to_string());
        self.transforms.push(transform);
        self.by_name.insert(name.to_string(), h);
        h
    }

    pub fn find(&self, name: &str) -> Option<SceneHandle> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, handle: SceneHandle) -> &str {
        &self.names[handle.index()]
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transform(&self, handle: SceneHandle) -> &Isometry3<f32> {
        &self.transforms[handle.index()]
    }

    pub fn set_transform(&mut self, handle: SceneHandle, transform: Isometry3<f32>) {
        self.transforms[handle.index()] = transform;
    }
}
