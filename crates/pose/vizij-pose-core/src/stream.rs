//! Pose stream contract and the reference in-memory implementation.
//!
//! A pose stream is the per-frame snapshot solvers read and write: joint
//! transforms addressed by [`StreamHandle`], read-only scene objects addressed
//! by [`SceneHandle`], root-motion velocities, and nested input streams
//! produced upstream in the same frame.
//!
//! [`PoseBuffer`] recomputes global transforms eagerly: every write (local or
//! global) refreshes the globals of the written joint and its subtree before
//! returning, so a read always reflects all earlier writes of the same frame.

use std::sync::Arc;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::binding::{SceneHandle, StreamHandle};
use crate::scene::Scene;
use crate::skeleton::{JointIndex, Skeleton};

pub trait PoseStream {
    /// Global (scene-space) position.
    fn position(&self, joint: StreamHandle) -> Vector3<f32>;
    /// Global (scene-space) rotation.
    fn rotation(&self, joint: StreamHandle) -> UnitQuaternion<f32>;
    /// Position relative to the parent joint.
    fn local_position(&self, joint: StreamHandle) -> Vector3<f32>;
    /// Rotation relative to the parent joint.
    fn local_rotation(&self, joint: StreamHandle) -> UnitQuaternion<f32>;

    fn set_position(&mut self, joint: StreamHandle, position: Vector3<f32>);
    fn set_rotation(&mut self, joint: StreamHandle, rotation: UnitQuaternion<f32>);
    fn set_local_position(&mut self, joint: StreamHandle, position: Vector3<f32>);
    fn set_local_rotation(&mut self, joint: StreamHandle, rotation: UnitQuaternion<f32>);

    /// Write both local fields at once. Implementations that recompute
    /// hierarchy state on write can override this to do it once.
    fn set_local_pose(
        &mut self,
        joint: StreamHandle,
        position: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
    ) {
        self.set_local_position(joint, position);
        self.set_local_rotation(joint, rotation);
    }

    /// Write many local poses. Reads made after this call see every write;
    /// implementations may defer hierarchy updates until the batch is done.
    fn set_local_poses(&mut self, poses: &[(StreamHandle, Vector3<f32>, UnitQuaternion<f32>)]) {
        for &(joint, position, rotation) in poses {
            self.set_local_pose(joint, position, rotation);
        }
    }

    fn scene_position(&self, object: SceneHandle) -> Vector3<f32>;
    fn scene_rotation(&self, object: SceneHandle) -> UnitQuaternion<f32>;

    fn input_count(&self) -> usize;
    fn input_stream(&self, slot: usize) -> Option<&dyn PoseStream>;

    fn velocity(&self) -> Vector3<f32>;
    fn angular_velocity(&self) -> Vector3<f32>;
    fn set_velocity(&mut self, velocity: Vector3<f32>);
    fn set_angular_velocity(&mut self, angular_velocity: Vector3<f32>);
}

/// In-memory pose stream over a [`Skeleton`].
///
/// Handles index directly into the skeleton's arena; a handle bound against a
/// different skeleton is a programming error and panics on access.
#[derive(Clone, Debug)]
pub struct PoseBuffer {
    skeleton: Arc<Skeleton>,
    scene: Arc<Scene>,
    locals: Vec<Isometry3<f32>>,
    globals: Vec<Isometry3<f32>>,
    velocity: Vector3<f32>,
    angular_velocity: Vector3<f32>,
    inputs: Vec<PoseBuffer>,
}

impl PoseBuffer {
    /// Stream holding the skeleton's rest pose, no scene objects, no inputs.
    pub fn from_rest(skeleton: Arc<Skeleton>) -> Self {
        let locals: Vec<Isometry3<f32>> = skeleton.joints().iter().map(|j| j.rest).collect();
        let mut buf = Self {
            globals: locals.clone(),
            locals,
            skeleton,
            scene: Arc::new(Scene::new()),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            inputs: Vec::new(),
        };
        buf.recompute_all();
        buf
    }

    pub fn with_scene(mut self, scene: Arc<Scene>) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<PoseBuffer>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_root_motion(mut self, velocity: Vector3<f32>, angular: Vector3<f32>) -> Self {
        self.velocity = velocity;
        self.angular_velocity = angular;
        self
    }

    pub fn push_input(&mut self, input: PoseBuffer) {
        self.inputs.push(input);
    }

    pub fn input_mut(&mut self, slot: usize) -> Option<&mut PoseBuffer> {
        self.inputs.get_mut(slot)
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    pub fn local(&self, joint: JointIndex) -> &Isometry3<f32> {
        &self.locals[joint.index()]
    }

    pub fn global(&self, joint: JointIndex) -> &Isometry3<f32> {
        &self.globals[joint.index()]
    }

    pub fn set_local(&mut self, joint: JointIndex, local: Isometry3<f32>) {
        self.locals[joint.index()] = local;
        self.recompute_subtree(joint);
    }

    fn parent_global(&self, joint: JointIndex) -> Isometry3<f32> {
        match self.skeleton.parent(joint) {
            Some(p) => self.globals[p.index()],
            None => Isometry3::identity(),
        }
    }

    fn recompute_all(&mut self) {
        // Parents precede children in the arena.
        for i in 0..self.locals.len() {
            let j = JointIndex(i as u32);
            self.globals[i] = self.parent_global(j) * self.locals[i];
        }
    }

    fn recompute_subtree(&mut self, joint: JointIndex) {
        let skeleton = Arc::clone(&self.skeleton);
        for &j in skeleton.subtree(joint) {
            self.globals[j.index()] = self.parent_global(j) * self.locals[j.index()];
        }
    }

    fn set_global(&mut self, joint: JointIndex, global: Isometry3<f32>) {
        let local = self.parent_global(joint).inverse() * global;
        self.set_local(joint, local);
    }
}

impl PoseStream for PoseBuffer {
    fn position(&self, joint: StreamHandle) -> Vector3<f32> {
        self.globals[joint.index()].translation.vector
    }

    fn rotation(&self, joint: StreamHandle) -> UnitQuaternion<f32> {
        self.globals[joint.index()].rotation
    }

    fn local_position(&self, joint: StreamHandle) -> Vector3<f32> {
        self.locals[joint.index()].translation.vector
    }

    fn local_rotation(&self, joint: StreamHandle) -> UnitQuaternion<f32> {
        self.locals[joint.index()].rotation
    }

    fn set_position(&mut self, joint: StreamHandle, position: Vector3<f32>) {
        let rotation = self.globals[joint.index()].rotation;
        self.set_global(
            joint.joint(),
            Isometry3::from_parts(Translation3::from(position), rotation),
        );
    }

    fn set_rotation(&mut self, joint: StreamHandle, rotation: UnitQuaternion<f32>) {
        let translation = self.globals[joint.index()].translation;
        self.set_global(joint.joint(), Isometry3::from_parts(translation, rotation));
    }

    fn set_local_position(&mut self, joint: StreamHandle, position: Vector3<f32>) {
        let rotation = self.locals[joint.index()].rotation;
        self.set_local(
            joint.joint(),
            Isometry3::from_parts(Translation3::from(position), rotation),
        );
    }

    fn set_local_rotation(&mut self, joint: StreamHandle, rotation: UnitQuaternion<f32>) {
        let translation = self.locals[joint.index()].translation;
        self.set_local(joint.joint(), Isometry3::from_parts(translation, rotation));
    }

    fn set_local_pose(
        &mut self,
        joint: StreamHandle,
        position: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
    ) {
        self.set_local(
            joint.joint(),
            Isometry3::from_parts(Translation3::from(position), rotation),
        );
    }

    fn set_local_poses(&mut self, poses: &[(StreamHandle, Vector3<f32>, UnitQuaternion<f32>)]) {
        for &(joint, position, rotation) in poses {
            self.locals[joint.index()] =
                Isometry3::from_parts(Translation3::from(position), rotation);
        }
        self.recompute_all();
    }

    fn scene_position(&self, object: SceneHandle) -> Vector3<f32> {
        self.scene.transform(object).translation.vector
    }

    fn scene_rotation(&self, object: SceneHandle) -> UnitQuaternion<f32> {
        self.scene.transform(object).rotation
    }

    fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn input_stream(&self, slot: usize) -> Option<&dyn PoseStream> {
        self.inputs.get(slot).map(|s| s as &dyn PoseStream)
    }

    fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    fn angular_velocity(&self) -> Vector3<f32> {
        self.angular_velocity
    }

    fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.velocity = velocity;
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vector3<f32>) {
        self.angular_velocity = angular_velocity;
    }
}
