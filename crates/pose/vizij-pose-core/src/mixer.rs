//! Weighted two-input pose mixer.
//!
//! Blends input stream 0 toward input stream 1 per joint, using
//! `weight * bone_weights[i]` as the interpolation factor: positions lerp,
//! rotations slerp along the shortest path, both in parent-local space. Root
//! motion velocities are lerped by the global weight alone.

use nalgebra::{UnitQuaternion, Vector3};

use crate::binding::{Binder, StreamHandle};
use crate::config::MixerConfig;
use crate::error::{FrameError, SetupError};
use crate::job::PoseJob;
use crate::math::slerp_shortest;
use crate::stream::PoseStream;

/// Per-joint blend weights, one per mixer handle. Values are clamped to
/// `[0, 1]` on every write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneWeights(Vec<f32>);

impl BoneWeights {
    pub fn filled(len: usize, weight: f32) -> Self {
        Self(vec![clamp_unit(weight); len])
    }

    pub fn zeros(len: usize) -> Self {
        Self::filled(len, 0.0)
    }

    pub fn ones(len: usize) -> Self {
        Self::filled(len, 1.0)
    }

    pub fn from_vec(mut weights: Vec<f32>) -> Self {
        for w in &mut weights {
            *w = clamp_unit(*w);
        }
        Self(weights)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<f32> {
        self.0.get(slot).copied()
    }

    /// Panics if `slot` is out of range.
    pub fn set(&mut self, slot: usize, weight: f32) {
        self.0[slot] = clamp_unit(weight);
    }

    pub fn fill(&mut self, weight: f32) {
        let w = clamp_unit(weight);
        self.0.iter_mut().for_each(|x| *x = w);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// NaN maps to 0 so a bad authoring value freezes the joint at input 0.
#[inline]
pub(crate) fn clamp_unit(w: f32) -> f32 {
    if w.is_nan() {
        0.0
    } else {
        w.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct Mixer {
    handles: Vec<StreamHandle>,
    bone_weights: BoneWeights,
    weight: f32,
}

impl Mixer {
    /// Handles are not checked, see [`Mixer::from_handles`].
    pub(crate) fn new(
        handles: Vec<StreamHandle>,
        bone_weights: BoneWeights,
        weight: f32,
    ) -> Result<Self, SetupError> {
        if handles.len() != bone_weights.len() {
            return Err(SetupError::WeightLengthMismatch {
                handles: handles.len(),
                weights: bone_weights.len(),
            });
        }
        Ok(Self {
            handles,
            bone_weights,
            weight: clamp_unit(weight),
        })
    }

    /// Build from already-resolved handles, checking each against `binder`.
    pub fn from_handles<B: Binder + ?Sized>(
        binder: &B,
        handles: Vec<StreamHandle>,
        bone_weights: BoneWeights,
        weight: f32,
    ) -> Result<Self, SetupError> {
        for &h in &handles {
            binder.check_stream_handle(h)?;
        }
        Self::new(handles, bone_weights, weight)
    }

    /// Every joint below `cfg.root` with all bone weights at 1.
    pub fn bind<B: Binder + ?Sized>(binder: &B, cfg: &MixerConfig) -> Result<Self, SetupError> {
        let table = binder.flatten_hierarchy(&cfg.root)?;
        let handles: Vec<StreamHandle> = table.joints().iter().map(|j| (*j).into()).collect();
        let n = handles.len();
        log::debug!("mixer bound: root='{}' joints={}", cfg.root, n);
        Self::new(handles, BoneWeights::ones(n), cfg.weight)
    }

    pub fn handles(&self) -> &[StreamHandle] {
        &self.handles
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = clamp_unit(weight);
    }

    pub fn bone_weights(&self) -> &BoneWeights {
        &self.bone_weights
    }

    /// Length is fixed at construction; only values can change.
    pub fn bone_weights_mut(&mut self) -> &mut BoneWeights {
        &mut self.bone_weights
    }

    /// Effective interpolation factor for handle `i`.
    #[inline]
    pub fn factor(&self, i: usize) -> f32 {
        clamp_unit(self.weight * self.bone_weights.0[i])
    }

    pub fn blend_root_motion(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        let (velocity, angular_velocity) = {
            let (a, b) = input_pair(stream)?;
            (
                a.velocity().lerp(&b.velocity(), self.weight),
                a.angular_velocity()
                    .lerp(&b.angular_velocity(), self.weight),
            )
        };
        stream.set_velocity(velocity);
        stream.set_angular_velocity(angular_velocity);
        Ok(())
    }

    pub fn blend_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        // Read everything from the inputs first; writes happen only once both
        // inputs are known to exist.
        let blended: Vec<(StreamHandle, Vector3<f32>, UnitQuaternion<f32>)> = {
            let (a, b) = input_pair(stream)?;
            self.handles
                .iter()
                .enumerate()
                .map(|(i, &h)| {
                    let t = self.factor(i);
                    let position = a.local_position(h).lerp(&b.local_position(h), t);
                    let rotation = slerp_shortest(&a.local_rotation(h), &b.local_rotation(h), t);
                    (h, position, rotation)
                })
                .collect()
        };
        stream.set_local_poses(&blended);
        Ok(())
    }
}

fn input_pair(
    stream: &dyn PoseStream,
) -> Result<(&dyn PoseStream, &dyn PoseStream), FrameError> {
    let a = stream
        .input_stream(0)
        .ok_or(FrameError::MissingInput { slot: 0 })?;
    let b = stream
        .input_stream(1)
        .ok_or(FrameError::MissingInput { slot: 1 })?;
    Ok((a, b))
}

impl PoseJob for Mixer {
    fn process_root_motion(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.blend_root_motion(stream)
    }

    fn process_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.blend_pose(stream)
    }
}
