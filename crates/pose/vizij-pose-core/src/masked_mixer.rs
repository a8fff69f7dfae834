//! Mixer driven by a hierarchical mask.
//!
//! Bone weights start at zero; only joints covered by a mask entry blend
//! toward input 1. The host adjusts entry weights and the global weight
//! between frames and calls [`MaskedMixer::refresh_weights`] before
//! evaluating the frame.

use crate::binding::Binder;
use crate::config::MaskedMixerConfig;
use crate::error::{FrameError, SetupError};
use crate::job::PoseJob;
use crate::mask::HierarchyMask;
use crate::mixer::{BoneWeights, Mixer};
use crate::stream::PoseStream;

#[derive(Clone, Debug)]
pub struct MaskedMixer {
    mixer: Mixer,
    mask: HierarchyMask,
}

impl MaskedMixer {
    pub fn new(mixer: Mixer, mask: HierarchyMask) -> Result<Self, SetupError> {
        if mask.table_len() != mixer.handles().len() {
            return Err(SetupError::MaskSizeMismatch {
                mask: mask.table_len(),
                mixer: mixer.handles().len(),
            });
        }
        let mut node = Self { mixer, mask };
        node.refresh_weights();
        Ok(node)
    }

    pub fn bind<B: Binder + ?Sized>(
        binder: &B,
        cfg: &MaskedMixerConfig,
    ) -> Result<Self, SetupError> {
        let table = binder.flatten_hierarchy(&cfg.root)?;
        let mask = HierarchyMask::bind(binder.skeleton(), &table, &cfg.mask)?;
        let handles = table.joints().iter().map(|j| (*j).into()).collect();
        let mixer = Mixer::new(handles, BoneWeights::zeros(table.len()), cfg.weight)?;
        log::debug!(
            "masked mixer bound: root='{}' joints={} mask entries={}",
            cfg.root,
            table.len(),
            mask.len()
        );
        Self::new(mixer, mask)
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn mask(&self) -> &HierarchyMask {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut HierarchyMask {
        &mut self.mask
    }

    pub fn weight(&self) -> f32 {
        self.mixer.weight()
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.mixer.set_weight(weight);
    }

    pub fn set_entry_weight(&mut self, entry: usize, weight: f32) -> bool {
        self.mask.set_weight(entry, weight)
    }

    pub fn bone_weights(&self) -> &BoneWeights {
        self.mixer.bone_weights()
    }

    /// Propagate the mask into the mixer's bone weights.
    pub fn refresh_weights(&mut self) {
        // Sizes were checked in `new`, so propagation cannot fail here.
        if let Err(err) = self.mask.propagate(self.mixer.bone_weights_mut()) {
            log::warn!("mask propagation skipped: {err}");
        }
    }
}

impl PoseJob for MaskedMixer {
    fn process_root_motion(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.mixer.blend_root_motion(stream)
    }

    fn process_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.mixer.blend_pose(stream)
    }
}
