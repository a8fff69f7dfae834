//! Closed set of pose node kinds, buildable from [`NodeConfig`].

use crate::binding::Binder;
use crate::config::NodeConfig;
use crate::error::{FrameError, SetupError};
use crate::job::PoseJob;
use crate::look_at::LookAt;
use crate::masked_mixer::MaskedMixer;
use crate::mixer::Mixer;
use crate::stream::PoseStream;
use crate::two_bone_ik::TwoBoneIk;

#[derive(Clone, Debug)]
pub enum PoseNode {
    LookAt(LookAt),
    TwoBoneIk(TwoBoneIk),
    Mixer(Mixer),
    MaskedMixer(MaskedMixer),
}

impl PoseNode {
    pub fn bind<B: Binder + ?Sized>(binder: &B, cfg: &NodeConfig) -> Result<Self, SetupError> {
        Ok(match cfg {
            NodeConfig::LookAt(c) => PoseNode::LookAt(LookAt::bind(binder, c)?),
            NodeConfig::TwoBoneIk(c) => PoseNode::TwoBoneIk(TwoBoneIk::bind(binder, c)?),
            NodeConfig::Mixer(c) => PoseNode::Mixer(Mixer::bind(binder, c)?),
            NodeConfig::MaskedMixer(c) => PoseNode::MaskedMixer(MaskedMixer::bind(binder, c)?),
        })
    }

    /// Bind a list of configs; the first failure aborts the whole set.
    pub fn bind_all<B: Binder + ?Sized>(
        binder: &B,
        cfgs: &[NodeConfig],
    ) -> Result<Vec<Self>, SetupError> {
        cfgs.iter().map(|c| Self::bind(binder, c)).collect()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PoseNode::LookAt(_) => "look_at",
            PoseNode::TwoBoneIk(_) => "two_bone_ik",
            PoseNode::Mixer(_) => "mixer",
            PoseNode::MaskedMixer(_) => "masked_mixer",
        }
    }

    fn job(&self) -> &dyn PoseJob {
        match self {
            PoseNode::LookAt(n) => n,
            PoseNode::TwoBoneIk(n) => n,
            PoseNode::Mixer(n) => n,
            PoseNode::MaskedMixer(n) => n,
        }
    }
}

impl PoseJob for PoseNode {
    fn process_root_motion(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.job().process_root_motion(stream)
    }

    fn process_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.job().process_pose(stream)
    }
}
