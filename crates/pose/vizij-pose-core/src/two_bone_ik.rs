//! Analytic two-bone IK (top / mid / end joints toward a scene goal).
//!
//! The mid joint is bent with the law of cosines so the top-to-end distance
//! matches the top-to-goal distance, then the top joint swings the chain onto
//! the goal direction, and finally the end joint copies the goal rotation.
//! The mid write must land before the top solve reads the end position.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::binding::{Binder, SceneHandle, StreamHandle};
use crate::config::TwoBoneIkConfig;
use crate::error::{FrameError, SetupError};
use crate::job::PoseJob;
use crate::math::{any_orthogonal, is_finite_quat, shortest_arc, EPSILON};
use crate::skeleton::{JointIndex, Skeleton};
use crate::stream::PoseStream;

#[derive(Copy, Clone, Debug)]
pub struct TwoBoneIk {
    top: StreamHandle,
    mid: StreamHandle,
    end: StreamHandle,
    goal: SceneHandle,
}

impl TwoBoneIk {
    pub(crate) fn new(
        top: StreamHandle,
        mid: StreamHandle,
        end: StreamHandle,
        goal: SceneHandle,
    ) -> Self {
        Self {
            top,
            mid,
            end,
            goal,
        }
    }

    /// Build from already-resolved handles. Every handle is checked against
    /// `binder` and the chain must follow its hierarchy.
    pub fn from_handles<B: Binder + ?Sized>(
        binder: &B,
        top: StreamHandle,
        mid: StreamHandle,
        end: StreamHandle,
        goal: SceneHandle,
    ) -> Result<Self, SetupError> {
        for h in [top, mid, end] {
            binder.check_stream_handle(h)?;
        }
        let goal = binder.check_scene_handle(goal)?;
        let skeleton = binder.skeleton();
        ensure_descendant(skeleton, top.joint(), mid.joint())?;
        ensure_descendant(skeleton, mid.joint(), end.joint())?;
        Ok(Self::new(top, mid, end, goal))
    }

    /// Resolve the chain, deriving missing `mid`/`top` from the parents of
    /// `end`, and check that `top > mid > end` in the hierarchy.
    pub fn bind<B: Binder + ?Sized>(
        binder: &B,
        cfg: &TwoBoneIkConfig,
    ) -> Result<Self, SetupError> {
        let skeleton = binder.skeleton();
        let end = skeleton.index_of(&cfg.end)?;
        let mid = match &cfg.mid {
            Some(name) => skeleton.index_of(name)?,
            None => parent_or_err(skeleton, end, "mid")?,
        };
        let top = match &cfg.top {
            Some(name) => skeleton.index_of(name)?,
            None => parent_or_err(skeleton, mid, "top")?,
        };
        ensure_descendant(skeleton, top, mid)?;
        ensure_descendant(skeleton, mid, end)?;

        let goal = binder.bind_scene_object(&cfg.goal)?;
        log::debug!(
            "two_bone_ik bound: top='{}' mid='{}' end='{}' goal='{}'",
            skeleton.name(top),
            skeleton.name(mid),
            skeleton.name(end),
            cfg.goal
        );
        Ok(Self::new(top.into(), mid.into(), end.into(), goal))
    }

    pub fn top(&self) -> StreamHandle {
        self.top
    }

    pub fn mid(&self) -> StreamHandle {
        self.mid
    }

    pub fn end(&self) -> StreamHandle {
        self.end
    }

    pub fn goal(&self) -> SceneHandle {
        self.goal
    }

    pub fn solve(&self, stream: &mut dyn PoseStream) {
        let a_rotation = stream.rotation(self.top);
        let b_rotation = stream.rotation(self.mid);
        let g_rotation = stream.scene_rotation(self.goal);

        let a = stream.position(self.top);
        let b = stream.position(self.mid);
        let c = stream.position(self.end);
        let g = stream.scene_position(self.goal);

        let ab = b - a;
        let bc = c - b;
        let ac = c - a;
        let ag = g - a;

        let current = triangle_angle(ac.norm(), &ab, &bc);
        let desired = triangle_angle(ag.norm(), &ab, &bc);
        let delta = current - desired;

        let bend_axis = Unit::try_new(ab.cross(&bc), EPSILON).unwrap_or_else(|| {
            log::trace!("two_bone_ik: straight chain, bending about a perpendicular axis");
            any_orthogonal(&ab)
        });
        let mid_rotation = UnitQuaternion::from_axis_angle(&bend_axis, delta) * b_rotation;
        if is_finite_quat(&mid_rotation) {
            stream.set_rotation(self.mid, mid_rotation);
        }

        // The mid write moved the end joint.
        let ac = stream.position(self.end) - a;
        let top_rotation = shortest_arc(&ac, &ag) * a_rotation;
        if is_finite_quat(&top_rotation) {
            stream.set_rotation(self.top, top_rotation);
        }

        stream.set_rotation(self.end, g_rotation);
    }
}

fn parent_or_err(
    skeleton: &Skeleton,
    joint: JointIndex,
    missing: &str,
) -> Result<JointIndex, SetupError> {
    skeleton
        .parent(joint)
        .ok_or_else(|| SetupError::MissingAncestor {
            joint: skeleton.name(joint).to_string(),
            missing: missing.to_string(),
        })
}

fn ensure_descendant(
    skeleton: &Skeleton,
    ancestor: JointIndex,
    descendant: JointIndex,
) -> Result<(), SetupError> {
    if skeleton.is_ancestor(ancestor, descendant) {
        Ok(())
    } else {
        Err(SetupError::NotDescendant {
            ancestor: skeleton.name(ancestor).to_string(),
            descendant: skeleton.name(descendant).to_string(),
        })
    }
}

/// Angle (radians) between edges `v1` and `v2` of a triangle whose third
/// side has length `opposite`. The cosine is clamped to `[-1, 1]`, so an
/// unreachable length yields a straight (pi) or folded (0) angle. Returns 0
/// when either edge has zero length.
pub fn triangle_angle(opposite: f32, v1: &Vector3<f32>, v2: &Vector3<f32>) -> f32 {
    let len1 = v1.norm();
    let len2 = v2.norm();
    let denom = 2.0 * len1 * len2;
    if denom <= EPSILON {
        return 0.0;
    }
    let c = ((len1 * len1 + len2 * len2 - opposite * opposite) / denom).clamp(-1.0, 1.0);
    c.acos()
}

impl PoseJob for TwoBoneIk {
    fn process_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.solve(stream);
        Ok(())
    }
}
