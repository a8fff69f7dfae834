//! Single-joint look-at constraint.
//!
//! Rotates one joint so that a fixed local axis points at a scene target. The
//! correction angle is clamped to `[min_angle, max_angle]` (degrees) and
//! applied as a world-space delta on the left of the current rotation. The
//! joint's position is never written.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::binding::{Binder, SceneHandle, StreamHandle};
use crate::config::LookAtConfig;
use crate::error::{FrameError, SetupError};
use crate::job::PoseJob;
use crate::math::{angle_between, any_orthogonal, is_finite_quat, EPSILON};
use crate::stream::PoseStream;

#[derive(Clone, Debug)]
pub struct LookAt {
    joint: StreamHandle,
    target: SceneHandle,
    axis: Unit<Vector3<f32>>,
    min_angle: f32,
    max_angle: f32,
}

impl LookAt {
    /// Angle limits may be given in either order but must be finite; the axis
    /// is normalized. Handles are not checked, see [`LookAt::from_handles`].
    pub(crate) fn new(
        joint: StreamHandle,
        target: SceneHandle,
        axis: Vector3<f32>,
        min_angle: f32,
        max_angle: f32,
    ) -> Result<Self, SetupError> {
        if !axis.iter().all(|c| c.is_finite()) {
            return Err(SetupError::InvalidAxis);
        }
        let axis = Unit::try_new(axis, EPSILON).ok_or(SetupError::InvalidAxis)?;
        if !min_angle.is_finite() || !max_angle.is_finite() {
            return Err(SetupError::InvalidAngleLimits {
                min: min_angle,
                max: max_angle,
            });
        }
        Ok(Self {
            joint,
            target,
            axis,
            min_angle: min_angle.min(max_angle),
            max_angle: min_angle.max(max_angle),
        })
    }

    /// Build from already-resolved handles, checking both against `binder`.
    pub fn from_handles<B: Binder + ?Sized>(
        binder: &B,
        joint: StreamHandle,
        target: SceneHandle,
        axis: Vector3<f32>,
        min_angle: f32,
        max_angle: f32,
    ) -> Result<Self, SetupError> {
        let joint = binder.check_stream_handle(joint)?;
        let target = binder.check_scene_handle(target)?;
        Self::new(joint, target, axis, min_angle, max_angle)
    }

    pub fn bind<B: Binder + ?Sized>(binder: &B, cfg: &LookAtConfig) -> Result<Self, SetupError> {
        let joint = binder.bind_stream_joint(&cfg.joint)?;
        let target = binder.bind_scene_object(&cfg.target)?;
        let node = Self::new(
            joint,
            target,
            cfg.axis.vector(),
            cfg.min_angle,
            cfg.max_angle,
        )?;
        log::debug!(
            "look_at bound: joint='{}' target='{}' limits=[{}, {}]",
            cfg.joint,
            cfg.target,
            node.min_angle,
            node.max_angle
        );
        Ok(node)
    }

    pub fn joint(&self) -> StreamHandle {
        self.joint
    }

    pub fn target(&self) -> SceneHandle {
        self.target
    }

    pub fn axis(&self) -> Vector3<f32> {
        self.axis.into_inner()
    }

    /// `(min, max)` in degrees, `min <= max`.
    pub fn limits(&self) -> (f32, f32) {
        (self.min_angle, self.max_angle)
    }

    pub fn solve(&self, stream: &mut dyn PoseStream) {
        let rotation = stream.rotation(self.joint);
        let solved = look_at_rotation(
            &rotation,
            &stream.position(self.joint),
            &stream.scene_position(self.target),
            &self.axis,
            self.min_angle,
            self.max_angle,
        );
        if is_finite_quat(&solved) {
            stream.set_rotation(self.joint, solved);
        }
    }
}

/// Global rotation for a joint at `position` with current global `rotation`
/// so that local `axis` turns toward `target`, by at most the clamped angle.
///
/// Limits may come in either order. A target at the joint, one already along
/// the axis, or a NaN limit leaves the rotation unchanged. A target exactly
/// behind the axis turns about an arbitrary perpendicular axis.
pub fn look_at_rotation(
    rotation: &UnitQuaternion<f32>,
    position: &Vector3<f32>,
    target: &Vector3<f32>,
    axis: &Unit<Vector3<f32>>,
    min_angle: f32,
    max_angle: f32,
) -> UnitQuaternion<f32> {
    if min_angle.is_nan() || max_angle.is_nan() {
        log::trace!("look_at: NaN angle limit, no correction");
        return *rotation;
    }
    let (lo, hi) = (min_angle.min(max_angle), min_angle.max(max_angle));

    let from_dir = rotation * axis.into_inner();
    let to_dir = target - position;
    if to_dir.norm_squared() <= EPSILON * EPSILON {
        log::trace!("look_at: target coincides with joint, no correction");
        return *rotation;
    }

    let angle = angle_between(&from_dir, &to_dir)
        .to_degrees()
        .clamp(lo, hi);

    let rotation_axis = match Unit::try_new(from_dir.cross(&to_dir), EPSILON) {
        Some(axis) => axis,
        None if from_dir.dot(&to_dir) < 0.0 => {
            log::trace!("look_at: target opposite the axis, using perpendicular axis");
            any_orthogonal(&from_dir)
        }
        None => return *rotation,
    };

    UnitQuaternion::from_axis_angle(&rotation_axis, angle.to_radians()) * rotation
}

impl PoseJob for LookAt {
    fn process_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        self.solve(stream);
        Ok(())
    }
}
