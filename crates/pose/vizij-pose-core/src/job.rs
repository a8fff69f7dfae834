//! Two-phase per-frame evaluation contract.

use crate::error::FrameError;
use crate::stream::PoseStream;

/// A pose node evaluated once per frame. The host calls
/// [`process_root_motion`](PoseJob::process_root_motion) before
/// [`process_pose`](PoseJob::process_pose) for the same stream; [`evaluate`]
/// does both in order.
///
/// Implementations hold only setup-time bindings and parameters. Both phases
/// must leave the stream untouched when returning an error.
pub trait PoseJob {
    fn process_root_motion(&self, _stream: &mut dyn PoseStream) -> Result<(), FrameError> {
        Ok(())
    }

    fn process_pose(&self, stream: &mut dyn PoseStream) -> Result<(), FrameError>;
}

/// Run both phases of `job` against `stream`.
pub fn evaluate<J: PoseJob + ?Sized>(
    job: &J,
    stream: &mut dyn PoseStream,
) -> Result<(), FrameError> {
    let result = job
        .process_root_motion(stream)
        .and_then(|()| job.process_pose(stream));
    if let Err(err) = &result {
        log::warn!("pose frame skipped: {err}");
    }
    result
}
