//! Camera to muxer pipeline.

use crate::camera::VideoSource;
use crate::error::{StreamError, StreamResult};
use raspilive_ffmpeg::{Format, Muxer};
use tracing as log;

/// Pipe video from `camera` into `muxer` until the camera stops.
///
/// The muxer is launched first so it is already reading when the first
/// frames arrive. Both sides are always waited on once started. When only
/// one side fails its error is returned; when both fail the camera error
/// comes first in [`StreamError::PipelineFailed`].
pub async fn stream_video<F: Format>(
    camera: &mut dyn VideoSource,
    muxer: &mut Muxer<F>,
) -> StreamResult<()> {
    log::info!("Processing {}", muxer.format().name().to_uppercase());

    let video = camera.take_video()?;
    muxer.mux(video)?;

    // A camera that fails to start drops its end of the pipe, so ffmpeg
    // still sees EOF and exits.
    let camera_result = match camera.start() {
        Ok(()) => camera.wait().await,
        Err(e) => Err(e),
    };
    let muxer_result = muxer.wait().await;

    match (camera_result, muxer_result) {
        (Ok(()), Ok(())) => {
            log::info!("Stream finished");
            Ok(())
        }
        (Err(camera), Ok(())) => Err(camera),
        (Ok(()), Err(muxer)) => Err(muxer.into()),
        (Err(camera), Err(muxer)) => {
            log::error!("Camera and muxer both failed");
            Err(StreamError::PipelineFailed {
                camera: Box::new(camera),
                muxer: Box::new(muxer),
            })
        }
    }
}
