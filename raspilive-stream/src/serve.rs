//! Stream and serve concurrently.

use crate::camera::VideoSource;
use crate::error::StreamResult;
use crate::file_server::FileServer;
use crate::pipeline::stream_video;
use raspilive_ffmpeg::{Format, Muxer};
use tracing as log;

/// Run the camera pipeline and the file server side by side.
///
/// Returns once both finish. The file server normally never does, so in
/// practice this only returns on failure; the first failure ends the session
/// and drops the other half.
pub async fn serve<F: Format>(
    server: FileServer,
    camera: &mut dyn VideoSource,
    muxer: &mut Muxer<F>,
) -> StreamResult<()> {
    let stream = async move {
        stream_video(camera, muxer).await.inspect_err(|e| {
            log::error!("Stream failed: {}", e);
        })
    };

    let files = async move {
        server.run().await.inspect_err(|e| {
            log::error!("File server failed: {}", e);
        })
    };

    tokio::try_join!(stream, files)?;
    Ok(())
}
