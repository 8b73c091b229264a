use raspilive_ffmpeg::MuxError;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Muxer error: {0}")]
    MuxError(#[from] MuxError),

    #[error("Camera not started")]
    CameraNotStarted,

    #[error("Camera already started")]
    CameraAlreadyStarted,

    #[error("Camera already waited")]
    CameraAlreadyWaited,

    #[error("Camera video stream already taken")]
    VideoTaken,

    #[error("Failed to launch camera `{command}`: {source}")]
    CameraLaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Camera exited with {status}: {command}")]
    CameraExit { status: ExitStatus, command: String },

    /// Both halves of the pipeline failed. The camera error came first.
    #[error("Camera failed ({camera}) and muxer failed ({muxer})")]
    PipelineFailed {
        camera: Box<StreamError>,
        muxer: Box<MuxError>,
    },

    #[error("File server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type StreamResult<T> = Result<T, StreamError>;
