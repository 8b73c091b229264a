use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MuxError {
    /// The option set cannot be turned into a transcoder invocation.
    /// Raised before any process exists.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to launch `{command}`: {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Muxer not started")]
    NotStarted,

    #[error("Muxer already started")]
    AlreadyStarted,

    #[error("Muxer already waited")]
    AlreadyWaited,

    #[error("Transcoder exited with {status}: {command}")]
    TranscoderExit { status: ExitStatus, command: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type MuxResult<T> = Result<T, MuxError>;

impl MuxError {
    /// Exit code reported by the transcoder, when it exited on its own.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::TranscoderExit { status, .. } => status.code(),
            _ => None,
        }
    }

    /// Whether the error was raised before a process was launched.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidOptions(_))
    }
}
