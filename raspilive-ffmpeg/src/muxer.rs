//! The ffmpeg muxer process.
//!
//! A [`Muxer`] is single use: [`Muxer::mux`] launches ffmpeg reading video
//! from the given stream, [`Muxer::wait`] collects its exit status once.

use crate::error::{MuxError, MuxResult};
use crate::format::Format;
use crate::options::MuxOptions;
use crate::process::{Invocation, Launcher, Process, ProcessIo};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tracing as log;

pub const FFMPEG_PROGRAM: &str = "ffmpeg";

/// Exit code ffmpeg reports when it is cut off mid-stream, e.g. when the
/// camera closes its end of the pipe. Treated as a clean shutdown.
pub const EARLY_EXIT_CODE: i32 = 255;

enum State {
    Idle,
    Running(Box<dyn Process>),
    Exited,
}

pub struct Muxer<F: Format> {
    directory: PathBuf,
    options: MuxOptions,
    format: F,
    program: String,
    launcher: Arc<dyn Launcher>,
    invocation: Option<Invocation>,
    state: State,
}

impl<F: Format> Muxer<F> {
    pub fn new(
        directory: impl Into<PathBuf>,
        options: MuxOptions,
        format: F,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            directory: directory.into(),
            options,
            format,
            program: FFMPEG_PROGRAM.to_string(),
            launcher,
            invocation: None,
            state: State::Idle,
        }
    }

    /// Use a different transcoder binary name or path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn options(&self) -> &MuxOptions {
        &self.options
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.format.manifest_path(&self.directory)
    }

    /// Build the invocation without launching anything.
    pub fn invocation(&self) -> MuxResult<Invocation> {
        self.format.validate(&self.options)?;
        let args = self.format.build_args(&self.directory, &self.options)?;
        Ok(Invocation::new(self.program.clone(), args))
    }

    /// Launch ffmpeg with `video` attached to its stdin.
    ///
    /// Returns as soon as the process exists. Invalid options are reported
    /// before anything is spawned.
    pub fn mux(&mut self, video: Stdio) -> MuxResult<()> {
        if !matches!(self.state, State::Idle) {
            return Err(MuxError::AlreadyStarted);
        }

        let invocation = self.invocation()?;
        log::info!("Starting {} muxer: {}", self.format.name(), invocation);

        let process = self
            .launcher
            .launch(&invocation, ProcessIo::reading(video))
            .map_err(|source| MuxError::LaunchFailed {
                command: invocation.to_string(),
                source,
            })?;

        log::debug!("{} muxer running (pid {:?})", self.format.name(), process.id());

        self.invocation = Some(invocation);
        self.state = State::Running(process);
        Ok(())
    }

    /// Wait for ffmpeg to finish.
    ///
    /// Terminal state is consumed: a second call fails even if the first
    /// one did.
    pub async fn wait(&mut self) -> MuxResult<()> {
        let process = match &mut self.state {
            State::Idle => return Err(MuxError::NotStarted),
            State::Exited => return Err(MuxError::AlreadyWaited),
            State::Running(process) => process,
        };

        let result = process.wait().await;
        self.state = State::Exited;

        check_exit(result?, &self.command_line())
    }

    /// The exact command line launched, empty until [`Muxer::mux`] succeeds.
    /// Diagnostic only.
    pub fn command_line(&self) -> String {
        self.invocation
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.state, State::Idle)
    }
}

impl<F: Format> fmt::Display for Muxer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

impl<F: Format + fmt::Debug> fmt::Debug for Muxer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Muxer")
            .field("directory", &self.directory)
            .field("options", &self.options)
            .field("format", &self.format)
            .field("program", &self.program)
            .field("started", &self.is_started())
            .finish()
    }
}

/// Map an ffmpeg exit status onto the muxer result.
pub fn check_exit(status: ExitStatus, command: &str) -> MuxResult<()> {
    if status.success() {
        log::info!("ffmpeg finished: {}", command);
        return Ok(());
    }

    if status.code() == Some(EARLY_EXIT_CODE) {
        log::info!("ffmpeg exited early ({}), input closed", status);
        return Ok(());
    }

    log::error!("ffmpeg failed with {}: {}", status, command);
    Err(MuxError::TranscoderExit {
        status,
        command: command.to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    fn exited(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn test_success() {
        assert!(check_exit(exited(0), "ffmpeg").is_ok());
    }

    #[test]
    fn test_early_exit_is_success() {
        assert!(check_exit(exited(255), "ffmpeg").is_ok());
    }

    #[test]
    fn test_failure_carries_code_and_command() {
        let err = check_exit(exited(1), "ffmpeg -i pipe:0").unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
        match err {
            MuxError::TranscoderExit { command, .. } => assert_eq!(command, "ffmpeg -i pipe:0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_signal_is_failure() {
        // SIGKILL, no exit code
        let err = check_exit(ExitStatus::from_raw(9), "ffmpeg").unwrap_err();
        assert_eq!(err.exit_code(), None);
        assert!(matches!(err, MuxError::TranscoderExit { .. }));
    }
}
