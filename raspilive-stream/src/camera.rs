//! Camera sources.
//!
//! A camera produces raw H.264 on a pipe. The read end is handed to the
//! muxer before the camera starts, so nothing written by the camera is lost.

use crate::error::{StreamError, StreamResult};
use async_trait::async_trait;
use raspilive_ffmpeg::{Invocation, Launcher, Process, ProcessIo};
use serde::{Deserialize, Serialize};
use std::io::{PipeReader, PipeWriter};
use std::process::Stdio;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const RASPIVID_PROGRAM: &str = "raspivid";

/// Producer side of the pipeline.
#[async_trait]
pub trait VideoSource: Send {
    /// Hand out the video byte stream. Only available once.
    fn take_video(&mut self) -> StreamResult<Stdio>;

    /// Start producing video without waiting for it to finish.
    fn start(&mut self) -> StreamResult<()>;

    /// Wait until the camera stops producing video.
    async fn wait(&mut self) -> StreamResult<()>;

    /// Command line used to start the camera, empty before start.
    fn command_line(&self) -> String {
        String::new()
    }
}

/// raspivid camera settings. Zero values leave the camera defaults in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaspividOptions {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
}

impl RaspividOptions {
    /// raspivid arguments. Video always goes to stdout and recording never
    /// times out.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-o", "-", "-t", "0"].iter().map(|s| s.to_string()).collect();

        for (flag, value) in [("-w", self.width), ("-h", self.height), ("-fps", self.fps)] {
            if value != 0 {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
        }

        if self.horizontal_flip {
            args.push("-hf".to_string());
        }
        if self.vertical_flip {
            args.push("-vf".to_string());
        }

        args
    }
}

enum State {
    Idle,
    Running(Box<dyn Process>),
    Exited,
}

/// Raspberry Pi camera module, read through `raspivid`.
pub struct Raspivid {
    options: RaspividOptions,
    launcher: Arc<dyn Launcher>,
    video: Option<PipeReader>,
    output: Option<PipeWriter>,
    invocation: Option<Invocation>,
    state: State,
}

impl Raspivid {
    pub fn new(options: RaspividOptions, launcher: Arc<dyn Launcher>) -> StreamResult<Self> {
        let (video, output) = std::io::pipe()?;

        Ok(Self {
            options,
            launcher,
            video: Some(video),
            output: Some(output),
            invocation: None,
            state: State::Idle,
        })
    }

    pub fn options(&self) -> &RaspividOptions {
        &self.options
    }
}

#[async_trait]
impl VideoSource for Raspivid {
    fn take_video(&mut self) -> StreamResult<Stdio> {
        self.video
            .take()
            .map(Stdio::from)
            .ok_or(StreamError::VideoTaken)
    }

    fn start(&mut self) -> StreamResult<()> {
        if !matches!(self.state, State::Idle) {
            return Err(StreamError::CameraAlreadyStarted);
        }
        let output = self.output.take().ok_or(StreamError::CameraAlreadyStarted)?;

        let invocation = Invocation::new(RASPIVID_PROGRAM, self.options.args());
        info!("Starting camera: {}", invocation);

        // The write end moves into the child; once it exits the reader sees EOF
        let process = self
            .launcher
            .launch(&invocation, ProcessIo::writing(Stdio::from(output)))
            .map_err(|source| StreamError::CameraLaunchFailed {
                command: invocation.to_string(),
                source,
            })?;

        debug!("Camera running (pid {:?})", process.id());

        self.invocation = Some(invocation);
        self.state = State::Running(process);
        Ok(())
    }

    async fn wait(&mut self) -> StreamResult<()> {
        let process = match &mut self.state {
            State::Idle => return Err(StreamError::CameraNotStarted),
            State::Exited => return Err(StreamError::CameraAlreadyWaited),
            State::Running(process) => process,
        };

        let result = process.wait().await;
        self.state = State::Exited;
        let status = result?;

        if status.success() {
            info!("Camera finished");
            Ok(())
        } else {
            let command = self.command_line();
            error!("Camera failed with {}: {}", status, command);
            Err(StreamError::CameraExit { status, command })
        }
    }

    fn command_line(&self) -> String {
        self.invocation
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        assert_eq!(RaspividOptions::default().args(), vec!["-o", "-", "-t", "0"]);
    }

    #[test]
    fn test_all_args() {
        let options = RaspividOptions {
            width: 1280,
            height: 720,
            fps: 30,
            horizontal_flip: true,
            vertical_flip: true,
        };

        assert_eq!(
            options.args(),
            vec![
                "-o", "-", "-t", "0", "-w", "1280", "-h", "720", "-fps", "30", "-hf", "-vf"
            ]
        );
    }
}
