//! Process launching.
//!
//! Everything that spawns an external program goes through [`Launcher`], so
//! the muxer and the camera never touch `Command` directly and tests can swap
//! in fake processes.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing as log;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// Renders the command line as it would be typed, for logs only.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Standard streams handed to a launched process.
pub struct ProcessIo {
    pub stdin: Stdio,
    pub stdout: Stdio,
}

impl ProcessIo {
    /// Read from `stdin`, discard stdout.
    pub fn reading(stdin: Stdio) -> Self {
        Self {
            stdin,
            stdout: Stdio::null(),
        }
    }

    /// Write to `stdout`, no stdin.
    pub fn writing(stdout: Stdio) -> Self {
        Self {
            stdin: Stdio::null(),
            stdout,
        }
    }
}

/// A running process owned by whoever launched it.
#[async_trait]
pub trait Process: Send {
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit.
    async fn wait(&mut self) -> io::Result<ExitStatus>;
}

/// Spawns processes.
pub trait Launcher: Send + Sync {
    /// Start `invocation` without waiting for it. Fails when the OS cannot
    /// create the process, e.g. the program is not on `PATH`.
    fn launch(&self, invocation: &Invocation, io: ProcessIo) -> io::Result<Box<dyn Process>>;
}

/// Launches real OS processes through tokio.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, invocation: &Invocation, io: ProcessIo) -> io::Result<Box<dyn Process>> {
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(io.stdin)
            .stdout(io.stdout)
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        log::debug!("Spawned {} (pid {:?})", invocation.program, child.id());

        Ok(Box::new(SystemProcess { child }))
    }
}

struct SystemProcess {
    child: Child,
}

#[async_trait]
impl Process for SystemProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new(
            "ffmpeg",
            vec!["-i".to_string(), "pipe:0".to_string(), "out.m3u8".to_string()],
        );
        assert_eq!(invocation.to_string(), "ffmpeg -i pipe:0 out.m3u8");
        assert_eq!(Invocation::new("ffmpeg", Vec::new()).to_string(), "ffmpeg");
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_launch() {
        let invocation = Invocation::new("raspilive-definitely-not-a-real-program", Vec::new());
        let result = SystemLauncher.launch(&invocation, ProcessIo::reading(Stdio::null()));
        assert!(result.is_err());
    }
}
