//! External command execution
//!
//! Every container engine call goes through [`CommandRunner`], so backends
//! can be exercised against a scripted runner in tests and against
//! [`LocalRunner`] in production. A non-zero exit is always surfaced as a
//! [`RunError`] carrying the argument vector and captured output.

mod command;

pub use command::{Cmd, CmdOutput, RunError, RunFailure, Stream};

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Runs [`Cmd`]s somewhere
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    ///
    /// Returns the captured streams on success and a [`RunError`] when the
    /// program cannot be started or exits unsuccessfully.
    async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, RunError>;
}

/// Runs commands as local child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }
}

fn stdio_for(stream: Stream) -> Stdio {
    match stream {
        Stream::Capture => Stdio::piped(),
        Stream::Inherit => Stdio::inherit(),
        Stream::Null => Stdio::null(),
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, RunError> {
        debug!("Running: {}", cmd);

        let output = Command::new(cmd.program())
            .args(cmd.get_args())
            .envs(cmd.get_env().iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(stdio_for(cmd.stdout_stream()))
            .stderr(stdio_for(cmd.stderr_stream()))
            .output()
            .await
            .map_err(|e| RunError::spawn(cmd, e))?;

        let captured = CmdOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        };

        if !output.status.success() {
            return Err(RunError::exit(
                cmd,
                output.status.code(),
                captured.combined(),
            ));
        }

        Ok(captured)
    }
}
