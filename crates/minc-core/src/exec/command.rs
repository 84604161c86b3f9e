//! Command description and failure type

use std::fmt;
use std::io;

/// Where a standard output stream of a command goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stream {
    /// Capture into the returned output
    #[default]
    Capture,
    /// Forward to this process's stream
    Inherit,
    Null,
}

/// An external program invocation
///
/// Built once, run by a [`CommandRunner`](super::CommandRunner). Runners
/// never mutate it, so the same value can be run again (e.g. from a retry
/// loop).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    stdout: Stream,
    stderr: Stream,
}

impl Cmd {
    /// Create a command for a program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this invocation only
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdout(mut self, stream: Stream) -> Self {
        self.stdout = stream;
        self
    }

    pub fn stderr(mut self, stream: Stream) -> Self {
        self.stderr = stream;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn stdout_stream(&self) -> Stream {
        self.stdout
    }

    pub fn stderr_stream(&self) -> Stream {
        self.stderr
    }

    /// The full argument vector, program first
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CmdOutput {
    /// Output with only stdout populated
    pub fn from_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// Stderr followed by stdout
    pub fn combined(&self) -> Vec<u8> {
        let mut combined = self.stderr.clone();
        combined.extend_from_slice(&self.stdout);
        combined
    }
}

/// Why a command failed
#[derive(Debug)]
pub enum RunFailure {
    /// The program could not be started
    Spawn(io::Error),
    /// The program exited unsuccessfully; `None` when killed by a signal
    Exit(Option<i32>),
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Spawn(err) => write!(f, "failed to start: {}", err),
            RunFailure::Exit(Some(code)) => write!(f, "exit status {}", code),
            RunFailure::Exit(None) => write!(f, "terminated by signal"),
        }
    }
}

/// Error running a [`Cmd`]
///
/// Carries the argument vector that was run and whatever the command wrote
/// to its captured streams, so the failure can be diagnosed without logs.
#[derive(Debug)]
pub struct RunError {
    /// Program followed by its arguments
    pub command: Vec<String>,
    /// Captured stderr and stdout
    pub output: Vec<u8>,
    /// Underlying cause
    pub failure: RunFailure,
}

impl RunError {
    /// A program that exited with `code` after writing `output`
    pub fn exit(command: &Cmd, code: Option<i32>, output: impl Into<Vec<u8>>) -> Self {
        Self {
            command: command.argv(),
            output: output.into(),
            failure: RunFailure::Exit(code),
        }
    }

    /// A program that could not be spawned
    pub fn spawn(command: &Cmd, err: io::Error) -> Self {
        Self {
            command: command.argv(),
            output: Vec::new(),
            failure: RunFailure::Spawn(err),
        }
    }

    /// Captured output as lossy UTF-8, trimmed
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).trim().to_string()
    }

    /// True when the program ran and exited unsuccessfully
    pub fn is_exit(&self) -> bool {
        matches!(self.failure, RunFailure::Exit(_))
    }

    /// True when the program itself was not found
    pub fn is_not_found(&self) -> bool {
        matches!(&self.failure, RunFailure::Spawn(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command \"{}\" failed: {}",
            self.command.join(" "),
            self.failure
        )?;
        let output = self.output_lossy();
        if !output.is_empty() {
            write!(f, ": {}", output)?;
        }
        Ok(())
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.failure {
            RunFailure::Spawn(err) => Some(err),
            RunFailure::Exit(_) => None,
        }
    }
}
