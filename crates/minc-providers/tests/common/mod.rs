//! Common test helpers for minc-providers integration tests
//!
//! A scripted [`CommandRunner`] stands in for podman/docker: every command is
//! recorded, and replies are chosen by matching argument tokens.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use minc_core::exec::{Cmd, CmdOutput, CommandRunner, RunError};

pub const INFO_PODMAN_OK: &str =
    r#"{"host":{"cgroupVersion":"v2","security":{"rootless":false}}}"#;
pub const INFO_PODMAN_V1: &str =
    r#"{"host":{"cgroupVersion":"v1","security":{"rootless":false}}}"#;
pub const INFO_PODMAN_ROOTLESS: &str =
    r#"{"host":{"cgroupVersion":"v2","security":{"rootless":true}}}"#;
pub const INFO_DOCKER_OK: &str = r#"{"CgroupVersion":"2","SecurityOptions":["name=seccomp"]}"#;

// ─── Command Log ─────────────────────────────────────────────────────────────

/// Records argument vectors (program first) of every command run
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl CommandLog {
    pub fn record(&self, argv: Vec<String>) {
        self.calls.lock().unwrap().push(argv);
    }

    pub fn all(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of commands containing every token in `tokens`
    pub fn count_matching(&self, tokens: &[&str]) -> usize {
        self.all()
            .iter()
            .filter(|argv| matches_tokens(argv, tokens))
            .count()
    }

    /// Assert some command contained every token in `tokens`.
    pub fn assert_called_with(&self, tokens: &[&str]) {
        assert!(
            self.count_matching(tokens) > 0,
            "no command contained {:?}. Actual calls: {:?}",
            tokens,
            self.all()
        );
    }

    /// Assert no command contained every token in `tokens`.
    pub fn assert_not_called_with(&self, tokens: &[&str]) {
        assert_eq!(
            self.count_matching(tokens),
            0,
            "a command contained {:?}. Actual calls: {:?}",
            tokens,
            self.all()
        );
    }

    /// Subcommands (first argument after the engine program) in call order
    pub fn subcommands(&self) -> Vec<String> {
        self.all()
            .iter()
            .filter_map(|argv| {
                let skip = if argv.first().map(String::as_str) == Some("sudo") {
                    2
                } else {
                    1
                };
                argv.get(skip).cloned()
            })
            .collect()
    }
}

fn matches_tokens(argv: &[String], tokens: &[&str]) -> bool {
    tokens.iter().all(|t| argv.iter().any(|a| a == t))
}

// ─── Scripted Runner ─────────────────────────────────────────────────────────

/// Reply to a matched command
#[derive(Debug, Clone)]
pub enum Reply {
    /// Exit 0 with this stdout
    Ok(String),
    /// Exit with this code after writing this output
    Fail(i32, String),
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Reply::Ok(stdout.to_string())
    }

    pub fn empty() -> Self {
        Reply::Ok(String::new())
    }

    pub fn fail(code: i32, output: &str) -> Self {
        Reply::Fail(code, output.to_string())
    }
}

struct Rule {
    tokens: Vec<String>,
    replies: VecDeque<Reply>,
    last: Reply,
}

/// [`CommandRunner`] answering from a script
///
/// The first rule whose tokens all appear in the argument vector answers.
/// A rule with several replies hands them out in order and then repeats the
/// last one. Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    log: CommandLog,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, tokens: &[&str], reply: Reply) -> Self {
        self.on_sequence(tokens, vec![reply])
    }

    pub fn on_sequence(self, tokens: &[&str], replies: Vec<Reply>) -> Self {
        let last = replies.last().cloned().unwrap_or_else(Reply::empty);
        self.rules.lock().unwrap().push(Rule {
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
            replies: replies.into(),
            last,
        });
        self
    }

    /// Podman reporting cgroup v2 and rootful mode
    pub fn podman_ok() -> Self {
        Self::new().on(&["info"], Reply::ok(INFO_PODMAN_OK))
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, cmd: &Cmd) -> Result<CmdOutput, RunError> {
        let argv = cmd.argv();
        self.log.record(argv.clone());

        let reply = {
            let mut rules = self.rules.lock().unwrap();
            rules
                .iter_mut()
                .find(|rule| {
                    rule.tokens
                        .iter()
                        .all(|t| argv.iter().any(|a| a == t))
                })
                .map(|rule| rule.replies.pop_front().unwrap_or_else(|| rule.last.clone()))
                .unwrap_or_else(Reply::empty)
        };

        match reply {
            Reply::Ok(stdout) => Ok(CmdOutput::from_stdout(stdout)),
            Reply::Fail(code, output) => Err(RunError::exit(cmd, Some(code), output)),
        }
    }
}
