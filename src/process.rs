// ABOUTME: Runs external tools (git, docker, kubectl) as child processes.
// ABOUTME: Captures output, feeds optional stdin, and enforces a per-command timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Lines of stderr kept when a command fails.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with {}: {stderr}", exit_status(*code))]
    Exited {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error talking to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}


/// Captured result of a successful command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// A command to run.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Run to completion. The child is killed if this future is dropped
    /// or the timeout elapses.
    pub async fn run(&self) -> Result<CommandOutput, CommandError> {
        tracing::debug!(program = %self.program, args = ?self.args, "running command");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref cwd) = self.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let input = self.stdin.as_deref();
        let pipe = child.stdin.take();
        // The pipe is dropped once written, which closes the child's stdin.
        let feed = async move {
            match (input, pipe) {
                (Some(input), Some(mut pipe)) => pipe.write_all(input).await,
                _ => Ok(()),
            }
        };
        let exchange = async move { tokio::join!(feed, child.wait_with_output()) };

        let (fed, output) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| CommandError::TimedOut {
                    program: self.program.clone(),
                    timeout: limit,
                })?,
            None => exchange.await,
        };
        let output = output.map_err(|source| self.io(source))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::debug!(program = %self.program, code = ?output.status.code(), "command failed");
            return Err(CommandError::Exited {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }
        fed.map_err(|source| self.io(source))?;

        Ok(CommandOutput { stdout, stderr })
    }

    fn io(&self, source: std::io::Error) -> CommandError {
        CommandError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

fn exit_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
