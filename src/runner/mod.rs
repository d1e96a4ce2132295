use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fmt;
use std::io::ErrorKind;
use std::process::{ExitStatus, Output, Stdio};
use tokio::process::Command;

use crate::error::{Error, Result};

mod builder;
pub use builder::InvocationBuilder;


/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Code(i32),
    /// Terminated by a signal before it could report a code (unix only).
    Signal(i32),
    Unknown,
}

impl ExitState {
    pub fn success(&self) -> bool {
        matches!(self, ExitState::Code(0))
    }

    /// Status to hand back to our own caller. Signals follow the shell's
    /// `128 + n` convention.
    pub fn code(&self) -> i32 {
        match *self {
            ExitState::Code(code) => code,
            ExitState::Signal(signal) => 128 + signal,
            ExitState::Unknown => 1,
        }
    }
}

impl From<ExitStatus> for ExitState {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitState::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitState::Signal(signal);
            }
        }
        ExitState::Unknown
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Code(code) => write!(f, "exit status {code}"),
            ExitState::Signal(signal) => write!(f, "signal {signal}"),
            ExitState::Unknown => f.write_str("an unknown status"),
        }
    }
}

/// Output of a finished child, buffered in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub exit: ExitState,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for Captured {
    fn from(output: Output) -> Self {
        Self {
            exit: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// A fully resolved command: what to run and the exact environment it gets.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// The overrides layered on top of the base environment, kept for reporting.
    pub extra_env: BTreeMap<String, String>,
    /// Complete environment for the child; nothing else is inherited.
    pub env: HashMap<OsString, OsString>,
}

impl Invocation {
    /// Program and arguments joined by single spaces, for display. Bytes that
    /// aren't UTF-8 show up as U+FFFD.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Copies `base` and overlays `extra`; on a key collision `extra` wins.
pub fn merge_env<I, K, V>(
    base: I,
    extra: &BTreeMap<String, String>,
) -> HashMap<OsString, OsString>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut env: HashMap<OsString, OsString> = base
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    for (key, value) in extra {
        env.insert(OsString::from(key), OsString::from(value));
    }
    env
}

/// Runs an invocation to completion and hands back whatever it printed.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, invocation: &Invocation) -> Result<Captured>;
}

/// Spawns the real process with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

#[async_trait]
impl Launcher for TokioLauncher {
    async fn launch(&self, invocation: &Invocation) -> Result<Captured> {
        tracing::info!(
            program = %invocation.program,
            args = ?invocation.args,
            "Spawning child process"
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .env_clear()
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|source| {
            tracing::error!(
                error = %source,
                program = %invocation.program,
                "Failed to spawn process"
            );
            if source.kind() == ErrorKind::NotFound {
                Error::RunnerNotFound {
                    program: invocation.program.clone(),
                }
            } else {
                Error::Spawn {
                    program: invocation.program.clone(),
                    source,
                }
            }
        })?;

        let captured = Captured::from(output);
        tracing::debug!(
            exit = %captured.exit,
            stdout_len = captured.stdout.len(),
            stderr_len = captured.stderr.len(),
            "Child process finished"
        );
        Ok(captured)
    }
}

/// Launches `invocation` and turns a non-zero exit into
/// [`Error::ChildProcessFailed`] carrying the captured streams.
pub async fn execute<L>(launcher: &L, invocation: &Invocation) -> Result<Captured>
where
    L: Launcher + ?Sized,
{
    let captured = launcher.launch(invocation).await?;
    if captured.exit.success() {
        return Ok(captured);
    }

    tracing::warn!(exit = %captured.exit, "Child process failed");
    Err(Error::ChildProcessFailed {
        command: invocation.command_line(),
        exit: captured.exit,
        stdout: captured.stdout,
        stderr: captured.stderr,
    })
}
