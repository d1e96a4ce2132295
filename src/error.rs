use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::runner::ExitState;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a run can end short of success. Each variant is terminal.
#[derive(Error, Debug)]
pub enum Error {
    #[error("MCP config file not found at {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// Anything other than a missing file, e.g. permission denied or a directory.
    #[error("could not read MCP config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not decode JSON from {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("launcher command is empty")]
    EmptyLauncher,

    #[error("'{program}' command not found. Make sure {program} is installed and in your PATH.")]
    RunnerNotFound { program: String },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' failed with {exit}")]
    ChildProcessFailed {
        command: String,
        exit: ExitState,
        stdout: String,
        stderr: String,
    },
}

impl Error {
    /// Status the wrapping process should exit with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ChildProcessFailed { exit, .. } => exit.code(),
            _ => 1,
        }
    }
}
