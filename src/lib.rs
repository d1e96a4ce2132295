//! # aider_uv_runner
//!
//! Runs [aider](https://aider.chat) through `uv`, handing it the environment
//! variables configured for an MCP server entry in `~/.cursor/mcp.json`.
//!
//! The flow is strictly sequential: read the config, pick the server's `env`
//! block, merge it over the current environment, spawn one child, relay what
//! it printed and exit with its status.
//!
//! ## Example
//!
//! ```no_run
//! use aider_uv_runner::{app, config::Settings, runner::TokioLauncher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::default();
//!     let args = ["--message", "add a README"];
//!     let mut stdout = std::io::stdout();
//!     let mut stderr = std::io::stderr();
//!
//!     if let Err(e) = app::run(&TokioLauncher, &settings, args, &mut stdout, &mut stderr).await {
//!         app::report_error(&e, &mut stderr);
//!         std::process::exit(e.exit_code());
//!     }
//! }
//! ```

/// Load, report and relay: one complete run
pub mod app;
/// Config file loading and env extraction
pub mod config;
/// Error types and exit status mapping
pub mod error;
/// Building and launching the child process
pub mod runner;

pub use error::{Error, Result};

/// Where the MCP configuration lives, before `~` expansion.
pub const DEFAULT_CONFIG_PATH: &str = "~/.cursor/mcp.json";

/// The `mcpServers` entry whose `env` block is handed to aider.
pub const DEFAULT_SERVER_KEY: &str = "giizhendam-aabajichiganan-mcp";

/// Runs aider's entry point inside the project environment managed by `uv`.
/// Pass-through arguments are appended after these tokens.
pub const LAUNCHER_PREFIX: &[&str] = &["uv", "run", "--", "python", "-m", "aider.main"];

#[cfg(test)]
mod tests;
