use std::ffi::OsStr;
use std::io::{self, Write};

use crate::config::{load_config, server_env, Settings};
use crate::error::{Error, Result};
use crate::runner::{execute, InvocationBuilder, Launcher};

/// One full run: load the config, pick out the server's env, launch the
/// wrapped tool with the pass-through `args` and relay what it printed.
///
/// Diagnostics go to `err`, the tool's stdout to `out`.
pub async fn run<L, I, S>(
    launcher: &L,
    settings: &Settings,
    args: I,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()>
where
    L: Launcher + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let path = settings.resolved_config_path();
    let config = load_config(&path)?;

    let extra_env = server_env(&config, &settings.server_key);
    if extra_env.is_empty() {
        tracing::warn!(server_key = %settings.server_key, "No environment variables found");
        write_diag(
            err,
            format_args!("Warning: No environment variables found for aider in mcp.json"),
        );
    }

    let invocation = InvocationBuilder::from_launcher(settings.launcher.as_slice())?
        .args(args)
        .envs(&extra_env)
        .build();

    write_diag(
        err,
        format_args!("Executing command: {}", invocation.command_line()),
    );
    write_diag(
        err,
        format_args!("With extra environment: {:?}", invocation.extra_env),
    );

    let captured = execute(launcher, &invocation).await?;

    write_diag(out, format_args!("Aider Output:\n {}", captured.stdout));
    if !captured.stderr.is_empty() {
        write_diag(err, format_args!("Aider Stderr:\n {}", captured.stderr));
    }
    Ok(())
}

/// Writes the user-facing description of `error` to `err`.
pub fn report_error(error: &Error, err: &mut dyn Write) {
    match error {
        Error::ChildProcessFailed { stdout, stderr, .. } => {
            write_diag(err, format_args!("Error running aider: {error}"));
            write_diag(err, format_args!("Aider Stdout:\n{stdout}"));
            write_diag(err, format_args!("Aider Stderr:\n{stderr}"));
        }
        _ => write_diag(err, format_args!("Error: {error}")),
    }
}

// A closed stdout/stderr must not change the exit status we report.
fn write_diag(w: &mut dyn Write, args: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(w, "{args}").and_then(|()| w.flush()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            tracing::debug!(error = %e, "Failed to write diagnostic");
        }
    }
}
