use aider_uv_runner::{app, config::Settings, runner::TokioLauncher};
use anyhow::Result;
use std::ffi::OsString;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let settings = Settings::default();
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    tracing::debug!(?args, ?settings, "Starting");

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let code = match runtime.block_on(app::run(
        &TokioLauncher,
        &settings,
        &args,
        &mut stdout,
        &mut stderr,
    )) {
        Ok(()) => 0,
        Err(e) => {
            app::report_error(&e, &mut stderr);
            e.exit_code()
        }
    };

    // POSIX keeps only the low byte of the status.
    Ok(ExitCode::from(code as u8))
}
