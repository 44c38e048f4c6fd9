//! Hand-off to the downstream application.
//!
//! The launcher's job ends here: build one interpreter invocation carrying
//! the original arguments verbatim plus a definite `--script_mode`, activate
//! the isolated environment for exactly the lifetime of that process, and
//! propagate its exit code unchanged.

use std::path::PathBuf;
use std::process::Command;

use crate::config::LaunchConfig;
use crate::error::{LauncherError, Result};
use crate::mode::{ExecutionMode, MODE_FLAG};
use crate::shell::command::Invocation;

/// Interpreter the downstream application runs under.
const INTERPRETER: &str = "python";

/// Entry script of the downstream application, relative to the root.
const APP_SCRIPT: &str = "app.py";

/// Cache directory variable exported for model downloads.
const MODEL_CACHE_VAR: &str = "HF_HOME";

/// Build the downstream invocation.
///
/// Arguments are the entry script, the original tokens untouched, then an
/// explicit `--script_mode` so the application never has to re-detect its
/// environment. In native mode the environment's `bin` directory is
/// prepended to `base_path`, activating the environment for the child only;
/// in container mode PATH is left alone since the image already provides
/// the runtime.
pub fn build_invocation(config: &LaunchConfig, base_path: &str) -> Invocation {
    let mut args = vec![APP_SCRIPT.to_string()];
    args.extend(config.args.forwarded().iter().cloned());
    args.push(format!("--{MODE_FLAG}"));
    args.push(config.mode.flag_value().to_string());

    let mut invocation = Invocation::with_args(INTERPRETER, args).env(
        MODEL_CACHE_VAR,
        config.models_dir().to_string_lossy().to_string(),
    );

    if config.mode == ExecutionMode::Native {
        let activated = format!("{}:{}", config.env.bin_dir().display(), base_path);
        invocation = invocation.env("PATH", activated);
    }

    invocation
}

/// Run the downstream application and return its exit code.
pub fn launch(config: &LaunchConfig) -> Result<i32> {
    let base_path = std::env::var("PATH").unwrap_or_default();
    let invocation = build_invocation(config, &base_path);

    tracing::info!(mode = %config.mode.flag_value(), "starting downstream application");

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args).current_dir(&config.root);
    for (key, value) in &invocation.env {
        cmd.env(key, value);
    }

    let status = cmd.status().map_err(|_| LauncherError::CommandSpawn {
        program: PathBuf::from(&invocation.program),
    })?;

    // A signal death carries no code; report generic failure.
    Ok(status.code().unwrap_or(1))
}
