//! Foreign Python environment guard.
//!
//! The launcher provisions its own isolated environment, and conda refuses
//! to nest cleanly inside an already-activated environment. Before touching
//! dependencies, the Native path checks that the invoking shell has no
//! conda or virtualenv environment active. Checks run in order:
//!
//! 1. `CONDA_DEFAULT_ENV` set - conda environment active
//! 2. `VIRTUAL_ENV` set - generic virtualenv active
//! 3. the resolved `python`/`python3` on PATH lives under `CONDA_PREFIX`
//!    or `VIRTUAL_ENV`
//!
//! Any match is a fatal conflict. Silence on pass; this guard has no side
//! effects.

use std::path::{Path, PathBuf};

use crate::error::{LauncherError, Result};
use crate::shell::lookup::{parse_system_path, resolve_tool_path};

/// Conda's active-environment indicator.
const CONDA_ACTIVE_VAR: &str = "CONDA_DEFAULT_ENV";

/// Conda's environment root prefix.
const CONDA_PREFIX_VAR: &str = "CONDA_PREFIX";

/// virtualenv/venv active-environment indicator (also its root).
const VENV_VAR: &str = "VIRTUAL_ENV";

/// Check the live process environment, resolving the interpreter on PATH.
pub fn check() -> Result<()> {
    let interpreter = resolve_tool_path("python", &parse_system_path())
        .or_else(|| resolve_tool_path("python3", &parse_system_path()));
    check_with(|key| std::env::var(key), interpreter.as_deref())
}

/// Check with injected environment lookups and a pre-resolved interpreter.
pub fn check_with<F>(env_fn: F, interpreter: Option<&Path>) -> Result<()>
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    if let Ok(name) = env_fn(CONDA_ACTIVE_VAR) {
        return Err(conflict(format!("{}={}", CONDA_ACTIVE_VAR, name)));
    }

    if let Ok(root) = env_fn(VENV_VAR) {
        return Err(conflict(format!("{}={}", VENV_VAR, root)));
    }

    if let Some(python) = interpreter {
        for var in [CONDA_PREFIX_VAR, VENV_VAR] {
            if let Ok(root) = env_fn(var) {
                let bin = PathBuf::from(&root).join("bin");
                if python.starts_with(&bin) {
                    return Err(conflict(format!(
                        "python at {} inside {}={}",
                        python.display(),
                        var,
                        root
                    )));
                }
            }
        }
    }

    Ok(())
}

fn conflict(source_hint: String) -> LauncherError {
    LauncherError::ForeignEnvironment { source_hint }
}
