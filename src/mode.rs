//! Execution mode resolution.
//!
//! Decides once per run whether provisioning happens on the host (`Native`)
//! or is assumed already satisfied inside a container (`FullDocker`).
//! Container detection takes precedence over any explicit flag; the
//! resolver never fails.

use std::path::Path;

use crate::cli::ArgumentMap;

/// Flag interpreted by the launcher for mode selection.
pub const MODE_FLAG: &str = "script_mode";

/// Environment variable set by container runtimes (systemd-nspawn, podman).
const CONTAINER_ENV_VAR: &str = "container";

/// Marker file created by Docker inside containers.
const CONTAINER_MARKER: &str = "/.dockerenv";

/// How the downstream application is to be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Provision dependencies on the host and run directly.
    Native,
    /// Inside a container; dependencies are baked into the image.
    FullDocker,
}

impl ExecutionMode {
    /// The value injected as `--script_mode` when forwarding.
    pub fn flag_value(&self) -> &'static str {
        match self {
            ExecutionMode::Native => "native",
            ExecutionMode::FullDocker => "full_docker",
        }
    }
}

/// Resolve the execution mode from live process state.
pub fn resolve(args: &ArgumentMap) -> ExecutionMode {
    resolve_with(args, |key| std::env::var(key), Path::new(CONTAINER_MARKER))
}

/// Resolve with injected container signals.
///
/// Container detection wins over the flag: a `--script_mode native` given
/// inside a container is ignored. Any flag value other than `native`,
/// including an absent flag, also resolves to `Native` outside containers.
pub fn resolve_with<F>(args: &ArgumentMap, env_fn: F, marker: &Path) -> ExecutionMode
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    if env_fn(CONTAINER_ENV_VAR).is_ok() || marker.exists() {
        tracing::debug!("container indicator present, forcing full_docker mode");
        return ExecutionMode::FullDocker;
    }

    // The flag only ever selects Native explicitly; it exists so the
    // downstream application receives a definite mode either way.
    if let Some(value) = args.get(MODE_FLAG) {
        if value != ExecutionMode::Native.flag_value() {
            tracing::debug!(value, "unrecognized script_mode value, running native");
        }
    }
    ExecutionMode::Native
}
