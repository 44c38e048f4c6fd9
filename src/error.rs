//! Error types for launcher operations.
//!
//! This module defines [`LauncherError`], the primary error type used
//! throughout the launcher, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Fatal pre-checks (platform, foreign environment, argument parsing)
//!   abort before any provisioning side effect
//! - Per-program install failures are accumulated, never raised; only the
//!   final re-check raises [`LauncherError::ProgramsStillMissing`]
//! - Use `anyhow::Error` (via `LauncherError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for launcher operations.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Host OS or CPU architecture has no provisioning strategy.
    #[error("Error: OS/architecture unsupported ({os}/{arch})")]
    UnsupportedPlatform { os: String, arch: String },

    /// A conda or virtualenv environment is already active in the shell.
    #[error("A Python environment is already active ({source_hint}). Launch inkcast from a shell without any conda or virtualenv environment activated.")]
    ForeignEnvironment { source_hint: String },

    /// Raw token did not fit the `--key [value]` grammar.
    #[error("Unknown option: {token}")]
    ArgumentParse { token: String },

    /// No known package manager binary was found on the host.
    #[error("No supported package manager found on this system")]
    NoPackageManager,

    /// After attempting every install, some programs are still absent.
    #[error("Required programs could not be installed: {programs}")]
    ProgramsStillMissing { programs: String },

    /// Downloading or running the environment-manager installer failed.
    #[error("Failed to bootstrap the environment manager: {message}")]
    ManagerBootstrap { message: String },

    /// Creating the runtime environment or installing its manifest failed.
    #[error("Failed to provision the runtime environment: {message}")]
    ManifestInstall { message: String },

    /// Installing or verifying the container engine failed.
    #[error("Failed to install the container engine: {message}")]
    ContainerToolInstall { message: String },

    /// An external command could not be spawned.
    #[error("Command failed to start: {program}")]
    CommandSpawn { program: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;
