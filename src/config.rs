//! The immutable launch configuration.
//!
//! Built exactly once from ArgumentStore, PlatformProfile, and ModeResolver
//! output, then passed by reference into every later component. After
//! construction, nothing reads ambient process state to make decisions.

use std::path::{Path, PathBuf};

use crate::cli::ArgumentMap;
use crate::mode::ExecutionMode;
use crate::platform::PlatformProfile;
use crate::provision::runtime::RuntimeEnvironment;

/// Everything later stages need, resolved up front.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Parsed flags plus the verbatim forward vector.
    pub args: ArgumentMap,
    /// Resolved host platform.
    pub platform: PlatformProfile,
    /// Resolved execution mode; fixed before any provisioning step.
    pub mode: ExecutionMode,
    /// Repository root all relative paths hang off.
    pub root: PathBuf,
    /// The isolated runtime environment descriptor.
    pub env: RuntimeEnvironment,
}

impl LaunchConfig {
    /// Assemble the configuration from the already-resolved pieces.
    pub fn assemble(
        args: ArgumentMap,
        platform: PlatformProfile,
        mode: ExecutionMode,
        root: &Path,
    ) -> Self {
        Self {
            args,
            platform,
            mode,
            root: root.to_path_buf(),
            env: RuntimeEnvironment::for_root(root),
        }
    }

    /// Model cache directory exported to the downstream application.
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Scratch directory for downloaded installer scripts.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }
}
