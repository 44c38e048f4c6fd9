//! Isolated runtime environment provisioning.
//!
//! Two steps, both idempotent at their own level:
//!
//! 1. **Manager bootstrap** - if `conda` is absent, download the Miniforge
//!    installer for this platform, run it non-interactively into
//!    `~/miniforge3`, and initialize shell integration. A manager binary
//!    that still doesn't work afterwards is fatal.
//! 2. **Environment creation** - iff the target environment path does not
//!    exist on disk, create it pinned to a fixed Python version and install
//!    every manifest entry into it one at a time. On-disk existence of the
//!    path is the sole idempotency signal; no content hashing.
//!
//! The environment is never activated here; the launcher activates it only
//! for the lifetime of the downstream process.

use std::path::{Path, PathBuf};

use crate::error::{LauncherError, Result};
use crate::platform::PlatformProfile;
use crate::requirements::installer::DOWNLOAD_HELPER;
use crate::shell::command::{run_inherit, Invocation};
use crate::shell::lookup::binary_on_path;

/// Python version the environment is pinned to.
pub const PYTHON_VERSION: &str = "3.12";

/// Directory name of the isolated environment under the repository root.
pub const ENV_DIR_NAME: &str = "python_env";

/// Dependency manifest read during provisioning.
pub const MANIFEST_NAME: &str = "requirements.txt";

/// Environment-manager install directory under the user's home.
const MANAGER_DIR_NAME: &str = "miniforge3";

/// Working directories whose permissions are relaxed on first provisioning.
pub const WORK_DIRS: &[&str] = &["audiobooks", "tmp", "models"];

/// Descriptor of the isolated runtime environment.
#[derive(Debug, Clone)]
pub struct RuntimeEnvironment {
    /// Target environment path (`<root>/python_env`).
    pub path: PathBuf,
    /// Pinned language runtime version.
    pub python_version: String,
    /// Manifest file listing the runtime packages.
    pub manifest_path: PathBuf,
}

impl RuntimeEnvironment {
    /// Describe the environment for a repository root.
    pub fn for_root(root: &Path) -> Self {
        Self {
            path: root.join(ENV_DIR_NAME),
            python_version: PYTHON_VERSION.to_string(),
            manifest_path: root.join(MANIFEST_NAME),
        }
    }

    /// Whether the environment already exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The environment's binary directory, prepended to PATH on activation.
    pub fn bin_dir(&self) -> PathBuf {
        self.path.join("bin")
    }
}

/// Injectable dependencies for provisioning.
pub struct ProvisionerContext<'a> {
    /// Run an external invocation, returning true on exit 0.
    pub run: &'a dyn Fn(&Invocation) -> bool,
    /// Whether a binary of the given name is on PATH.
    pub probe: &'a dyn Fn(&str) -> bool,
    /// User home directory (manager install location).
    pub home: PathBuf,
    /// Repository root (working directories, pip download dir).
    pub root: PathBuf,
}

/// Build the production context.
pub fn default_context(root: PathBuf) -> ProvisionerContext<'static> {
    ProvisionerContext {
        run: &run_inherit,
        probe: &|bin| binary_on_path(bin),
        home: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
        root,
    }
}

/// Ensure a working environment manager, returning the program to invoke.
///
/// Returns plain `conda` when the manager is already on PATH; otherwise
/// bootstraps Miniforge and returns the absolute binary path inside the
/// fresh install (the current shell has no integration yet).
pub fn ensure_manager(profile: &PlatformProfile, ctx: &ProvisionerContext<'_>) -> Result<String> {
    if (ctx.probe)("conda") {
        tracing::debug!("conda already available");
        return Ok("conda".to_string());
    }

    let installer = ctx.home.join("miniforge-installer.sh");
    let installer_str = installer.to_string_lossy().to_string();
    let install_dir = ctx.home.join(MANAGER_DIR_NAME);

    tracing::info!(url = %profile.installer_url, "downloading environment-manager installer");
    let download = Invocation::with_args(
        DOWNLOAD_HELPER,
        vec![
            "-nv".to_string(),
            profile.installer_url.clone(),
            "-O".to_string(),
            installer_str.clone(),
        ],
    );
    if !(ctx.run)(&download) {
        return Err(LauncherError::ManagerBootstrap {
            message: format!("failed to download {}", profile.installer_url),
        });
    }

    let install = Invocation::with_args(
        "sh",
        vec![
            installer_str,
            "-b".to_string(),
            "-u".to_string(),
            "-p".to_string(),
            install_dir.to_string_lossy().to_string(),
        ],
    );
    if !(ctx.run)(&install) {
        return Err(LauncherError::ManagerBootstrap {
            message: "installer exited non-zero".to_string(),
        });
    }

    let conda = install_dir.join("bin").join("conda");
    let conda_str = conda.to_string_lossy().to_string();

    // The installer can exit 0 and still leave a broken tree behind
    if !(ctx.run)(&Invocation::new(conda_str.as_str(), &["--version"])) {
        return Err(LauncherError::ManagerBootstrap {
            message: format!("{} is not a working manager binary", conda.display()),
        });
    }

    if !(ctx.run)(&Invocation::new(conda_str.as_str(), &["init"])) {
        tracing::warn!("conda init failed; shell integration must be set up manually");
    }

    Ok(conda_str)
}

/// Create and populate the environment unless its path already exists.
///
/// Returns `true` when the environment was created on this call, `false`
/// when the existing path made the step a no-op. Each manifest entry is
/// installed individually with `TMPDIR` pointed at an isolated download
/// directory; the first failing entry is fatal.
pub fn ensure_environment(
    conda: &str,
    env: &RuntimeEnvironment,
    ctx: &ProvisionerContext<'_>,
) -> Result<bool> {
    if env.exists() {
        tracing::info!(path = %env.path.display(), "runtime environment already present");
        return Ok(false);
    }

    let env_path = env.path.to_string_lossy().to_string();
    tracing::info!(path = %env_path, version = %env.python_version, "creating runtime environment");

    let create = Invocation::with_args(
        conda,
        vec![
            "create".to_string(),
            "--prefix".to_string(),
            env_path.clone(),
            format!("python={}", env.python_version),
            "-y".to_string(),
        ],
    );
    if !(ctx.run)(&create) {
        return Err(LauncherError::ManifestInstall {
            message: format!("could not create environment at {}", env_path),
        });
    }

    let manifest =
        std::fs::read_to_string(&env.manifest_path).map_err(|e| LauncherError::ManifestInstall {
            message: format!("cannot read {}: {}", env.manifest_path.display(), e),
        })?;

    let download_dir = ctx.root.join("tmp").join("pip_downloads");
    std::fs::create_dir_all(&download_dir)?;
    let download_dir_str = download_dir.to_string_lossy().to_string();

    // One entry at a time: a single broken wheel should name itself in the
    // failure instead of poisoning a batch install.
    for entry in manifest.lines() {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        tracing::info!(package = entry, "installing manifest entry");
        let install = Invocation::with_args(
            conda,
            vec![
                "run".to_string(),
                "--prefix".to_string(),
                env_path.clone(),
                "pip".to_string(),
                "install".to_string(),
                entry.to_string(),
            ],
        )
        .env("TMPDIR", download_dir_str.clone());
        if !(ctx.run)(&install) {
            return Err(LauncherError::ManifestInstall {
                message: format!("pip install {} failed", entry),
            });
        }
    }

    relax_working_dirs(&ctx.root)?;

    Ok(true)
}

/// Create the downstream working directories and open up their permissions.
///
/// The pipeline is commonly re-launched under docker or sudo after a native
/// run, so these directories must stay writable across uid changes.
fn relax_working_dirs(root: &Path) -> Result<()> {
    for name in WORK_DIRS {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir)?;
        relax_recursive(&dir)?;
    }
    Ok(())
}

#[cfg(unix)]
fn relax_recursive(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))?;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            relax_recursive(&entry?.path())?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn relax_recursive(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
