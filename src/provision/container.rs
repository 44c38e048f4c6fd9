//! Container engine provisioning.
//!
//! Used only by flows that delegate conversion work to a container engine;
//! the default native and full-docker dispatch never calls this. On darwin
//! the engine is installed as a Homebrew cask; on Linux via the vendor
//! convenience script plus a systemd service enable. A `hello-world` run
//! verifies the install.

use crate::error::{LauncherError, Result};
use crate::platform::OsFamily;
use crate::requirements::installer::{InstallerContext, DOWNLOAD_HELPER};
use crate::shell::command::Invocation;

/// Vendor convenience installer for Linux.
const DOCKER_INSTALLER_URL: &str = "https://get.docker.com";

/// Ensure a working container engine, installing it if absent.
pub fn ensure_engine(ctx: &InstallerContext<'_>) -> Result<()> {
    if (ctx.probe)("docker") {
        tracing::debug!("container engine already present");
        return Ok(());
    }

    tracing::info!("installing container engine");
    match ctx.os_family {
        OsFamily::Darwin => install_darwin(ctx)?,
        OsFamily::Linux => install_linux(ctx)?,
    }

    smoke_test(ctx)
}

fn install_darwin(ctx: &InstallerContext<'_>) -> Result<()> {
    let install = Invocation::new("brew", &["install", "--cask", "docker"]);
    if !(ctx.run)(&install) {
        return Err(LauncherError::ContainerToolInstall {
            message: "brew install --cask docker failed".to_string(),
        });
    }
    Ok(())
}

fn install_linux(ctx: &InstallerContext<'_>) -> Result<()> {
    let script = ctx.tmp_dir.join("get-docker.sh");
    let script_str = script.to_string_lossy().to_string();

    let download = Invocation::with_args(
        DOWNLOAD_HELPER,
        vec![
            "-nv".to_string(),
            DOCKER_INSTALLER_URL.to_string(),
            "-O".to_string(),
            script_str.clone(),
        ],
    );
    if !(ctx.run)(&download) {
        return Err(LauncherError::ContainerToolInstall {
            message: format!("failed to download {}", DOCKER_INSTALLER_URL),
        });
    }

    let run_script = privileged(ctx, "sh", &[&script_str]);
    if !(ctx.run)(&run_script) {
        return Err(LauncherError::ContainerToolInstall {
            message: "vendor install script failed".to_string(),
        });
    }

    let enable = privileged(ctx, "systemctl", &["enable", "--now", "docker"]);
    if !(ctx.run)(&enable) {
        return Err(LauncherError::ContainerToolInstall {
            message: "could not enable the docker service".to_string(),
        });
    }

    Ok(())
}

fn smoke_test(ctx: &InstallerContext<'_>) -> Result<()> {
    let test = Invocation::new("docker", &["run", "--rm", "hello-world"]);
    if (ctx.run)(&test) {
        Ok(())
    } else {
        Err(LauncherError::ContainerToolInstall {
            message: "engine installed but the smoke-test container failed".to_string(),
        })
    }
}

fn privileged(ctx: &InstallerContext<'_>, program: &str, args: &[&str]) -> Invocation {
    if ctx.elevated {
        Invocation::new(program, args)
    } else {
        let mut full = vec![program.to_string()];
        full.extend(args.iter().map(|s| (*s).to_string()));
        Invocation::with_args("sudo", full)
    }
}
