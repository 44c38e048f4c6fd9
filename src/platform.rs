//! Host platform resolution.
//!
//! Maps the OS family and CPU architecture onto a provisioning descriptor:
//! the Miniforge installer URL used to bootstrap the environment manager.
//! Exactly four combinations are supported; everything else is fatal before
//! any other work happens.

use crate::error::{LauncherError, Result};

/// Supported operating-system families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Darwin,
}

impl OsFamily {
    /// Lowercase name as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Darwin => "darwin",
        }
    }
}

/// Resolved host platform and its environment-manager installer URL.
///
/// Immutable once computed.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub os_family: OsFamily,
    pub arch: String,
    pub installer_url: String,
}

/// Fixed installer URLs per supported (OS, architecture) pair.
const INSTALLER_URLS: &[(OsFamily, &str, &str)] = &[
    (
        OsFamily::Linux,
        "x86_64",
        "https://github.com/conda-forge/miniforge/releases/latest/download/Miniforge3-Linux-x86_64.sh",
    ),
    (
        OsFamily::Linux,
        "aarch64",
        "https://github.com/conda-forge/miniforge/releases/latest/download/Miniforge3-Linux-aarch64.sh",
    ),
    (
        OsFamily::Darwin,
        "x86_64",
        "https://github.com/conda-forge/miniforge/releases/latest/download/Miniforge3-MacOSX-x86_64.sh",
    ),
    (
        OsFamily::Darwin,
        "arm64",
        "https://github.com/conda-forge/miniforge/releases/latest/download/Miniforge3-MacOSX-arm64.sh",
    ),
];

impl PlatformProfile {
    /// Resolve the profile for the compile-target host.
    pub fn detect() -> Result<Self> {
        // Rust reports Apple Silicon as aarch64; the installer naming uses
        // the Darwin convention (arm64).
        let arch = if std::env::consts::OS == "macos" && std::env::consts::ARCH == "aarch64" {
            "arm64"
        } else {
            std::env::consts::ARCH
        };
        Self::resolve(std::env::consts::OS, arch)
    }

    /// Resolve a profile from explicit OS and architecture signals.
    ///
    /// `os` accepts both Rust's `macos` and the uname-style `darwin`.
    pub fn resolve(os: &str, arch: &str) -> Result<Self> {
        let family = match os {
            "linux" => OsFamily::Linux,
            "macos" | "darwin" => OsFamily::Darwin,
            _ => {
                return Err(LauncherError::UnsupportedPlatform {
                    os: os.to_string(),
                    arch: arch.to_string(),
                })
            }
        };

        let url = INSTALLER_URLS
            .iter()
            .find(|(f, a, _)| *f == family && *a == arch)
            .map(|(_, _, url)| (*url).to_string())
            .ok_or_else(|| LauncherError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })?;

        Ok(Self {
            os_family: family,
            arch: arch.to_string(),
            installer_url: url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_x86_64_resolves_fixed_url() {
        let profile = PlatformProfile::resolve("linux", "x86_64").unwrap();
        assert_eq!(profile.os_family, OsFamily::Linux);
        assert!(profile.installer_url.ends_with("Miniforge3-Linux-x86_64.sh"));
    }

    #[test]
    fn linux_aarch64_resolves_fixed_url() {
        let profile = PlatformProfile::resolve("linux", "aarch64").unwrap();
        assert!(profile
            .installer_url
            .ends_with("Miniforge3-Linux-aarch64.sh"));
    }

    #[test]
    fn darwin_x86_64_resolves_fixed_url() {
        let profile = PlatformProfile::resolve("darwin", "x86_64").unwrap();
        assert_eq!(profile.os_family, OsFamily::Darwin);
        assert!(profile
            .installer_url
            .ends_with("Miniforge3-MacOSX-x86_64.sh"));
    }

    #[test]
    fn darwin_arm64_resolves_fixed_url() {
        let profile = PlatformProfile::resolve("darwin", "arm64").unwrap();
        assert!(profile.installer_url.ends_with("Miniforge3-MacOSX-arm64.sh"));
    }

    #[test]
    fn macos_alias_accepted() {
        let profile = PlatformProfile::resolve("macos", "arm64").unwrap();
        assert_eq!(profile.os_family, OsFamily::Darwin);
    }

    #[test]
    fn unsupported_os_is_fatal() {
        let err = PlatformProfile::resolve("windows", "x86_64").unwrap_err();
        assert!(matches!(err, LauncherError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn unsupported_arch_within_supported_os_is_fatal() {
        let err = PlatformProfile::resolve("linux", "riscv64").unwrap_err();
        assert!(matches!(err, LauncherError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn darwin_aarch64_uses_arm64_naming_only() {
        // uname/installer naming is arm64; raw aarch64 is not a darwin key
        assert!(PlatformProfile::resolve("darwin", "aarch64").is_err());
    }

    #[test]
    fn os_family_names() {
        assert_eq!(OsFamily::Linux.name(), "linux");
        assert_eq!(OsFamily::Darwin.name(), "darwin");
    }
}
