//! System package installation.
//!
//! Maps the host onto exactly one package-manager strategy and drives
//! installation of absent programs. The manager set is a closed enum with
//! explicit argument vectors per variant; selection probes for manager
//! binaries in a fixed priority order per OS family.
//!
//! Per-program failures are logged and accumulated, never aborting the
//! remaining installs. The component as a whole succeeds only if a final
//! re-check of the full requirement list reports nothing absent. The single
//! fatal condition inside this component is finding no package manager at
//! all.

use std::path::PathBuf;

use crate::error::{LauncherError, Result};
use crate::platform::OsFamily;
use crate::requirements::checker::missing_programs_with;
use crate::requirements::registry::ProgramRequirement;
use crate::shell::command::{run_inherit, Invocation};
use crate::shell::lookup::{binary_on_path, is_elevated};

/// Vendor install script for calibre on Linux. The distro packages lag and
/// ship a broken Qt on some targets, so the vendor script is preferred.
const CALIBRE_INSTALLER_URL: &str = "https://download.calibre-ebook.com/linux-installer.sh";

/// Library known to conflict with calibre's bundled Qt when pulled in
/// transitively by distro packages.
const CALIBRE_CONFLICT_PACKAGE: &str = "libxcb-cursor0";

/// Download helper the installer provisions and every later download uses.
pub const DOWNLOAD_HELPER: &str = "wget";

/// Known package managers, one invocation syntax each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Brew,
    AptGet,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Emerge,
}

/// Probe order per OS family. Darwin has a single known manager.
const LINUX_PRIORITY: &[PackageManager] = &[
    PackageManager::AptGet,
    PackageManager::Dnf,
    PackageManager::Yum,
    PackageManager::Pacman,
    PackageManager::Zypper,
    PackageManager::Emerge,
];
const DARWIN_PRIORITY: &[PackageManager] = &[PackageManager::Brew];

impl PackageManager {
    /// The manager's binary name, used both for probing and invocation.
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Brew => "brew",
            PackageManager::AptGet => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Emerge => "emerge",
        }
    }

    /// Select the first manager whose binary probes present.
    pub fn detect_with(os_family: OsFamily, probe: &dyn Fn(&str) -> bool) -> Option<Self> {
        let priority = match os_family {
            OsFamily::Linux => LINUX_PRIORITY,
            OsFamily::Darwin => DARWIN_PRIORITY,
        };
        priority.iter().copied().find(|m| probe(m.binary()))
    }

    /// Build the install invocation for a set of packages.
    ///
    /// Linux managers are prefixed with `sudo` when the launcher is
    /// unprivileged; Homebrew refuses to run as root and never is.
    pub fn install_invocation(&self, packages: &[&str], elevated: bool) -> Invocation {
        let mut args: Vec<String> = match self {
            PackageManager::Brew => vec!["install".into()],
            PackageManager::AptGet | PackageManager::Dnf | PackageManager::Yum => {
                vec!["install".into(), "-y".into()]
            }
            PackageManager::Pacman => vec!["-Sy".into(), "--noconfirm".into()],
            PackageManager::Zypper => {
                vec!["--non-interactive".into(), "install".into()]
            }
            PackageManager::Emerge => Vec::new(),
        };
        args.extend(packages.iter().map(|p| (*p).to_string()));
        self.privileged(args, elevated)
    }

    /// Build the removal invocation for a set of packages.
    pub fn remove_invocation(&self, packages: &[&str], elevated: bool) -> Invocation {
        let mut args: Vec<String> = match self {
            PackageManager::Brew => vec!["uninstall".into()],
            PackageManager::AptGet | PackageManager::Dnf | PackageManager::Yum => {
                vec!["remove".into(), "-y".into()]
            }
            PackageManager::Pacman => vec!["-R".into(), "--noconfirm".into()],
            PackageManager::Zypper => {
                vec!["--non-interactive".into(), "remove".into()]
            }
            PackageManager::Emerge => vec!["--unmerge".into()],
        };
        args.extend(packages.iter().map(|p| (*p).to_string()));
        self.privileged(args, elevated)
    }

    fn privileged(&self, args: Vec<String>, elevated: bool) -> Invocation {
        if *self == PackageManager::Brew || elevated {
            Invocation::with_args(self.binary(), args)
        } else {
            let mut full = vec![self.binary().to_string()];
            full.extend(args);
            Invocation::with_args("sudo", full)
        }
    }

    /// Auxiliary dictionary packages bundled with a mecab install.
    fn mecab_extras(&self) -> &'static [&'static str] {
        match self {
            PackageManager::AptGet => &["libmecab-dev", "mecab-ipadic-utf8"],
            _ => &["mecab-ipadic"],
        }
    }
}

/// Per-requirement install result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationOutcome {
    pub name: String,
    pub installed: bool,
}

/// Injectable dependencies for the installer.
pub struct InstallerContext<'a> {
    /// Run an external invocation, returning true on exit 0.
    pub run: &'a dyn Fn(&Invocation) -> bool,
    /// Whether a binary of the given name is available.
    pub probe: &'a dyn Fn(&str) -> bool,
    /// Whether the launcher already runs as root.
    pub elevated: bool,
    /// Host OS family.
    pub os_family: OsFamily,
    /// Scratch directory for downloaded installer scripts.
    pub tmp_dir: PathBuf,
}

/// Build the production context.
pub fn default_context(os_family: OsFamily, tmp_dir: PathBuf) -> InstallerContext<'static> {
    InstallerContext {
        run: &run_inherit,
        probe: &|bin| binary_on_path(bin),
        elevated: is_elevated(),
        os_family,
        tmp_dir,
    }
}

/// Install every absent program, then re-check the full requirement list.
///
/// Returns the per-program outcomes on success. Fails with
/// [`LauncherError::NoPackageManager`] if no manager binary is found, or
/// [`LauncherError::ProgramsStillMissing`] if the re-check still reports
/// gaps after all attempts.
pub fn install_missing(
    missing: &[ProgramRequirement],
    all_requirements: &[ProgramRequirement],
    ctx: &InstallerContext<'_>,
) -> Result<Vec<InstallationOutcome>> {
    let manager = PackageManager::detect_with(ctx.os_family, ctx.probe)
        .ok_or(LauncherError::NoPackageManager)?;
    tracing::info!(manager = manager.binary(), "selected package manager");

    ensure_download_helper(manager, ctx);

    let mut outcomes = Vec::with_capacity(missing.len());
    for req in missing {
        install_one(manager, req, ctx);

        let installed = (ctx.probe)(req.probe_binary);
        if installed {
            tracing::info!(program = req.canonical_name, "installed");
        } else {
            tracing::warn!(program = req.canonical_name, "install did not yield a working binary");
        }
        outcomes.push(InstallationOutcome {
            name: req.canonical_name.to_string(),
            installed,
        });
    }

    let recheck = missing_programs_with(all_requirements, ctx.probe);
    if recheck.all_satisfied() {
        Ok(outcomes)
    } else {
        let names: Vec<&str> = recheck
            .missing()
            .iter()
            .map(|r| r.canonical_name)
            .collect();
        Err(LauncherError::ProgramsStillMissing {
            programs: names.join(", "),
        })
    }
}

/// Install the download helper first if absent; later steps depend on it.
fn ensure_download_helper(manager: PackageManager, ctx: &InstallerContext<'_>) {
    if (ctx.probe)(DOWNLOAD_HELPER) {
        return;
    }
    tracing::info!("installing {}", DOWNLOAD_HELPER);
    let inv = manager.install_invocation(&[DOWNLOAD_HELPER], ctx.elevated);
    if !(ctx.run)(&inv) || !(ctx.probe)(DOWNLOAD_HELPER) {
        tracing::warn!("{} unavailable; downloads will fail later", DOWNLOAD_HELPER);
    }
}

/// Apply the right strategy for one requirement. Failures are not raised;
/// the caller re-probes afterwards.
fn install_one(manager: PackageManager, req: &ProgramRequirement, ctx: &InstallerContext<'_>) {
    match req.canonical_name {
        "calibre" => install_calibre(manager, req, ctx),
        "mecab" => {
            let mut packages = vec![req.canonical_name];
            packages.extend_from_slice(manager.mecab_extras());
            let inv = manager.install_invocation(&packages, ctx.elevated);
            (ctx.run)(&inv);
        }
        _ => {
            let inv = manager.install_invocation(&[req.canonical_name], ctx.elevated);
            (ctx.run)(&inv);
        }
    }
}

/// Calibre needs special handling: drop the conflicting transitive library,
/// prefer the vendor install script on Linux, fall back to the distro
/// package if that leaves no working binary.
fn install_calibre(manager: PackageManager, req: &ProgramRequirement, ctx: &InstallerContext<'_>) {
    let removal = manager.remove_invocation(&[CALIBRE_CONFLICT_PACKAGE], ctx.elevated);
    // Absence of the conflict package is the common case
    let _ = (ctx.run)(&removal);

    if ctx.os_family == OsFamily::Linux {
        let script = ctx.tmp_dir.join("calibre-linux-installer.sh");
        let script_path = script.to_string_lossy().to_string();
        let download = Invocation::with_args(
            DOWNLOAD_HELPER,
            vec![
                "-nv".to_string(),
                CALIBRE_INSTALLER_URL.to_string(),
                "-O".to_string(),
                script_path.clone(),
            ],
        );
        if (ctx.run)(&download) {
            let run_script = if ctx.elevated {
                Invocation::with_args("sh", vec![script_path])
            } else {
                Invocation::with_args("sudo", vec!["sh".to_string(), script_path])
            };
            (ctx.run)(&run_script);
        }
        if (ctx.probe)(req.probe_binary) {
            return;
        }
        tracing::warn!("vendor calibre installer did not yield a binary, trying the package");
    }

    let inv = manager.install_invocation(&[req.canonical_name], ctx.elevated);
    (ctx.run)(&inv);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const CALIBRE: ProgramRequirement = ProgramRequirement::new("calibre", "ebook-convert");
    const FFMPEG: ProgramRequirement = ProgramRequirement::new("ffmpeg", "ffmpeg");
    const MECAB: ProgramRequirement = ProgramRequirement::new("mecab", "mecab");

    /// Records every invocation and answers probes from a growing set:
    /// installing a package makes its binaries probe present afterwards.
    struct FakeHost {
        log: RefCell<Vec<Invocation>>,
        present: RefCell<HashSet<String>>,
        install_works: bool,
    }

    impl FakeHost {
        fn new(present: &[&str], install_works: bool) -> Self {
            Self {
                log: RefCell::new(Vec::new()),
                present: RefCell::new(present.iter().map(|s| s.to_string()).collect()),
                install_works,
            }
        }

        fn run(&self, inv: &Invocation) -> bool {
            self.log.borrow_mut().push(inv.clone());
            if !self.install_works {
                return false;
            }
            // Mirror what a real manager does: installed package names make
            // their binaries appear. wget/calibre script downloads succeed.
            let mut present = self.present.borrow_mut();
            for arg in &inv.args {
                match arg.as_str() {
                    "calibre" => {
                        present.insert("ebook-convert".to_string());
                    }
                    "nodejs" => {
                        present.insert("node".to_string());
                    }
                    other => {
                        present.insert(other.to_string());
                    }
                }
                if arg.ends_with("calibre-linux-installer.sh") && inv.program != DOWNLOAD_HELPER {
                    present.insert("ebook-convert".to_string());
                }
            }
            true
        }

        fn probe(&self, bin: &str) -> bool {
            self.present.borrow().contains(bin)
        }

        fn programs_run(&self) -> Vec<String> {
            self.log.borrow().iter().map(|i| i.program.clone()).collect()
        }
    }

    fn ctx_for<'a>(
        run: &'a dyn Fn(&Invocation) -> bool,
        probe: &'a dyn Fn(&str) -> bool,
        os_family: OsFamily,
        temp: &TempDir,
    ) -> InstallerContext<'a> {
        InstallerContext {
            run,
            probe,
            elevated: true,
            os_family,
            tmp_dir: temp.path().to_path_buf(),
        }
    }

    #[test]
    fn detect_prefers_apt_on_linux() {
        let probe = |bin: &str| bin == "apt-get" || bin == "pacman";
        let manager = PackageManager::detect_with(OsFamily::Linux, &probe).unwrap();
        assert_eq!(manager, PackageManager::AptGet);
    }

    #[test]
    fn detect_falls_through_priority_order() {
        let probe = |bin: &str| bin == "zypper";
        let manager = PackageManager::detect_with(OsFamily::Linux, &probe).unwrap();
        assert_eq!(manager, PackageManager::Zypper);
    }

    #[test]
    fn darwin_only_knows_brew() {
        let probe = |bin: &str| bin == "apt-get";
        assert!(PackageManager::detect_with(OsFamily::Darwin, &probe).is_none());
        let probe = |bin: &str| bin == "brew";
        assert_eq!(
            PackageManager::detect_with(OsFamily::Darwin, &probe),
            Some(PackageManager::Brew)
        );
    }

    #[test]
    fn install_invocation_is_argument_vector() {
        let inv = PackageManager::AptGet.install_invocation(&["ffmpeg", "sox"], true);
        assert_eq!(inv.program, "apt-get");
        assert_eq!(inv.args, vec!["install", "-y", "ffmpeg", "sox"]);
    }

    #[test]
    fn unprivileged_linux_install_goes_through_sudo() {
        let inv = PackageManager::AptGet.install_invocation(&["ffmpeg"], false);
        assert_eq!(inv.program, "sudo");
        assert_eq!(inv.args, vec!["apt-get", "install", "-y", "ffmpeg"]);
    }

    #[test]
    fn brew_never_uses_sudo() {
        let inv = PackageManager::Brew.install_invocation(&["ffmpeg"], false);
        assert_eq!(inv.program, "brew");
        assert_eq!(inv.args, vec!["install", "ffmpeg"]);
    }

    #[test]
    fn pacman_uses_its_own_syntax() {
        let inv = PackageManager::Pacman.install_invocation(&["ffmpeg"], true);
        assert_eq!(inv.args, vec!["-Sy", "--noconfirm", "ffmpeg"]);
    }

    #[test]
    fn no_manager_found_is_fatal() {
        let host = FakeHost::new(&[], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        let err = install_missing(&[FFMPEG], &[FFMPEG], &ctx).unwrap_err();
        assert!(matches!(err, LauncherError::NoPackageManager));
        assert!(host.programs_run().is_empty());
    }

    #[test]
    fn helper_installed_before_programs() {
        let host = FakeHost::new(&["apt-get"], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        install_missing(&[FFMPEG], &[FFMPEG], &ctx).unwrap();

        let log = host.log.borrow();
        assert!(log[0].args.contains(&"wget".to_string()));
        assert!(log[1].args.contains(&"ffmpeg".to_string()));
    }

    #[test]
    fn helper_not_reinstalled_when_present() {
        let host = FakeHost::new(&["apt-get", "wget"], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        install_missing(&[FFMPEG], &[FFMPEG], &ctx).unwrap();

        let log = host.log.borrow();
        assert!(!log.iter().any(|i| i.args.contains(&"wget".to_string())));
    }

    #[test]
    fn outcomes_accumulate_per_program() {
        let host = FakeHost::new(&["apt-get", "wget"], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        let missing = [FFMPEG, MECAB];
        let outcomes = install_missing(&missing, &missing, &ctx).unwrap();
        assert_eq!(
            outcomes,
            vec![
                InstallationOutcome {
                    name: "ffmpeg".to_string(),
                    installed: true
                },
                InstallationOutcome {
                    name: "mecab".to_string(),
                    installed: true
                },
            ]
        );
    }

    #[test]
    fn failed_install_does_not_abort_remaining() {
        let host = FakeHost::new(&["apt-get", "wget"], false);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        let missing = [FFMPEG, MECAB];
        let err = install_missing(&missing, &missing, &ctx).unwrap_err();

        // Both programs were attempted despite every run failing
        let attempted = host
            .log
            .borrow()
            .iter()
            .filter(|i| i.args.iter().any(|a| a == "ffmpeg" || a == "mecab"))
            .count();
        assert!(attempted >= 2);
        match err {
            LauncherError::ProgramsStillMissing { programs } => {
                assert!(programs.contains("ffmpeg"));
                assert!(programs.contains("mecab"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mecab_bundles_dictionary_packages() {
        let host = FakeHost::new(&["apt-get", "wget"], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        install_missing(&[MECAB], &[MECAB], &ctx).unwrap();

        let log = host.log.borrow();
        let mecab_inv = log
            .iter()
            .find(|i| i.args.iter().any(|a| a == "mecab"))
            .unwrap();
        assert!(mecab_inv.args.iter().any(|a| a == "libmecab-dev"));
        assert!(mecab_inv.args.iter().any(|a| a == "mecab-ipadic-utf8"));
    }

    #[test]
    fn calibre_removes_conflict_then_runs_vendor_script() {
        let host = FakeHost::new(&["apt-get", "wget"], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Linux, &temp);

        install_missing(&[CALIBRE], &[CALIBRE], &ctx).unwrap();

        let log = host.log.borrow();
        let removal_pos = log
            .iter()
            .position(|i| i.args.iter().any(|a| a == CALIBRE_CONFLICT_PACKAGE))
            .unwrap();
        let script_pos = log
            .iter()
            .position(|i| {
                i.program != DOWNLOAD_HELPER
                    && i.args.iter().any(|a| a.ends_with("calibre-linux-installer.sh"))
            })
            .unwrap();
        assert!(removal_pos < script_pos);
        // Vendor script worked, so the distro package was never requested
        assert!(!log
            .iter()
            .any(|i| i.args.iter().any(|a| a == "calibre")));
    }

    #[test]
    fn calibre_on_darwin_skips_vendor_script() {
        let host = FakeHost::new(&["brew", "wget"], true);
        let temp = TempDir::new().unwrap();
        let run = |inv: &Invocation| host.run(inv);
        let probe = |bin: &str| host.probe(bin);
        let ctx = ctx_for(&run, &probe, OsFamily::Darwin, &temp);

        install_missing(&[CALIBRE], &[CALIBRE], &ctx).unwrap();

        let log = host.log.borrow();
        assert!(log.iter().any(|i| i.args.iter().any(|a| a == "calibre")));
        assert!(!log
            .iter()
            .any(|i| i.args.iter().any(|a| a.contains("linux-installer"))));
    }
}
