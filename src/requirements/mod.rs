//! System-level program requirements: presence checking and installation.

pub mod checker;
pub mod installer;
pub mod registry;

pub use checker::{missing_programs, CheckReport};
pub use installer::{install_missing, InstallationOutcome, InstallerContext, PackageManager};
pub use registry::{required_programs, ProgramRequirement};
