//! Program presence checking.
//!
//! A pure query over an ordered requirement list: probe each requirement's
//! binary and report the subset that is absent, preserving input order. No
//! installation side effects here.

use crate::requirements::registry::ProgramRequirement;
use crate::shell::lookup::binary_on_path;

/// Result of checking a requirement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckReport {
    /// Every probe binary was found.
    AllSatisfied,
    /// These requirements' probe binaries were absent, in input order.
    Missing(Vec<ProgramRequirement>),
}

impl CheckReport {
    /// Whether nothing is missing.
    pub fn all_satisfied(&self) -> bool {
        matches!(self, CheckReport::AllSatisfied)
    }

    /// The missing subset (empty when satisfied).
    pub fn missing(&self) -> &[ProgramRequirement] {
        match self {
            CheckReport::AllSatisfied => &[],
            CheckReport::Missing(list) => list,
        }
    }
}

/// Check the requirement list against the live PATH.
pub fn missing_programs(requirements: &[ProgramRequirement]) -> CheckReport {
    missing_programs_with(requirements, &binary_on_path)
}

/// Check with an injected probe.
///
/// Probes the `probe_binary`, not the canonical name, tolerating package
/// vs. binary naming mismatches.
pub fn missing_programs_with(
    requirements: &[ProgramRequirement],
    probe: &dyn Fn(&str) -> bool,
) -> CheckReport {
    let absent: Vec<ProgramRequirement> = requirements
        .iter()
        .filter(|req| !probe(req.probe_binary))
        .cloned()
        .collect();

    if absent.is_empty() {
        CheckReport::AllSatisfied
    } else {
        for req in &absent {
            tracing::info!(program = req.canonical_name, "required program not found");
        }
        CheckReport::Missing(absent)
    }
}
