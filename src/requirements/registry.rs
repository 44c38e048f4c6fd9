//! Required-program definitions.
//!
//! The downstream pipeline shells out to a handful of system programs. A
//! requirement's display/package name can differ from the binary probed for
//! presence: the `nodejs` package ships a `node` binary, and calibre is
//! only usable through `ebook-convert`.

/// A single system-level program requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRequirement {
    /// Display and package name.
    pub canonical_name: &'static str,
    /// Binary name used for presence checks.
    pub probe_binary: &'static str,
}

impl ProgramRequirement {
    pub const fn new(canonical_name: &'static str, probe_binary: &'static str) -> Self {
        Self {
            canonical_name,
            probe_binary,
        }
    }
}

/// Programs the pipeline needs, in install order.
const REQUIRED_PROGRAMS: &[ProgramRequirement] = &[
    ProgramRequirement::new("calibre", "ebook-convert"),
    ProgramRequirement::new("ffmpeg", "ffmpeg"),
    ProgramRequirement::new("nodejs", "node"),
    ProgramRequirement::new("mecab", "mecab"),
    ProgramRequirement::new("sox", "sox"),
];

/// The full ordered requirement list.
pub fn required_programs() -> &'static [ProgramRequirement] {
    REQUIRED_PROGRAMS
}
