//! Status message writer.
//!
//! Provisioning is chatty by nature (package managers stream their own
//! output between our lines), so every message carries a colored marker
//! that survives the noise.

use console::style;

/// Writer for user-facing status lines.
#[derive(Debug, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// A step that is starting.
    pub fn status(&self, msg: &str) {
        println!("{} {}", style("›").cyan().bold(), msg);
    }

    /// A step that finished successfully.
    pub fn success(&self, msg: &str) {
        println!("{} {}", style("✓").green().bold(), msg);
    }

    /// A fatal problem; the caller aborts after this.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {}", style("✗").red().bold(), msg);
    }
}
