//! External command execution.
//!
//! Every external invocation is built from an explicit program plus
//! argument vector. No command line is ever assembled by string
//! interpolation, so package names and paths can never be re-interpreted
//! by a shell.

use std::process::Command;

/// A fully described external invocation.
///
/// This is also the unit recorded by test doubles: provisioners and
/// installers hand `Invocation`s to an injected runner instead of spawning
/// processes themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables, merged over the inherited environment.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Build an invocation with no extra environment.
    pub fn new<S: Into<String>>(program: S, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
            env: Vec::new(),
        }
    }

    /// Build from owned arguments.
    pub fn with_args<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }

    /// Add an environment variable.
    pub fn env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Run an invocation with inherited stdio, returning true on exit 0.
///
/// Provisioning steps stream package-manager and installer output straight
/// to the user's terminal; there is nothing useful to capture.
pub fn run_inherit(invocation: &Invocation) -> bool {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    for (key, value) in &invocation.env {
        cmd.env(key, value);
    }

    match cmd.status() {
        Ok(status) => {
            tracing::debug!(
                program = %invocation.program,
                code = ?status.code(),
                "external command finished"
            );
            status.success()
        }
        Err(e) => {
            tracing::debug!(program = %invocation.program, error = %e, "failed to spawn");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_inherit_reports_status() {
        assert!(run_inherit(&Invocation::new("true", &[])));
        assert!(!run_inherit(&Invocation::new("false", &[])));
        assert!(!run_inherit(&Invocation::new(
            "definitely-not-a-real-binary-xyz",
            &[]
        )));
    }

    #[test]
    fn run_inherit_passes_extra_env() {
        let inv = Invocation::new("sh", &["-c", "test \"$INKCAST_TEST_VAR\" = value-42"])
            .env("INKCAST_TEST_VAR", "value-42");
        assert!(run_inherit(&inv));
    }

    #[test]
    fn invocation_builder_collects_env() {
        let inv = Invocation::new("pip", &["install", "pydub"]).env("TMPDIR", "/tmp/dl");
        assert_eq!(inv.program, "pip");
        assert_eq!(inv.args, vec!["install", "pydub"]);
        assert_eq!(inv.env, vec![("TMPDIR".to_string(), "/tmp/dl".to_string())]);
    }
}
