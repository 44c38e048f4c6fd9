//! Raw argument-token parsing.
//!
//! The downstream application owns the real CLI surface, so the launcher
//! cannot use a schema-driven parser: it must accept any `--key value` or
//! bare `--key` pair without knowing the key, keep the full token sequence
//! verbatim for forwarding, and reject only tokens that fit neither shape.
//!
//! Grammar per token:
//! - `--key value` - next token does not start with `--`, consumed as value
//! - `--key` - no consumable next token, bound to boolean `true`
//! - anything else - fatal `Unknown option` error before any other
//!   component runs
//!
//! Keys are stored with the leading dashes stripped; the last occurrence of
//! a repeated key wins.

use std::collections::HashMap;

use crate::error::{LauncherError, Result};

/// Prefix that marks a token as a long flag.
const FLAG_PREFIX: &str = "--";

/// Value bound to a flag in the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Flag followed by a non-flag token.
    Text(String),
    /// Bare flag with no following value.
    Set,
}

/// Parsed flag map plus the verbatim token sequence.
///
/// Read-only after construction; the forwarded sequence is exactly what the
/// process received, so the downstream application sees the original
/// arguments untouched.
#[derive(Debug, Clone)]
pub struct ArgumentMap {
    flags: HashMap<String, FlagValue>,
    forwarded: Vec<String>,
}

impl ArgumentMap {
    /// Parse a raw token sequence.
    ///
    /// Returns [`LauncherError::ArgumentParse`] for any token that is not a
    /// flag and was not consumed as a flag's value.
    pub fn parse<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let forwarded: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut flags = HashMap::new();

        let mut i = 0;
        while i < forwarded.len() {
            let token = &forwarded[i];
            let Some(key) = token.strip_prefix(FLAG_PREFIX) else {
                return Err(LauncherError::ArgumentParse {
                    token: token.clone(),
                });
            };

            match forwarded.get(i + 1) {
                Some(next) if !next.starts_with(FLAG_PREFIX) => {
                    flags.insert(key.to_string(), FlagValue::Text(next.clone()));
                    i += 2;
                }
                _ => {
                    flags.insert(key.to_string(), FlagValue::Set);
                    i += 1;
                }
            }
        }

        Ok(Self { flags, forwarded })
    }

    /// Get a flag's string value, if it was given one.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.flags.get(key) {
            Some(FlagValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    /// Whether a flag is present at all (with or without a value).
    pub fn is_set(&self, key: &str) -> bool {
        self.flags.contains_key(key)
    }

    /// The original token sequence, verbatim.
    pub fn forwarded(&self) -> &[String] {
        &self.forwarded
    }

    /// Number of distinct flags parsed.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flags were parsed.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
