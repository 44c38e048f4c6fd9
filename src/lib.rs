//! Inkcast launcher - environment bootstrap and dependency provisioning.
//!
//! This crate is the front-end for the Inkcast ebook-to-audio pipeline.
//! It decides an execution mode, verifies system-level prerequisites,
//! provisions an isolated Python runtime environment, and finally hands
//! control to the downstream application (`app.py`).
//!
//! # Modules
//!
//! - [`cli`] - Raw argument-token parsing and verbatim forwarding
//! - [`config`] - The immutable launch configuration built once per run
//! - [`platform`] - OS/architecture resolution and installer URLs
//! - [`mode`] - Native vs. full-docker execution mode resolution
//! - [`guard`] - Refusal to run inside a pre-existing Python environment
//! - [`requirements`] - Program presence checks and package installation
//! - [`provision`] - Runtime environment and container engine provisioning
//! - [`launch`] - Downstream application invocation
//! - [`shell`] - Process execution and PATH resolution
//! - [`ui`] - Terminal output
//! - [`error`] - Error types and result alias
//!
//! # Example
//!
//! ```
//! use inkcast::cli::ArgumentMap;
//!
//! let map = ArgumentMap::parse(["--script_mode", "native", "--headless"]).unwrap();
//! assert_eq!(map.get("script_mode"), Some("native"));
//! assert!(map.is_set("headless"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod launch;
pub mod mode;
pub mod platform;
pub mod provision;
pub mod requirements;
pub mod shell;
pub mod ui;

pub use error::{LauncherError, Result};
