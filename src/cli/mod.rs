//! Command-line surface.
//!
//! The launcher interprets exactly one flag (`--script_mode`); every other
//! token is opaque and forwarded verbatim to the downstream application.

pub mod args;

pub use args::ArgumentMap;
