//! Process execution and host probing.

pub mod command;
pub mod lookup;

pub use command::{run_inherit, Invocation};
pub use lookup::{binary_on_path, is_elevated, parse_system_path, resolve_tool_path};
