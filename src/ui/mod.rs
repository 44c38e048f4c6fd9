//! Terminal output helpers.

pub mod output;
pub mod spinner;

pub use output::Output;
pub use spinner::ProgressSpinner;
