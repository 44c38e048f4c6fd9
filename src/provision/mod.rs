//! Provisioning of the isolated runtime environment and, for delegating
//! flows, the container engine.

pub mod container;
pub mod runtime;

pub use runtime::{
    default_context, ensure_environment, ensure_manager, ProvisionerContext, RuntimeEnvironment,
};
