//! Single-call create/open/delete workflows for interactive front ends.
//!
//! Unlike the operation layer, the manager composes the two clients and the
//! two registries directly: one call does the whole workflow, no callback
//! wiring required.

pub mod errors;
pub mod manager;

pub use errors::LifecycleError;
pub use manager::{DeleteOptions, LifecycleManager};
