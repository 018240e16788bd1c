//! Git operations for Arbor.
//!
//! The [`client::VersionControl`] trait is the capability contract the
//! operation layer and lifecycle manager consume. [`cli::GitCli`] is the
//! production implementation; a scripted mock lives in [`mock`] for tests.

pub mod cli;
pub mod client;
pub mod errors;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use cli::GitCli;
pub use client::VersionControl;
pub use errors::GitError;
pub use types::{SyncStrategy, WorktreeInfo};
