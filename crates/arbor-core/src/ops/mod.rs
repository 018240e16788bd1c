//! The operation layer: five stateless orchestration functions.
//!
//! Each function takes the client collaborators plus a small set of
//! injected callbacks (safety confirmation, cleanup, PR creation, state
//! adoption, store pruning) so it never depends on a specific front end.
//! All of them are safely re-runnable: an interrupted merge or rebase is
//! picked up through the version-control tool's own in-progress markers.

pub mod delete;
pub mod discover;
pub mod errors;
pub mod merge;
pub mod prune;
pub mod sync;
pub mod types;

pub use delete::{delete, delete_all};
pub use discover::discover;
pub use errors::OpError;
pub use merge::merge;
pub use prune::prune;
pub use sync::{sync, sync_all};
pub use types::*;
