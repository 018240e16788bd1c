//! Persisted worktree registry.
//!
//! One JSON document mapping absolute worktree path to [`WorktreeRecord`].
//! Every mutation is a full load-modify-save cycle with an atomic
//! temp-file-then-rename write; there is no cross-process lock, so two
//! concurrent orchestrator processes race last-writer-wins (documented
//! limitation).

pub mod errors;
pub mod store;
pub mod types;

pub use errors::StateError;
pub use store::WorktreeStateStore;
pub use types::WorktreeRecord;
