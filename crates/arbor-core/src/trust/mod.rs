//! Persisted assistant trust registry.
//!
//! One JSON document mapping absolute worktree path to [`TrustRecord`].
//! A record marks the worktree as pre-approved for the external coding
//! assistant so it does not prompt per-worktree. Same persistence contract
//! as the worktree registry: load-modify-save with an atomic
//! temp-file-then-rename write, no cross-process lock (last-writer-wins).

pub mod store;

pub use store::{TrustError, TrustRecord, TrustStore};
