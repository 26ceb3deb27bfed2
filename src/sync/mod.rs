//! Mirror synchronization between the GitHub API and the local store.

pub mod engine;

pub use engine::{IssueSyncReport, RepoSyncReport, SyncEngine, SyncError};
