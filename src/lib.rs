//! Repo Relay - bridges GitHub webhooks to chat notifications and keeps a
//! local, queryable mirror of repositories and issues.
//!
//! This library provides the domain types, webhook pipeline, sync engine,
//! and HTTP surface; the binary in `main.rs` wires them together.

pub mod cache;
pub mod config;
pub mod github;
pub mod notify;
pub mod server;
pub mod store;
pub mod sync;
pub mod types;
pub mod webhooks;
