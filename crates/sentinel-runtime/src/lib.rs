//! Runtime layer for Chat Sentinel.
//!
//! Hosts the two long-running processes: the keyword monitoring engine and
//! the scheduled broadcast loop, plus the platform seam they run against and
//! the registry of live sessions.

pub mod broadcaster;
pub mod monitor;
pub mod platform;
pub mod registry;
pub mod scheduler;
pub mod supervisor;

pub use sentinel_core as core;
pub use sentinel_store as store;
