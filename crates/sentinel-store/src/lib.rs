//! Durable per-owner storage for Chat Sentinel.
//!
//! One JSON file per owner under a flat data directory. All cross-component
//! state flows through this store; nothing else touches the files.

pub mod store;

pub use store::OwnerStore;

pub use sentinel_core as core;
