//! Process-wide registry of live platform sessions.
//!
//! Live session handles are runtime-only state: the durable store holds
//! credentials and flags, never a live object. After a restart the registry
//! starts empty and the login layer re-registers fresh sessions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sentinel_core::models::OwnerId;

use crate::platform::ChatSession;

/// Maps owner ids to their live, authenticated sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<OwnerId, Arc<dyn ChatSession>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the live session for `owner`.
    pub fn register(&self, owner: OwnerId, session: Arc<dyn ChatSession>) {
        tracing::info!(owner, "session registered");
        self.sessions
            .write()
            .expect("session registry lock poisoned")
            .insert(owner, session);
    }

    /// The live session for `owner`, if one is registered.
    pub fn get(&self, owner: OwnerId) -> Option<Arc<dyn ChatSession>> {
        self.sessions
            .read()
            .expect("session registry lock poisoned")
            .get(&owner)
            .cloned()
    }

    /// Drop the live session handle for `owner`, if any.
    pub fn remove(&self, owner: OwnerId) -> Option<Arc<dyn ChatSession>> {
        let removed = self
            .sessions
            .write()
            .expect("session registry lock poisoned")
            .remove(&owner);
        if removed.is_some() {
            tracing::info!(owner, "session removed");
        }
        removed
    }

    /// Owner ids with a live session, in ascending order.
    pub fn ids(&self) -> Vec<OwnerId> {
        let mut ids: Vec<OwnerId> = self
            .sessions
            .read()
            .expect("session registry lock poisoned")
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}
