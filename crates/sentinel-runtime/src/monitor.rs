//! Keyword monitoring engine.
//!
//! For one owner, drains the session's standing message subscription and
//! applies the match-and-alert algorithm to every inbound event. The spawned
//! task lives exactly as long as the session: there is no explicit stop
//! operation, tearing the session down closes the channel and ends the task.

use std::sync::Arc;

use chrono::Utc;
use sentinel_core::matcher::{
    first_match, truncate_chars, NOTIFIED_MESSAGE_CHARS, STORED_MESSAGE_CHARS,
};
use sentinel_core::models::{Alert, OwnerId};
use sentinel_store::OwnerStore;

use crate::platform::{IncomingMessage, Notifier};
use crate::registry::SessionRegistry;

/// Sender display name when the platform resolved neither a first name nor
/// a handle.
pub const UNKNOWN_SENDER: &str = "unknown";

/// Conversation display name for events without a group title.
pub const PRIVATE_CHAT: &str = "private chat";

/// Per-owner keyword monitoring.
pub struct MonitoringEngine {
    store: Arc<OwnerStore>,
    registry: Arc<SessionRegistry>,
    notifier: Arc<dyn Notifier>,
}

impl MonitoringEngine {
    pub fn new(
        store: Arc<OwnerStore>,
        registry: Arc<SessionRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            registry,
            notifier,
        }
    }

    /// Begin monitoring all conversations visible to `owner`'s session.
    ///
    /// Returns `false` without side effects when the owner has no live
    /// session or an empty keyword set. On success the standing subscription
    /// runs in a background task until the session is torn down; delivery
    /// and storage failures inside the task are logged and never stop it.
    pub fn start_monitoring(&self, owner: OwnerId) -> bool {
        let Some(session) = self.registry.get(owner) else {
            tracing::warn!(owner, "cannot start monitoring: no live session");
            return false;
        };

        if self.store.load(owner).keywords.is_empty() {
            tracing::warn!(owner, "cannot start monitoring: no keywords configured");
            return false;
        }

        let mut events = session.subscribe_messages();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            tracing::info!(owner, "monitoring started");
            while let Some(event) = events.recv().await {
                handle_event(&store, notifier.as_ref(), owner, event).await;
            }
            tracing::info!(owner, "session closed; monitoring stopped");
        });

        true
    }
}

/// Apply the match-and-alert algorithm to one inbound event.
///
/// The owner record is re-read per event so keyword edits made while
/// monitoring is live take effect immediately. At most one alert is raised
/// per message: the first keyword (in configured order) matching as a
/// case-insensitive substring wins, and later matches are ignored.
async fn handle_event(
    store: &OwnerStore,
    notifier: &dyn Notifier,
    owner: OwnerId,
    event: IncomingMessage,
) {
    let Some(text) = event.text.as_deref().filter(|t| !t.is_empty()) else {
        return;
    };

    let record = store.load(owner);
    let Some(keyword) = first_match(&record.keywords, text) else {
        return;
    };

    let sender = event
        .sender_first_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(event.sender_username.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(UNKNOWN_SENDER)
        .to_string();
    let chat = event
        .chat_title
        .clone()
        .unwrap_or_else(|| PRIVATE_CHAT.to_string());
    let now = Utc::now();

    let alert = Alert {
        keyword: keyword.to_string(),
        message: truncate_chars(text, STORED_MESSAGE_CHARS),
        sender: sender.clone(),
        sender_id: event.sender_id,
        chat: chat.clone(),
        time: now,
    };

    let alert_text = format!(
        "Keyword alert\n\
         keyword: {keyword}\n\
         sender: {sender}\n\
         message: {}\n\
         location: {chat}\n\
         time: {}",
        truncate_chars(text, NOTIFIED_MESSAGE_CHARS),
        now.format("%H:%M:%S"),
    );

    if let Err(e) = store.append_alert(owner, alert) {
        tracing::error!(owner, keyword, error = %e, "failed to record alert");
    }

    if let Err(e) = notifier.notify(owner, &alert_text).await {
        tracing::warn!(owner, keyword, error = %e, "alert notification failed");
    }
}
