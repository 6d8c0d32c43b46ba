use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleTime;

/// Stable identifier for an owning account.
pub type OwnerId = i64;

/// Opaque credential material for re-establishing an authenticated session.
///
/// The core never interprets these fields; the setup collaborator fills them
/// in and the login layer consumes them. A persisted `session_string` is only
/// credential material for a fresh login after restart, never a live handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Platform application id.
    #[serde(default)]
    pub api_id: String,
    /// Platform application hash.
    #[serde(default)]
    pub api_hash: String,
    /// Phone number the account is registered under.
    #[serde(default)]
    pub phone: String,
    /// Serialised session string from a previous login, if any.
    #[serde(default)]
    pub session_string: String,
}

/// One keyword hit recorded against an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// The keyword that matched, exactly as configured by the owner.
    pub keyword: String,
    /// Message text truncated to the first 200 characters.
    pub message: String,
    /// Display name of the sender.
    pub sender: String,
    /// Platform id of the sender, when the platform resolved one.
    #[serde(default)]
    pub sender_id: Option<i64>,
    /// Display name of the source conversation.
    pub chat: String,
    /// When the match occurred.
    pub time: DateTime<Utc>,
}

/// The durable per-owner record.
///
/// Every field carries a serde default so that records written by older
/// versions (or a brand-new empty record) deserialise to safe, inert values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerRecord {
    /// Opaque login material, populated by the setup collaborator.
    #[serde(default)]
    pub credentials: Credentials,
    /// Text body broadcast to every destination.
    #[serde(default)]
    pub message: String,
    /// Ordered media references broadcast alongside the message.
    #[serde(default)]
    pub photos: Vec<String>,
    /// Group identifiers to broadcast to. Duplicates are tolerated in
    /// storage and deduplicated at send time.
    #[serde(default)]
    pub destinations: Vec<String>,
    /// Case-insensitive match terms, in match-priority order.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Daily send time, interpreted in the process-local clock.
    #[serde(default)]
    pub schedule_time: ScheduleTime,
    /// Whether the daily broadcast is enabled.
    #[serde(default)]
    pub is_broadcast_active: bool,
    /// Whether keyword monitoring is enabled.
    #[serde(default)]
    pub is_monitoring_active: bool,
    /// Timestamp of the most recent broadcast attempt; dedup only.
    #[serde(default)]
    pub last_sent_at: Option<DateTime<Utc>>,
    /// Append-only log of keyword hits.
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl OwnerRecord {
    /// Whether a broadcast at `now` is suppressed by the 60-second dedup
    /// window around `last_sent_at`.
    ///
    /// This is deliberately a minute-scale guard, not a day-scale one: a
    /// second tick landing in the same clock minute is suppressed, while a
    /// restart more than 60 seconds after a same-day send is not.
    pub fn within_dedup_window(&self, now: DateTime<Utc>) -> bool {
        match self.last_sent_at {
            Some(last) => (now - last).num_seconds() < 60,
            None => false,
        }
    }
}
