//! Best-effort fan-out of an owner's stored message and photos.
//!
//! Each destination is attempted independently: a failing destination is
//! logged and skipped, never blocking delivery to the rest of the list.

use std::collections::HashSet;

use sentinel_core::models::OwnerRecord;

use crate::platform::ChatSession;

/// Outcome of one broadcast pass over an owner's destination list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Unique destinations a delivery was attempted to.
    pub attempted: usize,
    /// Destinations that received the full message/photo set.
    pub delivered: usize,
}

impl DeliveryReport {
    /// Whether every attempted destination was fully delivered.
    pub fn is_complete(&self) -> bool {
        self.delivered == self.attempted
    }
}

/// Send the record's message text and photos to every stored destination.
///
/// Destinations are treated as a set: duplicates in storage are collapsed,
/// keeping first-seen order, so no group is ever messaged twice in one pass.
pub async fn send(session: &dyn ChatSession, record: &OwnerRecord) -> DeliveryReport {
    let mut seen = HashSet::new();
    let mut report = DeliveryReport {
        attempted: 0,
        delivered: 0,
    };

    for destination in &record.destinations {
        if !seen.insert(destination.as_str()) {
            continue;
        }

        report.attempted += 1;
        match send_to_destination(session, destination, record).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(
                    destination = %destination,
                    error = %e,
                    "delivery to destination failed; continuing with the rest"
                );
            }
        }
    }

    report
}

/// Deliver the full message/photo set to one destination. The first failure
/// aborts this destination only.
async fn send_to_destination(
    session: &dyn ChatSession,
    destination: &str,
    record: &OwnerRecord,
) -> anyhow::Result<()> {
    if !record.message.is_empty() {
        session.send_message(destination, &record.message).await?;
    }
    for photo in &record.photos {
        session.send_photo(destination, photo).await?;
    }
    Ok(())
}
