//! The seam between the core and the chat platform.
//!
//! Login, 2FA, and session persistence live outside this workspace; the core
//! consumes already-authenticated capabilities through [`ChatSession`], and
//! delivers owner alerts through [`Notifier`]. Both are fallible and async.

use async_trait::async_trait;
use tokio::sync::mpsc;

use sentinel_core::models::OwnerId;

/// One inbound message event, as resolved by the platform adapter.
///
/// The adapter resolves sender and conversation metadata before handing the
/// event over; the monitoring engine only applies fallbacks for fields the
/// platform could not resolve.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Text content; events without text are ignored by the engine.
    pub text: Option<String>,
    /// Sender's first name, when known.
    pub sender_first_name: Option<String>,
    /// Sender's handle, used when the first name is unknown.
    pub sender_username: Option<String>,
    /// Platform id of the sender.
    pub sender_id: Option<i64>,
    /// Title of the source conversation; `None` for a private chat.
    pub chat_title: Option<String>,
}

/// An authenticated session on the chat platform.
///
/// A live session is exclusively owned by this process and is never
/// serialised; tearing the session down closes its message channel, which is
/// the only way a standing subscription ends.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send a text message to a destination group.
    async fn send_message(&self, destination: &str, text: &str) -> anyhow::Result<()>;

    /// Send one photo to a destination group.
    async fn send_photo(&self, destination: &str, photo: &str) -> anyhow::Result<()>;

    /// Open a standing subscription to every new-message event visible to
    /// this session. The channel closes when the session is torn down.
    fn subscribe_messages(&self) -> mpsc::Receiver<IncomingMessage>;
}

/// Outbound channel that delivers alert text to the owning account.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the owner. Failure is non-fatal to the caller.
    async fn notify(&self, owner: OwnerId, text: &str) -> anyhow::Result<()>;
}

/// Fallback notifier that writes alert text to the log.
///
/// Used when no outbound messaging endpoint has been wired up, so alerts are
/// still observable.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, owner: OwnerId, text: &str) -> anyhow::Result<()> {
        tracing::info!(owner, alert = %text, "keyword alert");
        Ok(())
    }
}
