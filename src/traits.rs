use async_trait::async_trait;

use crate::relay::MessagePayload;

/// Outbound surface of the messaging platform, as seen by the relay engine.
///
/// The serenity-backed implementation lives in `channels::discord`; tests use
/// a scripted mock. Channel and message identifiers are opaque
/// platform-assigned tokens and are never interpreted here.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Confirm the channel exists and is reachable with the current
    /// credentials.
    async fn resolve_channel(&self, channel_id: u64) -> anyhow::Result<()>;

    /// Create a message in the channel. Returns the platform-assigned id of
    /// the new message.
    async fn send_message(&self, channel_id: u64, payload: &MessagePayload)
        -> anyhow::Result<u64>;

    /// Confirm a previously sent message still exists (it may have been
    /// deleted out-of-band).
    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> anyhow::Result<()>;

    /// Replace the content of a previously sent message.
    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        payload: &MessagePayload,
    ) -> anyhow::Result<()>;
}
