use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::relay::payload::{MessagePayload, SourceMessage};
use crate::relay::store::ForwardStore;
use crate::traits::RelayTransport;

/// Why a relay operation failed, named after the outbound call that
/// produced it. The handler logs one line and moves on; there is no retry
/// path for any of these.
#[derive(Debug)]
pub enum RelayError {
    ChannelResolution(anyhow::Error),
    Send(anyhow::Error),
    Fetch(anyhow::Error),
    Edit(anyhow::Error),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::ChannelResolution(e) => {
                write!(f, "target channel resolution failed: {}", e)
            }
            RelayError::Send(e) => write!(f, "send to target channel failed: {}", e),
            RelayError::Fetch(e) => write!(f, "fetch of forwarded message failed: {}", e),
            RelayError::Edit(e) => write!(f, "edit of forwarded message failed: {}", e),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::ChannelResolution(e)
            | RelayError::Send(e)
            | RelayError::Fetch(e)
            | RelayError::Edit(e) => Some(e.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Forwarded { forwarded_id: u64 },
    /// The message was posted outside the source channel; nothing happened.
    NotSourceChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated { forwarded_id: u64 },
    /// The edit happened outside the source channel; nothing happened.
    NotSourceChannel,
    /// No forward record for this source message (never forwarded, evicted,
    /// or the process restarted). Not an error; zero outbound calls.
    NotTracked,
}

/// Mirrors creation and edits of source-channel messages into the target
/// channel. The only state transition per source message is unforwarded →
/// forwarded; after that, edits re-render the forwarded copy in place.
pub struct RelayEngine {
    transport: Arc<dyn RelayTransport>,
    store: Arc<ForwardStore>,
    source_channel_id: u64,
    target_channel_id: u64,
}

impl RelayEngine {
    pub fn new(
        transport: Arc<dyn RelayTransport>,
        store: Arc<ForwardStore>,
        source_channel_id: u64,
        target_channel_id: u64,
    ) -> Self {
        Self {
            transport,
            store,
            source_channel_id,
            target_channel_id,
        }
    }

    pub fn source_channel_id(&self) -> u64 {
        self.source_channel_id
    }

    /// Forward a newly created source-channel message into the target
    /// channel and remember the id pair for later edit relays.
    pub async fn on_message_created(
        &self,
        msg: &SourceMessage,
    ) -> Result<ForwardOutcome, RelayError> {
        if msg.channel_id != self.source_channel_id {
            return Ok(ForwardOutcome::NotSourceChannel);
        }

        info!(
            source_id = msg.id,
            author = %msg.author,
            "Forwarding message from source channel"
        );

        self.transport
            .resolve_channel(self.target_channel_id)
            .await
            .map_err(RelayError::ChannelResolution)?;

        let payload = MessagePayload::from_source(msg);
        let forwarded_id = self
            .transport
            .send_message(self.target_channel_id, &payload)
            .await
            .map_err(RelayError::Send)?;

        self.store.record(msg.id, forwarded_id);
        info!(
            source_id = msg.id,
            forwarded_id,
            tracked = self.store.len(),
            "Message forwarded to target channel"
        );
        Ok(ForwardOutcome::Forwarded { forwarded_id })
    }

    /// Relay an edit of a previously forwarded message. Edits are filtered
    /// by source channel only; text-unchanged edits still relay so embed and
    /// attachment changes propagate.
    pub async fn on_message_edited(
        &self,
        msg: &SourceMessage,
    ) -> Result<EditOutcome, RelayError> {
        if msg.channel_id != self.source_channel_id {
            return Ok(EditOutcome::NotSourceChannel);
        }

        let Some(forwarded_id) = self.store.lookup(msg.id) else {
            return Ok(EditOutcome::NotTracked);
        };

        self.transport
            .resolve_channel(self.target_channel_id)
            .await
            .map_err(RelayError::ChannelResolution)?;

        let payload = MessagePayload::from_source(msg);
        self.transport
            .fetch_message(self.target_channel_id, forwarded_id)
            .await
            .map_err(RelayError::Fetch)?;
        self.transport
            .edit_message(self.target_channel_id, forwarded_id, &payload)
            .await
            .map_err(RelayError::Edit)?;

        info!(
            source_id = msg.id,
            forwarded_id, "Forwarded message updated"
        );
        Ok(EditOutcome::Updated { forwarded_id })
    }
}
