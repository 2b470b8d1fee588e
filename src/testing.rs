//! Test infrastructure: a scripted transport with a call log, plus message
//! builders shared by the unit and integration tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::relay::{MessagePayload, SourceMessage};
use crate::traits::RelayTransport;

/// A recorded call against the mock transport, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    ResolveChannel {
        channel_id: u64,
    },
    Send {
        channel_id: u64,
        payload: MessagePayload,
    },
    Fetch {
        channel_id: u64,
        message_id: u64,
    },
    Edit {
        channel_id: u64,
        message_id: u64,
        payload: MessagePayload,
    },
}

/// Scriptable `RelayTransport` that records every call. Set the `fail_*`
/// flags to make the corresponding call return an error.
pub struct MockTransport {
    calls: Mutex<Vec<TransportCall>>,
    next_message_id: AtomicU64,
    pub fail_resolve: AtomicBool,
    pub fail_send: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_edit: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicU64::new(9000),
            fail_resolve: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            fail_edit: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads passed to `send_message`, in send order.
    pub fn sent_payloads(&self) -> Vec<MessagePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Send { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Payloads passed to `edit_message`, in edit order.
    pub fn edited_payloads(&self) -> Vec<MessagePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Edit { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn log(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RelayTransport for MockTransport {
    async fn resolve_channel(&self, channel_id: u64) -> anyhow::Result<()> {
        self.log(TransportCall::ResolveChannel { channel_id });
        if self.fail_resolve.load(Ordering::SeqCst) {
            anyhow::bail!("simulated channel resolution failure");
        }
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: u64,
        payload: &MessagePayload,
    ) -> anyhow::Result<u64> {
        self.log(TransportCall::Send {
            channel_id,
            payload: payload.clone(),
        });
        if self.fail_send.load(Ordering::SeqCst) {
            anyhow::bail!("simulated send failure");
        }
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> anyhow::Result<()> {
        self.log(TransportCall::Fetch {
            channel_id,
            message_id,
        });
        if self.fail_fetch.load(Ordering::SeqCst) {
            anyhow::bail!("simulated fetch failure");
        }
        Ok(())
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        payload: &MessagePayload,
    ) -> anyhow::Result<()> {
        self.log(TransportCall::Edit {
            channel_id,
            message_id,
            payload: payload.clone(),
        });
        if self.fail_edit.load(Ordering::SeqCst) {
            anyhow::bail!("simulated edit failure");
        }
        Ok(())
    }
}

/// Plain text message with no embeds or attachments.
pub fn source_message(id: u64, channel_id: u64, content: &str) -> SourceMessage {
    SourceMessage {
        id,
        channel_id,
        author: "tester".to_string(),
        content: content.to_string(),
        embeds: Vec::new(),
        attachments: Vec::new(),
    }
}
