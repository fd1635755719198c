use crate::plugin::InboundEvent;

/// Admission check applied before any extraction work.
///
/// Only messages from the configured source channel that were not written by
/// the relay itself are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFilter {
    channel_id: u64,
}

impl SourceFilter {
    pub fn new(channel_id: u64) -> Self {
        Self { channel_id }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Check if an event should be routed at all.
    pub fn admits(&self, event: &InboundEvent) -> bool {
        !event.author_is_self && event.channel_id == self.channel_id
    }
}
