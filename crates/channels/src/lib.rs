//! Channel-agnostic relay types.
//!
//! The ingress adapter turns platform messages into [`InboundEvent`]s, the
//! router decides where they go, and a [`DeliverySink`] carries the original
//! [`DeliveryPayload`] out to each webhook target.

pub mod gating;
pub mod plugin;

pub use {
    gating::SourceFilter,
    plugin::{DeliveryPayload, DeliverySink, InboundEvent, RichContent, RichField},
};
