//! Discord side of the relay.
//!
//! Uses serenity to receive messages from the gateway and plain webhook
//! POSTs (reqwest) to deliver them.

pub mod bot;
pub mod convert;
pub mod error;
pub mod handler;
pub mod outbound;

pub use {
    bot::run,
    error::{Error, Result},
    handler::RelayHandler,
    outbound::WebhookSink,
};
