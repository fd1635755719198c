//! Match-and-fan-out routing.
//!
//! An inbound message is searched for a `Bot <name> has successfully` line.
//! The lowercased name is looked up in every destination's identifier set,
//! and each destination that contains it gets the message on all of its
//! webhook targets. One name may match several destinations.

pub mod error;
pub mod extract;
pub mod registry;
pub mod router;

pub use {
    error::{Error, Result},
    extract::{extract, find_token},
    registry::{Registry, RuleSet, build_registry},
    router::{RouteOutcome, Router},
};
