//! Configuration loading and validation.
//!
//! Everything comes from the process environment (optionally seeded from a
//! `.env` file): the bot token, the source channel, and one destination per
//! `WEBHOOK_<NAME>` / `LIST_<NAME>` pair.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{default_base_dir, from_env, from_vars, load_env_file},
    schema::{DestinationConfig, RelayConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
