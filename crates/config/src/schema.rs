use std::path::PathBuf;

use secrecy::Secret;

/// Default per-request webhook timeout.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Process-wide relay configuration, loaded once at startup.
pub struct RelayConfig {
    /// Discord bot token.
    pub token: Secret<String>,

    /// The only channel whose messages are relayed.
    pub source_channel_id: u64,

    /// Upper bound on a single webhook request.
    pub delivery_timeout_secs: u64,

    /// Destinations sorted by name.
    pub destinations: Vec<DestinationConfig>,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("token", &"[REDACTED]")
            .field("source_channel_id", &self.source_channel_id)
            .field("delivery_timeout_secs", &self.delivery_timeout_secs)
            .field("destinations", &self.destinations)
            .finish()
    }
}

/// One named destination as found in the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    /// Suffix shared by `WEBHOOK_<NAME>` and `LIST_<NAME>`.
    pub name: String,

    /// Trimmed, non-empty webhook URLs. `None` when `WEBHOOK_<NAME>` is absent.
    pub webhooks: Option<Vec<String>>,

    /// Resolved identifier list path. `None` when `LIST_<NAME>` is absent.
    pub list_path: Option<PathBuf>,
}

impl DestinationConfig {
    pub fn webhook_var(&self) -> String {
        format!("WEBHOOK_{}", self.name)
    }

    pub fn list_var(&self) -> String {
        format!("LIST_{}", self.name)
    }
}

// Webhook URLs carry a secret token in their path.
impl std::fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("name", &self.name)
            .field("webhooks", &self.webhooks.as_ref().map(Vec::len))
            .field("list_path", &self.list_path)
            .finish()
    }
}
