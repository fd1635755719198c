//! Configuration audit.
//!
//! Nothing found here stops the relay from starting: a destination with a
//! missing list or webhook is registered in degraded form. The diagnostics
//! exist so the operator finds out before a message silently goes nowhere.

use crate::schema::{DestinationConfig, RelayConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "destinations", "missing-list", "file-ref", "missing-webhook",
    /// "invalid-url"
    pub category: &'static str,
    /// Variable the diagnostic refers to, e.g. "LIST_ALPHA"
    pub path: String,
    pub message: String,
}

/// Result of validating a loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Diagnostics attached to one variable.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.path == path)
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Audit a loaded configuration.
pub fn validate(config: &RelayConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.destinations.is_empty() {
        result.push(
            Severity::Warning,
            "destinations",
            "WEBHOOK_*",
            "no destinations configured, nothing will be relayed",
        );
    }

    for dest in &config.destinations {
        check_list(dest, &mut result);
        check_webhooks(dest, &mut result);
    }

    result
}

fn check_list(dest: &DestinationConfig, result: &mut ValidationResult) {
    let var = dest.list_var();
    match &dest.list_path {
        None => result.push(
            Severity::Warning,
            "missing-list",
            var,
            format!(
                "destination {} has no identifier list and will never match",
                dest.name
            ),
        ),
        Some(path) if !path.is_file() => result.push(
            Severity::Warning,
            "file-ref",
            var,
            format!("identifier list not found: {}", path.display()),
        ),
        Some(_) => {},
    }
}

fn check_webhooks(dest: &DestinationConfig, result: &mut ValidationResult) {
    let var = dest.webhook_var();
    let Some(webhooks) = dest.webhooks.as_deref() else {
        result.push(
            Severity::Warning,
            "missing-webhook",
            var,
            format!(
                "destination {} is configured but non-deliverable: variable not set",
                dest.name
            ),
        );
        return;
    };

    if webhooks.is_empty() {
        result.push(
            Severity::Warning,
            "missing-webhook",
            var,
            format!(
                "destination {} is configured but non-deliverable: no URLs listed",
                dest.name
            ),
        );
        return;
    }

    for (index, raw) in webhooks.iter().enumerate() {
        // URLs embed a secret, so report positions rather than values.
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {},
            Ok(parsed) => result.push(
                Severity::Error,
                "invalid-url",
                var.clone(),
                format!(
                    "webhook #{} uses unsupported scheme {:?}",
                    index + 1,
                    parsed.scheme()
                ),
            ),
            Err(e) => result.push(
                Severity::Error,
                "invalid-url",
                var.clone(),
                format!("webhook #{} is not a valid URL: {e}", index + 1),
            ),
        }
    }
}
