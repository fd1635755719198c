//! `relay doctor` — configuration and identifier list audit.
//!
//! Loads the same configuration `relay run` would, builds the routing table,
//! and prints a report with `[ok]`, `[warn]`, `[fail]` or `[info]` per item.
//! Nothing connects to Discord.

use std::path::Path;

use {
    anyhow::Result,
    relay_config::{
        RelayConfig,
        validate::{self, Severity, ValidationResult},
    },
    relay_routing::Registry,
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Fail,
            Severity::Warning => Self::Warn,
            Severity::Info => Self::Info,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

// ── Printing ────────────────────────────────────────────────────────────────

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Print the report and return `(errors, warnings)`.
pub fn handle_doctor(base_dir: &Path) -> Result<(usize, usize)> {
    eprintln!("{BOLD}relay doctor{RESET}");
    eprintln!("{BOLD}============{RESET}\n");

    let mut sections = Vec::new();

    match relay_config::from_env(base_dir) {
        Ok(config) => {
            sections.push(check_environment(&config, base_dir));
            let result = validate::validate(&config);
            let registry = relay_routing::build_registry(&config)?;
            sections.push(check_destinations(&config, &registry, &result));
        },
        Err(e) => {
            let mut section = Section::new("Environment");
            section.push(Status::Fail, e.to_string());
            sections.push(section);
        },
    }

    let (errors, warnings) = print_report(&sections);

    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    Ok((errors, warnings))
}

// ── 1. Environment ──────────────────────────────────────────────────────────

fn check_environment(config: &RelayConfig, base_dir: &Path) -> Section {
    let mut section = Section::new("Environment");
    section.push(Status::Ok, "DISCORD_BOT_TOKEN is set");
    section.push(
        Status::Ok,
        format!("source channel: {}", config.source_channel_id),
    );
    section.push(
        Status::Info,
        format!("relative list paths resolve against {}", base_dir.display()),
    );
    section.push(
        Status::Info,
        format!("webhook timeout: {}s", config.delivery_timeout_secs),
    );
    section
}

// ── 2. Destinations ─────────────────────────────────────────────────────────

fn check_destinations(
    config: &RelayConfig,
    registry: &Registry,
    result: &ValidationResult,
) -> Section {
    let mut section = Section::new(format!("Destinations ({})", registry.len()));

    for d in result.for_path("WEBHOOK_*") {
        section.push(d.severity.into(), d.message.clone());
    }

    for dest in &config.destinations {
        let list_var = dest.list_var();
        let webhook_var = dest.webhook_var();
        let mut problems = result
            .for_path(&list_var)
            .chain(result.for_path(&webhook_var))
            .peekable();

        if problems.peek().is_none()
            && let Some(rule) = registry.get(&dest.name)
        {
            section.push(
                Status::Ok,
                format!(
                    "{}: {} identifier(s), {} webhook(s)",
                    dest.name,
                    rule.identifiers().len(),
                    rule.targets().len()
                ),
            );
            continue;
        }

        for d in problems {
            section.push(d.severity.into(), format!("{}: {}", d.path, d.message));
        }
    }

    section
}
