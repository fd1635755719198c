use std::{collections::HashSet, io, path::Path};

use {
    relay_config::{DestinationConfig, RelayConfig},
    tracing::{error, info, warn},
};

use crate::error::{Error, Result};

/// One destination: who it wants and where to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    name: String,
    identifiers: HashSet<String>,
    targets: Vec<String>,
}

impl RuleSet {
    /// Identifiers are trimmed and lowercased; blanks are dropped.
    pub fn new<I, S>(name: impl Into<String>, identifiers: I, targets: Vec<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            identifiers: identifiers
                .into_iter()
                .filter_map(|id| normalize(id.as_ref()))
                .collect(),
            targets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifiers(&self) -> &HashSet<String> {
        &self.identifiers
    }

    /// Webhook URLs in delivery order. May contain duplicates.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// `token` must already be lowercase.
    pub fn matches(&self, token: &str) -> bool {
        self.identifiers.contains(token)
    }

    /// A rule set without targets still matches but never delivers.
    pub fn is_deliverable(&self) -> bool {
        !self.targets.is_empty()
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// All destinations, in registration order. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Vec<RuleSet>,
}

impl Registry {
    /// Fails if two rule sets share a name.
    pub fn new(rules: Vec<RuleSet>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(Error::DuplicateDestination {
                    name: rule.name().to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(RuleSet::name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse a newline-delimited identifier list.
pub fn parse_identifiers(text: &str) -> HashSet<String> {
    text.lines().filter_map(normalize).collect()
}

/// Read an identifier list file.
pub fn load_identifiers(path: &Path) -> io::Result<HashSet<String>> {
    std::fs::read_to_string(path).map(|text| parse_identifiers(&text))
}

/// Build the registry from configuration. Called once at startup.
///
/// A destination whose list cannot be read is registered with no identifiers;
/// one without webhooks is registered with no targets. Both are logged and
/// neither stops the other destinations from loading.
pub fn build_registry(config: &RelayConfig) -> Result<Registry> {
    let rules = config
        .destinations
        .iter()
        .map(|dest| RuleSet {
            name: dest.name.clone(),
            identifiers: identifiers_for(dest),
            targets: targets_for(dest),
        })
        .collect();
    Registry::new(rules)
}

fn identifiers_for(dest: &DestinationConfig) -> HashSet<String> {
    let Some(path) = dest.list_path.as_deref() else {
        warn!(
            destination = %dest.name,
            "found {} but no corresponding {}",
            dest.webhook_var(),
            dest.list_var()
        );
        return HashSet::new();
    };

    match load_identifiers(path) {
        Ok(identifiers) => {
            info!(
                destination = %dest.name,
                path = %path.display(),
                count = identifiers.len(),
                "loaded identifier list"
            );
            identifiers
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(destination = %dest.name, path = %path.display(), "identifier list not found");
            HashSet::new()
        },
        Err(e) => {
            error!(
                destination = %dest.name,
                path = %path.display(),
                error = %e,
                "failed to read identifier list"
            );
            HashSet::new()
        },
    }
}

fn targets_for(dest: &DestinationConfig) -> Vec<String> {
    let targets = dest.webhooks.clone().unwrap_or_default();
    if targets.is_empty() {
        warn!(
            destination = %dest.name,
            "no webhook URL in {}, destination is configured but non-deliverable",
            dest.webhook_var()
        );
    }
    targets
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret, std::path::PathBuf};

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config(destinations: Vec<DestinationConfig>) -> RelayConfig {
        RelayConfig {
            token: Secret::new("tok".into()),
            source_channel_id: 1,
            delivery_timeout_secs: 30,
            destinations,
        }
    }

    fn dest(
        name: &str,
        webhooks: Option<Vec<&str>>,
        list_path: Option<PathBuf>,
    ) -> DestinationConfig {
        DestinationConfig {
            name: name.into(),
            webhooks: webhooks.map(|w| w.into_iter().map(String::from).collect()),
            list_path,
        }
    }

    #[test]
    fn list_is_normalized() {
        assert_eq!(parse_identifiers("Foo\nfoo\n\n  Bar  \n"), set(&["foo", "bar"]));
    }

    #[test]
    fn list_handles_crlf_and_whitespace_lines() {
        assert_eq!(parse_identifiers("Alpha\r\n   \r\nBETA\r\n"), set(&["alpha", "beta"]));
    }

    #[test]
    fn list_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "Foo\nfoo\n\n  Bar  \n").unwrap();
        assert_eq!(load_identifiers(&path).unwrap(), set(&["foo", "bar"]));
    }

    #[test]
    fn rule_set_normalizes_identifiers() {
        let rule = RuleSet::new("A", [" Foo ", "", "BAR"], Vec::new());
        assert_eq!(rule.identifiers(), &set(&["foo", "bar"]));
        assert!(rule.matches("foo"));
        assert!(!rule.matches("Foo"));
        assert!(!rule.is_deliverable());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Registry::new(vec![
            RuleSet::new("A", ["foo"], Vec::new()),
            RuleSet::new("A", ["bar"], Vec::new()),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateDestination { name } if name == "A"));
    }

    #[test]
    fn shared_identifiers_are_allowed() {
        let registry = Registry::new(vec![
            RuleSet::new("A", ["foo"], Vec::new()),
            RuleSet::new("B", ["foo"], Vec::new()),
        ])
        .unwrap();
        assert_eq!(registry.names(), vec!["A", "B"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn builds_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let alpha = dir.path().join("alpha.txt");
        std::fs::write(&alpha, "Foo\nBar\n").unwrap();

        let registry = build_registry(&config(vec![
            dest(
                "ALPHA",
                Some(vec!["https://a.example/1", "https://a.example/1"]),
                Some(alpha),
            ),
            dest("BRAVO", Some(vec!["https://b.example/1"]), None),
            dest(
                "CHARLIE",
                Some(vec!["https://c.example/1"]),
                Some(dir.path().join("missing.txt")),
            ),
            dest("DELTA", None, None),
        ]))
        .unwrap();

        assert_eq!(registry.names(), vec!["ALPHA", "BRAVO", "CHARLIE", "DELTA"]);

        let alpha = registry.get("ALPHA").unwrap();
        assert_eq!(alpha.identifiers(), &set(&["foo", "bar"]));
        assert_eq!(alpha.targets().len(), 2);

        assert!(registry.get("BRAVO").unwrap().identifiers().is_empty());
        assert!(registry.get("CHARLIE").unwrap().identifiers().is_empty());

        let delta = registry.get("DELTA").unwrap();
        assert!(!delta.is_deliverable());
    }

    #[test]
    fn unreadable_list_degrades() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let registry = build_registry(&config(vec![dest(
            "ALPHA",
            Some(vec!["https://a.example/1"]),
            Some(dir.path().to_path_buf()),
        )]))
        .unwrap();
        assert!(registry.get("ALPHA").unwrap().identifiers().is_empty());
    }
}
