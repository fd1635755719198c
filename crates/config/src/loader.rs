use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    schema::{DEFAULT_DELIVERY_TIMEOUT_SECS, DestinationConfig, RelayConfig},
};

pub const TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";
pub const SOURCE_CHANNEL_VAR: &str = "SOURCE_CHANNEL_ID";
pub const DELIVERY_TIMEOUT_VAR: &str = "RELAY_DELIVERY_TIMEOUT_SECS";
pub const WEBHOOK_PREFIX: &str = "WEBHOOK_";
pub const LIST_PREFIX: &str = "LIST_";

/// Seed the process environment from an env file.
///
/// Variables already set in the environment win. Returns `false` when the
/// file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "loaded env file");
            Ok(true)
        },
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "no env file found");
            Ok(false)
        },
        Err(source) => Err(Error::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Directory relative list paths are resolved against: the directory holding
/// the running executable, falling back to the working directory.
pub fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load config from the process environment.
pub fn from_env(base_dir: &Path) -> Result<RelayConfig> {
    let vars = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
    from_vars(vars, base_dir)
}

/// Build config from an explicit set of variables.
///
/// This is the implementation behind [`from_env`]; taking the variables as an
/// iterator keeps it testable without touching the process environment.
pub fn from_vars(
    vars: impl IntoIterator<Item = (String, String)>,
    base_dir: &Path,
) -> Result<RelayConfig> {
    let vars: BTreeMap<String, String> = vars.into_iter().collect();

    let token = vars
        .get(TOKEN_VAR)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::missing(TOKEN_VAR))?;

    let source_channel_id = parse_u64(&vars, SOURCE_CHANNEL_VAR)?
        .ok_or_else(|| Error::missing(SOURCE_CHANNEL_VAR))?;

    let delivery_timeout_secs =
        match parse_u64(&vars, DELIVERY_TIMEOUT_VAR)?.unwrap_or(DEFAULT_DELIVERY_TIMEOUT_SECS) {
            0 => {
                return Err(Error::ZeroDuration {
                    var: DELIVERY_TIMEOUT_VAR,
                });
            },
            secs => secs,
        };

    Ok(RelayConfig {
        token: Secret::new(token.to_string()),
        source_channel_id,
        delivery_timeout_secs,
        destinations: collect_destinations(&vars, base_dir),
    })
}

fn parse_u64(vars: &BTreeMap<String, String>, var: &'static str) -> Result<Option<u64>> {
    let Some(raw) = vars.get(var).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    raw.parse()
        .map(Some)
        .map_err(|source| Error::InvalidInteger {
            var,
            value: raw.to_string(),
            source,
        })
}

/// One destination per distinct `<NAME>` seen in either a `WEBHOOK_` or a
/// `LIST_` variable, in name order.
fn collect_destinations(
    vars: &BTreeMap<String, String>,
    base_dir: &Path,
) -> Vec<DestinationConfig> {
    let mut destinations: BTreeMap<&str, DestinationConfig> = BTreeMap::new();

    for (key, value) in vars {
        if let Some(name) = key.strip_prefix(WEBHOOK_PREFIX) {
            if name.is_empty() {
                warn!(var = %key, "ignoring webhook variable without a destination name");
                continue;
            }
            entry(&mut destinations, name).webhooks = Some(parse_webhook_list(value));
        } else if let Some(name) = key.strip_prefix(LIST_PREFIX) {
            if name.is_empty() {
                warn!(var = %key, "ignoring list variable without a destination name");
                continue;
            }
            let raw = value.trim();
            let dest = entry(&mut destinations, name);
            if raw.is_empty() {
                warn!(var = %key, "list variable is blank, destination will never match");
            } else {
                dest.list_path = Some(resolve_list_path(raw, base_dir));
            }
        }
    }

    destinations.into_values().collect()
}

fn entry<'m, 'a>(
    destinations: &'m mut BTreeMap<&'a str, DestinationConfig>,
    name: &'a str,
) -> &'m mut DestinationConfig {
    destinations
        .entry(name)
        .or_insert_with(|| DestinationConfig {
            name: name.to_string(),
            webhooks: None,
            list_path: None,
        })
}

/// Split a comma-separated URL list, trimming entries and dropping blanks.
pub fn parse_webhook_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}

/// Absolute paths are kept; relative paths are joined onto `base_dir`.
pub fn resolve_list_path(raw: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
