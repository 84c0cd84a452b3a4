//! Configuration loading for the record-store reader
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`AGORA_*`)
//! 3. TOML config file
//! 4. Compiled default, for the settings that have one
//!
//! Required settings with no value in any tier are collected and reported
//! together as a single [`Error::Config`] before anything is served.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5730";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_FORWARD_FIELD: &str = "Viewpoints";
pub const DEFAULT_BACK_REFERENCE_FIELD: &str = "Topic";

const CONFIG_DIR_NAME: &str = "agora";
const CONFIG_FILE_NAME: &str = "agora-reader.toml";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional here; requiredness is enforced by
/// [`StoreSettings::resolve`] once all tiers have been consulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub base_id: Option<String>,
    #[serde(default)]
    pub topics_table: Option<String>,
    #[serde(default)]
    pub viewpoints_table: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Record store root URL (default https://api.airtable.com)
    #[serde(default)]
    pub api_url: Option<String>,
    /// Named store view listing topics newest-first
    #[serde(default)]
    pub newest_view: Option<String>,
    /// Explicit sort for topic listing
    #[serde(default)]
    pub sort: Option<SortConfig>,
    /// Revalidation window in seconds
    #[serde(default)]
    pub revalidate_secs: Option<u64>,
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub linkage: Option<LinkageConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// `[sort]` table in the TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct SortConfig {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// `[linkage]` table in the TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct LinkageConfig {
    /// "forward" or "back_reference"
    pub strategy: String,
    #[serde(default)]
    pub field: Option<String>,
}

/// Sort direction understood by the record store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::Config(format!(
                "Invalid sort direction '{}', expected 'asc' or 'desc'",
                other
            ))),
        }
    }
}

/// Single-field sort sent as `sort[0][field]` / `sort[0][direction]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// How a topic's viewpoints are linked in the store
///
/// Chosen once per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkageStrategy {
    /// The topic record lists its viewpoint ids in `field`
    ForwardRefs { field: String },
    /// Each viewpoint record names its owning topic id in `field`
    BackReference { field: String },
}

impl LinkageStrategy {
    /// Parse a strategy name with an optional field override
    pub fn parse(strategy: &str, field: Option<String>) -> Result<Self> {
        let field = field.filter(|f| is_present(f));
        match strategy.trim().to_ascii_lowercase().as_str() {
            "forward" | "forward_refs" => Ok(LinkageStrategy::ForwardRefs {
                field: field.unwrap_or_else(|| DEFAULT_FORWARD_FIELD.to_string()),
            }),
            "back_reference" | "back-reference" | "backref" => Ok(LinkageStrategy::BackReference {
                field: field.unwrap_or_else(|| DEFAULT_BACK_REFERENCE_FIELD.to_string()),
            }),
            other => Err(Error::Config(format!(
                "Unknown linkage strategy '{}', expected 'forward' or 'back_reference'",
                other
            ))),
        }
    }

    /// Topic field holding forward viewpoint links, if this strategy uses one
    pub fn forward_field(&self) -> Option<&str> {
        match self {
            LinkageStrategy::ForwardRefs { field } => Some(field),
            LinkageStrategy::BackReference { .. } => None,
        }
    }
}

impl Default for LinkageStrategy {
    fn default() -> Self {
        LinkageStrategy::BackReference {
            field: DEFAULT_BACK_REFERENCE_FIELD.to_string(),
        }
    }
}

/// Maximum age of a fetched result before it must be treated as stale
///
/// Exposed to whatever caching layer sits in front of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevalidationWindow(Duration);

impl RevalidationWindow {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// Instant after which a result fetched at `fetched_at` is stale
    pub fn stale_after(&self, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.0)
            .ok()
            .and_then(|window| fetched_at.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_stale(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= self.stale_after(fetched_at)
    }

    /// `Cache-Control` header value for responses governed by this window
    pub fn cache_control(&self) -> String {
        match self.0.as_secs() {
            0 => "no-cache".to_string(),
            secs => format!("public, max-age={}", secs),
        }
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_id: Option<String>,
    pub topics_table: Option<String>,
    pub viewpoints_table: Option<String>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub newest_view: Option<String>,
    pub revalidate_secs: Option<u64>,
    pub linkage: Option<String>,
    pub link_field: Option<String>,
    pub bind_addr: Option<String>,
}

/// Fully resolved settings for the reader
///
/// Constructed once at startup and passed into the client and resolver.
#[derive(Clone)]
pub struct StoreSettings {
    pub api_url: String,
    pub base_id: String,
    pub topics_table: String,
    pub viewpoints_table: String,
    pub api_key: String,
    pub newest_view: Option<String>,
    pub sort: Option<SortSpec>,
    pub revalidation: RevalidationWindow,
    pub linkage: LinkageStrategy,
    pub bind_addr: String,
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("api_url", &self.api_url)
            .field("base_id", &self.base_id)
            .field("topics_table", &self.topics_table)
            .field("viewpoints_table", &self.viewpoints_table)
            .field("api_key", &"<redacted>")
            .field("newest_view", &self.newest_view)
            .field("sort", &self.sort)
            .field("revalidation", &self.revalidation)
            .field("linkage", &self.linkage)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl StoreSettings {
    /// Resolve settings from CLI overrides, environment and TOML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] listing every missing required setting,
    /// or describing the first malformed value.
    pub fn resolve(overrides: ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let mut missing = Vec::new();

        let mut required = |cli: Option<String>, env_name: &'static str, file: Option<&String>| {
            let value = pick(cli, env_name, file);
            if value.is_none() {
                missing.push(env_name);
            }
            value.unwrap_or_default()
        };

        let base_id = required(overrides.base_id, "AGORA_BASE_ID", toml.base_id.as_ref());
        let topics_table = required(
            overrides.topics_table,
            "AGORA_TOPICS_TABLE",
            toml.topics_table.as_ref(),
        );
        let viewpoints_table = required(
            overrides.viewpoints_table,
            "AGORA_VIEWPOINTS_TABLE",
            toml.viewpoints_table.as_ref(),
        );
        let api_key = required(overrides.api_key, "AGORA_API_KEY", toml.api_key.as_ref());

        let revalidate_secs = match overrides.revalidate_secs {
            Some(secs) => Some(secs),
            None => match env_value("AGORA_REVALIDATE_SECS") {
                Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                    Error::Config(format!("Invalid AGORA_REVALIDATE_SECS '{}': {}", raw, e))
                })?),
                None => toml.revalidate_secs,
            },
        };
        if revalidate_secs.is_none() {
            missing.push("AGORA_REVALIDATE_SECS");
        }

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing required settings: {}. Set them on the command line, in the environment, or in {}",
                missing.join(", "),
                CONFIG_FILE_NAME
            )));
        }

        let api_url = pick(overrides.api_url, "AGORA_API_URL", toml.api_url.as_ref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let newest_view = pick(
            overrides.newest_view,
            "AGORA_NEWEST_VIEW",
            toml.newest_view.as_ref(),
        );

        let sort = match env_value("AGORA_SORT_FIELD") {
            Some(field) => {
                let direction = match env_value("AGORA_SORT_DIRECTION") {
                    Some(raw) => SortDirection::parse(&raw)?,
                    None => SortDirection::default(),
                };
                Some(SortSpec { field, direction })
            }
            None => toml
                .sort
                .as_ref()
                .filter(|s| is_present(&s.field))
                .map(|s| SortSpec {
                    field: s.field.trim().to_string(),
                    direction: s.direction,
                }),
        };

        let link_field = overrides
            .link_field
            .filter(|f| is_present(f))
            .or_else(|| env_value("AGORA_LINK_FIELD"));
        let linkage = match overrides
            .linkage
            .filter(|s| is_present(s))
            .or_else(|| env_value("AGORA_LINKAGE"))
        {
            Some(strategy) => LinkageStrategy::parse(&strategy, link_field)?,
            None => match &toml.linkage {
                Some(cfg) => LinkageStrategy::parse(&cfg.strategy, link_field.or(cfg.field.clone()))?,
                None => match link_field {
                    Some(field) => LinkageStrategy::BackReference { field },
                    None => LinkageStrategy::default(),
                },
            },
        };

        let bind_addr = pick(overrides.bind_addr, "AGORA_BIND_ADDR", toml.bind_addr.as_ref())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            base_id,
            topics_table,
            viewpoints_table,
            api_key,
            newest_view,
            sort,
            revalidation: RevalidationWindow::from_secs(revalidate_secs.unwrap_or_default()),
            linkage,
            bind_addr,
        })
    }
}

impl TomlConfig {
    /// Log filter directive: command line, else `[logging] level`
    ///
    /// `RUST_LOG`, when set, still wins at subscriber initialization.
    pub fn log_level(&self, cli: Option<&str>) -> String {
        cli.filter(|l| is_present(l))
            .map(str::to_string)
            .unwrap_or_else(|| self.logging.level.clone())
    }

    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config {} failed: {}", path.display(), e)))?;
        let config = toml::from_str(&content)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config file, tolerating a missing default file
    ///
    /// An explicitly named file must exist. The platform default location is
    /// optional: when absent, a warning is logged and an empty config is
    /// returned.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                warn!(
                    "Config file not found at {}, relying on command line and environment",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, relying on command line and environment");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config file location (e.g. ~/.config/agora/agora-reader.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Non-blank value (blank or whitespace-only counts as missing)
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| is_present(v))
        .map(|v| v.trim().to_string())
}

fn pick(cli: Option<String>, env_name: &str, file: Option<&String>) -> Option<String> {
    cli.filter(|v| is_present(v))
        .map(|v| v.trim().to_string())
        .or_else(|| env_value(env_name))
        .or_else(|| {
            file.filter(|v| is_present(v))
                .map(|v| v.trim().to_string())
        })
}
