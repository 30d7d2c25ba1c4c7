//! Configuration file support for matchsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `MATCHSYNC_`, sections separated by
//!    `__`, e.g., `MATCHSYNC_RIOT__API_KEY`)
//! 3. Config file (./matchsync.toml, then ~/.config/matchsync/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [player]
//! puuid = "..."          # needed by the riot provider
//! game_name = "Faker"    # needed by opgg; used by every provider to find you in a match
//! tag_line = "KR1"
//!
//! [riot]
//! api_key = "RGAPI-..."  # or use MATCHSYNC_RIOT__API_KEY
//!
//! [opgg]
//! region = "eune"
//!
//! [lcu]
//! lockfile = "/Applications/League of Legends.app/Contents/LoL/lockfile"
//! platform_id = "EUN1"
//!
//! [clockify]
//! api_token = "..."      # or use MATCHSYNC_CLOCKIFY__API_TOKEN
//! project_name = "League of Legends"
//!
//! [sync]
//! days = 7
//! create_delay_ms = 0
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use matchsync::retry::DEFAULT_MAX_ATTEMPTS;
use matchsync::sync::{DEFAULT_CREATION_COOLDOWN_MS, DEFAULT_PAGE_SIZE, DEFAULT_SYNC_DAYS};
use matchsync::{PlayerIdentity, RetryConfig, RiotId, SyncOptions};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing {key} (set it in config.toml or via {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{key} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        source: url::ParseError,
    },
}

/// Which upstream provider a run reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Riot,
    Opgg,
    Lcu,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Riot => write!(f, "Riot API"),
            Self::Opgg => write!(f, "OP.GG"),
            Self::Lcu => write!(f, "League client"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub riot: RiotConfig,
    pub opgg: OpggConfig,
    pub lcu: LcuConfig,
    pub clockify: ClockifyConfig,
    pub sync: SyncConfig,
}

/// The player whose matches are synced.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub puuid: Option<String>,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

/// Riot API configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RiotConfig {
    /// Development or production API key.
    pub api_key: Option<String>,
    /// Regional routing host. Defaults to the Europe host.
    pub base_url: Option<String>,
}

/// OP.GG configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OpggConfig {
    pub region: String,
    /// MCP endpoint. Defaults to the public OP.GG server.
    pub endpoint: Option<String>,
}

impl Default for OpggConfig {
    fn default() -> Self {
        Self {
            region: "eune".to_string(),
            endpoint: None,
        }
    }
}

/// League client configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LcuConfig {
    /// Lock file path. Defaults to the standard install location.
    pub lockfile: Option<PathBuf>,
    /// Platform prefix for match ids.
    pub platform_id: String,
    /// Number of recent games to request.
    pub match_count: usize,
}

impl Default for LcuConfig {
    fn default() -> Self {
        Self {
            lockfile: None,
            platform_id: "EUN1".to_string(),
            match_count: 50,
        }
    }
}

/// Clockify configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClockifyConfig {
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    /// Project new entries are filed under. Entries have no project when unset.
    pub project_name: Option<String>,
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Window size in days, ending now.
    pub days: u32,
    /// Wait after each created entry.
    pub create_delay_ms: u64,
    /// Wait after a creation was throttled.
    pub creation_cooldown_ms: u64,
    /// Attempts per upstream request before giving up on throttling.
    pub max_attempts: u32,
    /// Match ids requested per listing page (Riot only).
    pub page_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_SYNC_DAYS,
            create_delay_ms: 0,
            creation_cooldown_ms: DEFAULT_CREATION_COOLDOWN_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        })
    }
}

fn check_url(key: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(value) => url::Url::parse(value)
            .map(|_| ())
            .map_err(|source| ConfigError::InvalidUrl {
                key,
                value: value.to_string(),
                source,
            }),
        None => Ok(()),
    }
}

fn require(
    value: Option<&String>,
    key: &'static str,
    env: &'static str,
) -> Result<(), ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Missing { key, env }),
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/matchsync/config.toml)
    /// 3. Local config file (./matchsync.toml)
    /// 4. Environment variables with MATCHSYNC_ prefix
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("matchsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./matchsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., MATCHSYNC_CLOCKIFY__API_TOKEN -> clockify.api_token
        builder = builder.add_source(Self::environment());

        Ok(builder.build()?.try_deserialize()?)
    }

    fn environment() -> Environment {
        Environment::with_prefix("MATCHSYNC")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "matchsync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check everything a run against `provider` needs, once, before any request.
    pub fn validate_for(&self, provider: Provider) -> Result<(), ConfigError> {
        check_range("sync.days", u64::from(self.sync.days), 1, 3650)?;
        check_range("sync.create_delay_ms", self.sync.create_delay_ms, 0, 10_000)?;
        check_range("sync.creation_cooldown_ms", self.sync.creation_cooldown_ms, 0, 60_000)?;
        check_range("sync.max_attempts", u64::from(self.sync.max_attempts), 1, 10)?;

        require(
            self.clockify.api_token.as_ref(),
            "clockify.api_token",
            "MATCHSYNC_CLOCKIFY__API_TOKEN",
        )?;
        check_url("clockify.base_url", self.clockify.base_url.as_deref())?;

        match provider {
            Provider::Riot => {
                require(self.riot.api_key.as_ref(), "riot.api_key", "MATCHSYNC_RIOT__API_KEY")?;
                require(self.player.puuid.as_ref(), "player.puuid", "MATCHSYNC_PLAYER__PUUID")?;
                check_range("sync.page_size", self.sync.page_size as u64, 1, 100)?;
                check_url("riot.base_url", self.riot.base_url.as_deref())?;
            }
            Provider::Opgg => {
                self.require_riot_id()?;
                check_url("opgg.endpoint", self.opgg.endpoint.as_deref())?;
            }
            Provider::Lcu => {
                if self.player.puuid.is_none() {
                    self.require_riot_id()?;
                }
                check_range("lcu.match_count", self.lcu.match_count as u64, 1, 200)?;
            }
        }
        Ok(())
    }

    fn require_riot_id(&self) -> Result<(), ConfigError> {
        require(
            self.player.game_name.as_ref(),
            "player.game_name",
            "MATCHSYNC_PLAYER__GAME_NAME",
        )?;
        require(
            self.player.tag_line.as_ref(),
            "player.tag_line",
            "MATCHSYNC_PLAYER__TAG_LINE",
        )
    }

    /// The configured player, by PUUID and/or Riot ID.
    pub fn player_identity(&self) -> PlayerIdentity {
        let riot_id = match (&self.player.game_name, &self.player.tag_line) {
            (Some(name), Some(tag)) => Some(RiotId::new(name.trim(), tag.trim())),
            _ => None,
        };
        match (&self.player.puuid, riot_id) {
            (Some(puuid), Some(riot_id)) => PlayerIdentity::from_puuid(puuid).with_riot_id(riot_id),
            (Some(puuid), None) => PlayerIdentity::from_puuid(puuid),
            (None, Some(riot_id)) => PlayerIdentity::from_riot_id(riot_id),
            (None, None) => PlayerIdentity::default(),
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default().with_max_attempts(self.sync.max_attempts)
    }

    pub fn sync_options(&self, dry_run: bool) -> SyncOptions {
        SyncOptions {
            create_delay: Duration::from_millis(self.sync.create_delay_ms),
            creation_cooldown: Duration::from_millis(self.sync.creation_cooldown_ms),
            dry_run,
        }
    }
}
