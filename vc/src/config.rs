//! Configuration types, loading and layering
//!
//! Values resolve with a fixed precedence: command-line flag, then
//! environment variable (both handled by clap), then the config file, then
//! the built-in default.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::client::{Credentials, DEFAULT_API_HOST, DEFAULT_AUTH_HOST};
use crate::output::OutputFormat;
use crate::search::SearchDefaults;

const APP_DIR: &str = "vantage-cli";
const CONFIG_FILE: &str = "config.toml";

/// Contents of the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account, credentials and hosts
    pub general: GeneralConfig,

    /// Per-command search defaults, keyed by command name
    #[serde(flatten)]
    pub commands: BTreeMap<String, SearchDefaults>,
}

/// The `[general]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vantage_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_host: Option<String>,

    /// Output format (json, csv)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,

    /// `[general.search]`: defaults for every search command
    #[serde(skip_serializing_if = "SearchDefaults::is_empty")]
    pub search: SearchDefaults,
}

/// Default config file location: `<config_dir>/vantage-cli/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load configuration
    ///
    /// An explicitly named file must exist. A missing default file yields an
    /// empty configuration.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        debug!(?config_path, "Config::load: called");
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Some(user_config) = default_config_path()
            && user_config.exists()
        {
            return Self::load_from_file(&user_config)
                .context(format!("Failed to load config from {}", user_config.display()));
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Write the configuration, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(?path, "Config::save: called");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Search defaults for a command: its own section over `[general.search]`
    pub fn search_defaults(&self, command: &str) -> SearchDefaults {
        debug!(%command, "search_defaults: called");
        let general = self.general.search.clone();
        match self.commands.get(command) {
            Some(section) => {
                debug!(%command, "search_defaults: command section found");
                general.overlay(section)
            }
            None => general,
        }
    }
}

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub account_id: Option<String>,
    pub vantage_api_key: Option<String>,
    pub jwt_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_host: String,
    pub auth_host: String,
    pub output: OutputFormat,
    pub debug: bool,
}

/// First non-blank value among the layers
fn layer(flag: Option<&String>, file: Option<&String>) -> Option<String> {
    flag.into_iter()
        .chain(file)
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(String::from)
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        debug!("Settings::resolve: called");
        let general = &config.general;

        let output = match (&cli.output_type, &general.output_type) {
            (Some(format), _) => *format,
            (None, Some(name)) => name
                .parse::<OutputFormat>()
                .map_err(|e| eyre::eyre!(e))
                .context("Invalid output_type in config file")?,
            (None, None) => OutputFormat::default(),
        };

        let settings = Self {
            account_id: layer(cli.account_id.as_ref(), general.account_id.as_ref()),
            vantage_api_key: layer(cli.vantage_api_key.as_ref(), general.vantage_api_key.as_ref()),
            jwt_token: layer(cli.jwt_token.as_ref(), general.jwt_token.as_ref()),
            client_id: layer(cli.client_id.as_ref(), general.client_id.as_ref()),
            client_secret: layer(cli.client_secret.as_ref(), general.client_secret.as_ref()),
            api_host: layer(cli.api_host.as_ref(), general.api_host.as_ref())
                .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            auth_host: layer(cli.auth_host.as_ref(), general.auth_host.as_ref())
                .unwrap_or_else(|| DEFAULT_AUTH_HOST.to_string()),
            output,
            debug: cli.debug,
        };
        debug!(
            account_id = ?settings.account_id,
            api_host = %settings.api_host,
            output = %settings.output,
            "Settings::resolve: resolved"
        );
        Ok(settings)
    }

    /// Credentials by precedence, if any combination is complete
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::resolve(
            self.vantage_api_key.as_deref(),
            self.jwt_token.as_deref(),
            self.client_id.as_deref(),
            self.client_secret.as_deref(),
        )
    }
}
