//! Static configuration for the playlist builder.
//!
//! Everything the run needs besides credentials lives in one TOML file: the
//! channel registry, the category registry that groups channels, and the
//! playlist naming/privacy defaults. The file is read once per invocation;
//! nothing is written back.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::youtube::PrivacyStatus;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/tubedigest/config.toml";

const DEFAULT_TITLE_TEMPLATE: &str = "{category}_{date}";
const DEFAULT_DESCRIPTION_TEMPLATE: &str =
    "{category} videos from {channels} uploaded on {date}";

/// One entry of the channel registry.
///
/// `name` is the logical display name used for tagging and reporting; it is
/// deliberately independent of whatever title the platform reports for the
/// channel. At least one of `channel_id`/`handle` must be present so the
/// searcher can reach the channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
}

/// Groups channels under a category name and optionally narrows the search
/// window to the last N hours.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub hours_back: Option<i64>,
}

/// Playlist naming and privacy defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistConfig {
    #[serde(default = "default_privacy")]
    pub privacy: PrivacyStatus,
    #[serde(default = "default_title_template")]
    pub title_template: String,
    #[serde(default = "default_description_template")]
    pub description_template: String,
}

fn default_privacy() -> PrivacyStatus {
    PrivacyStatus::Unlisted
}

fn default_title_template() -> String {
    DEFAULT_TITLE_TEMPLATE.to_string()
}

fn default_description_template() -> String {
    DEFAULT_DESCRIPTION_TEMPLATE.to_string()
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            privacy: default_privacy(),
            title_template: default_title_template(),
            description_template: default_description_template(),
        }
    }
}

/// The whole config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryConfig>,
    #[serde(default)]
    pub playlist: PlaylistConfig,
}

impl AppConfig {
    /// Reads and validates the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Every configured channel must be reachable one way or the other.
    fn validate(&self) -> Result<()> {
        for (key, channel) in &self.channels {
            if channel.channel_id.is_none() && channel.handle.is_none() {
                bail!("channel '{key}' has neither channel_id nor handle");
            }
        }
        Ok(())
    }

    /// Looks up a category by name.
    pub fn category(&self, name: &str) -> Result<&CategoryConfig> {
        self.categories
            .get(name)
            .ok_or_else(|| anyhow!("no configuration found for category '{name}'"))
    }

    /// Resolves a category's channel names against the channel registry.
    ///
    /// Names missing from the registry are logged and skipped; the category
    /// is still usable as long as at least one channel resolves. Categories
    /// with no members at all are a configuration error.
    pub fn category_channels(&self, name: &str) -> Result<Vec<ChannelConfig>> {
        let category = self.category(name)?;
        if category.channels.is_empty() {
            bail!("no channels configured for category '{name}'");
        }

        let mut resolved = Vec::new();
        for channel_name in &category.channels {
            match self.channels.get(channel_name) {
                Some(channel) => resolved.push(channel.clone()),
                None => {
                    log::warn!("channel '{channel_name}' not found in the channel registry");
                }
            }
        }

        if resolved.is_empty() {
            bail!("no valid channels found for category '{name}'");
        }

        Ok(resolved)
    }
}
