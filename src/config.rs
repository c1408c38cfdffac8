//! Lookup configuration
//!
//! Collection names, page sizes and per-clause boosts for the lookup sets.
//! Every key is optional in the JSON form; absent keys take the defaults
//! below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for this shape
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Boost factors for the four author search clauses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBoosts {
    #[serde(default = "default_boost")]
    pub name: f32,
    #[serde(default = "default_boost")]
    pub asciiname: f32,
    #[serde(default = "default_boost")]
    pub pauseid: f32,
    #[serde(default = "default_boost")]
    pub profile: f32,
}

impl Default for SearchBoosts {
    fn default() -> Self {
        Self {
            name: default_boost(),
            asciiname: default_boost(),
            pauseid: default_boost(),
            profile: default_boost(),
        }
    }
}

/// Configuration for the author and favorite lookup sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Collection holding author documents
    #[serde(default = "default_author_collection")]
    pub author_collection: String,

    /// Collection holding favorite documents
    #[serde(default = "default_favorite_collection")]
    pub favorite_collection: String,

    /// Hit cap for author lookups by user
    #[serde(default = "default_by_user_size")]
    pub by_user_size: u64,

    /// Page size for author search
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u64,

    /// Default hit cap for favorites by user
    #[serde(default = "default_favorite_by_user_size")]
    pub favorite_by_user_size: u64,

    /// Hit cap for users by distribution
    #[serde(default = "default_users_by_distribution_size")]
    pub users_by_distribution_size: u64,

    /// Number of leaderboard entries
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,

    /// Author search clause boosts
    #[serde(default)]
    pub boosts: SearchBoosts,
}

fn default_author_collection() -> String {
    "author".to_string()
}
fn default_favorite_collection() -> String {
    "favorite".to_string()
}
fn default_by_user_size() -> u64 {
    100
}
fn default_search_page_size() -> u64 {
    10
}
fn default_favorite_by_user_size() -> u64 {
    250
}
fn default_users_by_distribution_size() -> u64 {
    1000
}
fn default_leaderboard_size() -> usize {
    100
}
fn default_boost() -> f32 {
    1.0
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            author_collection: default_author_collection(),
            favorite_collection: default_favorite_collection(),
            by_user_size: default_by_user_size(),
            search_page_size: default_search_page_size(),
            favorite_by_user_size: default_favorite_by_user_size(),
            users_by_distribution_size: default_users_by_distribution_size(),
            leaderboard_size: default_leaderboard_size(),
            boosts: SearchBoosts::default(),
        }
    }
}

impl LookupConfig {
    /// Parses and validates a JSON configuration document
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: LookupConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Rejects empty collection names, zero sizes and non-positive boosts
    pub fn validate(&self) -> ConfigResult<()> {
        for (key, name) in [
            ("author_collection", &self.author_collection),
            ("favorite_collection", &self.favorite_collection),
        ] {
            if name.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }

        for (key, size) in [
            ("by_user_size", self.by_user_size),
            ("search_page_size", self.search_page_size),
            ("favorite_by_user_size", self.favorite_by_user_size),
            ("users_by_distribution_size", self.users_by_distribution_size),
            ("leaderboard_size", self.leaderboard_size as u64),
        ] {
            if size == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", key)));
            }
        }

        let b = &self.boosts;
        for (key, boost) in [
            ("boosts.name", b.name),
            ("boosts.asciiname", b.asciiname),
            ("boosts.pauseid", b.pauseid),
            ("boosts.profile", b.profile),
        ] {
            if !(boost.is_finite() && boost > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a positive number, got {}",
                    key, boost
                )));
            }
        }

        Ok(())
    }
}
