// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent configuration stored in TOML format. The API base URL can be
//! overridden without touching the file: the `--api-base` flag and the
//! `FLYSMART_API` environment variable both take precedence over the
//! stored value.

use serde::{Deserialize, Serialize};

/// Default API base URL for a locally running backend.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the configured API base URL.
pub const API_BASE_ENV_VAR: &str = "FLYSMART_API";

/// Application configuration stored in TOML format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations.
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// API base URL used when no flag or env var overrides it.
    #[serde(default = "default_api_base")]
    pub api_base_url: String,

    /// Open the statistics window on startup.
    #[serde(default)]
    pub show_stats_on_startup: bool,

    /// Number of plane cards per grid row.
    #[serde(default = "default_cards_per_row")]
    pub cards_per_row: usize,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_cards_per_row() -> usize {
    3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_base_url: default_api_base(),
            show_stats_on_startup: false,
            cards_per_row: default_cards_per_row(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating the file with defaults on
    /// first run.
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("flysmart-desktop", "config")
    }

    /// Save configuration to disk.
    #[allow(dead_code)]
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("flysmart-desktop", "config", self)
    }

    /// Get the config file path for display to user.
    #[allow(dead_code)]
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path("flysmart-desktop", "config")
    }

    /// Resolve the effective API base URL: CLI flag, then env var, then the
    /// config file. Trailing slashes are stripped.
    pub fn resolve_api_base(&self, cli_override: Option<&str>) -> String {
        if let Some(base) = cli_override {
            return base.trim_end_matches('/').to_string();
        }
        if let Ok(base) = std::env::var(API_BASE_ENV_VAR) {
            if !base.trim().is_empty() {
                return base.trim().trim_end_matches('/').to_string();
            }
        }
        self.api_base_url.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flag_wins_over_config() {
        let config = AppConfig {
            api_base_url: "http://config:8000".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_base(Some("http://flag:9000/")),
            "http://flag:9000"
        );
    }

    #[test]
    fn test_config_value_used_without_overrides() {
        // The env var may leak in from the test environment; only assert the
        // config fallback when it is unset.
        if std::env::var(API_BASE_ENV_VAR).is_err() {
            let config = AppConfig {
                api_base_url: "http://config:8000/".to_string(),
                ..Default::default()
            };
            assert_eq!(config.resolve_api_base(None), "http://config:8000");
        }
    }
}
