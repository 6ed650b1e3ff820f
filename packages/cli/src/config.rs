use redline_commands::{CommandArea, END_MARKER, START_MARKER};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "redline.config.json";

/// Redline configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Comment opening the command area
    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    /// Comment closing the command area
    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Rewrite paragraph ids from position after an approved edit
    #[serde(default = "default_renumber")]
    pub renumber_on_approve: bool,
}

fn default_start_marker() -> String {
    START_MARKER.to_string()
}

fn default_end_marker() -> String {
    END_MARKER.to_string()
}

fn default_renumber() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn command_area(&self) -> CommandArea {
        CommandArea::new(&self.start_marker, &self.end_marker)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            renumber_on_approve: default_renumber(),
        }
    }
}
