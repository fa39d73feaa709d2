//! Process settings, read from an optional `settings.toml` and from
//! `BUDGETLINE__*` environment variables (e.g. `BUDGETLINE__APP__LEVEL`).
//!
//! ```toml
//! storage = { sqlite = "budgetline.db" }
//!
//! [app]
//! level = "debug"
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub storage: Storage,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_PATH)).required(false))
            .add_source(Environment::with_prefix("BUDGETLINE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
