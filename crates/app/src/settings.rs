//! Settings for `pocket`.
//!
//! Sources, later ones winning: the optional TOML file (`config/pocket.toml`
//! or `--config`), environment variables prefixed with `POCKET` using `__` as
//! separator (e.g. `POCKET__APP__LEVEL=debug`), then command-line flags.

use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/pocket.toml";

#[derive(Debug, Clone, Deserialize)]
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

/// Where the snapshot documents live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    Memory,
    File(String),
    Sqlite(String),
}

impl Default for Storage {
    fn default() -> Self {
        Self::File("data".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub storage: Storage,
    pub seed_defaults: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: App::default(),
            storage: Storage::default(),
            seed_defaults: true,
        }
    }
}

/// Flags that override the loaded settings.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<String>,
    pub level: Option<String>,
    pub data_dir: Option<String>,
    pub sqlite: Option<String>,
    pub memory: bool,
}

impl Settings {
    pub fn load(overrides: Overrides) -> Result<Self> {
        let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("POCKET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Some(level) = overrides.level {
            settings.app.level = level;
        }
        if overrides.memory {
            settings.storage = Storage::Memory;
        } else if let Some(path) = overrides.sqlite {
            settings.storage = Storage::Sqlite(path);
        } else if let Some(dir) = overrides.data_dir {
            settings.storage = Storage::File(dir);
        }

        Ok(settings)
    }
}
