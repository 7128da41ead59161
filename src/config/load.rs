use std::{env, path::PathBuf};

use tracing::warn;

use super::schema::Settings;
use crate::util::log::get_config_dir;

impl Settings {
    /// Load settings from the optional config file and the environment.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("KRAKEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Like [`Settings::load`], but never fails: a broken config is logged
    /// and replaced by defaults.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(msg) => {
                    warn!("invalid config, using defaults: {msg}");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.playlist.source.trim().is_empty() {
            return Err("playlist.source must not be empty".to_string());
        }
        if self.playback.tick_ms == 0 {
            return Err("playback.tick_ms must be >= 1".to_string());
        }
        let step = self.playback.seek_step_percent;
        if !step.is_finite() || step <= 0.0 || step > 100.0 {
            return Err("playback.seek_step_percent must be in (0, 100]".to_string());
        }
        Ok(())
    }
}

/// `KRAKEN_CONFIG_PATH` if set, otherwise `config.toml` in the platform config dir.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("KRAKEN_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

pub fn default_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}
