use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `KRAKEN__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playlist: PlaylistSettings,
    pub playback: PlaybackSettings,
    pub display: DisplaySettings,
    pub state: StateSettings,
    pub downloads: DownloadSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Where the track list lives: an `http(s)://` URL or a file path.
    pub source: String,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            source: "list.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Delay before seeking to the restored position at startup (milliseconds).
    pub restore_delay_ms: u64,
    /// Interval between progress ticks while playing (milliseconds).
    pub tick_ms: u64,
    /// When set, next/previous are ignored unless something is playing.
    pub advance_only_while_playing: bool,
    /// Step used by the seek keys, as a percentage of the track.
    pub seek_step_percent: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            restore_delay_ms: 100,
            tick_ms: 250,
            advance_only_while_playing: false,
            seek_step_percent: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub unknown_title: String,
    pub unknown_artist: String,
    pub default_cover: String,
    /// Show failures in the UI in addition to the log.
    pub show_errors: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            unknown_title: "Unknown track".to_string(),
            unknown_artist: "Unknown artist".to_string(),
            default_cover: "kraken-logo.svg".to_string(),
            show_errors: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StateSettings {
    /// Where the playback snapshot is kept. Defaults to the data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Target directory for downloaded tracks. Defaults to the user's download dir.
    pub dir: Option<PathBuf>,
}
