use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use tracing::debug;

use super::error::PlayerError;

pub const TRACK_INDEX_KEY: &str = "currentTrackIndex";
pub const POSITION_KEY: &str = "currentTime";

/// Snapshot of where playback was. Fields are optional because the stored
/// text is not trusted; callers bounds-check the index themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PersistedState {
    pub track_index: Option<i64>,
    pub position: Option<f64>,
}

impl PersistedState {
    pub fn new(track_index: usize, position: f64) -> Self {
        Self {
            track_index: i64::try_from(track_index).ok(),
            position: Some(position),
        }
    }

    /// Parse `name=value; name=value`. Unknown names are skipped, later
    /// entries win, unparsable values are left unset.
    pub fn parse(raw: &str) -> Self {
        let mut state = Self::default();
        for (name, value) in raw
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
        {
            match name.trim() {
                TRACK_INDEX_KEY => state.track_index = value.trim().parse().ok(),
                POSITION_KEY => state.position = value.trim().parse().ok(),
                other => debug!(name = other, "ignoring unknown state entry"),
            }
        }
        state
    }

    pub fn encode(&self) -> String {
        let mut pairs = Vec::with_capacity(2);
        if let Some(index) = self.track_index {
            pairs.push(format!("{TRACK_INDEX_KEY}={index}"));
        }
        if let Some(position) = self.position {
            pairs.push(format!("{POSITION_KEY}={position}"));
        }
        pairs.join("; ")
    }
}

pub trait StateStore: Send {
    fn load(&self) -> Result<PersistedState, PlayerError>;
    fn save(&mut self, state: &PersistedState) -> Result<(), PlayerError>;
}

/// Keeps the snapshot in a single file. Writes are skipped while the
/// snapshot is unchanged, so a paused player does not touch the disk.
pub struct FileStateStore {
    path: PathBuf,
    last_written: Option<String>,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written: None,
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<PersistedState, PlayerError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(PersistedState::parse(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PersistedState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PlayerError> {
        let encoded = state.encode();
        if self.last_written.as_deref() == Some(encoded.as_str()) {
            return Ok(());
        }

        if self.last_written.is_none() {
            if let Some(dir) = self.path.parent() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(&self.path, &encoded)?;
        self.last_written = Some(encoded);
        Ok(())
    }
}

/// In-memory store. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    raw: Arc<Mutex<String>>,
}

impl MemoryStateStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(Mutex::new(raw.into())),
        }
    }

    pub fn raw(&self) -> String {
        self.raw
            .lock()
            .map(|raw| raw.clone())
            .unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<PersistedState, PlayerError> {
        Ok(PersistedState::parse(&self.raw()))
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PlayerError> {
        if let Ok(mut raw) = self.raw.lock() {
            *raw = state.encode();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cookie_style_pairs() {
        let state = PersistedState::parse("theme=dark; currentTrackIndex=2; currentTime=42.5");
        assert_eq!(state.track_index, Some(2));
        assert_eq!(state.position, Some(42.5));
    }

    #[test]
    fn later_entries_win_and_garbage_is_unset() {
        let state = PersistedState::parse("currentTrackIndex=1;currentTrackIndex=4; currentTime=abc");
        assert_eq!(state.track_index, Some(4));
        assert_eq!(state.position, None);

        assert_eq!(PersistedState::parse(""), PersistedState::default());
    }

    #[test]
    fn encode_matches_parse() {
        let state = PersistedState::new(1, 42.5);
        assert_eq!(state.encode(), "currentTrackIndex=1; currentTime=42.5");
        assert_eq!(PersistedState::parse(&state.encode()), state);
    }

    #[test]
    fn file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("playback_state");

        let mut store = FileStateStore::new(&path);
        assert_eq!(store.load().unwrap(), PersistedState::default());

        store.save(&PersistedState::new(3, 12.25)).unwrap();
        let reopened = FileStateStore::new(&path);
        assert_eq!(reopened.load().unwrap(), PersistedState::new(3, 12.25));
    }

    #[test]
    fn file_store_skips_unchanged_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playback_state");
        let mut store = FileStateStore::new(&path);

        store.save(&PersistedState::new(1, 5.0)).unwrap();
        std::fs::remove_file(&path).unwrap();

        store.save(&PersistedState::new(1, 5.0)).unwrap();
        assert!(!path.exists());

        store.save(&PersistedState::new(1, 5.25)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "currentTrackIndex=1; currentTime=5.25"
        );
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStateStore::default();
        let mut writer = store.clone();
        writer.save(&PersistedState::new(0, 1.5)).unwrap();
        assert_eq!(store.raw(), "currentTrackIndex=0; currentTime=1.5");
    }
}
