use serde::Deserialize;

use super::error::PlaylistError;

/// The fetched playlist document: `{ "tracks": [ ... ] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistDocument {
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
}

/// One raw entry as it appears in the document. Nothing is required here;
/// entries without a locator are dropped by [`PlaylistDocument::into_tracks`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackEntry {
    pub url: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
}

/// A playable playlist entry. Identity is its position in the playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub url: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
    pub is_new: bool,
}

impl Track {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            artist: None,
            cover: None,
            is_new: false,
        }
    }

    #[cfg(test)]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[cfg(test)]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[cfg(test)]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(&self.title).unwrap_or(fallback)
    }

    pub fn artist_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(&self.artist).unwrap_or(fallback)
    }

    pub fn cover_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(&self.cover).unwrap_or(fallback)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl PlaylistDocument {
    pub fn from_json(bytes: &[u8]) -> Result<Self, PlaylistError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
            .into_iter()
            .filter_map(|entry| {
                let url = entry.url.filter(|u| !u.trim().is_empty())?;
                Some(Track {
                    url,
                    title: entry.title,
                    artist: entry.artist,
                    cover: entry.cover,
                    is_new: entry.is_new,
                })
            })
            .collect()
    }
}
