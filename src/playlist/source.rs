use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use super::{error::PlaylistError, model::PlaylistDocument};

/// Where the playlist document comes from.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn fetch(&self) -> Result<PlaylistDocument, PlaylistError>;

    /// Resolve a track locator relative to the playlist location.
    fn resolve(&self, locator: &str) -> String;

    fn location(&self) -> String;
}

pub struct HttpSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl PlaylistSource for HttpSource {
    async fn fetch(&self) -> Result<PlaylistDocument, PlaylistError> {
        info!(url = self.url.as_str(), "fetching playlist");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<PlaylistDocument>().await?)
    }

    fn resolve(&self, locator: &str) -> String {
        match self.url.join(locator) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!(locator, "cannot resolve against playlist url: {e}");
                locator.to_string()
            }
        }
    }

    fn location(&self) -> String {
        self.url.to_string()
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlaylistSource for FileSource {
    async fn fetch(&self) -> Result<PlaylistDocument, PlaylistError> {
        info!(path = %self.path.display(), "reading playlist");
        let bytes = tokio::fs::read(&self.path).await?;
        PlaylistDocument::from_json(&bytes)
    }

    fn resolve(&self, locator: &str) -> String {
        if has_scheme(locator) || Path::new(locator).is_absolute() {
            return locator.to_string();
        }
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(locator).display().to_string(),
            _ => locator.to_string(),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick a source for `location`: HTTP(S) URLs are fetched, anything else is a file.
pub fn source_for(
    location: &str,
    client: reqwest::Client,
) -> Result<Box<dyn PlaylistSource>, PlaylistError> {
    if is_remote(location) {
        let url = Url::parse(location)
            .map_err(|e| PlaylistError::InvalidLocation(format!("{location}: {e}")))?;
        return Ok(Box::new(HttpSource::new(client, url)));
    }
    Ok(Box::new(FileSource::new(local_path(location))))
}

pub fn is_remote(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn has_scheme(locator: &str) -> bool {
    locator.contains("://")
}

pub fn local_path(locator: &str) -> PathBuf {
    PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
}

/// Read the bytes behind a track locator, over HTTP or from disk.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    locator: &str,
) -> Result<Vec<u8>, PlaylistError> {
    if is_remote(locator) {
        let response = client.get(locator).send().await?.error_for_status()?;
        return Ok(response.bytes().await?.to_vec());
    }
    Ok(tokio::fs::read(local_path(locator)).await?)
}
