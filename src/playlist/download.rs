use std::path::{Path, PathBuf};

use reqwest::Url;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::info;

use super::{
    error::PlaylistError,
    model::Track,
    source::{fetch_bytes, is_remote, local_path},
};

const FALLBACK_NAME: &str = "track";
const MAX_COPIES: usize = 1000;

/// Save the track behind `track.url` into `dir`, named after the locator's
/// last path segment. An existing file is never replaced; the copy gets a
/// ` (n)` suffix instead.
pub async fn download_track(
    client: &reqwest::Client,
    track: &Track,
    dir: &Path,
) -> Result<PathBuf, PlaylistError> {
    let bytes = fetch_bytes(client, &track.url).await?;
    tokio::fs::create_dir_all(dir).await?;

    let (target, mut file) = create_unique(dir, &file_name_for(&track.url)).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    info!(url = track.url.as_str(), target = %target.display(), size = bytes.len(), "track downloaded");
    Ok(target)
}

async fn create_unique(
    dir: &Path,
    name: &str,
) -> Result<(PathBuf, tokio::fs::File), PlaylistError> {
    for copy in 0..MAX_COPIES {
        let target = dir.join(numbered(name, copy));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => return Ok((target, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("too many copies of {name} in {}", dir.display()),
    )
    .into())
}

/// `song.mp3` → `song (2).mp3`; copy 0 is the name itself.
fn numbered(name: &str, copy: usize) -> String {
    if copy == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({copy}).{ext}"),
        _ => format!("{name} ({copy})"),
    }
}

pub fn file_name_for(locator: &str) -> String {
    let name = if is_remote(locator) {
        Url::parse(locator).ok().and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(|segment| {
                    urlencoding::decode(segment)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| segment.to_string())
                })
        })
    } else {
        local_path(locator)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    };

    // a decoded segment may carry separators of its own
    name.map(|n| n.replace(['/', '\\'], "_"))
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}
