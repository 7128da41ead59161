use thiserror::Error;

use crate::playlist::PlaylistError;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Failed to load playlist: {0}")]
    Playlist(#[from] PlaylistError),

    #[error("Playlist has no playable tracks")]
    EmptyPlaylist,

    #[error("State store error: {0}")]
    Store(#[from] std::io::Error),
}
