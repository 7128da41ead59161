use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed playlist: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),
}
