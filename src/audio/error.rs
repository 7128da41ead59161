use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio output device error: {0}")]
    DeviceError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Seek error: {0}")]
    SeekError(String),

    #[error("No track loaded")]
    NoSource,

    #[error("Superseded by another track")]
    Superseded,
}
