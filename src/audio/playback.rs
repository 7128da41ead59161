use std::{io::Cursor, sync::Arc, time::Duration};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::audio::error::AudioError;

/// Decoding sink driven by [`crate::audio::RodioMedia`]. Sources arrive as
/// fully fetched bytes.
pub trait AudioOutput: Send + Sync + 'static {
    /// Decode far enough to learn the length of `bytes`.
    fn probe(&self, bytes: Arc<[u8]>) -> Result<Option<Duration>, AudioError>;

    /// Decode `bytes` and queue the result behind whatever is playing.
    fn append(&self, bytes: Arc<[u8]>) -> Result<(), AudioError>;

    fn play(&self);

    fn pause(&self);

    /// Drop every queued source.
    fn stop(&self);

    fn is_paused(&self) -> bool;

    fn is_empty(&self) -> bool;

    fn position(&self) -> Duration;

    fn try_seek(&self, position: Duration) -> Result<(), AudioError>;
}

pub struct PlaybackEngine {
    _stream: OutputStream,
    sink: Arc<Sink>,
}

impl PlaybackEngine {
    pub fn new() -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::DeviceError(e.to_string()))?;
        // rodio prints to stderr when the stream is dropped, which tears the TUI.
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        Ok(Self {
            _stream: stream,
            sink: Arc::new(sink),
        })
    }
}

fn decode(bytes: Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, AudioError> {
    let len = bytes.len() as u64;
    Decoder::builder()
        .with_data(Cursor::new(bytes))
        .with_byte_len(len)
        .with_seekable(true)
        .build()
        .map_err(|e| AudioError::DecodingError(e.to_string()))
}

impl AudioOutput for PlaybackEngine {
    fn probe(&self, bytes: Arc<[u8]>) -> Result<Option<Duration>, AudioError> {
        Ok(decode(bytes)?.total_duration())
    }

    fn append(&self, bytes: Arc<[u8]>) -> Result<(), AudioError> {
        self.sink.append(decode(bytes)?);
        Ok(())
    }

    fn play(&self) {
        self.sink.play();
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn is_empty(&self) -> bool {
        self.sink.empty()
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn try_seek(&self, position: Duration) -> Result<(), AudioError> {
        self.sink
            .try_seek(position)
            .map_err(|e| AudioError::SeekError(e.to_string()))
    }
}
