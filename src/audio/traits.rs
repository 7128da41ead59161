use flume::Sender;
use futures::future::BoxFuture;

use crate::{audio::error::AudioError, event::Event};

/// Outcome of a playback start request. Owns everything it needs, so it can
/// be driven on a separate task.
pub type PlayFuture = BoxFuture<'static, Result<(), AudioError>>;

/// A single playback resource: one source at a time, positions in seconds.
pub trait MediaResource: Send {
    /// Register the channel that receives [`crate::event::MediaEvent`]s.
    fn subscribe(&mut self, listener: Sender<Event>);

    /// Point the resource at `url`, stopping whatever was playing.
    fn load(&mut self, url: &str);

    fn play(&mut self) -> PlayFuture;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64) -> Result<(), AudioError>;

    fn current_time(&self) -> f64;

    /// `None` until metadata is known.
    fn duration(&self) -> Option<f64>;

    fn is_paused(&self) -> bool;
}
