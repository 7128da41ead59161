pub mod error;
pub mod media;
pub mod playback;
pub mod progress;
pub mod traits;

pub use error::AudioError;
pub use media::RodioMedia;
pub use traits::{MediaResource, PlayFuture};
