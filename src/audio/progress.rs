use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Position bookkeeping shared between the media resource and its
/// background tasks.
#[derive(Default, Debug)]
pub struct TrackProgress {
    current_position_millis: AtomicU64,
    total_duration_millis: AtomicU64,
    start_offset_millis: AtomicU64,
    started: AtomicBool,
    generation: AtomicU64,
}

impl TrackProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_position(&self, position: Duration) {
        self.current_position_millis
            .store(position.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn current_position(&self) -> Duration {
        Duration::from_millis(self.current_position_millis.load(Ordering::Relaxed))
    }

    pub fn set_total_duration(&self, duration: Duration) {
        self.total_duration_millis
            .store(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// `None` while the duration is unknown.
    pub fn total_duration(&self) -> Option<Duration> {
        match self.total_duration_millis.load(Ordering::Relaxed) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Remember where playback should begin once the source is attached.
    pub fn set_start_offset(&self, offset: Duration) {
        self.start_offset_millis
            .store(offset.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn take_start_offset(&self) -> Duration {
        Duration::from_millis(self.start_offset_millis.swap(0, Ordering::Relaxed))
    }

    pub fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    pub fn mark_finished(&self) {
        self.started.store(false, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Forget the current source. Returns the new generation.
    pub fn reset(&self) -> u64 {
        self.mark_finished();
        self.set_current_position(Duration::ZERO);
        self.set_total_duration(Duration::ZERO);
        self.set_start_offset(Duration::ZERO);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_bumps_generation_and_clears_state() {
        let progress = TrackProgress::new();
        progress.set_total_duration(Duration::from_secs(200));
        progress.set_start_offset(Duration::from_millis(42_500));
        progress.mark_started();

        let generation = progress.reset();
        assert_eq!(generation, 1);
        assert_eq!(progress.generation(), 1);
        assert!(progress.total_duration().is_none());
        assert!(!progress.is_started());
        assert_eq!(progress.take_start_offset(), Duration::ZERO);
    }

    #[test]
    fn start_offset_is_taken_once() {
        let progress = TrackProgress::new();
        progress.set_start_offset(Duration::from_millis(42_500));
        assert_eq!(progress.take_start_offset(), Duration::from_millis(42_500));
        assert_eq!(progress.take_start_offset(), Duration::ZERO);
    }
}
