use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use flume::Sender;
use futures::{
    FutureExt,
    future::{self, BoxFuture, Shared},
};
use tracing::{debug, info, warn};

use crate::{
    audio::{
        error::AudioError,
        playback::{AudioOutput, PlaybackEngine},
        progress::TrackProgress,
        traits::{MediaResource, PlayFuture},
    },
    event::{Event, MediaEvent},
    playlist::source::fetch_bytes,
    util::task::TaskManager,
};

type Fetch = Shared<BoxFuture<'static, Result<Arc<[u8]>, AudioError>>>;

/// [`MediaResource`] backed by a rodio sink.
///
/// `load` starts fetching the locator right away and probes its duration;
/// `play` waits for that same fetch before attaching the decoded source.
///
/// Switching sources and attaching one both happen under `switch`, so a
/// play request that loses the race against `load` can never put the old
/// source on the sink.
pub struct RodioMedia<O: AudioOutput = PlaybackEngine> {
    output: Arc<O>,
    client: reqwest::Client,
    progress: Arc<TrackProgress>,
    switch: Arc<Mutex<()>>,
    fetch: Option<Fetch>,
    listener: Option<Sender<Event>>,
    tick: Duration,
    tasks: TaskManager,
}

impl RodioMedia {
    pub fn new(client: reqwest::Client, tick: Duration) -> Result<Self, AudioError> {
        Ok(Self::with_output(
            Arc::new(PlaybackEngine::new()?),
            client,
            tick,
        ))
    }
}

impl<O: AudioOutput> RodioMedia<O> {
    pub fn with_output(output: Arc<O>, client: reqwest::Client, tick: Duration) -> Self {
        Self {
            output,
            client,
            progress: Arc::new(TrackProgress::new()),
            switch: Arc::new(Mutex::new(())),
            fetch: None,
            listener: None,
            tick,
            tasks: TaskManager::new(),
        }
    }

    fn start_monitor(&mut self) {
        let output = self.output.clone();
        let progress = self.progress.clone();
        let switch = self.switch.clone();
        let listener = self.listener.clone();
        let tick = self.tick;

        self.tasks.spawn("monitor", async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                report_progress(output.as_ref(), &progress, &switch, &listener);
            }
        });
    }
}

fn lock(switch: &Mutex<()>) -> MutexGuard<'_, ()> {
    switch.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One monitor tick. Runs under `switch` so the sink state it reads and the
/// generation it reports belong to the same source.
fn report_progress<O: AudioOutput>(
    output: &O,
    progress: &TrackProgress,
    switch: &Mutex<()>,
    listener: &Option<Sender<Event>>,
) {
    let _switch = lock(switch);
    let generation = progress.generation();

    if !progress.is_started() || output.is_paused() {
        return;
    }

    progress.set_current_position(output.position());
    let event = if output.is_empty() {
        progress.mark_finished();
        MediaEvent::Ended
    } else {
        MediaEvent::TimeUpdate
    };
    emit(listener, progress, generation, event);
}

fn emit(
    listener: &Option<Sender<Event>>,
    progress: &TrackProgress,
    generation: u64,
    event: MediaEvent,
) {
    if progress.generation() != generation {
        debug!(?event, "dropping media event from a previous source");
        return;
    }
    if let Some(tx) = listener {
        let _ = tx.send(Event::Media(event));
    }
}

/// Put fetched `bytes` on the sink unless another source was loaded since
/// `generation` was issued.
fn attach<O: AudioOutput>(
    output: &O,
    progress: &TrackProgress,
    switch: &Mutex<()>,
    generation: u64,
    bytes: Arc<[u8]>,
) -> Result<(), AudioError> {
    let _switch = lock(switch);
    if progress.generation() != generation {
        return Err(AudioError::Superseded);
    }

    output.append(bytes)?;

    let offset = progress.take_start_offset();
    if !offset.is_zero() {
        if let Err(e) = output.try_seek(offset) {
            warn!(?offset, "could not apply start offset: {e}");
        }
    }

    output.play();
    progress.mark_started();
    Ok(())
}

impl<O: AudioOutput> MediaResource for RodioMedia<O> {
    fn subscribe(&mut self, listener: Sender<Event>) {
        self.listener = Some(listener);
        self.start_monitor();
    }

    fn load(&mut self, url: &str) {
        let generation = {
            let _switch = lock(&self.switch);
            let generation = self.progress.reset();
            self.output.stop();
            generation
        };
        info!(url, generation, "loading source");

        let client = self.client.clone();
        let locator = url.to_string();
        let fetch: Fetch = async move {
            fetch_bytes(&client, &locator)
                .await
                .map(Arc::<[u8]>::from)
                .map_err(|e| AudioError::StreamError(e.to_string()))
        }
        .boxed()
        .shared();
        self.fetch = Some(fetch.clone());

        let output = self.output.clone();
        let progress = self.progress.clone();
        let listener = self.listener.clone();
        self.tasks.spawn("probe", async move {
            let event = match fetch.await.and_then(|bytes| output.probe(bytes)) {
                Ok(total) => {
                    match total {
                        Some(total) => progress.set_total_duration(total),
                        None => debug!(generation, "source has no known duration"),
                    }
                    MediaEvent::LoadedMetadata
                }
                Err(e) => {
                    warn!(generation, "source failed to load: {e}");
                    MediaEvent::Error(e)
                }
            };
            emit(&listener, &progress, generation, event);
        });
    }

    fn play(&mut self) -> PlayFuture {
        if self.progress.is_started() && !self.output.is_empty() {
            self.output.play();
            return future::ready(Ok(())).boxed();
        }

        let Some(fetch) = self.fetch.clone() else {
            return future::ready(Err(AudioError::NoSource)).boxed();
        };
        let output = self.output.clone();
        let progress = self.progress.clone();
        let switch = self.switch.clone();
        let generation = progress.generation();

        async move {
            let bytes = fetch.await?;
            attach(output.as_ref(), &progress, &switch, generation, bytes)
        }
        .boxed()
    }

    fn pause(&mut self) {
        self.output.pause();
    }

    fn seek(&mut self, seconds: f64) -> Result<(), AudioError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(AudioError::SeekError(format!("invalid position {seconds}")));
        }
        let position = Duration::from_secs_f64(seconds);

        if self.progress.is_started() {
            self.output.try_seek(position)?;
        } else {
            self.progress.set_start_offset(position);
        }
        self.progress.set_current_position(position);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        if self.progress.is_started() {
            self.output.position().as_secs_f64()
        } else {
            self.progress.current_position().as_secs_f64()
        }
    }

    fn duration(&self) -> Option<f64> {
        self.progress.total_duration().map(|d| d.as_secs_f64())
    }

    fn is_paused(&self) -> bool {
        !self.progress.is_started() || self.output.is_paused()
    }
}
