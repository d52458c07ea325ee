//! Single-shot and periodic device-location acquisition.
//!
//! Every start and stop bumps a generation counter. A tick remembers the
//! generation it was started under and drops its result if the counter has
//! moved by the time the acquisition resolves, so nothing observable happens
//! after [`LocationTracker::stop_periodic`] returns.

use crate::{
    core::{config::TrackerConfig, session::Session},
    location::{
        provider::{LocationError, LocationSample, PositionOptions, PositionProvider},
        sink::LocationSink,
    },
    runtime::{self, AsyncHandle, AsyncSpawner, BoxedTask, TokioSpawner},
};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Receives the outcome of each periodic tick that is still current.
pub trait TrackerObserver: Send + Sync {
    /// Called before the sample is uploaded.
    fn on_sample(&self, generation: u64, sample: &LocationSample);

    /// Called when a tick's acquisition failed; the loop keeps running.
    fn on_error(&self, _generation: u64, _error: &LocationError) {}
}

struct TrackerInner {
    provider: Arc<dyn PositionProvider>,
    sink: Arc<dyn LocationSink>,
    session: Session,
    config: TrackerConfig,
    observer: Option<Arc<dyn TrackerObserver>>,
    generation: AtomicU64,
    timer: Mutex<Option<Box<dyn AsyncHandle>>>,
}

impl TrackerInner {
    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn acquire(&self) -> Result<LocationSample, LocationError> {
        let options = PositionOptions {
            high_accuracy: self.config.high_accuracy,
            timeout: self.config.acquire_timeout(),
        };
        let request = self.provider.current_position(options);
        match tokio::time::timeout(options.timeout, request).await {
            Ok(Ok(sample)) if sample.position().is_valid() => Ok(sample),
            Ok(Ok(sample)) => {
                warn!(
                    "Provider returned an invalid position ({}, {})",
                    sample.latitude, sample.longitude
                );
                Err(LocationError::PositionUnavailable)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LocationError::Timeout),
        }
    }

    /// False once the tick's loop has been stopped or replaced.
    fn is_current(&self, generation: u64) -> bool {
        if self.current_generation() == generation {
            return true;
        }
        debug!("Discarding location result from stopped generation {}", generation);
        false
    }

    async fn run_tick(&self, generation: u64) {
        let result = self.acquire().await;

        if !self.is_current(generation) {
            return;
        }

        match result {
            Ok(sample) => {
                if let Some(observer) = &self.observer {
                    observer.on_sample(generation, &sample);
                }
                // The observer may have taken long enough for a stop to land.
                if !self.is_current(generation) {
                    return;
                }
                if let Err(e) = self
                    .sink
                    .post_location(&self.session.user_id, sample.latitude, sample.longitude)
                    .await
                {
                    warn!("Location upload failed: {}", e);
                }
            }
            Err(e) => {
                warn!("Location tick failed: {}", e);
                if let Some(observer) = &self.observer {
                    observer.on_error(generation, &e);
                }
            }
        }
    }
}

/// Owns at most one periodic sampling loop.
pub struct LocationTracker {
    inner: Arc<TrackerInner>,
    runtime: Option<Handle>,
}

impl LocationTracker {
    /// Tracker without an observer: samples are only uploaded.
    pub fn new(
        provider: Arc<dyn PositionProvider>,
        sink: Arc<dyn LocationSink>,
        session: Session,
        config: TrackerConfig,
    ) -> Self {
        Self::build(provider, sink, session, config, None)
    }

    /// Tracker that also reports every current sample and failure.
    pub fn with_observer(
        provider: Arc<dyn PositionProvider>,
        sink: Arc<dyn LocationSink>,
        session: Session,
        config: TrackerConfig,
        observer: Arc<dyn TrackerObserver>,
    ) -> Self {
        Self::build(provider, sink, session, config, Some(observer))
    }

    fn build(
        provider: Arc<dyn PositionProvider>,
        sink: Arc<dyn LocationSink>,
        session: Session,
        config: TrackerConfig,
        observer: Option<Arc<dyn TrackerObserver>>,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                provider,
                sink,
                session,
                config,
                observer,
                generation: AtomicU64::new(0),
                timer: Mutex::new(None),
            }),
            runtime: None,
        }
    }

    /// Runs the loop on `handle`, so it can be started from threads that are
    /// not inside a tokio runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// One bounded, high-accuracy acquisition. Not tied to the periodic loop.
    pub async fn get_once(&self) -> Result<LocationSample, LocationError> {
        self.inner.acquire().await
    }

    /// Starts sampling at the configured interval.
    pub fn start_periodic(&self) -> crate::Result<()> {
        self.start_periodic_every(self.inner.config.interval())
    }

    /// Starts sampling every `period`, replacing any loop already running.
    /// The first sample is taken one period after the call.
    ///
    /// Without a runtime from [`Self::with_runtime`] the caller must be inside
    /// one; otherwise this fails and the tracker is left stopped.
    pub fn start_periodic_every(&self, period: Duration) -> crate::Result<()> {
        let period = period.max(Duration::from_millis(1));
        let mut timer = self.lock_timer();
        if let Some(previous) = timer.take() {
            previous.cancel();
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let inner = Arc::clone(&self.inner);
        let task: BoxedTask = Box::pin(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if inner.current_generation() != generation {
                    break;
                }
                let tick = Arc::clone(&inner);
                // Detached: the generation checks discard late results.
                tokio::spawn(async move { tick.run_tick(generation).await });
            }
        });
        let spawned = match &self.runtime {
            Some(handle) => TokioSpawner::on(handle.clone()).spawn_boxed(task),
            None => runtime::runtime().spawn_boxed(task),
        };
        match spawned {
            Ok(handle) => {
                *timer = Some(handle);
                debug!(
                    "Location tracking started (generation {}, every {:?})",
                    generation, period
                );
                Ok(())
            }
            Err(e) => {
                warn!("Location tracking could not start: {}", e);
                Err(e)
            }
        }
    }

    /// Cancels the loop. In-flight acquisitions may still finish, but their
    /// results are dropped.
    pub fn stop_periodic(&self) {
        let mut timer = self.lock_timer();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = timer.take() {
            handle.cancel();
            debug!("Location tracking stopped (generation {})", generation);
        }
    }

    /// Whether a periodic loop is active.
    pub fn is_running(&self) -> bool {
        self.lock_timer()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Current generation; samples tagged with any other value are stale.
    pub fn generation(&self) -> u64 {
        self.inner.current_generation()
    }

    /// Session whose user id is attached to uploads.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn AsyncHandle>>> {
        match self.inner.timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.stop_periodic();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct FixedProvider(Result<LocationSample, LocationError>);

    #[async_trait]
    impl PositionProvider for FixedProvider {
        async fn current_position(
            &self,
            _options: PositionOptions,
        ) -> Result<LocationSample, LocationError> {
            self.0
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl PositionProvider for HangingProvider {
        async fn current_position(
            &self,
            _options: PositionOptions,
        ) -> Result<LocationSample, LocationError> {
            futures::future::pending().await
        }
    }

    #[derive(Default)]
    struct CountingSink(AtomicUsize);

    #[async_trait]
    impl LocationSink for CountingSink {
        async fn post_location(&self, _user: &str, _lat: f64, _lng: f64) -> crate::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn tracker(provider: impl PositionProvider + 'static) -> LocationTracker {
        LocationTracker::new(
            Arc::new(provider),
            Arc::new(CountingSink::default()),
            Session::new("u-1"),
            TrackerConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_once_times_out() {
        let tracker = tracker(HangingProvider);
        assert_eq!(tracker.get_once().await, Err(LocationError::Timeout));
    }

    #[tokio::test]
    async fn test_get_once_passes_errors_through() {
        let tracker = tracker(FixedProvider(Err(LocationError::PermissionDenied)));
        assert_eq!(tracker.get_once().await, Err(LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_invalid_sample_is_unavailable() {
        let tracker = tracker(FixedProvider(Ok(LocationSample::new(f64::NAN, 0.0))));
        assert_eq!(
            tracker.get_once().await,
            Err(LocationError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn test_start_stop_state() {
        let tracker = tracker(FixedProvider(Ok(LocationSample::new(1.0, 2.0))));
        assert!(!tracker.is_running());

        tracker.start_periodic().unwrap();
        assert!(tracker.is_running());
        let running_generation = tracker.generation();

        tracker.stop_periodic();
        assert!(!tracker.is_running());
        assert!(tracker.generation() > running_generation);

        tracker.stop_periodic();
        assert!(!tracker.is_running());
    }

    #[test]
    fn test_start_outside_runtime_fails_without_panicking() {
        let tracker = tracker(FixedProvider(Ok(LocationSample::new(1.0, 2.0))));
        assert!(tracker.start_periodic().is_err());
        assert!(!tracker.is_running());
        tracker.stop_periodic();
    }

    #[test]
    fn test_pinned_runtime_runs_loop_from_plain_thread() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let tracker = tracker(FixedProvider(Ok(LocationSample::new(1.0, 2.0))))
            .with_runtime(rt.handle().clone());

        tracker.start_periodic().unwrap();
        assert!(tracker.is_running());
        tracker.stop_periodic();
        assert!(!tracker.is_running());
    }
}
