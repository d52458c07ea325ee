//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tripmap::prelude::*;

/// Always answers with the same result.
pub struct FixedProvider(pub std::result::Result<LocationSample, LocationError>);

impl FixedProvider {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self(Ok(LocationSample::new(lat, lng)))
    }

    pub fn failing(error: LocationError) -> Self {
        Self(Err(error))
    }
}

#[async_trait]
impl PositionProvider for FixedProvider {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> std::result::Result<LocationSample, LocationError> {
        self.0
    }
}

/// Fails every other request, starting with the first.
#[derive(Default)]
pub struct FlakyProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl PositionProvider for FlakyProvider {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> std::result::Result<LocationSample, LocationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 2 == 0 {
            Err(LocationError::PositionUnavailable)
        } else {
            Ok(LocationSample::new(10.0, 20.0))
        }
    }
}

/// Blocks each request until the test releases a permit.
pub struct GatedProvider {
    pub gate: Arc<Semaphore>,
    pub started: AtomicUsize,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            started: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PositionProvider for GatedProvider {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> std::result::Result<LocationSample, LocationError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        match self.gate.acquire().await {
            Ok(permit) => {
                permit.forget();
                Ok(LocationSample::new(1.0, 1.0))
            }
            Err(_) => Err(LocationError::PositionUnavailable),
        }
    }
}

/// Records uploads; optionally fails every one of them.
#[derive(Default)]
pub struct RecordingSink {
    pub uploads: Mutex<Vec<(String, f64, f64)>>,
    pub attempts: AtomicUsize,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSink for RecordingSink {
    async fn post_location(&self, user_id: &str, latitude: f64, longitude: f64) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Box::new(MapError::Upload("backend unavailable".into())));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((user_id.to_string(), latitude, longitude));
        Ok(())
    }
}

/// Collects what the tracker reports.
#[derive(Default)]
pub struct RecordingObserver {
    pub samples: Mutex<Vec<(u64, LocationSample)>>,
    pub errors: Mutex<Vec<(u64, LocationError)>>,
}

impl TrackerObserver for RecordingObserver {
    fn on_sample(&self, generation: u64, sample: &LocationSample) {
        self.samples.lock().unwrap().push((generation, *sample));
    }

    fn on_error(&self, generation: u64, error: &LocationError) {
        self.errors.lock().unwrap().push((generation, *error));
    }
}

pub fn container() -> MapContainer {
    MapContainer::new("map", 390.0, 844.0)
}

pub fn marker(id: &str, lat: f64, lng: f64) -> Marker {
    Marker::new(id, LatLng::new(lat, lng))
}
