use crate::{MapError, Result};
use async_trait::async_trait;
use log::debug;
use serde::Serialize;

/// Destination for uploaded positions.
#[async_trait]
pub trait LocationSink: Send + Sync {
    async fn post_location(&self, user_id: &str, latitude: f64, longitude: f64) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationPayload<'a> {
    user_id: &'a str,
    latitude: f64,
    longitude: f64,
}

/// Posts positions as JSON to `<base_url>/locations`.
#[derive(Debug, Clone)]
pub struct RestLocationSink {
    client: reqwest::Client,
    endpoint: String,
}

impl RestLocationSink {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/locations", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LocationSink for RestLocationSink {
    async fn post_location(&self, user_id: &str, latitude: f64, longitude: f64) -> Result<()> {
        let payload = LocationPayload {
            user_id,
            latitude,
            longitude,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(MapError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Box::new(MapError::Upload(format!(
                "{} responded with {}",
                self.endpoint, status
            ))));
        }
        debug!("Uploaded location for {}", user_id);
        Ok(())
    }
}
