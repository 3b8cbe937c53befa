use log::debug;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::auth::Token;
use crate::error::{Result, SyncError};
use crate::sync::{UploadSink, WorkoutUpload};

pub const DEFAULT_BASE_URL: &str = "https://intervals.icu";

/// intervals.icu API keys authenticate as this fixed basic-auth user.
const API_KEY_USER: &str = "API_KEY";

/// Calendar event body for a planned workout.
#[derive(Debug, Serialize)]
struct EventRequest<'a> {
    category: &'static str,
    start_date_local: String,
    #[serde(rename = "type")]
    kind: &'static str,
    filename: &'a str,
    file_contents: &'a str,
}

impl<'a> From<&'a WorkoutUpload> for EventRequest<'a> {
    fn from(upload: &'a WorkoutUpload) -> Self {
        Self {
            category: "WORKOUT",
            start_date_local: format!("{}T00:00:00", upload.date.format("%Y-%m-%d")),
            kind: "Ride",
            filename: &upload.filename,
            file_contents: &upload.contents,
        }
    }
}

/// Client for the intervals.icu events API.
pub struct IntervalsClient {
    client: Client,
    events_url: Url,
    api_key: Token,
}

impl IntervalsClient {
    pub fn new(base_url: &str, athlete_id: &str, api_key: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("suffersync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to create HTTP client: {e}")))?;

        let events_url = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("Invalid intervals.icu URL: {e}")))?
            .join(&format!("api/v1/athlete/{athlete_id}/events"))
            .map_err(|e| SyncError::Config(format!("Invalid events URL: {e}")))?;

        Ok(Self {
            client,
            events_url,
            api_key,
        })
    }

    /// Creates a workout event on the athlete's calendar.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Upload` for any non-success status.
    pub async fn create_workout_event(&self, upload: &WorkoutUpload) -> Result<()> {
        let response = self
            .client
            .post(self.events_url.clone())
            .basic_auth(API_KEY_USER, Some(self.api_key.as_str()))
            .json(&EventRequest::from(upload))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(SyncError::Upload {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Created workout event for {} ({status})", upload.date);
        Ok(())
    }
}

impl UploadSink for IntervalsClient {
    async fn upload(&self, upload: &WorkoutUpload) -> Result<()> {
        self.create_workout_event(upload).await
    }
}
