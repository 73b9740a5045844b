//! Typed client for the VO2 metrics API

use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::config::UpstreamSettings;
use crate::error::ClientError;
use crate::models::{Sport, VolumeResponse, YtdVolume};

pub const API_KEY_HEADER: &str = "x-vo2-api-key";

pub struct Vo2Client {
    http: Client,
    base_url: Url,
    api_key: String,
    provider: String,
}

impl Vo2Client {
    pub fn new(settings: &UpstreamSettings, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = settings
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::MissingConfig {
                field: "base_url".to_string(),
            })?;
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClientError::MissingConfig {
                field: "api_key".to_string(),
            })?;

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Vo2Client {
            http,
            base_url: Url::parse(base_url)?,
            api_key,
            provider: settings.provider.clone(),
        })
    }

    /// Weekly volume for `sports` since `start_date`
    pub async fn weekly_volume(
        &self,
        athlete_id: Uuid,
        sports: &[Sport],
        start_date: NaiveDate,
    ) -> Result<VolumeResponse, ClientError> {
        let url = self.endpoint(&format!("athletes/{}/metrics/volume", athlete_id))?;

        let mut query: Vec<(&str, String)> = vec![
            ("provider", self.provider.clone()),
            ("frequency", "week".to_string()),
        ];
        query.extend(sports.iter().map(|sport| ("sport", sport.to_string())));
        query.push(("startDate", start_date.format("%Y-%m-%d").to_string()));

        tracing::info!(%athlete_id, sports = sports.len(), %start_date, "Fetching weekly volume");
        self.get_json(url, &query).await
    }

    /// Running totals since January 1st
    pub async fn running_ytd(&self, athlete_id: Uuid) -> Result<YtdVolume, ClientError> {
        let url = self.endpoint(&format!("athletes/{}/metrics/running-ytd-volume", athlete_id))?;
        let query = [("provider", self.provider.clone())];

        tracing::info!(%athlete_id, "Fetching running year-to-date volume");
        self.get_json(url, &query).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T, ClientError> {
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Error for a non-success response, preferring the body's `error` field
async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let body: Option<serde_json::Value> = response.json().await.ok();

    let message = body
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown status")
            )
        });

    tracing::warn!(status = status.as_u16(), %message, "Metrics API returned an error");

    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}
