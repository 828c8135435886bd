//! REST client for leaderboard, history, and analytics queries.
//!
//! Stateless request/response wrapper over `awc`. Non-2xx responses and
//! transport failures surface as [`ApiError`]; callers show them as a
//! retryable message and never crash.

use awc::Client;
use log::debug;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{DailyAnalytics, GameRecord, Health, HourlyAnalytics, UserStats};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::default(),
        }
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.get_json("/health").await
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<UserStats>, ApiError> {
        self.get_json(&format!("/leaderboard?limit={}", limit)).await
    }

    pub async fn user_stats(&self, username: &str) -> Result<UserStats, ApiError> {
        self.get_json(&format!("/user/{}", username)).await
    }

    pub async fn recent_games(&self, limit: usize) -> Result<Vec<GameRecord>, ApiError> {
        self.get_json(&format!("/games/recent?limit={}", limit)).await
    }

    pub async fn user_games(&self, username: &str, limit: usize) -> Result<Vec<GameRecord>, ApiError> {
        self.get_json(&format!("/games/user/{}?limit={}", username, limit))
            .await
    }

    pub async fn hourly_analytics(&self, hours: usize) -> Result<Vec<HourlyAnalytics>, ApiError> {
        self.get_json(&format!("/analytics/hourly?hours={}", hours))
            .await
    }

    pub async fn daily_analytics(&self, days: usize) -> Result<Vec<DailyAnalytics>, ApiError> {
        self.get_json(&format!("/analytics/daily?days={}", days)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let mut response = self.http.get(&url).send().await.map_err(|e| ApiError::Request {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(ApiError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}
