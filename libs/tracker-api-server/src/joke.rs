use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::de::IgnoredAny;

use crate::AppState;
use crate::config::JokeSettings;
use crate::error::ApiError;

/// Прокси к стороннему API случайных шуток. Один запрос на вызов,
/// без retry и кэша; тело upstream отдаётся как есть.
pub struct JokeClient {
    http: reqwest::Client,
    upstream_url: String,
}

impl JokeClient {
    pub fn new(settings: &JokeSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            upstream_url: settings.upstream_url.clone(),
        })
    }

    /// Тело upstream-ответа байт в байт. Проверяется только, что это JSON.
    pub async fn fetch(&self) -> Result<Bytes, ApiError> {
        let resp = self
            .http
            .get(&self.upstream_url)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("fetch: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!("HTTP {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Upstream(format!("read: {e}")))?;
        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|e| ApiError::Upstream(format!("decode: {e}")))?;
        Ok(body)
    }
}

// --- GET /joke ---

pub(crate) async fn handle_joke(State(state): State<AppState>) -> Result<Response, ApiError> {
    let joke = state.jokes.fetch().await?;
    tracing::debug!(upstream = %state.jokes.upstream_url, bytes = joke.len(), "joke fetched");
    Ok(([(CONTENT_TYPE, "application/json")], joke).into_response())
}
