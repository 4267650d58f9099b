//! REST client for the sourcedeck demo API.
//!
//! Implements the coordinator's [`SourceFetcher`] seam over reqwest, so the
//! state machine never sees HTTP details.

use crate::config::TuiConfig;
use async_trait::async_trait;
use sourcedeck_api::ApiError as ApiServerError;
use sourcedeck_core::{DataSource, FetchError, QueryRequest, QueryResult, RequestKey, SourceFetcher};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list_sources(
        &self,
        start_date_index: i64,
    ) -> Result<Vec<DataSource>, ApiClientError> {
        let url = format!("{}/api/datasources", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("startDateIndex", start_date_index)])
            .send()
            .await?;
        self.parse_response(response).await
    }

    pub async fn post_query(&self, request: &QueryRequest) -> Result<QueryResult, ApiClientError> {
        let url = format!("{}/api/query", self.base_url);
        let response = self.client.post(url).json(request).send().await?;
        self.parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let text = response.text().await?;
            let message = match serde_json::from_str::<ApiServerError>(&text) {
                Ok(api_error) => api_error.to_string(),
                Err(_) => text,
            };
            Err(ApiClientError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl SourceFetcher for RestClient {
    async fn fetch_sources(
        &self,
        start_index: RequestKey,
    ) -> Result<Vec<DataSource>, FetchError> {
        self.list_sources(start_index).await.map_err(into_fetch_error)
    }

    async fn submit_query(&self, request: QueryRequest) -> Result<QueryResult, FetchError> {
        self.post_query(&request).await.map_err(into_fetch_error)
    }
}

fn into_fetch_error(err: ApiClientError) -> FetchError {
    match err {
        ApiClientError::Http(e) if e.is_decode() => FetchError::Decode(e.to_string()),
        ApiClientError::Http(e) => FetchError::Transport(e.to_string()),
        ApiClientError::Status { status, message } => FetchError::Status { status, message },
    }
}
