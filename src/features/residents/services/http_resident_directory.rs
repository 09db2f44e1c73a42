use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::residents::services::ResidentDirectory;

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    resident_id: Option<Uuid>,
}

/// Resident directory reached over HTTP at `GET {base_url}/residents/resolve?q=`
pub struct HttpResidentDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResidentDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ResidentDirectory for HttpResidentDirectory {
    async fn resolve(&self, search_term: &str) -> Result<Option<Uuid>> {
        let url = format!("{}/residents/resolve", self.base_url);
        tracing::debug!("Resolving resident '{}' via {}", search_term, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", search_term)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Resident directory request failed: {}", e);
                AppError::ExternalServiceError(format!("Resident directory unavailable: {}", e))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Resident directory returned HTTP {}",
                response.status()
            )));
        }

        let body: ResolveResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Invalid resident directory response: {}", e))
        })?;

        Ok(body.resident_id)
    }
}
