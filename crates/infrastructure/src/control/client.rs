use std::time::Duration;
use steer_dns_domain::{DomainError, ProbeCycleResult};

/// Client for a running server's control API.
#[derive(Clone)]
pub struct ControlClient {
    client: reqwest::Client,
    base_url: String,
    header_name: String,
    secret: Option<String>,
}

impl ControlClient {
    pub fn new(
        base_url: impl Into<String>,
        header_name: impl Into<String>,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::HttpError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            header_name: header_name.into(),
            secret,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.secret {
            Some(secret) => request.header(self.header_name.as_str(), secret.as_str()),
            None => request,
        }
    }

    async fn check(response: reqwest::Response, url: &str) -> Result<(), DomainError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DomainError::HttpError(format!(
            "HTTP {} for {}: {}",
            status.as_u16(),
            url,
            body.trim()
        )))
    }

    pub async fn push_result(&self, result: &ProbeCycleResult) -> Result<(), DomainError> {
        let url = self.endpoint("results");
        let response = self
            .authorized(self.client.post(&url).json(result))
            .send()
            .await
            .map_err(|e| DomainError::HttpError(format!("push to {}: {}", url, e)))?;
        Self::check(response, &url).await
    }

    pub async fn reload(&self) -> Result<(), DomainError> {
        let url = self.endpoint("config/reload");
        let response = self
            .authorized(self.client.post(&url))
            .send()
            .await
            .map_err(|e| DomainError::HttpError(format!("reload via {}: {}", url, e)))?;
        Self::check(response, &url).await
    }
}
