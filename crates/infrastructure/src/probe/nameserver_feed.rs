use async_trait::async_trait;
use serde::Deserialize;
use steer_dns_application::ports::NameserverFeedPort;
use steer_dns_domain::DomainError;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct FeedEntry {
    ip: String,
}

/// Public resolver list: `GET <base>/nameserver/<cc>.json` → `[{"ip": ...}]`.
pub struct NameserverFeedClient {
    client: reqwest::Client,
    base_url: String,
}

impl NameserverFeedClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn feed_url(&self, country: &str) -> String {
        format!(
            "{}/nameserver/{}.json",
            self.base_url,
            country.to_ascii_lowercase()
        )
    }
}

#[async_trait]
impl NameserverFeedPort for NameserverFeedClient {
    async fn fetch(&self, country: &str) -> Result<Vec<String>, DomainError> {
        let url = self.feed_url(country);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::HttpError(format!("fetch error for {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(DomainError::HttpError(format!(
                "HTTP {} for {}",
                response.status().as_u16(),
                url
            )));
        }

        let entries: Vec<FeedEntry> = response
            .json()
            .await
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        debug!(country = %country, nameservers = entries.len(), "Nameserver feed fetched");
        Ok(entries.into_iter().map(|entry| entry.ip).collect())
    }
}
