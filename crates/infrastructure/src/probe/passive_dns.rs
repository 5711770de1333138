use async_trait::async_trait;
use serde::Deserialize;
use steer_dns_application::ports::{PassiveDnsPort, PassiveResolution};
use steer_dns_domain::DomainError;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct DomainReport {
    #[serde(default)]
    resolutions: Vec<PassiveResolution>,
}

/// Passive-DNS history lookup:
/// `GET <base>/searchApi/v2/domain/report/?domain=<host>`.
pub struct PassiveDnsClient {
    client: reqwest::Client,
    base_url: String,
}

impl PassiveDnsClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn report_url(&self) -> String {
        format!("{}/searchApi/v2/domain/report/", self.base_url)
    }
}

#[async_trait]
impl PassiveDnsPort for PassiveDnsClient {
    async fn resolutions(&self, host: &str) -> Result<Vec<PassiveResolution>, DomainError> {
        let response = self
            .client
            .get(self.report_url())
            .query(&[("domain", host)])
            .send()
            .await
            .map_err(|e| DomainError::HttpError(format!("passive DNS for {}: {}", host, e)))?;

        if !response.status().is_success() {
            return Err(DomainError::HttpError(format!(
                "HTTP {} from passive DNS for {}",
                response.status().as_u16(),
                host
            )));
        }

        let report: DomainReport = response
            .json()
            .await
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        debug!(host = %host, resolutions = report.resolutions.len(), "Passive DNS report");
        Ok(report.resolutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_url_strips_trailing_slash() {
        let client = PassiveDnsClient::new(reqwest::Client::new(), "https://pdns.example/");
        assert_eq!(
            client.report_url(),
            "https://pdns.example/searchApi/v2/domain/report/"
        );
    }

    #[test]
    fn test_report_without_resolutions_is_empty() {
        let report: DomainReport = serde_json::from_str(r#"{"response_code": "0"}"#).unwrap();
        assert!(report.resolutions.is_empty());

        let report: DomainReport = serde_json::from_str(
            r#"{"resolutions": [{"ip_address": "192.0.2.1", "last_resolved": "2024-01-02"}]}"#,
        )
        .unwrap();
        assert_eq!(
            report.resolutions,
            vec![PassiveResolution::new("192.0.2.1", "2024-01-02")]
        );
    }
}
