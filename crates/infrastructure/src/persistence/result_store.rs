use super::write_atomically;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use steer_dns_application::ports::ResultStorePort;
use steer_dns_domain::{DomainError, ProbeCycleResult};
use tracing::debug;

/// Last cycle result as a pretty-printed JSON document.
pub struct JsonResultStore {
    path: PathBuf,
}

impl JsonResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultStorePort for JsonResultStore {
    async fn load(&self) -> Result<Option<ProbeCycleResult>, DomainError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::IoError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let result = serde_json::from_str(&text).map_err(|e| {
            DomainError::SerializationError(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(result))
    }

    async fn save(&self, result: &ProbeCycleResult) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(result)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        write_atomically(&self.path, &json).await?;
        debug!(path = %self.path.display(), hosts = result.detail.len(), "Probe result saved");
        Ok(())
    }
}
