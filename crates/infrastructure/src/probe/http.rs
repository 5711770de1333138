//! HTTPS throughput probe.
//!
//! The client pins every test-object host to the candidate address, so TLS
//! still validates the original certificate while TCP goes to the candidate.

use async_trait::async_trait;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::time::Instant;
use steer_dns_application::ports::{ThroughputProbePort, ThroughputTarget};
use steer_dns_domain::{DomainError, TestObject};
use tracing::debug;

/// Digest picked from the expected hash: 40 hex chars is SHA-1, 64 is SHA-256.
pub enum ContentHasher {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl ContentHasher {
    pub fn for_hash(expected: &str) -> Option<Self> {
        match expected.len() {
            40 => Some(Self::Sha1(Sha1::new())),
            64 => Some(Self::Sha256(Sha256::new())),
            _ => None,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(chunk),
            Self::Sha256(h) => h.update(chunk),
        }
    }

    pub fn finalize_hex(self) -> String {
        let digest = match self {
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
        };
        digest.iter().fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
    }
}

pub struct HttpThroughputProbe {
    user_agent: String,
}

impl HttpThroughputProbe {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    fn client_for(&self, target: &ThroughputTarget) -> Result<reqwest::Client, DomainError> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = target.timeout {
            builder = builder.timeout(timeout);
        }

        // Port 0 keeps the scheme default unless the URL names a port.
        let pinned = SocketAddr::from((target.addr, 0));
        builder = builder.resolve(&target.host, pinned);
        for object in target.objects.iter() {
            if let Some(host) = reqwest::Url::parse(&object.url)
                .ok()
                .and_then(|url| url.host_str().map(str::to_string))
            {
                builder = builder.resolve(&host, pinned);
            }
        }

        builder
            .build()
            .map_err(|e| DomainError::HttpError(e.to_string()))
    }

    async fn download(
        &self,
        client: &reqwest::Client,
        target: &ThroughputTarget,
        object: &TestObject,
    ) -> Result<u64, DomainError> {
        let failed = |reason: String| DomainError::ProbeFailed {
            addr: target.addr.to_string(),
            reason,
        };

        let mut hasher = ContentHasher::for_hash(&object.hash)
            .ok_or_else(|| failed(format!("unsupported hash for {}", object.url)))?;

        let mut response = client
            .get(&object.url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failed(format!(
                "HTTP {} for {}",
                response.status().as_u16(),
                object.url
            )));
        }

        let mut received = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| failed(e.to_string()))? {
            received += chunk.len() as u64;
            hasher.update(&chunk);
        }

        if !hasher.finalize_hex().eq_ignore_ascii_case(&object.hash) {
            return Err(DomainError::HashMismatch {
                url: object.url.clone(),
            });
        }
        Ok(received)
    }
}

#[async_trait]
impl ThroughputProbePort for HttpThroughputProbe {
    async fn measure(&self, target: &ThroughputTarget) -> Result<f64, DomainError> {
        if target.objects.is_empty() {
            return Err(DomainError::ProbeFailed {
                addr: target.addr.to_string(),
                reason: "no test objects".into(),
            });
        }

        let client = self.client_for(target)?;
        let started = Instant::now();
        let mut total = 0u64;

        // At least one object is always fetched, even with a zero minimum.
        loop {
            let object = &target.objects[fastrand::usize(..target.objects.len())];
            total += self.download(&client, target, object).await?;
            if total >= target.min_bytes {
                break;
            }
        }

        let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
        let speed = total as f64 / elapsed;
        debug!(
            host = %target.host,
            addr = %target.addr,
            bytes = total,
            speed,
            "Throughput measured"
        );
        Ok(speed)
    }
}
