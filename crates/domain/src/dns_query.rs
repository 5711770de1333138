use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Transport a DNS request arrived on. Upstream exchanges reuse the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a DNS question.
///
/// The name is lowercased and always carries a trailing dot, so `Example.TEST`
/// and `example.test.` produce the same fingerprint. The hash is the cache key
/// and doubles as a short identifier in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryFingerprint {
    name: Arc<str>,
    record_type: Arc<str>,
    class: Arc<str>,
    hash: Arc<str>,
}

impl QueryFingerprint {
    pub fn new(name: &str, record_type: impl fmt::Display, class: impl fmt::Display) -> Self {
        let name = normalize_name(name);
        let record_type = record_type.to_string().to_ascii_uppercase();
        let class = class.to_string().to_ascii_uppercase();

        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(b" ");
        hasher.update(class.as_bytes());
        hasher.update(b" ");
        hasher.update(record_type.as_bytes());
        let digest = hasher.finalize();

        let hash: String = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();

        Self {
            name: name.into(),
            record_type: record_type.into(),
            class: class.into(),
            hash: hash.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.name, self.class, self.record_type, self.hash
        )
    }
}

/// Lowercase a domain name and make it fully qualified.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = name.trim().to_ascii_lowercase();
    if !normalized.ends_with('.') {
        normalized.push('.');
    }
    normalized
}
