use serde::{Deserialize, Serialize};

/// A content object downloaded during throughput probing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestObject {
    pub url: String,

    /// Hex digest of the body. 40 characters selects SHA-1, 64 selects SHA-256.
    pub hash: String,
}

impl TestObject {
    pub fn new(url: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hash: hash.into(),
        }
    }

    pub fn has_valid_hash(&self) -> bool {
        matches!(self.hash.len(), 40 | 64) && self.hash.chars().all(|c| c.is_ascii_hexdigit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManagedHostConfig {
    pub host: String,

    /// Name currently serving production traffic for `host`, if any.
    #[serde(default)]
    pub live_alias: Option<String>,

    /// Extra hostnames (or literal IPv4 addresses) that seed discovery.
    #[serde(default)]
    pub aux_hosts: Vec<String>,

    #[serde(default)]
    pub tests: Vec<TestObject>,
}

impl ManagedHostConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            live_alias: None,
            aux_hosts: Vec::new(),
            tests: Vec::new(),
        }
    }

    pub fn with_live_alias(mut self, alias: impl Into<String>) -> Self {
        self.live_alias = Some(alias.into());
        self
    }

    pub fn with_aux_hosts(mut self, aux: Vec<String>) -> Self {
        self.aux_hosts = aux;
        self
    }

    pub fn with_tests(mut self, tests: Vec<TestObject>) -> Self {
        self.tests = tests;
        self
    }
}
