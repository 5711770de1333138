use serde::{Deserialize, Serialize};

use super::values::DurationValue;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Lifetime of a positive entry, independent of the records' own TTLs.
    #[serde(default = "default_ttl")]
    pub ttl: DurationValue,

    /// 0 means unbounded.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_negative_ttl")]
    pub negative_ttl: DurationValue,

    #[serde(default = "default_negative_max_entries")]
    pub negative_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_entries: default_max_entries(),
            negative_ttl: default_negative_ttl(),
            negative_max_entries: default_negative_max_entries(),
        }
    }
}

fn default_ttl() -> DurationValue {
    DurationValue::from_secs(600)
}

fn default_max_entries() -> usize {
    65_536
}

fn default_negative_ttl() -> DurationValue {
    DurationValue::from_secs(30)
}

fn default_negative_max_entries() -> usize {
    16_384
}
