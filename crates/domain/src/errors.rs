use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport failure talking to {server}: {reason}")]
    TransportFailure { server: String, reason: String },

    #[error("{qname} resolution failed on {} ({transport})", .nameservers.join("; "))]
    ResolutionExhausted {
        qname: String,
        transport: String,
        nameservers: Vec<String>,
    },

    #[error("No nameservers available for {0}")]
    NoNameservers(String),

    #[error("Cache is full")]
    CacheFull,

    #[error("Probe failed for {addr}: {reason}")]
    ProbeFailed { addr: String, reason: String },

    #[error("Content hash mismatch for {url}")]
    HashMismatch { url: String },

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("A probe cycle is already running")]
    CycleInProgress,

    #[error("Resource not found: {0}")]
    NotFound(String),
}
