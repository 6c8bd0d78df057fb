use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("DNS error: {0}")]
    Dns(#[from] DnsError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Malformed UNC path '{0}'")]
    InvalidUnc(String),

    #[error("Invalid wildcard pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Name resolution failures. Any of these keeps an unseen server out of the catalog.
#[derive(Error, Debug)]
pub enum DnsError {
    #[error("host '{0}' did not resolve")]
    NotFound(String),

    #[error("lookup of '{host}' timed out after {timeout_ms}ms")]
    Timeout { host: String, timeout_ms: u64 },

    #[error("lookup of '{host}' failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reported by the operating system drive layer.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("failed to enumerate mapped drives: {0}")]
    Enumerate(String),

    #[error("failed to unmap {local_name}: error code {code}")]
    Unmap { local_name: String, code: u32 },

    #[error("drive operations are not supported on this platform")]
    Unsupported,
}
