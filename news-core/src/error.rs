use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("payload parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("no item at index {index} (page has {len})")]
    NoSuchItem { index: usize, len: usize },
    #[error("controller task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("controller channel closed unexpectedly")]
    ChannelClosed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a configuration directory")]
    NoConfigDir,
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid config: {0}")]
    Invalid(String),
}
