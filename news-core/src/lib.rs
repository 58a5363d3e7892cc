pub mod article;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod feed;
pub mod poller;
pub mod storage;

pub use article::{ArticleRecord, NewsApiResponse, EMPTY_PIN_ID};
pub use config::{ApiConfig, AppConfig, FeedConfig, StorageConfig};
pub use controller::{derive_page, Advance, FeedController, FeedEvent, FeedState, FeedView};
pub use data::{FeedData, NEWS_KEY, PINNED_KEY};
pub use error::{ConfigError, FeedError, StoreError};
pub use feed::{ArticleSource, FeedFetcher, NewsApiClient};
pub use poller::{spawn_controller, ControllerHandle, Intent};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
