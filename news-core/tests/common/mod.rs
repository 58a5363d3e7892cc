#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use news_core::{
    ArticleRecord, ArticleSource, FeedController, FeedData, FeedError, FeedEvent, FeedFetcher,
    FeedView, KeyValueStore, MemoryStore, NewsApiResponse, SharedStore, StoreError,
};

/// Source that replays a script: `Some(n)` yields a batch of `n` headlines,
/// `None` (or an exhausted script) fails.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Option<usize>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Option<usize>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    async fn fetch_articles(&self) -> Result<Vec<ArticleRecord>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().flatten();
        match next {
            Some(len) => Ok(batch(len)),
            None => Err(parse_error()),
        }
    }
}

/// Source that answers with a batch of `len` headlines after `delay`.
pub struct SlowSource {
    delay: Duration,
    len: usize,
}

impl SlowSource {
    pub fn new(delay: Duration, len: usize) -> Arc<Self> {
        Arc::new(Self { delay, len })
    }
}

#[async_trait]
impl ArticleSource for SlowSource {
    async fn fetch_articles(&self) -> Result<Vec<ArticleRecord>, FeedError> {
        tokio::time::sleep(self.delay).await;
        Ok(batch(self.len))
    }
}

/// In-memory store whose writes can be switched to fail. Reads always work.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner.delete(key).await
    }
}

pub fn parse_error() -> FeedError {
    FeedError::Parse(serde_json::from_str::<NewsApiResponse>("{").unwrap_err())
}

pub fn batch(len: usize) -> Vec<ArticleRecord> {
    (0..len)
        .map(|i| ArticleRecord::new(i as i64, format!("headline {i}")))
        .collect()
}

pub fn ids(records: &[ArticleRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

pub fn controller(store: SharedStore, source: Arc<dyn ArticleSource>) -> FeedController {
    let data = FeedData::new(store);
    let fetcher = FeedFetcher::new(source, data.clone());
    FeedController::new(data, fetcher, 10)
}

pub async fn stored_len(store: SharedStore) -> Option<usize> {
    FeedData::new(store)
        .load_batch()
        .await
        .unwrap()
        .map(|batch| batch.len())
}

pub fn drain_events(rx: &mut broadcast::Receiver<FeedEvent>) -> Vec<FeedEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Waits up to two seconds for a view matching `pred`.
pub async fn wait_for_view(
    rx: &mut broadcast::Receiver<FeedEvent>,
    pred: impl Fn(&FeedView) -> bool,
) -> FeedView {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, rx.recv()).await {
            Ok(Ok(FeedEvent::Updated(view))) if pred(&view) => return view,
            Ok(Ok(_)) | Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
            Ok(Err(broadcast::error::RecvError::Closed)) => panic!("event channel closed"),
            Err(_) => panic!("timed out waiting for view"),
        }
    }
}
