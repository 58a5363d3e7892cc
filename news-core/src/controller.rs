//! Pagination, refresh and pin state for the reader.
//!
//! The controller keeps a page of at most `page_len` unread records derived
//! from the stored batch. Advancing removes the leading chunk from the stored
//! batch and re-derives the page; once the batch is exhausted the next
//! advance fetches a new one. Deleting only touches the in-memory page, while
//! pinning and unpinning write through to the store.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::article::ArticleRecord;
use crate::data::FeedData;
use crate::error::FeedError;
use crate::feed::FeedFetcher;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading,
    Ready,
    Empty,
    Error,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    pub state: FeedState,
    pub page: Vec<ArticleRecord>,
    pub pinned: Option<ArticleRecord>,
    pub is_loading: bool,
    pub is_error: bool,
    pub last_refreshed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    RefreshStarted,
    RefreshFinished { ok: bool },
    Updated(FeedView),
}

/// Outcome of [`FeedController::advance_page`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The leading chunk was removed from the stored batch.
    Paged {
        consumed: Vec<ArticleRecord>,
        remaining: usize,
    },
    /// The stored batch was exhausted and a new one was fetched.
    Refetched { batch_len: usize },
    Failed,
}

pub struct FeedController {
    data: FeedData,
    fetcher: FeedFetcher,
    page_len: usize,
    state: FeedState,
    page: Vec<ArticleRecord>,
    pinned: Option<ArticleRecord>,
    is_error: bool,
    last_refreshed: Option<DateTime<Utc>>,
    events: broadcast::Sender<FeedEvent>,
}

/// Unread records from the head of `batch`, marked read for display.
pub fn derive_page(batch: Vec<ArticleRecord>, page_len: usize) -> Vec<ArticleRecord> {
    batch
        .into_iter()
        .filter(|record| !record.read)
        .take(page_len)
        .map(|record| ArticleRecord {
            read: true,
            ..record
        })
        .collect()
}

impl FeedController {
    pub fn new(data: FeedData, fetcher: FeedFetcher, page_len: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            data,
            fetcher,
            page_len: page_len.max(1),
            state: FeedState::Idle,
            page: Vec::new(),
            pinned: None,
            is_error: false,
            last_refreshed: None,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn page(&self) -> &[ArticleRecord] {
        &self.page
    }

    pub fn pinned(&self) -> Option<&ArticleRecord> {
        self.pinned.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            state: self.state,
            page: self.page.clone(),
            pinned: self.pinned.clone(),
            is_loading: self.state == FeedState::Loading,
            is_error: self.is_error,
            last_refreshed: self.last_refreshed,
        }
    }

    fn emit(&self, event: FeedEvent) {
        // No subscribers is fine; the view is still reachable via `view()`.
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        self.emit(FeedEvent::Updated(self.view()));
    }

    fn settle(&mut self) {
        self.state = if self.page.is_empty() {
            FeedState::Empty
        } else {
            FeedState::Ready
        };
    }

    fn fail(&mut self, err: &FeedError) {
        warn!(error = %err, "feed operation failed");
        self.is_error = true;
        self.state = FeedState::Error;
    }

    /// Restores the pin slot and shows whatever batch is cached. Without a
    /// restored pin, a fresh batch is fetched as well.
    pub async fn start(&mut self) -> FeedState {
        match self.data.load_pin().await {
            Ok(pin) => self.pinned = pin,
            Err(err) => warn!(error = %err, "failed to read pinned item"),
        }

        if let Err(err) = self.reload_page().await {
            self.fail(&err);
        } else {
            self.settle();
        }

        if self.pinned.is_some() {
            info!("pinned item restored, skipping initial fetch");
            self.publish();
        } else {
            let _ = self.fetch().await;
        }
        self.state
    }

    async fn reload_page(&mut self) -> Result<(), FeedError> {
        match self.data.load_batch().await? {
            Some(batch) => {
                self.page = derive_page(batch, self.page_len);
                debug!(len = self.page.len(), "page derived from stored batch");
            }
            None => debug!("no stored batch, page unchanged"),
        }
        Ok(())
    }

    async fn fetch(&mut self) -> Result<usize, FeedError> {
        self.state = FeedState::Loading;
        self.publish();

        let result = match self.fetcher.fetch_batch().await {
            Ok(batch) => {
                self.is_error = false;
                self.last_refreshed = Some(Utc::now());
                self.reload_page().await.map(|()| batch.len())
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => self.settle(),
            Err(err) => self.fail(err),
        }
        self.publish();
        result
    }

    /// Consumes the next chunk of the stored batch, or fetches a new batch
    /// when it is exhausted.
    pub async fn advance_page(&mut self) -> Advance {
        self.emit(FeedEvent::RefreshStarted);
        let outcome = self.advance_inner().await;
        self.emit(FeedEvent::RefreshFinished {
            ok: outcome != Advance::Failed,
        });
        outcome
    }

    async fn advance_inner(&mut self) -> Advance {
        let stored = match self.data.load_batch().await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err) => {
                self.fail(&err);
                self.publish();
                return Advance::Failed;
            }
        };

        if stored.is_empty() {
            info!("stored batch exhausted, fetching a new one");
            return match self.fetch().await {
                Ok(batch_len) => Advance::Refetched { batch_len },
                Err(_) => Advance::Failed,
            };
        }

        self.state = FeedState::Loading;
        self.publish();

        let mut remaining = stored;
        let take = self.page_len.min(remaining.len());
        let consumed: Vec<ArticleRecord> = remaining.drain(..take).collect();

        let result = match self.data.save_batch(&remaining).await {
            Ok(()) => self.reload_page().await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.fail(&err);
            self.publish();
            return Advance::Failed;
        }

        // The store is writable again, so an earlier store failure no longer holds.
        self.is_error = false;
        self.settle();
        self.publish();
        info!(
            consumed = consumed.len(),
            remaining = remaining.len(),
            "advanced to next page"
        );
        Advance::Paged {
            consumed,
            remaining: remaining.len(),
        }
    }

    /// Removes a row from the visible page only. The stored batch is left as
    /// is; the row is consumed with the rest of its chunk on the next advance.
    pub fn delete(&mut self, index: usize) -> Result<ArticleRecord, FeedError> {
        if index >= self.page.len() {
            return Err(FeedError::NoSuchItem {
                index,
                len: self.page.len(),
            });
        }
        let removed = self.page.remove(index);
        debug!(id = removed.id, "deleted item from page");
        self.publish();
        Ok(removed)
    }

    /// Copies a visible row into the pin slot, replacing any previous pin.
    pub async fn pin(&mut self, index: usize) -> Result<ArticleRecord, FeedError> {
        let record = self
            .page
            .get(index)
            .cloned()
            .ok_or(FeedError::NoSuchItem {
                index,
                len: self.page.len(),
            })?;
        self.data.save_pin(&record).await?;
        info!(id = record.id, "pinned item");
        self.pinned = Some(record.clone());
        self.publish();
        Ok(record)
    }

    pub async fn unpin(&mut self) -> Result<(), FeedError> {
        self.data.clear_pin().await?;
        if self.pinned.take().is_some() {
            info!("unpinned item");
        }
        self.publish();
        Ok(())
    }
}
