//! Feed reader task
//!
//! Each subscription owns a background task that loads pages, re-queries the
//! loaded window whenever the collection changes, and publishes the result on
//! a watch channel. Dropping the subscription stops the task.

use std::sync::Arc;

use manada_core::{
    collections, last_organic, splice_sponsored, ChangeEvent, Document, FeedCursor, FeedEntry,
    FeedQuery, FieldFilter,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::state::{FeedState, FeedStatus};
use crate::backend::{ChangeSource, FeedSource};
use crate::error::{ClientResult, FeedError};

enum Command {
    LoadMore(oneshot::Sender<()>),
    Refresh(oneshot::Sender<()>),
}

enum Step {
    Command(Option<Command>),
    Change(Result<ChangeEvent, RecvError>),
}

/// Configuration of a live feed
#[derive(Clone)]
pub struct FeedReader {
    source: Arc<dyn FeedSource>,
    changes: Arc<dyn ChangeSource>,
    query: FeedQuery,
    page_size: usize,
    sponsored_position: Option<usize>,
}

impl FeedReader {
    /// A reader over `query`; its limit is the page size
    pub fn new(source: Arc<dyn FeedSource>, changes: Arc<dyn ChangeSource>, query: FeedQuery) -> Self {
        let page_size = query.limit;
        Self {
            source,
            changes,
            query,
            page_size,
            sponsored_position: None,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, FeedQuery::MAX_LIMIT);
        self
    }

    /// Splice the newest active sponsored post at `position`
    pub fn with_sponsored(mut self, position: usize) -> Self {
        self.sponsored_position = Some(position);
        self
    }

    /// Start listening; the first page loads in the background
    pub fn subscribe(&self) -> FeedSubscription {
        let (state_tx, state_rx) = watch::channel(FeedState::loading());
        let (command_tx, command_rx) = mpsc::channel(8);
        // Subscribe before the first fetch so no change is missed
        let changes = self.changes.changes();

        let worker = FeedWorker {
            reader: self.clone(),
            state: state_tx,
        };
        let task = tokio::spawn(worker.run(command_rx, changes));

        FeedSubscription {
            state: state_rx,
            commands: command_tx,
            task,
        }
    }
}

impl std::fmt::Debug for FeedReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedReader")
            .field("collection", &self.query.collection)
            .field("page_size", &self.page_size)
            .field("sponsored_position", &self.sponsored_position)
            .finish()
    }
}

/// Handle to a running feed; dropping it unsubscribes
#[derive(Debug)]
pub struct FeedSubscription {
    state: watch::Receiver<FeedState>,
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl FeedSubscription {
    /// Latest published state
    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Wait for the next published state
    pub async fn changed(&mut self) -> Result<FeedState, FeedError> {
        self.state.changed().await.map_err(|_| FeedError::Closed)?;
        Ok(self.state.borrow_and_update().clone())
    }

    /// Wait until the first load finished (ready or failed)
    pub async fn loaded(&mut self) -> Result<FeedState, FeedError> {
        let state = self
            .state
            .wait_for(|s| s.status != FeedStatus::Loading)
            .await
            .map_err(|_| FeedError::Closed)?;
        Ok(state.clone())
    }

    /// Fetch the next page; does nothing once the end of data is reached
    pub async fn load_more(&self) -> Result<FeedState, FeedError> {
        self.request(Command::LoadMore).await
    }

    /// Re-query the loaded window now
    pub async fn refresh(&self) -> Result<FeedState, FeedError> {
        self.request(Command::Refresh).await
    }

    async fn request(&self, command: fn(oneshot::Sender<()>) -> Command) -> Result<FeedState, FeedError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(command(ack_tx))
            .await
            .map_err(|_| FeedError::Closed)?;
        ack_rx.await.map_err(|_| FeedError::Closed)?;
        Ok(self.state())
    }

    /// Stop the listener
    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct FeedWorker {
    reader: FeedReader,
    state: watch::Sender<FeedState>,
}

impl FeedWorker {
    #[instrument(skip_all, fields(collection = %self.reader.query.collection))]
    async fn run(self, mut commands: mpsc::Receiver<Command>, mut changes: broadcast::Receiver<ChangeEvent>) {
        self.initial_load().await;
        let mut changes_open = true;

        loop {
            let step = tokio::select! {
                command = commands.recv() => Step::Command(command),
                event = changes.recv(), if changes_open => Step::Change(event),
            };

            match step {
                Step::Command(Some(Command::LoadMore(ack))) => {
                    self.load_more().await;
                    let _ = ack.send(());
                }
                Step::Command(Some(Command::Refresh(ack))) => {
                    self.refresh().await;
                    let _ = ack.send(());
                }
                Step::Command(None) => break,
                Step::Change(Ok(event)) => {
                    if self.is_relevant(&event) {
                        self.refresh().await;
                    }
                }
                Step::Change(Err(RecvError::Lagged(skipped))) => {
                    debug!(skipped, "Change stream lagged; refreshing");
                    self.refresh().await;
                }
                Step::Change(Err(RecvError::Closed)) => {
                    debug!("Change stream closed");
                    changes_open = false;
                }
            }
        }
        debug!("Feed subscription ended");
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        event.collection == self.reader.query.collection
            || (self.reader.sponsored_position.is_some()
                && event.collection == collections::SPONSORED_POSTS)
    }

    async fn initial_load(&self) {
        match self.fetch_window(1).await {
            Ok((organic, end_of_data)) => {
                let entries = self.with_sponsored(&organic).await;
                self.state.send_replace(FeedState {
                    status: FeedStatus::Ready,
                    entries,
                    end_of_data,
                    pages_loaded: 1,
                });
            }
            Err(e) => {
                warn!(error = %e, "Initial feed load failed");
                self.state.send_modify(|s| s.status = FeedStatus::Failed(e.to_string()));
            }
        }
    }

    async fn load_more(&self) {
        let current = self.state.borrow().clone();
        if current.end_of_data || !current.is_ready() {
            return;
        }

        let cursor = last_organic(&current.entries)
            .map(|doc| FeedCursor::from_document(doc, &self.reader.query.order_by));
        let query = self
            .reader
            .query
            .clone()
            .limit(self.reader.page_size)
            .start_after(cursor);

        match self.reader.source.fetch(&query).await {
            Ok(page) => {
                let end_of_data = page.len() < self.reader.page_size;
                let mut organic: Vec<Document> = current
                    .entries
                    .iter()
                    .filter(|e| !e.is_sponsored())
                    .map(|e| e.document().clone())
                    .collect();
                organic.extend(page);
                let entries = self.with_sponsored(&organic).await;

                self.state.send_replace(FeedState {
                    status: FeedStatus::Ready,
                    entries,
                    end_of_data,
                    pages_loaded: current.pages_loaded + 1,
                });
            }
            Err(e) => warn!(error = %e, "Loading next feed page failed"),
        }
    }

    /// Re-query every loaded page; publish only when something changed
    async fn refresh(&self) {
        let pages = self.state.borrow().pages_loaded.max(1);
        match self.fetch_window(pages).await {
            Ok((organic, end_of_data)) => {
                let entries = self.with_sponsored(&organic).await;
                self.state.send_if_modified(|state| {
                    let next = FeedState {
                        status: FeedStatus::Ready,
                        entries,
                        end_of_data,
                        pages_loaded: pages,
                    };
                    if *state == next {
                        false
                    } else {
                        *state = next;
                        true
                    }
                });
            }
            Err(e) => warn!(error = %e, "Feed refresh failed; keeping previous entries"),
        }
    }

    /// Fetch up to `pages` pages from the start; stops at a short page
    async fn fetch_window(&self, pages: usize) -> ClientResult<(Vec<Document>, bool)> {
        let page_size = self.reader.page_size;
        let mut organic: Vec<Document> = Vec::new();
        let mut cursor = None;

        for _ in 0..pages {
            let query = self
                .reader
                .query
                .clone()
                .limit(page_size)
                .start_after(cursor);
            let page = self.reader.source.fetch(&query).await?;
            let short = page.len() < page_size;
            cursor = page
                .last()
                .map(|doc| FeedCursor::from_document(doc, &self.reader.query.order_by));
            organic.extend(page);
            if short {
                return Ok((organic, true));
            }
        }
        Ok((organic, false))
    }

    async fn with_sponsored(&self, organic: &[Document]) -> Vec<FeedEntry> {
        let Some(position) = self.reader.sponsored_position else {
            return organic.iter().cloned().map(FeedEntry::Organic).collect();
        };

        let query = FeedQuery::new(collections::SPONSORED_POSTS)
            .filter(FieldFilter::eq("active", true))
            .limit(1);
        let sponsored = match self.reader.source.fetch(&query).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(error = %e, "Sponsored lookup failed; showing organic entries only");
                Vec::new()
            }
        };
        splice_sponsored(organic, &sponsored, position)
    }
}
