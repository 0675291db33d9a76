//! Runs a [`MasonryFeed`] against a [`SearchProvider`] on tokio.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use masonry_feed::{
    Dp, FeedOutput, FetchError, FetchOutcome, FetchRequest, Instant, MasonryFeed, PageResponse,
};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, trace, warn};

use crate::{provider::SearchProvider, tokio_runtime};

/// Failure to set up a [`FeedDriver`].
#[derive(Debug, Error)]
pub enum DriverError {
    /// No ambient runtime and the shared one could not be started.
    #[error("failed to start the fetch runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Shared access to a feed owned by a [`FeedDriver`].
///
/// Cloning is cheap. Readers on other threads (a render loop, say) observe
/// every completion the driver applies.
pub struct FeedHandle<P> {
    inner: Arc<RwLock<MasonryFeed<P>>>,
}

impl<P> Clone for FeedHandle<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P> FeedHandle<P> {
    /// Execute a closure with a shared reference to the feed.
    pub fn with<R>(&self, f: impl FnOnce(&MasonryFeed<P>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Execute a closure with a mutable reference to the feed.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut MasonryFeed<P>) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl<P: Clone> FeedHandle<P> {
    /// Snapshot of the current output.
    pub fn output(&self) -> FeedOutput<P> {
        self.with(|feed| feed.output().clone())
    }
}

struct Completion<P> {
    request: FetchRequest,
    result: Result<PageResponse<P>, FetchError>,
}

/// Turns feed triggers into spawned provider fetches and feeds the results
/// back.
///
/// Completions travel over a channel and are applied by
/// [`pump`](Self::pump) or [`next_completion`](Self::next_completion), so the
/// feed only ever changes on the caller's side. A fetch whose future panics
/// is reported as a [`FetchError::Network`] failure. Dropping the driver
/// aborts every fetch still running and tears the feed down.
pub struct FeedDriver<P> {
    feed: FeedHandle<P>,
    provider: Arc<dyn SearchProvider<P>>,
    runtime: Handle,
    sender: UnboundedSender<Completion<P>>,
    completions: UnboundedReceiver<Completion<P>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<P> FeedDriver<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Creates a driver on the current tokio runtime, or on a shared
    /// background runtime when called outside one.
    pub fn new(
        feed: MasonryFeed<P>,
        provider: impl SearchProvider<P>,
    ) -> Result<Self, DriverError> {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => tokio_runtime::get()?.handle().clone(),
        };
        Ok(Self::with_runtime(feed, provider, runtime))
    }

    /// Creates a driver that spawns fetches onto `runtime`.
    pub fn with_runtime(
        feed: MasonryFeed<P>,
        provider: impl SearchProvider<P>,
        runtime: Handle,
    ) -> Self {
        let (sender, completions) = mpsc::unbounded_channel();
        Self {
            feed: FeedHandle {
                inner: Arc::new(RwLock::new(feed)),
            },
            provider: Arc::new(provider),
            runtime,
            sender,
            completions,
            tasks: Vec::new(),
        }
    }

    /// Shared handle to the feed.
    pub fn feed(&self) -> FeedHandle<P> {
        self.feed.clone()
    }

    /// Snapshot of the current output.
    pub fn output(&self) -> FeedOutput<P> {
        self.feed.output()
    }

    /// Fetch tasks that have not finished yet.
    pub fn pending_fetches(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Switches query and fetches its first page.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<FetchRequest> {
        let request = self.feed.with_mut(|feed| feed.set_query(query));
        self.dispatch(request)
    }

    /// Records a keystroke; see [`MasonryFeed::type_query`].
    pub fn type_query(&mut self, text: impl Into<String>) {
        self.feed
            .with_mut(|feed| feed.type_query(text, Instant::now()));
    }

    /// Applies a viewport size.
    pub fn report_viewport(
        &mut self,
        width: impl Into<Dp>,
        height: impl Into<Dp>,
    ) -> Option<FetchRequest> {
        let request = self
            .feed
            .with_mut(|feed| feed.report_viewport(width, height));
        self.dispatch(request)
    }

    /// Offers a scroll position.
    pub fn report_scroll(&mut self, position: impl Into<Dp>) -> Option<FetchRequest> {
        let request = self
            .feed
            .with_mut(|feed| feed.report_scroll(position, Instant::now()));
        self.dispatch(request)
    }

    /// Fires due timers.
    pub fn tick(&mut self) -> Option<FetchRequest> {
        let request = self.feed.with_mut(|feed| feed.tick(Instant::now()));
        self.dispatch(request)
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.feed.with(|feed| feed.next_deadline())
    }

    /// Re-requests the page that failed.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        let request = self.feed.with_mut(|feed| feed.retry());
        self.dispatch(request)
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn pump(&mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            outcomes.push(self.apply(completion));
        }
        outcomes
    }

    /// Waits for the next completion and applies it.
    pub async fn next_completion(&mut self) -> Option<FetchOutcome> {
        let completion = self.completions.recv().await?;
        Some(self.apply(completion))
    }

    /// Applies completions until no request is in flight for the current
    /// query.
    pub async fn settle(&mut self) {
        while self
            .feed
            .with(|feed| feed.pagination().in_flight().is_some())
        {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }

    fn apply(&mut self, completion: Completion<P>) -> FetchOutcome {
        let Completion { request, result } = completion;
        let outcome = self
            .feed
            .with_mut(|feed| feed.complete_fetch(&request, result));
        trace!(page = request.page, epoch = request.epoch, ?outcome, "completion applied");
        outcome
    }

    fn dispatch(&mut self, request: Option<FetchRequest>) -> Option<FetchRequest> {
        let request = request?;
        self.tasks.retain(|task| !task.is_finished());

        debug!(
            query = %request.query,
            page = request.page,
            epoch = request.epoch,
            "dispatching fetch"
        );
        let fetch = self
            .provider
            .fetch(&request.query, request.page, request.page_size);
        let sender = self.sender.clone();
        let sent = request.clone();
        self.tasks.push(self.runtime.spawn(async move {
            // A panicking provider still completes the request as a failure.
            let result = AssertUnwindSafe(fetch)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    warn!("fetch task panicked");
                    Err(FetchError::network("fetch task panicked"))
                });
            if sender
                .send(Completion {
                    request: sent,
                    result,
                })
                .is_err()
            {
                trace!("driver dropped before fetch completed");
            }
        }));
        Some(request)
    }
}

impl<P> Drop for FeedDriver<P> {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.feed.with_mut(|feed| feed.teardown());
    }
}
