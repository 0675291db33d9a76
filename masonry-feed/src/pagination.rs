//! Paged fetch state machine.
//!
//! ```text
//! Idle ──request──▶ Loading ──ok, more──▶ Loaded ──request──▶ Loading
//!                      │  └────ok, last──▶ Exhausted
//!                      └─────err────────▶ Error ──request──▶ Loading (same page)
//! ```
//!
//! A query change resets everything and bumps the query epoch. Requests carry
//! the epoch they were issued under; completions from an older epoch are
//! dropped on arrival so a superseded query can never refill the store.

use tracing::{debug, warn};

use crate::{
    error::FetchError,
    item::Item,
    store::{ItemStore, MergeStats},
};

/// Lifecycle of the current query's pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// Nothing requested yet for this query.
    Idle,
    /// A page request is in flight.
    Loading,
    /// The last page arrived and more are available.
    Loaded,
    /// The last request failed.
    Error,
    /// The provider has no further pages.
    Exhausted,
}

/// Snapshot of pagination progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Page most recently requested, starting at 1.
    pub page: u32,
    /// Whether the provider reported further pages.
    pub has_more: bool,
    /// Current status.
    pub status: FetchStatus,
    /// Message of the last failure, cleared on success or query change.
    pub error_message: Option<String>,
    /// Generation counter bumped on every query change.
    pub query_epoch: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            has_more: true,
            status: FetchStatus::Idle,
            error_message: None,
            query_epoch: 0,
        }
    }
}

/// A page request to hand to the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    /// Search query.
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
    /// Query epoch the request belongs to.
    pub epoch: u64,
}

/// One page returned by the search provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<P> {
    /// Items on this page.
    pub items: Vec<Item<P>>,
    /// Whether another page follows.
    pub has_next_page: bool,
}

impl<P> PageResponse<P> {
    /// Builds a page.
    pub fn new(items: Vec<Item<P>>, has_next_page: bool) -> Self {
        Self {
            items,
            has_next_page,
        }
    }
}

/// What [`PaginationController::complete`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Items were merged into the store.
    Merged {
        /// Merge counts.
        stats: MergeStats,
        /// Status after the merge.
        status: FetchStatus,
    },
    /// The failure was recorded.
    Failed,
    /// The response belonged to a superseded query.
    Stale,
    /// The response did not match the request in flight.
    Unexpected,
}

/// Accumulates pages for one query at a time.
#[derive(Debug)]
pub struct PaginationController<P> {
    query: String,
    page_size: u32,
    state: PaginationState,
    store: ItemStore<P>,
    in_flight: Option<FetchRequest>,
    completed: u32,
}

impl<P> PaginationController<P> {
    /// Creates an idle controller for the empty query.
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            page_size,
            state: PaginationState::default(),
            store: ItemStore::new(),
            in_flight: None,
            completed: 0,
        }
    }

    /// Current query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Pagination snapshot.
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Items accumulated for the current query.
    pub fn store(&self) -> &ItemStore<P> {
        &self.store
    }

    /// The request awaiting completion, if any.
    pub fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    /// Whether at least one response for the current query has been applied.
    pub fn has_completed_fetch(&self) -> bool {
        self.completed > 0
    }

    /// Whether [`request_more`](Self::request_more) would issue a request.
    ///
    /// A controller that was never [`reset`](Self::reset) has no query yet
    /// and never requests.
    pub fn can_request(&self) -> bool {
        self.state.query_epoch > 0
            && !matches!(
                self.state.status,
                FetchStatus::Loading | FetchStatus::Exhausted
            )
    }

    /// Switches to `query`: empties the store, rewinds to page 1, clears the
    /// error and starts a new epoch.
    ///
    /// A request still in flight keeps running but its completion will be
    /// rejected as stale.
    pub fn reset(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.store.clear();
        self.in_flight = None;
        self.completed = 0;
        self.state = PaginationState {
            query_epoch: self.state.query_epoch.wrapping_add(1),
            ..PaginationState::default()
        };
        debug!(
            query = %self.query,
            epoch = self.state.query_epoch,
            "pagination reset"
        );
    }

    /// Issues the next request, or `None` while loading or exhausted.
    ///
    /// After a successful page the page number advances. From `Idle` or
    /// `Error` the current page is requested again.
    pub fn request_more(&mut self) -> Option<FetchRequest> {
        if !self.can_request() {
            return None;
        }
        if self.state.status == FetchStatus::Loaded {
            self.state.page += 1;
        }
        self.state.status = FetchStatus::Loading;
        let request = FetchRequest {
            query: self.query.clone(),
            page: self.state.page,
            page_size: self.page_size,
            epoch: self.state.query_epoch,
        };
        debug!(
            query = %request.query,
            page = request.page,
            epoch = request.epoch,
            "requesting page"
        );
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Applies the provider's answer to `request`.
    ///
    /// Duplicate ids overwrite earlier values in place. An empty page ends
    /// pagination even if the provider claims more pages follow. A failure
    /// keeps existing items.
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<PageResponse<P>, FetchError>,
    ) -> FetchOutcome {
        if request.epoch != self.state.query_epoch {
            warn!(
                stale_epoch = request.epoch,
                current_epoch = self.state.query_epoch,
                page = request.page,
                "discarding response for superseded query"
            );
            return FetchOutcome::Stale;
        }
        if self.in_flight.as_ref() != Some(request) {
            warn!(page = request.page, "discarding response with no matching request");
            return FetchOutcome::Unexpected;
        }
        self.in_flight = None;
        self.completed += 1;

        match result {
            Ok(page) => {
                let has_more = page.has_next_page && !page.items.is_empty();
                let stats = self.store.merge(page.items);
                self.state.has_more = has_more;
                self.state.error_message = None;
                self.state.status = if has_more {
                    FetchStatus::Loaded
                } else {
                    FetchStatus::Exhausted
                };
                debug!(
                    page = request.page,
                    inserted = stats.inserted,
                    replaced = stats.replaced,
                    total = self.store.len(),
                    status = ?self.state.status,
                    "page merged"
                );
                FetchOutcome::Merged {
                    stats,
                    status: self.state.status,
                }
            }
            Err(err) => {
                warn!(page = request.page, error = %err, "page fetch failed");
                self.state.status = FetchStatus::Error;
                self.state.error_message = Some(err.user_message());
                FetchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemId;

    fn page(ids: &[u64], tag: &'static str, more: bool) -> PageResponse<&'static str> {
        PageResponse::new(
            ids.iter().map(|&id| Item::new(id, 100, 100, tag)).collect(),
            more,
        )
    }

    fn started(query: &str) -> (PaginationController<&'static str>, FetchRequest) {
        let mut controller = PaginationController::new(40);
        controller.reset(query);
        let request = controller.request_more().expect("idle controller requests");
        (controller, request)
    }

    #[test]
    fn first_request_is_page_one() {
        let (controller, request) = started("cats");
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 40);
        assert_eq!(request.query, "cats");
        assert_eq!(request.epoch, 1);
        assert_eq!(controller.state().status, FetchStatus::Loading);
    }

    #[test]
    fn fresh_controller_waits_for_a_query() {
        let mut controller = PaginationController::<()>::new(40);
        assert!(!controller.can_request());
        assert!(controller.request_more().is_none());
    }

    #[test]
    fn no_second_request_while_loading() {
        let (mut controller, _) = started("cats");
        assert!(controller.request_more().is_none());
    }

    #[test]
    fn success_advances_to_next_page() {
        let (mut controller, first) = started("cats");
        let outcome = controller.complete(&first, Ok(page(&[1, 2], "p1", true)));
        assert!(matches!(
            outcome,
            FetchOutcome::Merged {
                status: FetchStatus::Loaded,
                ..
            }
        ));

        let second = controller.request_more().expect("loaded requests more");
        assert_eq!(second.page, 2);
        controller.complete(&second, Ok(page(&[3], "p2", true)));
        assert_eq!(controller.store().len(), 3);
        assert!(controller.has_completed_fetch());
    }

    #[test]
    fn duplicate_ids_across_pages_keep_one_entry() {
        let (mut controller, first) = started("cats");
        controller.complete(&first, Ok(page(&[7, 8], "page-1", true)));
        let second = controller.request_more().expect("next page");
        controller.complete(&second, Ok(page(&[7, 9], "page-2", true)));

        let store = controller.store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.iter().filter(|i| i.id == ItemId(7)).count(), 1);
        assert_eq!(store.get(ItemId(7)).map(|i| i.payload), Some("page-2"));
    }

    #[test]
    fn last_page_exhausts() {
        let (mut controller, first) = started("cats");
        controller.complete(&first, Ok(page(&[1], "p1", false)));
        assert_eq!(controller.state().status, FetchStatus::Exhausted);
        assert!(!controller.state().has_more);
        assert!(controller.request_more().is_none());
    }

    #[test]
    fn empty_page_exhausts_even_if_more_claimed() {
        let (mut controller, first) = started("nothing");
        controller.complete(&first, Ok(page(&[], "p1", true)));
        assert_eq!(controller.state().status, FetchStatus::Exhausted);
        assert!(controller.store().is_empty());
    }

    #[test]
    fn failure_keeps_items_and_retries_same_page() {
        let (mut controller, first) = started("cats");
        controller.complete(&first, Ok(page(&[1, 2], "p1", true)));
        let second = controller.request_more().expect("page 2");

        let outcome = controller.complete(&second, Err(FetchError::network("offline")));
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(controller.state().status, FetchStatus::Error);
        assert_eq!(
            controller.state().error_message.as_deref(),
            Some("Error fetching items: network error: offline")
        );
        assert_eq!(controller.store().len(), 2);

        let retry = controller.request_more().expect("error is retryable");
        assert_eq!(retry.page, 2);
        controller.complete(&retry, Ok(page(&[3], "p2", true)));
        assert_eq!(controller.state().error_message, None);
        assert_eq!(controller.state().status, FetchStatus::Loaded);
    }

    #[test]
    fn reset_discards_store_and_bumps_epoch() {
        let (mut controller, first) = started("cats");
        controller.complete(&first, Ok(page(&[1], "p1", true)));
        let pending = controller.request_more().expect("page 2");

        controller.reset("dogs");
        let state = controller.state();
        assert_eq!(state.page, 1);
        assert_eq!(state.status, FetchStatus::Idle);
        assert_eq!(state.error_message, None);
        assert_eq!(state.query_epoch, 2);
        assert!(controller.store().is_empty());
        assert!(controller.in_flight().is_none());
        assert!(!controller.has_completed_fetch());

        let outcome = controller.complete(&pending, Ok(page(&[50, 51], "stale", true)));
        assert_eq!(outcome, FetchOutcome::Stale);
        assert!(controller.store().is_empty());
        assert_eq!(controller.state().status, FetchStatus::Idle);
    }

    #[test]
    fn unmatched_response_is_ignored() {
        let (mut controller, first) = started("cats");
        let bogus = FetchRequest {
            page: 9,
            ..first.clone()
        };
        assert_eq!(
            controller.complete(&bogus, Ok(page(&[1], "x", true))),
            FetchOutcome::Unexpected
        );
        assert_eq!(controller.state().status, FetchStatus::Loading);
        assert!(controller.store().is_empty());
    }
}
