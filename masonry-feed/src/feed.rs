//! The feed controller: owns pagination, layout and windowing for one view.
//!
//! ## Usage
//!
//! The presentation layer reports input through [`MasonryFeed::set_query`],
//! [`MasonryFeed::report_viewport`] and [`MasonryFeed::report_scroll`], hands
//! every returned [`FetchRequest`] to its search provider, and feeds results
//! back through [`MasonryFeed::complete_fetch`]. After each call
//! [`MasonryFeed::output`] holds the items to render.
//!
//! Time-based behaviour (scroll throttling, query debounce) is driven by
//! [`MasonryFeed::tick`]; [`MasonryFeed::next_deadline`] tells the event loop
//! when the next tick is due.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use web_time::Instant;

use crate::{
    columns::columns_for_width,
    config::FeedConfig,
    debounce::Debouncer,
    error::{ConfigError, FetchError},
    item::{ItemId, PositionedItem},
    layout::{LayoutMemo, LayoutParams, MasonryLayout},
    pagination::{FetchOutcome, FetchRequest, FetchStatus, PageResponse, PaginationController},
    store::ItemStore,
    throttle::Throttle,
    units::Dp,
    window::windowed,
};

/// Visible area reported by the presentation layer.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    /// Viewport width, also used as the container width for centering.
    pub width: Dp,
    /// Viewport height.
    pub height: Dp,
}

impl ViewportSize {
    /// Creates a viewport size.
    pub fn new(width: impl Into<Dp>, height: impl Into<Dp>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// Everything the presentation layer needs to render one frame.
#[derive(Debug, Clone)]
pub struct FeedOutput<P> {
    /// Items intersecting the viewport plus buffer, keyed by id.
    pub visible_items: Arc<FxHashMap<ItemId, PositionedItem<P>>>,
    /// A page request is in flight.
    pub is_loading: bool,
    /// Last fetch failure, if not yet recovered.
    pub error_message: Option<String>,
    /// Total content height.
    pub content_height: Dp,
    /// Columns currently in use.
    pub column_count: usize,
    /// The query finished loading with nothing to show.
    pub no_results: bool,
}

impl<P> Default for FeedOutput<P> {
    fn default() -> Self {
        Self {
            visible_items: Arc::new(FxHashMap::default()),
            is_loading: false,
            error_message: None,
            content_height: Dp::ZERO,
            column_count: 0,
            no_results: false,
        }
    }
}

/// Memo key for the visible window: layout pass, scroll position, viewport
/// height and buffer, all bit-exact.
type WindowKey = (u64, u64, u64, u64);

/// Owns the item store, pagination state and derived layout for one view.
#[derive(Debug)]
pub struct MasonryFeed<P> {
    config: FeedConfig,
    pagination: PaginationController<P>,
    viewport: ViewportSize,
    column_count: usize,
    scroll_position: Dp,
    scroll_throttle: Throttle<Dp>,
    query_input: Debouncer<String>,
    layout_memo: LayoutMemo<P>,
    window_key: Option<WindowKey>,
    output: FeedOutput<P>,
}

impl<P> MasonryFeed<P> {
    /// Cancels pending timers. Call when the view goes away.
    pub fn teardown(&mut self) {
        self.query_input.cancel();
        self.scroll_throttle.cancel();
    }
}

impl<P: Clone> MasonryFeed<P> {
    /// Creates a feed for `viewport` with an empty query. No request is
    /// issued until [`set_query`](Self::set_query) is called.
    pub fn new(config: FeedConfig, viewport: ViewportSize) -> Result<Self, ConfigError> {
        config.validate()?;
        let column_count = columns_for_width(viewport.width, config.column_width, config.gap);
        let mut feed = Self {
            pagination: PaginationController::new(config.page_size),
            viewport,
            column_count,
            scroll_position: Dp::ZERO,
            scroll_throttle: Throttle::new(config.scroll_throttle),
            query_input: Debouncer::new(config.query_debounce),
            layout_memo: LayoutMemo::new(),
            window_key: None,
            output: FeedOutput::default(),
            config,
        };
        feed.recompute();
        Ok(feed)
    }

    /// Configuration in use.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Latest output.
    pub fn output(&self) -> &FeedOutput<P> {
        &self.output
    }

    /// Current query.
    pub fn query(&self) -> &str {
        self.pagination.query()
    }

    /// Pagination status.
    pub fn status(&self) -> FetchStatus {
        self.pagination.state().status
    }

    /// Pagination controller, for inspection.
    pub fn pagination(&self) -> &PaginationController<P> {
        &self.pagination
    }

    /// Items accumulated for the current query.
    pub fn store(&self) -> &ItemStore<P> {
        self.pagination.store()
    }

    /// Full layout of every stored item.
    pub fn layout(&self) -> Arc<MasonryLayout<P>> {
        self.layout_memo.current()
    }

    /// Number of layout passes actually executed.
    pub fn layout_passes(&self) -> u64 {
        self.layout_memo.passes()
    }

    /// Scroll position currently applied (after throttling).
    pub fn scroll_position(&self) -> Dp {
        self.scroll_position
    }

    /// Viewport currently applied.
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Switches to `query` and returns the first page request.
    ///
    /// The store empties and the error clears immediately, even if a request
    /// for the previous query is still in flight.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<FetchRequest> {
        self.query_input.cancel();
        self.pagination.reset(query);
        let request = self.pagination.request_more();
        self.recompute();
        request
    }

    /// Records a keystroke in the query box. The query is applied by
    /// [`tick`](Self::tick) once input has been quiet for the debounce delay.
    pub fn type_query(&mut self, text: impl Into<String>, now: Instant) {
        self.query_input.schedule(text.into(), now);
    }

    /// Applies a new viewport size. Not throttled.
    pub fn report_viewport(
        &mut self,
        width: impl Into<Dp>,
        height: impl Into<Dp>,
    ) -> Option<FetchRequest> {
        let viewport = ViewportSize::new(width, height);
        if viewport == self.viewport {
            return None;
        }
        self.viewport = viewport;
        self.column_count =
            columns_for_width(viewport.width, self.config.column_width, self.config.gap);
        trace!(
            width = viewport.width.0,
            height = viewport.height.0,
            columns = self.column_count,
            "viewport changed"
        );
        self.recompute();
        self.maybe_request_more()
    }

    /// Offers a scroll position. Updates arriving faster than the throttle
    /// interval are coalesced; the newest one is applied by a later
    /// [`tick`](Self::tick).
    pub fn report_scroll(&mut self, position: impl Into<Dp>, now: Instant) -> Option<FetchRequest> {
        let position = self.scroll_throttle.submit(position.into(), now)?;
        self.apply_scroll(position)
    }

    /// Fires any due timers: a debounced query, then a parked scroll
    /// position.
    pub fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        let from_query = self
            .query_input
            .poll(now)
            .and_then(|query| self.set_query(query));
        let from_scroll = self
            .scroll_throttle
            .poll(now)
            .and_then(|position| self.apply_scroll(position));
        from_query.or(from_scroll)
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.query_input.deadline(), self.scroll_throttle.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Re-requests the failed page after an error.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if self.pagination.state().status != FetchStatus::Error {
            return None;
        }
        let request = self.pagination.request_more();
        self.recompute();
        request
    }

    /// Feeds a provider result back in.
    pub fn complete_fetch(
        &mut self,
        request: &FetchRequest,
        result: Result<PageResponse<P>, FetchError>,
    ) -> FetchOutcome {
        let outcome = self.pagination.complete(request, result);
        if !matches!(outcome, FetchOutcome::Stale | FetchOutcome::Unexpected) {
            self.recompute();
        }
        outcome
    }

    fn apply_scroll(&mut self, position: Dp) -> Option<FetchRequest> {
        self.scroll_position = position;
        trace!(position = position.0, "scroll applied");
        self.recompute();
        self.maybe_request_more()
    }

    fn near_bottom(&self) -> bool {
        self.column_count > 0
            && self.scroll_position + self.viewport.height
                >= self.output.content_height - self.config.near_bottom_threshold
    }

    fn maybe_request_more(&mut self) -> Option<FetchRequest> {
        if !self.near_bottom() || !self.pagination.can_request() {
            return None;
        }
        debug!(
            scroll = self.scroll_position.0,
            content_height = self.output.content_height.0,
            "near bottom, requesting more"
        );
        let request = self.pagination.request_more();
        self.recompute();
        request
    }

    fn recompute(&mut self) {
        let params = LayoutParams {
            column_count: self.column_count,
            container_width: self.viewport.width,
            column_width: self.config.column_width,
            gap: self.config.gap,
        };
        let (layout, _) = self.layout_memo.layout(self.pagination.store(), params);

        let window_key = (
            self.layout_memo.passes(),
            self.scroll_position.to_bits(),
            self.viewport.height.to_bits(),
            self.config.window_buffer.to_bits(),
        );
        if self.window_key != Some(window_key) {
            self.output.visible_items = Arc::new(windowed(
                layout.positioned(),
                self.scroll_position,
                self.viewport.height,
                self.config.window_buffer,
            ));
            self.window_key = Some(window_key);
        }

        let state = self.pagination.state();
        self.output.is_loading = state.status == FetchStatus::Loading;
        self.output.error_message = state.error_message.clone();
        self.output.content_height = layout.max_y();
        self.output.column_count = self.column_count;
        self.output.no_results = !self.output.is_loading
            && self.output.error_message.is_none()
            && self.pagination.store().is_empty()
            && self.pagination.has_completed_fetch();
    }
}
