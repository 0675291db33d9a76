//! masonry-feed lays out an unbounded, paginated stream of variable
//! aspect-ratio items in a multi-column masonry grid and works out which of
//! them are on screen.
//!
//! # Pipeline
//!
//! ```text
//! viewport width ──▶ columns_for_width ──▶ column count ─┐
//! ItemStore (filled page by page) ───────────────────────┼─▶ compute_layout ──▶ positions + max_y
//! viewport width (container) ────────────────────────────┘                         │
//! scroll position + viewport height ──────────────────────────────────▶ windowed ◀─┘
//!                                                                          │
//!                                                                   visible items
//! ```
//!
//! [`MasonryFeed`] owns the whole pipeline together with the
//! [`PaginationController`] that fills the store. It is synchronous: every
//! trigger (query change, resize, scroll, fetch completion) recomputes what
//! changed and returns at most one [`FetchRequest`] for the caller to run.
//!
//! # Example
//!
//! ```
//! use masonry_feed::{FeedConfig, Item, MasonryFeed, PageResponse, ViewportSize};
//!
//! let mut feed = MasonryFeed::new(FeedConfig::default(), ViewportSize::new(1200.0, 800.0))?;
//! let request = feed.set_query("mountains").expect("first page");
//!
//! let items = (0..8u64).map(|id| Item::new(id, 1600, 1200, ())).collect();
//! feed.complete_fetch(&request, Ok(PageResponse::new(items, true)));
//!
//! assert_eq!(feed.output().column_count, 5);
//! assert_eq!(feed.output().visible_items.len(), 8);
//! # Ok::<(), masonry_feed::ConfigError>(())
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod columns;
pub mod config;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod item;
pub mod layout;
pub mod pagination;
pub mod store;
pub mod throttle;
pub mod units;
pub mod window;

pub use crate::{
    columns::{ColumnSelection, columns_for_width, select_column},
    config::FeedConfig,
    debounce::Debouncer,
    error::{ConfigError, FetchError},
    feed::{FeedOutput, MasonryFeed, ViewportSize},
    item::{Item, ItemId, PositionedItem},
    layout::{LayoutMemo, LayoutParams, MasonryLayout, compute_layout},
    pagination::{
        FetchOutcome, FetchRequest, FetchStatus, PageResponse, PaginationController,
        PaginationState,
    },
    store::{ItemStore, MergeStats},
    throttle::Throttle,
    units::Dp,
    window::{ViewportWindow, windowed},
};

pub use web_time::Instant;
