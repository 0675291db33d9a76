//! Asynchronous fetching for [`masonry_feed`].
//!
//! [`FeedDriver`] wraps a [`MasonryFeed`](masonry_feed::MasonryFeed), forwards
//! each trigger to it and spawns whatever page request comes back onto tokio.
//! Results are applied on the caller's side through
//! [`FeedDriver::pump`] or [`FeedDriver::next_completion`].
#![deny(missing_docs, clippy::unwrap_used)]

pub mod driver;
pub mod provider;
mod tokio_runtime;

pub use crate::{
    driver::{DriverError, FeedDriver, FeedHandle},
    provider::{InMemoryProvider, SearchProvider},
};
