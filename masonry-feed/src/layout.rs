//! Greedy masonry placement.
//!
//! Every pass starts from empty columns and walks the items in store order,
//! dropping each one into the currently shortest column. The result depends
//! only on the inputs, so a pass can be cached and replayed freely.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    columns::select_column,
    item::{Item, ItemId, PositionedItem},
    store::ItemStore,
    units::Dp,
};

/// Geometry inputs of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Number of columns, usually from [`crate::columns_for_width`].
    pub column_count: usize,
    /// Width the grid is centered in.
    pub container_width: Dp,
    /// Fixed width of every column.
    pub column_width: Dp,
    /// Horizontal gap between columns and vertical gap between items.
    pub gap: Dp,
}

impl LayoutParams {
    /// Left edge of column 0.
    ///
    /// Negative when the container is narrower than the grid. Not clamped:
    /// this only happens transiently while a resize is being processed.
    pub fn x_offset(&self) -> Dp {
        if self.column_count == 0 {
            return Dp::ZERO;
        }
        let columns = self.column_count as f64;
        (self.container_width - self.column_width * columns - self.gap * (columns - 1.0)) / 2.0
    }

    /// Left edge of `column`.
    pub fn column_x(&self, column: usize) -> Dp {
        (self.column_width + self.gap) * column as f64 + self.x_offset()
    }

    /// Bit-exact key for memoization.
    fn key(&self) -> (usize, u64, u64, u64) {
        (
            self.column_count,
            self.container_width.to_bits(),
            self.column_width.to_bits(),
            self.gap.to_bits(),
        )
    }
}

/// Output of a layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MasonryLayout<P> {
    positioned: FxHashMap<ItemId, PositionedItem<P>>,
    order: Vec<ItemId>,
    column_heights: Vec<Dp>,
    max_y: Dp,
}

impl<P> Default for MasonryLayout<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P> MasonryLayout<P> {
    /// A layout with no columns and no items.
    pub fn empty() -> Self {
        Self {
            positioned: FxHashMap::default(),
            order: Vec::new(),
            column_heights: Vec::new(),
            max_y: Dp::ZERO,
        }
    }

    /// Total content height: the tallest final column bottom.
    pub fn max_y(&self) -> Dp {
        self.max_y
    }

    /// Final bottom edge of each column, gap included.
    pub fn column_heights(&self) -> &[Dp] {
        &self.column_heights
    }

    /// Positioned items keyed by id.
    pub fn positioned(&self) -> &FxHashMap<ItemId, PositionedItem<P>> {
        &self.positioned
    }

    /// Looks up one positioned item.
    pub fn get(&self, id: ItemId) -> Option<&PositionedItem<P>> {
        self.positioned.get(&id)
    }

    /// Positioned items in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &PositionedItem<P>> {
        self.order.iter().filter_map(|id| self.positioned.get(id))
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Places `items` into `params.column_count` columns.
///
/// Zero columns produce [`MasonryLayout::empty`]. Each item lands in the
/// shortest column (lowest index on ties) at that column's current bottom;
/// the column then grows by the item's rendered height plus `gap`.
///
/// Ids are expected to be unique, as an [`ItemStore`] guarantees. Any repeat
/// of an id already placed is skipped and takes up no column height.
#[tracing::instrument(level = "debug", skip(items), fields(items = items.len()))]
pub fn compute_layout<P: Clone>(items: &[Item<P>], params: LayoutParams) -> MasonryLayout<P> {
    if params.column_count == 0 {
        trace!("no columns available, producing an empty layout");
        return MasonryLayout::empty();
    }

    let mut column_heights = vec![Dp::ZERO; params.column_count];
    let mut positioned: FxHashMap<ItemId, PositionedItem<P>> =
        FxHashMap::with_capacity_and_hasher(items.len(), Default::default());
    let mut order = Vec::with_capacity(items.len());

    for item in items {
        if positioned.contains_key(&item.id) {
            trace!(id = %item.id, "skipping repeated item id");
            continue;
        }
        let Some(slot) = select_column(&column_heights, params.column_count) else {
            break;
        };
        let rendered_height = item.rendered_height(params.column_width);
        let placed = PositionedItem {
            item: item.clone(),
            x: params.column_x(slot.column),
            y: slot.y,
            rendered_width: params.column_width,
            rendered_height,
        };
        column_heights[slot.column] = slot.y + rendered_height + params.gap;
        positioned.insert(item.id, placed);
        order.push(item.id);
    }

    let max_y = column_heights
        .iter()
        .copied()
        .fold(Dp::ZERO, |acc, height| acc.max(height));

    debug!(placed = order.len(), max_y = max_y.0, "layout pass complete");
    MasonryLayout {
        positioned,
        order,
        column_heights,
        max_y,
    }
}

/// Caches the last layout pass.
///
/// The pass is replayed only when the store revision or any of the
/// [`LayoutParams`] changed since the previous call.
#[derive(Debug)]
pub struct LayoutMemo<P> {
    key: Option<(u64, (usize, u64, u64, u64))>,
    layout: Arc<MasonryLayout<P>>,
    passes: u64,
}

impl<P> Default for LayoutMemo<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> LayoutMemo<P> {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self {
            key: None,
            layout: Arc::new(MasonryLayout::empty()),
            passes: 0,
        }
    }

    /// The most recently computed layout.
    pub fn current(&self) -> Arc<MasonryLayout<P>> {
        Arc::clone(&self.layout)
    }

    /// How many real layout passes this memo has run.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Forgets the cached pass so the next call recomputes.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

impl<P: Clone> LayoutMemo<P> {
    /// Returns the layout for `store` under `params`, recomputing only when
    /// an input changed. The flag reports whether a pass ran.
    pub fn layout(
        &mut self,
        store: &ItemStore<P>,
        params: LayoutParams,
    ) -> (Arc<MasonryLayout<P>>, bool) {
        let key = (store.revision(), params.key());
        if self.key == Some(key) {
            return (self.current(), false);
        }
        self.layout = Arc::new(compute_layout(store.as_slice(), params));
        self.key = Some(key);
        self.passes += 1;
        (self.current(), true)
    }
}
