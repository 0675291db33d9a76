//! Viewport windowing over a finished layout.

use rustc_hash::FxHashMap;

use crate::{
    item::{ItemId, PositionedItem},
    units::Dp,
};

/// Vertical band of content that should stay rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportWindow {
    /// `scroll_position - buffer`.
    pub top: Dp,
    /// `scroll_position + viewport_height + buffer`.
    pub bottom: Dp,
}

impl ViewportWindow {
    /// Builds the band for a scroll position, viewport height and buffer.
    pub fn new(scroll_position: Dp, viewport_height: Dp, buffer: Dp) -> Self {
        Self {
            top: scroll_position - buffer,
            bottom: scroll_position + viewport_height + buffer,
        }
    }

    /// Whether `item` touches the band. Both edges are inclusive.
    pub fn contains<P>(&self, item: &PositionedItem<P>) -> bool {
        item.bottom() >= self.top && item.y <= self.bottom
    }
}

/// Items from `positioned` that intersect the visible band plus `buffer`.
pub fn windowed<P: Clone>(
    positioned: &FxHashMap<ItemId, PositionedItem<P>>,
    scroll_position: Dp,
    viewport_height: Dp,
    buffer: Dp,
) -> FxHashMap<ItemId, PositionedItem<P>> {
    let window = ViewportWindow::new(scroll_position, viewport_height, buffer);
    positioned
        .iter()
        .filter(|(_, item)| window.contains(item))
        .map(|(id, item)| (*id, item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    fn placed(id: u64, y: f64, height: f64) -> (ItemId, PositionedItem<()>) {
        (
            ItemId(id),
            PositionedItem {
                item: Item::new(id, 200, 200, ()),
                x: Dp::ZERO,
                y: Dp(y),
                rendered_width: Dp(200.0),
                rendered_height: Dp(height),
            },
        )
    }

    fn ids(map: &FxHashMap<ItemId, PositionedItem<()>>) -> Vec<u64> {
        let mut ids: Vec<_> = map.keys().map(|id| id.0).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn keeps_items_intersecting_the_band() {
        let positioned: FxHashMap<_, _> = [
            placed(1, 0.0, 100.0),
            placed(2, 500.0, 100.0),
            placed(3, 1200.0, 100.0),
            placed(4, 3000.0, 100.0),
        ]
        .into_iter()
        .collect();

        // band: [1000 - 200, 1000 + 600 + 200] = [800, 1800]
        let visible = windowed(&positioned, Dp(1000.0), Dp(600.0), Dp(200.0));
        assert_eq!(ids(&visible), vec![3]);

        let visible = windowed(&positioned, Dp(0.0), Dp(600.0), Dp(0.0));
        assert_eq!(ids(&visible), vec![1, 2]);
    }

    #[test]
    fn bottom_edge_touching_top_is_included() {
        // bottom = 800 = 1000 - 200
        let positioned: FxHashMap<_, _> = [placed(1, 700.0, 100.0)].into_iter().collect();
        let visible = windowed(&positioned, Dp(1000.0), Dp(600.0), Dp(200.0));
        assert_eq!(ids(&visible), vec![1]);

        let positioned: FxHashMap<_, _> = [placed(1, 699.0, 100.0)].into_iter().collect();
        let visible = windowed(&positioned, Dp(1000.0), Dp(600.0), Dp(200.0));
        assert!(visible.is_empty());
    }

    #[test]
    fn top_edge_touching_bottom_is_included() {
        // y = 1800 = 1000 + 600 + 200
        let positioned: FxHashMap<_, _> = [placed(1, 1800.0, 50.0), placed(2, 1800.5, 50.0)]
            .into_iter()
            .collect();
        let visible = windowed(&positioned, Dp(1000.0), Dp(600.0), Dp(200.0));
        assert_eq!(ids(&visible), vec![1]);
    }

    #[test]
    fn empty_layout_has_empty_window() {
        let positioned: FxHashMap<ItemId, PositionedItem<()>> = FxHashMap::default();
        assert!(windowed(&positioned, Dp(0.0), Dp(800.0), Dp(400.0)).is_empty());
    }
}
