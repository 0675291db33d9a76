//! Items flowing through the engine and their positioned form.

use std::fmt;

use crate::units::Dp;

/// Stable identity of an item across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A visual item as delivered by the search provider.
///
/// Only `width` and `height` are read by the engine. `payload` carries
/// everything else (image sources, attribution, colors) through untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item<P> {
    /// Identity, unique within one query.
    pub id: ItemId,
    /// Intrinsic width.
    pub width: u32,
    /// Intrinsic height.
    pub height: u32,
    /// Opaque consumer data.
    pub payload: P,
}

impl<P> Item<P> {
    /// Creates an item.
    pub fn new(id: impl Into<ItemId>, width: u32, height: u32, payload: P) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            payload,
        }
    }

    /// Height of this item when scaled to `rendered_width`.
    ///
    /// An item with zero intrinsic width has no usable aspect ratio and
    /// collapses to zero height.
    pub fn rendered_height(&self, rendered_width: Dp) -> Dp {
        if self.width == 0 {
            return Dp::ZERO;
        }
        Dp(rendered_width.0 * f64::from(self.height) / f64::from(self.width))
    }
}

/// An [`Item`] placed in the masonry grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedItem<P> {
    /// The source item.
    pub item: Item<P>,
    /// Left edge.
    pub x: Dp,
    /// Top edge.
    pub y: Dp,
    /// Width on screen, always the column width.
    pub rendered_width: Dp,
    /// Height on screen, derived from the aspect ratio.
    pub rendered_height: Dp,
}

impl<P> PositionedItem<P> {
    /// Item identity.
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Bottom edge (`y + rendered_height`).
    pub fn bottom(&self) -> Dp {
        self.y + self.rendered_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_height_follows_aspect_ratio() {
        let landscape = Item::new(1u64, 800, 600, ());
        assert_eq!(landscape.rendered_height(Dp(200.0)), Dp(150.0));

        let portrait = Item::new(2u64, 400, 800, ());
        assert_eq!(portrait.rendered_height(Dp(200.0)), Dp(400.0));
    }

    #[test]
    fn zero_width_item_collapses() {
        let broken = Item::new(3u64, 0, 500, ());
        assert_eq!(broken.rendered_height(Dp(200.0)), Dp::ZERO);
    }

    #[test]
    fn positioned_bottom_edge() {
        let placed = PositionedItem {
            item: Item::new(4u64, 100, 100, "payload"),
            x: Dp(8.0),
            y: Dp(50.0),
            rendered_width: Dp(200.0),
            rendered_height: Dp(200.0),
        };
        assert_eq!(placed.id(), ItemId(4));
        assert_eq!(placed.bottom(), Dp(250.0));
    }
}
