//! Feed configuration.

use std::time::Duration;

use derive_setters::Setters;

use crate::{error::ConfigError, units::Dp};

/// Tunables for a [`crate::MasonryFeed`].
///
/// ```
/// use std::time::Duration;
/// use masonry_feed::{Dp, FeedConfig};
///
/// let config = FeedConfig::default()
///     .column_width(Dp(240.0))
///     .page_size(60)
///     .scroll_throttle(Duration::from_millis(50));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedConfig {
    /// Fixed width of every column.
    pub column_width: Dp,
    /// Gap between columns and between stacked items.
    pub gap: Dp,
    /// Items requested per page.
    pub page_size: u32,
    /// Distance from the content bottom at which the next page is requested.
    pub near_bottom_threshold: Dp,
    /// Extra distance above and below the viewport kept rendered.
    pub window_buffer: Dp,
    /// Minimum interval between processed scroll updates.
    pub scroll_throttle: Duration,
    /// Quiet period after the last keystroke before a query is applied.
    pub query_debounce: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            column_width: Dp(200.0),
            gap: Dp(16.0),
            page_size: 40,
            near_bottom_threshold: Dp(100.0),
            window_buffer: Dp(800.0),
            scroll_throttle: Duration::from_millis(100),
            query_debounce: Duration::from_millis(300),
        }
    }
}

impl FeedConfig {
    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.column_width.is_finite() || self.column_width <= Dp::ZERO {
            return Err(ConfigError::InvalidColumnWidth(self.column_width.0));
        }
        if !self.gap.is_finite() || self.gap < Dp::ZERO {
            return Err(ConfigError::InvalidGap(self.gap.0));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if !self.near_bottom_threshold.is_finite() || self.near_bottom_threshold < Dp::ZERO {
            return Err(ConfigError::InvalidThreshold(self.near_bottom_threshold.0));
        }
        if !self.window_buffer.is_finite() || self.window_buffer < Dp::ZERO {
            return Err(ConfigError::InvalidBuffer(self.window_buffer.0));
        }
        if self.scroll_throttle.is_zero() {
            return Err(ConfigError::ZeroThrottle);
        }
        Ok(())
    }
}
