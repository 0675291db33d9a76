//! Column count resolution and shortest-column selection.

use crate::units::Dp;

/// Number of whole columns that fit in `viewport_width`.
///
/// Each column occupies `column_width + gap`. A viewport narrower than one
/// stride yields `0`, which the layout engine treats as an empty grid.
/// Degenerate inputs (non-positive stride, `NaN`, negative widths) also
/// resolve to `0`.
pub fn columns_for_width(viewport_width: Dp, column_width: Dp, gap: Dp) -> usize {
    let stride = column_width + gap;
    if stride.0.is_nan() || stride.0 <= 0.0 || !viewport_width.is_finite() {
        return 0;
    }
    let columns = (viewport_width.0 / stride.0).floor();
    if columns <= 0.0 || !columns.is_finite() {
        0
    } else {
        columns as usize
    }
}

/// Result of [`select_column`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSelection {
    /// Index of the chosen column.
    pub column: usize,
    /// Current bottom edge of that column, where the next item starts.
    pub y: Dp,
}

/// Picks the column with the smallest recorded height among the first
/// `column_count` entries.
///
/// Ties go to the lowest index. Columns beyond the end of `column_heights`
/// count as empty. Returns `None` when there are no columns.
pub fn select_column(column_heights: &[Dp], column_count: usize) -> Option<ColumnSelection> {
    if column_count == 0 {
        return None;
    }
    let height_at = |column: usize| column_heights.get(column).copied().unwrap_or(Dp::ZERO);

    let mut best = ColumnSelection {
        column: 0,
        y: height_at(0),
    };
    for column in 1..column_count {
        let y = height_at(column);
        if y < best.y {
            best = ColumnSelection { column, y };
        }
    }
    Some(best)
}
