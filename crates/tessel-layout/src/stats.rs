#![forbid(unsafe_code)]

//! Layout statistics.

use serde::Serialize;
use tessel_core::item::GridItem;

/// Summary of a layout's extent and fill.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GridStats {
    pub total_items: usize,
    /// Sum of item areas in cells. Overlapping cells count once per item.
    pub total_area: u64,
    /// Rightmost item edge.
    pub utilized_columns: u32,
    /// Bottommost item edge.
    pub utilized_rows: u32,
    /// `total_area / (utilized_columns × utilized_rows)`, 0 for an empty grid.
    pub density: f64,
}

/// Compute [`GridStats`] for a layout.
pub fn get_grid_stats<C>(items: &[GridItem<C>]) -> GridStats {
    let mut stats = GridStats {
        total_items: items.len(),
        ..GridStats::default()
    };

    for item in items {
        stats.total_area += u64::from(item.position.area());
        stats.utilized_columns = stats.utilized_columns.max(item.position.right());
        stats.utilized_rows = stats.utilized_rows.max(item.position.bottom());
    }

    let extent = u64::from(stats.utilized_columns) * u64::from(stats.utilized_rows);
    if extent > 0 {
        stats.density = stats.total_area as f64 / extent as f64;
    }
    stats
}
