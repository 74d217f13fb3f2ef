#![forbid(unsafe_code)]

//! Layout compaction.
//!
//! Items are visited in `(y, x)` order of their positions, ties keeping
//! input order, and each is reinserted at the first free slot of a growing
//! occupancy map. The result is packed toward the top-left.
//!
//! A single pass is not always stable: an item placed late can land in a
//! slot that sorts ahead of items visited earlier, so a second pass visits
//! them in a different order and may place them differently.
//! [`compact_layout`] therefore repeats the pass until no item moves, so
//! compacting a compacted layout is the identity.
//!
//! # Invariants
//!
//! - Output contains every input item exactly once, sizes unchanged.
//! - Output order is the visiting order of the final pass, which is
//!   `(y, x)` order of the returned positions.
//! - `compact_layout(&compact_layout(items, c), c) == compact_layout(items, c)`.

use tessel_core::geometry::DEFAULT_MAX_ROWS;
use tessel_core::item::GridItem;

use crate::occupancy::OccupancyMap;
use crate::placement::find_first_available_position;

/// Pack items toward the top-left of a `max_columns`-wide grid.
pub fn compact_layout<C: Clone>(items: &[GridItem<C>], max_columns: u16) -> Vec<GridItem<C>> {
    let _span = tracing::debug_span!(
        target: "tessel.layout",
        "compact_layout",
        items = items.len(),
        max_columns
    )
    .entered();

    let mut current = compact_pass(items.to_vec(), max_columns);
    let mut passes = 1usize;
    while passes <= items.len() {
        let next = compact_pass(current.clone(), max_columns);
        passes += 1;
        if same_positions(&next, &current) {
            current = next;
            break;
        }
        current = next;
    }

    tracing::debug!(target: "tessel.layout", passes, "compaction settled");
    current
}

/// One first-fit pass in `(y, x)` order.
fn compact_pass<C>(mut items: Vec<GridItem<C>>, max_columns: u16) -> Vec<GridItem<C>> {
    // `sort_by_key` is stable: equal keys keep their relative order.
    items.sort_by_key(|item| (item.position.y, item.position.x));

    let mut occupied = OccupancyMap::new();
    for item in &mut items {
        item.position = find_first_available_position(
            item.position.size(),
            &occupied,
            max_columns,
            DEFAULT_MAX_ROWS,
        );
        occupied.insert(&item.position, &item.id);
    }
    items
}

fn same_positions<C>(a: &[GridItem<C>], b: &[GridItem<C>]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.id == y.id && x.position == y.position)
}
