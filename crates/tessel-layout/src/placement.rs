#![forbid(unsafe_code)]

//! Placement search and bounds normalisation.
//!
//! Both searches are row-major raster scans over top-left candidates:
//! rows `0..max_rows`, columns `0..max_columns`, skipping candidates whose
//! right edge would pass `max_columns`. Cost is bounded by
//! `max_rows × max_columns` candidate tests.
//!
//! # Failure Modes
//!
//! Exhausting the scan is a defined outcome, never an error:
//!
//! | Function | Fallback |
//! |---|---|
//! | [`find_valid_position`] | the item's original position |
//! | [`find_first_available_position`] | `(0, 0)` with the requested size |

use tessel_core::geometry::{GridPosition, GridSize};
use tessel_core::item::GridItem;

use crate::collision::is_free_at;
use crate::occupancy::OccupancyMap;

/// Nearest collision-free position for `item`, scanning from the top-left.
///
/// Returns the current position unchanged when it is already free.
pub fn find_valid_position<C>(
    item: &GridItem<C>,
    others: &[GridItem<C>],
    max_columns: u16,
    max_rows: u16,
) -> GridPosition {
    let id = item.id.as_str();
    let original = item.position;
    if is_free_at(id, &original, others, None) {
        return original;
    }

    let found = raster_candidates(original.size(), max_columns, max_rows)
        .find(|candidate| is_free_at(id, candidate, others, None));

    match found {
        Some(position) => {
            tracing::trace!(
                target: "tessel.layout",
                item_id = %item.id,
                from_x = original.x,
                from_y = original.y,
                to_x = position.x,
                to_y = position.y,
                "collision resolved"
            );
            position
        }
        None => {
            tracing::debug!(
                target: "tessel.layout",
                item_id = %item.id,
                max_columns,
                max_rows,
                "placement scan exhausted; keeping original position"
            );
            original
        }
    }
}

/// First free slot of `size` against a per-cell occupancy map.
pub fn find_first_available_position(
    size: GridSize,
    occupied: &OccupancyMap,
    max_columns: u16,
    max_rows: u16,
) -> GridPosition {
    raster_candidates(size, max_columns, max_rows)
        .find(|candidate| !occupied.intersects(candidate))
        .unwrap_or_else(|| {
            tracing::debug!(
                target: "tessel.layout",
                width = size.width,
                height = size.height,
                max_columns,
                max_rows,
                "no free slot; falling back to origin"
            );
            GridPosition::at(0, 0, size)
        })
}

/// Normalise a position into the grid.
///
/// Width and height are floored at 1. `x` shifts left so the item ends
/// within `max_columns`; with `max_rows`, `y` shifts up likewise. An item
/// larger than the grid keeps its size and is pinned to 0 on that axis.
pub fn validate_position(
    position: GridPosition,
    max_columns: u16,
    max_rows: Option<u16>,
) -> GridPosition {
    let mut validated = position;
    validated.width = validated.width.max(1);
    validated.height = validated.height.max(1);

    if validated.right() > u32::from(max_columns) {
        validated.x = max_columns.saturating_sub(validated.width);
    }

    if let Some(max_rows) = max_rows
        && validated.bottom() > u32::from(max_rows)
    {
        validated.y = max_rows.saturating_sub(validated.height);
    }

    validated
}

/// Row-major candidates of `size` that fit within `max_columns`.
fn raster_candidates(
    size: GridSize,
    max_columns: u16,
    max_rows: u16,
) -> impl Iterator<Item = GridPosition> {
    max_columns
        .checked_sub(size.width)
        .into_iter()
        .flat_map(move |last_col| {
            (0..max_rows)
                .flat_map(move |row| {
                    (0..=last_col).map(move |col| GridPosition::at(col, row, size))
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::all_occupied_cells;

    fn item(id: &str, x: u16, y: u16, w: u16, h: u16) -> GridItem {
        GridItem::new(id, GridPosition::new(x, y, w, h))
    }

    #[test]
    fn free_position_is_returned_unchanged() {
        let a = item("a", 7, 9, 2, 2);
        let b = item("b", 0, 0, 2, 2);
        assert_eq!(find_valid_position(&a, &[b], 12, 100), a.position);
    }

    #[test]
    fn scans_row_zero_left_to_right() {
        let c = item("C", 0, 0, 3, 2);
        let d = item("D", 0, 0, 3, 2);
        assert_eq!(
            find_valid_position(&c, &[d], 12, 100),
            GridPosition::new(3, 0, 3, 2)
        );
    }

    #[test]
    fn candidates_never_pass_right_edge() {
        let wide = item("w", 0, 0, 5, 1);
        // Row 0 only leaves columns 8..12 free, too narrow for width 5.
        let blocker = item("b", 0, 0, 8, 1);
        assert_eq!(
            find_valid_position(&wide, &[blocker], 12, 100),
            GridPosition::new(0, 1, 5, 1)
        );
    }

    #[test]
    fn exhaustion_keeps_original() {
        let a = item("a", 1, 1, 2, 2);
        let wall = item("wall", 0, 0, 4, 4);
        assert_eq!(find_valid_position(&a, &[wall], 4, 4), a.position);
    }

    #[test]
    fn item_wider_than_grid_keeps_original() {
        let a = item("a", 0, 0, 13, 1);
        let b = item("b", 0, 0, 1, 1);
        assert_eq!(find_valid_position(&a, &[b], 12, 100), a.position);
    }

    #[test]
    fn first_available_skips_occupied_cells() {
        let items = vec![item("a", 0, 0, 4, 1), item("b", 6, 0, 2, 2)];
        let occupied = all_occupied_cells(&items);
        assert_eq!(
            find_first_available_position(GridSize::new(2, 2), &occupied, 12, 100),
            GridPosition::new(4, 0, 2, 2)
        );
        assert_eq!(
            find_first_available_position(GridSize::new(6, 1), &occupied, 12, 100),
            GridPosition::new(0, 1, 6, 1)
        );
    }

    #[test]
    fn first_available_falls_back_to_origin() {
        let occupied = all_occupied_cells(&[item("full", 0, 0, 2, 2)]);
        assert_eq!(
            find_first_available_position(GridSize::new(1, 1), &occupied, 2, 2),
            GridPosition::new(0, 0, 1, 1)
        );
        assert_eq!(
            find_first_available_position(GridSize::new(3, 1), &OccupancyMap::new(), 2, 2),
            GridPosition::new(0, 0, 3, 1)
        );
    }

    #[test]
    fn validate_floors_size_and_shifts_into_bounds() {
        assert_eq!(
            validate_position(GridPosition::new(0, 0, 0, 0), 12, None),
            GridPosition::new(0, 0, 1, 1)
        );
        assert_eq!(
            validate_position(GridPosition::new(10, 0, 4, 2), 12, None),
            GridPosition::new(8, 0, 4, 2)
        );
        assert_eq!(
            validate_position(GridPosition::new(0, 9, 2, 3), 12, Some(10)),
            GridPosition::new(0, 7, 2, 3)
        );
        assert_eq!(
            validate_position(GridPosition::new(0, 90, 2, 3), 12, None),
            GridPosition::new(0, 90, 2, 3)
        );
    }

    #[test]
    fn validate_does_not_shrink_oversized_items() {
        assert_eq!(
            validate_position(GridPosition::new(5, 0, 20, 1), 12, None),
            GridPosition::new(0, 0, 20, 1)
        );
        assert_eq!(
            validate_position(GridPosition::new(0, 4, 1, 30), 12, Some(10)),
            GridPosition::new(0, 0, 1, 30)
        );
    }
}
